use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::favorite::Favorite;
use super::holding::Holding;

/// Cash plus holdings for one user.
///
/// `total_value`, `total_asset_value`, `daily_change` and
/// `daily_change_percent` are cached results of the last valuation pass.
/// They are never authoritative; they can always be recomputed from `cash`,
/// `holdings` and fresh quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    /// Uninvested cash; never negative
    pub cash: Decimal,

    /// Positions in insertion order
    pub holdings: Vec<Holding>,

    pub total_value: Decimal,
    pub total_asset_value: Decimal,
    pub daily_change: Decimal,
    pub daily_change_percent: Decimal,

    pub last_updated: DateTime<Utc>,

    /// Bumped by the store on every successful write.
    #[serde(default)]
    pub version: u64,
}

impl Portfolio {
    /// A fresh portfolio holding only `cash`.
    pub fn with_cash(cash: Decimal) -> Self {
        Self {
            cash,
            holdings: Vec::new(),
            total_value: cash,
            total_asset_value: Decimal::ZERO,
            daily_change: Decimal::ZERO,
            daily_change_percent: Decimal::ZERO,
            last_updated: Utc::now(),
            version: 0,
        }
    }

    /// Find a holding by symbol (case-insensitive).
    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        let upper = symbol.to_uppercase();
        self.holdings.iter().find(|h| h.symbol == upper)
    }

    /// Shares held of `symbol`, 0 when there is no position.
    pub fn shares_of(&self, symbol: &str) -> u64 {
        self.holding(symbol).map_or(0, |h| h.shares)
    }

    pub fn symbols(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.symbol.clone()).collect()
    }
}

/// The persisted user record: portfolio and watchlist, keyed by the id the
/// identity layer hands us.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub user_id: Uuid,
    pub portfolio: Portfolio,
    pub favorites: Vec<Favorite>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user_id: Uuid, starting_cash: Decimal) -> Self {
        Self {
            user_id,
            portfolio: Portfolio::with_cash(starting_cash),
            favorites: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn favorite(&self, symbol: &str) -> Option<&Favorite> {
        let upper = symbol.to_uppercase();
        self.favorites.iter().find(|f| f.symbol == upper)
    }
}
