use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A user's position in one symbol.
///
/// Cost basis is a weighted average: every buy folds its cost into
/// `total_cost` and recomputes `avg_price`; a partial sell removes the same
/// fraction of `total_cost` as of `shares`, so `avg_price` is unchanged.
/// There is no lot tracking (no FIFO/LIFO).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Uppercased ticker, unique within a portfolio
    pub symbol: String,

    /// Whole shares held; a holding never exists with zero shares
    pub shares: u64,

    /// Weighted average entry price
    pub avg_price: Decimal,

    /// Cost basis of the shares still held
    pub total_cost: Decimal,

    /// Last known quote price; stale between valuation passes
    pub current_price: Decimal,

    pub last_updated: DateTime<Utc>,
}

impl Holding {
    /// Open a new position bought at `price`.
    pub fn open(symbol: impl Into<String>, shares: u64, price: Decimal) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            shares,
            avg_price: price,
            total_cost: Decimal::from(shares) * price,
            current_price: price,
            last_updated: Utc::now(),
        }
    }

    /// Value of the position at the last known price.
    pub fn market_value(&self) -> Decimal {
        Decimal::from(self.shares) * self.current_price
    }
}
