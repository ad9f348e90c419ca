use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::quote::QuoteSource;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

impl std::str::FromStr for TradeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(TradeAction::Buy),
            "SELL" => Ok(TradeAction::Sell),
            other => Err(format!("unknown trade action: {other}")),
        }
    }
}

/// Lifecycle status of a trade record. The executor only ever records
/// `Executed`; the other values exist for records imported from elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Pending,
    Executed,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
}

/// Cash and total value captured immediately before and after a trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub cash_before: Decimal,
    pub cash_after: Decimal,
    pub total_value_before: Decimal,
    pub total_value_after: Decimal,
}

/// Market figures from the quote the trade was priced with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub volume: u64,
    pub previous_close: Decimal,
    pub quote_source: QuoteSource,
}

/// An executed trade. Append-only: once recorded it is never mutated or
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: u64,

    /// Quote price at execution
    pub price: Decimal,

    /// `quantity * price`
    pub total: Decimal,

    pub fees: Decimal,
    pub status: TradeStatus,
    pub order_type: OrderType,
    pub executed_at: DateTime<Utc>,
    pub portfolio_snapshot: PortfolioSnapshot,
    pub market_data: MarketData,
}

/// Trade request as it arrives at the boundary, before validation.
///
/// `quantity` stays a raw JSON value so that fractional or non-numeric
/// input can be reported instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeRequest {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub action: Option<String>,
}

impl TradeRequest {
    pub fn new(symbol: &str, quantity: impl Into<Value>, action: &str) -> Self {
        Self {
            symbol: Some(symbol.to_string()),
            quantity: Some(quantity.into()),
            action: Some(action.to_string()),
        }
    }
}

/// A well-formed order: symbol normalized, quantity positive, action known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOrder {
    pub symbol: String,
    pub quantity: u64,
    pub action: TradeAction,
}

impl TradeOrder {
    pub fn buy(symbol: impl Into<String>, quantity: u64) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            quantity,
            action: TradeAction::Buy,
        }
    }

    pub fn sell(symbol: impl Into<String>, quantity: u64) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            quantity,
            action: TradeAction::Sell,
        }
    }
}
