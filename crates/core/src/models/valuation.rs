use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Valuation of a single holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingValuation {
    pub symbol: String,
    pub shares: u64,
    pub avg_price: Decimal,

    /// Price used for this pass (fresh quote, or the stored one when stale)
    pub current_price: Decimal,
    pub previous_close: Decimal,

    /// shares × current_price
    pub current_value: Decimal,
    pub total_cost: Decimal,

    /// current_value − total_cost
    pub profit_loss: Decimal,
    pub profit_loss_percent: Decimal,

    /// shares × (current_price − previous_close)
    pub daily_change: Decimal,
    pub daily_change_percent: Decimal,

    /// No fresh quote was available for this pass.
    pub quote_stale: bool,
}

/// Full derived figures for a portfolio at one point in time.
///
/// Invariant: `total_value == cash + total_asset_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub cash: Decimal,
    pub total_asset_value: Decimal,
    pub total_value: Decimal,
    pub total_profit_loss: Decimal,
    pub daily_change: Decimal,
    pub daily_change_percent: Decimal,
    pub holdings: Vec<HoldingValuation>,
    pub valued_at: DateTime<Utc>,
}
