use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lookback window for trade statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsWindow {
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    #[default]
    Month,
    #[serde(rename = "1y")]
    Year,
    #[serde(rename = "all")]
    All,
}

impl StatsWindow {
    /// Parse a timeframe label ("1d", "7d", "30d", "1y"); anything else
    /// means all time.
    pub fn from_timeframe(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "1d" => StatsWindow::Day,
            "7d" => StatsWindow::Week,
            "30d" => StatsWindow::Month,
            "1y" => StatsWindow::Year,
            _ => StatsWindow::All,
        }
    }

    /// Start of the window relative to `now`; `None` for all time.
    pub fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let span = match self {
            StatsWindow::Day => Duration::days(1),
            StatsWindow::Week => Duration::days(7),
            StatsWindow::Month => Duration::days(30),
            StatsWindow::Year => Duration::days(365),
            StatsWindow::All => return None,
        };
        Some(now - span)
    }
}

/// Aggregate figures over a user's executed trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStats {
    pub window: StatsWindow,
    pub total_trades: usize,
    pub buy_trades: usize,
    pub sell_trades: usize,

    /// Sum of trade totals
    pub total_volume: Decimal,

    /// total_volume / total_trades, 0 when there are no trades
    pub avg_trade_size: Decimal,
    pub total_fees: Decimal,
}

/// How actively one symbol has been traded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolActivity {
    pub symbol: String,
    pub trade_count: usize,
    pub total_volume: Decimal,
    pub last_trade_at: DateTime<Utc>,
}
