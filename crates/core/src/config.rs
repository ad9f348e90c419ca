use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::quote::{Quote, QuoteSource};

/// Alpha Vantage query endpoint.
pub const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";

/// Symbols shown in the market overview.
pub const POPULAR_SYMBOLS: [&str; 7] = ["AAPL", "GOOGL", "MSFT", "TSLA", "AMZN", "META", "NVDA"];

/// Market-data settings, handed to the quote providers at construction.
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    /// Alpha Vantage key; when absent the live Alpha Vantage provider is
    /// not registered.
    pub alphavantage_api_key: Option<String>,

    /// Override for the Alpha Vantage endpoint (tests, proxies).
    pub alphavantage_url: String,

    /// Register the keyless Yahoo Finance provider ahead of the fallback table.
    pub enable_yahoo: bool,

    /// Per-request timeout for live providers.
    pub timeout_secs: u64,

    /// Static quotes served when no live provider answers.
    pub fallback_quotes: Vec<Quote>,

    /// Symbols used by the market overview.
    pub popular_symbols: Vec<String>,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            alphavantage_api_key: None,
            alphavantage_url: ALPHA_VANTAGE_URL.to_string(),
            enable_yahoo: false,
            timeout_secs: 10,
            fallback_quotes: default_fallback_quotes(),
            popular_symbols: POPULAR_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl QuoteConfig {
    /// Offline configuration: only the fallback table answers.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_alphavantage_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.alphavantage_api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    pub fn with_fallback_quotes(mut self, quotes: Vec<Quote>) -> Self {
        self.fallback_quotes = quotes;
        self
    }
}

/// Account and trading rules.
#[derive(Debug, Clone)]
pub struct TradingConfig {
    /// Cash credited to a newly provisioned account.
    pub starting_cash: Decimal,

    /// Flat fee recorded on each trade. Fees are recorded on the trade but
    /// do not move cash.
    pub trade_fee: Decimal,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            starting_cash: dec!(10000.00),
            trade_fee: Decimal::ZERO,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn fallback_quote(
    symbol: &str,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    price: Decimal,
    volume: u64,
    previous_close: Decimal,
    change_amount: Decimal,
    change_percent: &str,
) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        price,
        change_percent: change_percent.to_string(),
        change_amount,
        open,
        high,
        low,
        volume,
        previous_close,
        latest_trading_day: NaiveDate::from_ymd_opt(2025, 1, 21),
        source: QuoteSource::Fallback,
    }
}

/// The built-in fallback table.
#[rustfmt::skip]
pub fn default_fallback_quotes() -> Vec<Quote> {
    vec![
        fallback_quote("AAPL", dec!(174.21), dec!(176.82), dec!(173.45), dec!(175.28), 58_427_693, dec!(174.18), dec!(1.10), "0.63%"),
        fallback_quote("GOOGL", dec!(181.32), dec!(183.78), dec!(180.65), dec!(182.45), 34_829_163, dec!(181.25), dec!(1.20), "0.66%"),
        fallback_quote("MSFT", dec!(416.25), dec!(419.65), dec!(414.92), dec!(417.82), 28_743_619, dec!(415.73), dec!(2.09), "0.50%"),
        fallback_quote("NVDA", dec!(876.32), dec!(894.67), dec!(872.15), dec!(880.15), 63_241_758, dec!(874.28), dec!(5.87), "0.67%"),
        fallback_quote("TSLA", dec!(174.12), dec!(177.38), dec!(172.85), dec!(175.43), 78_425_913, dec!(173.62), dec!(1.81), "1.04%"),
        fallback_quote("META", dec!(484.25), dec!(488.73), dec!(482.91), dec!(486.18), 23_176_485, dec!(483.47), dec!(2.71), "0.56%"),
        fallback_quote("AMZN", dec!(179.82), dec!(182.16), dec!(179.15), dec!(180.75), 41_985_274, dec!(179.24), dec!(1.51), "0.84%"),
    ]
}
