use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a quote came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteSource {
    /// A live market-data provider, by name (e.g. "Alpha Vantage").
    Live(String),
    /// The static table used when no live provider answers.
    Fallback,
}

impl std::fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteSource::Live(provider) => write!(f, "{provider}"),
            QuoteSource::Fallback => write!(f, "Fallback"),
        }
    }
}

/// A point-in-time price snapshot for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Uppercased ticker
    pub symbol: String,

    /// Last traded price
    pub price: Decimal,

    /// Change since previous close as reported by the source, e.g. "0.63%"
    pub change_percent: String,

    /// Change since previous close in currency units
    pub change_amount: Decimal,

    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: u64,
    pub previous_close: Decimal,

    /// Trading session the quote belongs to, when the source reports one
    pub latest_trading_day: Option<NaiveDate>,

    pub source: QuoteSource,
}

impl Quote {
    /// Build a quote from the handful of figures every source can provide;
    /// the change fields are derived from `price` and `previous_close`.
    pub fn from_prices(
        symbol: impl Into<String>,
        price: Decimal,
        previous_close: Decimal,
        source: QuoteSource,
    ) -> Self {
        let change_amount = price - previous_close;
        let change_percent = if previous_close.is_zero() {
            "0.00%".to_string()
        } else {
            let pct = change_amount / previous_close * Decimal::ONE_HUNDRED;
            format!("{:.2}%", pct.round_dp(2))
        };
        Self {
            symbol: symbol.into().to_uppercase(),
            price,
            change_percent,
            change_amount,
            open: price,
            high: price,
            low: price,
            volume: 0,
            previous_close,
            latest_trading_day: None,
            source,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == QuoteSource::Fallback
    }
}

/// Condensed quote used by the market overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMover {
    pub symbol: String,
    pub price: Decimal,
    pub change: String,
    pub change_amount: Decimal,
}

impl From<&Quote> for MarketMover {
    fn from(quote: &Quote) -> Self {
        Self {
            symbol: quote.symbol.clone(),
            price: quote.price,
            change: quote.change_percent.clone(),
            change_amount: quote.change_amount,
        }
    }
}
