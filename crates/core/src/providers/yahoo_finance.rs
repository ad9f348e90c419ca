use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::quote::{Quote, QuoteSource};

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance provider for stock quotes.
///
/// - **Free**: No API key required.
/// - **No strict rate limits** (unofficial public API).
/// - **Data**: daily OHLCV bars; the last bar is the current session and the
///   one before it supplies the previous close.
///
/// Opt-in through `QuoteConfig::enable_yahoo` because the endpoint is
/// unofficial and may change without notice.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    fn to_decimal(symbol: &str, value: f64) -> Result<Decimal, CoreError> {
        Decimal::from_f64(value)
            .map(|d| d.round_dp(4))
            .ok_or_else(|| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Invalid price returned for {symbol}: {value}"),
            })
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let resp = self
            .connector
            .get_quote_range(symbol, "1d", "5d")
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch quote for {symbol}: {e}"),
            })?;

        let bars = resp.quotes().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse quotes for {symbol}: {e}"),
        })?;

        let last = bars
            .last()
            .ok_or_else(|| CoreError::SymbolNotFound(symbol.to_string()))?;
        let previous = bars.len().checked_sub(2).and_then(|i| bars.get(i));

        let price = Self::to_decimal(symbol, last.close)?;
        let previous_close = match previous {
            Some(bar) => Self::to_decimal(symbol, bar.close)?,
            None => Self::to_decimal(symbol, last.open)?,
        };

        let mut quote = Quote::from_prices(
            symbol,
            price,
            previous_close,
            QuoteSource::Live(PROVIDER.into()),
        );
        quote.open = Self::to_decimal(symbol, last.open)?;
        quote.high = Self::to_decimal(symbol, last.high)?;
        quote.low = Self::to_decimal(symbol, last.low)?;
        quote.volume = last.volume;
        quote.latest_trading_day =
            chrono::DateTime::from_timestamp(last.timestamp, 0).map(|dt| dt.date_naive());
        Ok(quote)
    }
}
