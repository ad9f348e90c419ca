use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use super::traits::QuoteProvider;
use crate::config::ALPHA_VANTAGE_URL;
use crate::errors::CoreError;
use crate::models::quote::{Quote, QuoteSource};

const PROVIDER: &str = "Alpha Vantage";

/// Alpha Vantage `GLOBAL_QUOTE` provider.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key.
/// - **Failure modes**: a rate-limited or invalid request still answers
///   HTTP 200, with a `Note`/`Information`/`Error Message` body instead of
///   the quote. All of those are reported as errors so the caller falls
///   through to the next provider.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, ALPHA_VANTAGE_URL.to_string(), Duration::from_secs(10))
    }

    pub fn with_endpoint(api_key: String, base_url: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url,
        }
    }

    /// Turn a raw `GLOBAL_QUOTE` body into a quote.
    pub fn parse_response(symbol: &str, body: &str) -> Result<Quote, CoreError> {
        let resp: GlobalQuoteResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse quote for {symbol}: {e}"),
        })?;

        if let Some(msg) = resp.error_message {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Invalid symbol or API error for {symbol}: {msg}"),
            });
        }
        if let Some(msg) = resp.note.or(resp.information) {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("API rate limit exceeded: {msg}"),
            });
        }

        let quote = resp.global_quote.ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No data returned for {symbol}"),
        })?;

        // Unknown tickers come back as an empty "Global Quote" object.
        let Some(price) = quote.price.as_deref() else {
            return Err(CoreError::SymbolNotFound(symbol.to_string()));
        };
        let price = parse_decimal(symbol, "price", price)?;

        let optional =
            |field: &'static str, raw: &Option<String>| -> Result<Option<Decimal>, CoreError> {
                raw.as_deref().map(|v| parse_decimal(symbol, field, v)).transpose()
            };
        let previous_close = optional("previous close", &quote.previous_close)?.unwrap_or(price);
        let change_amount = optional("change", &quote.change)?.unwrap_or(price - previous_close);

        let volume = match quote.volume.as_deref() {
            Some(v) => v.trim().parse::<u64>().map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Invalid volume for {symbol}: {e}"),
            })?,
            None => 0,
        };

        Ok(Quote {
            symbol: quote
                .symbol
                .map(|s| s.to_uppercase())
                .unwrap_or_else(|| symbol.to_uppercase()),
            price,
            change_percent: quote.change_percent.unwrap_or_else(|| "0.00%".into()),
            change_amount,
            open: optional("open", &quote.open)?.unwrap_or(price),
            high: optional("high", &quote.high)?.unwrap_or(price),
            low: optional("low", &quote.low)?.unwrap_or(price),
            volume,
            previous_close,
            latest_trading_day: quote
                .latest_trading_day
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            source: QuoteSource::Live(PROVIDER.into()),
        })
    }
}

fn parse_decimal(symbol: &str, field: &str, raw: &str) -> Result<Decimal, CoreError> {
    Decimal::from_str(raw.trim()).map_err(|e| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Invalid {field} format for {symbol}: {e}"),
    })
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "02. open")]
    open: Option<String>,
    #[serde(rename = "03. high")]
    high: Option<String>,
    #[serde(rename = "04. low")]
    low: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("HTTP {status} for {symbol}"),
            });
        }

        let body = resp.text().await?;
        Self::parse_response(symbol, &body)
    }
}
