//! Server configuration from the environment

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use rust_decimal::Decimal;

use papertrade_core::config::{QuoteConfig, TradingConfig};

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,

    /// Ledger snapshot file; in-memory store when unset
    pub data_file: Option<PathBuf>,

    pub quote: QuoteConfig,
    pub trading: TradingConfig,
}

impl ServerConfig {
    /// Read `BIND_ADDR`, `DATA_FILE`, `ALPHA_VANTAGE_API_KEY`,
    /// `QUOTE_TIMEOUT_SECS`, `ENABLE_YAHOO` and `STARTING_CASH`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".into())
            .parse()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:3000")?;

        let mut quote = QuoteConfig::default();
        if let Some(key) = var("ALPHA_VANTAGE_API_KEY") {
            quote = quote.with_alphavantage_key(key);
        }
        if let Some(secs) = var("QUOTE_TIMEOUT_SECS") {
            quote.timeout_secs = secs
                .parse()
                .context("QUOTE_TIMEOUT_SECS must be a whole number of seconds")?;
        }
        if let Some(flag) = var("ENABLE_YAHOO") {
            quote.enable_yahoo =
                matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }

        let mut trading = TradingConfig::default();
        if let Some(cash) = var("STARTING_CASH") {
            let cash = Decimal::from_str(&cash).context("STARTING_CASH must be a decimal amount")?;
            anyhow::ensure!(cash >= Decimal::ZERO, "STARTING_CASH cannot be negative");
            trading.starting_cash = cash;
        }

        Ok(Self {
            bind_addr,
            data_file: var("DATA_FILE").map(PathBuf::from),
            quote,
            trading,
        })
    }
}
