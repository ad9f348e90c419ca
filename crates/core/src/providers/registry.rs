use std::time::Duration;

use crate::config::QuoteConfig;

use super::alphavantage::AlphaVantageProvider;
use super::fallback::StaticQuoteProvider;
use super::traits::QuoteProvider;
use super::yahoo_finance::YahooFinanceProvider;

/// Ordered list of quote providers.
///
/// Registration order is priority order: the quote service asks each
/// provider in turn and stops at the first usable answer.
pub struct QuoteProviderRegistry {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl QuoteProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry from configuration.
    ///
    /// Order: Alpha Vantage (only with a key), Yahoo Finance (only when
    /// enabled), then the static fallback table.
    pub fn new_with_defaults(config: &QuoteConfig) -> Self {
        let mut registry = Self::new();

        if let Some(key) = &config.alphavantage_api_key {
            registry.register(Box::new(AlphaVantageProvider::with_endpoint(
                key.clone(),
                config.alphavantage_url.clone(),
                Duration::from_secs(config.timeout_secs),
            )));
        } else {
            tracing::warn!("No Alpha Vantage API key configured, live quotes disabled");
        }

        if config.enable_yahoo {
            match YahooFinanceProvider::new() {
                Ok(yahoo) => registry.register(Box::new(yahoo)),
                Err(e) => tracing::warn!(error = %e, "Yahoo Finance provider unavailable"),
            }
        }

        registry.register(Box::new(StaticQuoteProvider::new(
            config.fallback_quotes.clone(),
        )));

        registry
    }

    /// Register a provider after all existing ones.
    pub fn register(&mut self, provider: Box<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    /// Providers in priority order.
    pub fn providers(&self) -> impl Iterator<Item = &dyn QuoteProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Union of symbols the providers can answer offline, sorted.
    pub fn known_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .providers
            .iter()
            .flat_map(|p| p.known_symbols())
            .collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for QuoteProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
