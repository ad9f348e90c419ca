use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::config::QuoteConfig;
use crate::errors::CoreError;
use crate::models::quote::{MarketMover, Quote};
use crate::providers::registry::QuoteProviderRegistry;
use crate::validation::{self, ValidationIssue};

/// Maximum number of partial matches returned by `search`.
const MAX_SEARCH_RESULTS: usize = 10;

/// Fetches quotes from the registered providers with automatic fallback.
///
/// No caching: every call goes to the providers, so a trade is always
/// priced with a quote fetched for that trade.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
    popular_symbols: Vec<String>,
}

impl QuoteService {
    pub fn new(registry: QuoteProviderRegistry) -> Self {
        Self {
            registry,
            popular_symbols: Vec::new(),
        }
    }

    /// Build the default provider chain from configuration.
    pub fn from_config(config: &QuoteConfig) -> Self {
        Self {
            registry: QuoteProviderRegistry::new_with_defaults(config),
            popular_symbols: config.popular_symbols.clone(),
        }
    }

    pub fn with_popular_symbols(mut self, symbols: Vec<String>) -> Self {
        self.popular_symbols = symbols;
        self
    }

    /// Names of the providers in the order they are asked.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry.provider_names()
    }

    /// Current quote for `symbol` (trimmed and uppercased first).
    ///
    /// Fails with `SymbolNotFound` when no source knows the symbol and with
    /// `QuoteUnavailable` when the sources failed for any other reason.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let symbol = validation::normalize_symbol(symbol)
            .map_err(|issue| CoreError::Validation(issue.into()))?;
        self.fetch_quote(&symbol).await
    }

    /// Quotes for many symbols, fetched concurrently.
    ///
    /// Each symbol maps to `None` when its lookup failed; a failure never
    /// affects the other entries.
    pub async fn get_quotes_batch(&self, symbols: &[String]) -> HashMap<String, Option<Quote>> {
        let mut unique: Vec<String> = symbols.iter().map(|s| s.trim().to_uppercase()).collect();
        unique.sort();
        unique.dedup();

        let lookups = unique.iter().map(|symbol| async move {
            match self.get_quote(symbol).await {
                Ok(quote) => (symbol.clone(), Some(quote)),
                Err(e) => {
                    tracing::warn!(%symbol, error = %e, "Quote lookup failed in batch");
                    (symbol.clone(), None)
                }
            }
        });

        join_all(lookups).await.into_iter().collect()
    }

    /// Search by exact symbol first, then by substring over the symbols the
    /// providers know offline (at most 10 results).
    pub async fn search(&self, query: &str) -> Result<Vec<Quote>, CoreError> {
        let query = query.trim().to_uppercase();
        if query.is_empty() {
            return Err(CoreError::Validation(
                ValidationIssue::MissingField("query").into(),
            ));
        }

        match self.get_quote(&query).await {
            Ok(quote) => return Ok(vec![quote]),
            Err(e) => tracing::debug!(%query, error = %e, "No exact match, trying partial matches"),
        }

        let candidates: Vec<String> = self
            .registry
            .known_symbols()
            .into_iter()
            .filter(|s| s.contains(&query))
            .take(MAX_SEARCH_RESULTS)
            .collect();

        let quotes = self.get_quotes_batch(&candidates).await;
        let results: Vec<Quote> = candidates
            .iter()
            .filter_map(|s| quotes.get(s).cloned().flatten())
            .collect();

        if results.is_empty() {
            return Err(CoreError::SymbolNotFound(query));
        }
        Ok(results)
    }

    /// Whether any provider can quote `symbol`.
    pub async fn validate_symbol(&self, symbol: &str) -> bool {
        self.get_quote(symbol).await.is_ok()
    }

    /// Condensed quotes for the popular symbols, skipping any that failed.
    pub async fn market_summary(&self) -> Vec<MarketMover> {
        let quotes = self.get_quotes_batch(&self.popular_symbols).await;
        self.popular_symbols
            .iter()
            .filter_map(|s| quotes.get(&s.to_uppercase()).and_then(Option::as_ref))
            .map(MarketMover::from)
            .collect()
    }

    /// Walk the providers in priority order until one returns a usable quote.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        if self.registry.is_empty() {
            return Err(CoreError::QuoteUnavailable {
                symbol: symbol.to_string(),
                reason: "no quote provider configured".into(),
            });
        }

        let mut not_found = false;
        let mut last_error = None;

        for provider in self.registry.providers() {
            match provider.get_quote(symbol).await {
                Ok(quote) if quote.price > Decimal::ZERO => {
                    tracing::debug!(
                        %symbol,
                        provider = provider.name(),
                        price = %quote.price,
                        "Quote fetched"
                    );
                    return Ok(quote);
                }
                Ok(quote) => {
                    tracing::warn!(
                        %symbol,
                        provider = provider.name(),
                        price = %quote.price,
                        "Discarding non-positive price"
                    );
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!(
                            "Invalid price returned for {symbol}: {} (must be positive)",
                            quote.price
                        ),
                    });
                }
                Err(CoreError::SymbolNotFound(_)) => {
                    tracing::debug!(
                        %symbol,
                        provider = provider.name(),
                        "Symbol unknown to provider"
                    );
                    not_found = true;
                }
                Err(e) => {
                    tracing::warn!(
                        %symbol,
                        provider = provider.name(),
                        error = %e,
                        "Quote provider failed, falling back"
                    );
                    last_error = Some(e);
                }
            }
        }

        if not_found {
            return Err(CoreError::SymbolNotFound(symbol.to_string()));
        }
        Err(CoreError::QuoteUnavailable {
            symbol: symbol.to_string(),
            reason: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no provider answered".into()),
        })
    }
}
