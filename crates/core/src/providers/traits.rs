use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::quote::Quote;

/// Abstraction over every source of stock quotes.
///
/// Live market-data APIs and the static fallback table implement the same
/// trait, so the quote service can walk them in priority order without
/// caring which one finally answers.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Symbols this provider can always answer for without a network call.
    /// Live providers return an empty list.
    fn known_symbols(&self) -> Vec<String> {
        Vec::new()
    }

    /// Current quote for an already-uppercased symbol.
    ///
    /// Returns `SymbolNotFound` when the source has no data for the symbol,
    /// any other error when the source itself failed.
    async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError>;
}
