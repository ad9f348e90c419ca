use async_trait::async_trait;
use std::collections::HashMap;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::quote::{Quote, QuoteSource};

/// Serves quotes from a fixed table. Used whenever no live source is
/// configured or every live source failed.
pub struct StaticQuoteProvider {
    quotes: HashMap<String, Quote>,
}

impl StaticQuoteProvider {
    pub fn new(quotes: Vec<Quote>) -> Self {
        let quotes = quotes
            .into_iter()
            .map(|mut q| {
                q.symbol = q.symbol.to_uppercase();
                q.source = QuoteSource::Fallback;
                (q.symbol.clone(), q)
            })
            .collect();
        Self { quotes }
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[async_trait]
impl QuoteProvider for StaticQuoteProvider {
    fn name(&self) -> &str {
        "Fallback"
    }

    fn known_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.quotes.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        self.quotes
            .get(&symbol.to_uppercase())
            .cloned()
            .ok_or_else(|| CoreError::SymbolNotFound(symbol.to_uppercase()))
    }
}
