//! Application State

use std::sync::Arc;

use papertrade_core::PaperTrader;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub trader: Arc<PaperTrader>,
}

impl AppState {
    pub fn new(trader: PaperTrader) -> Self {
        Self {
            trader: Arc::new(trader),
        }
    }
}
