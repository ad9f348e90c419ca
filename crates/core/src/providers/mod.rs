pub mod registry;
pub mod traits;

// Quote sources
pub mod alphavantage;
pub mod fallback;
pub mod yahoo_finance;
