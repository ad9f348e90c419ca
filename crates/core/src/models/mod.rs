pub mod analytics;
pub mod favorite;
pub mod holding;
pub mod portfolio;
pub mod quote;
pub mod trade;
pub mod valuation;
