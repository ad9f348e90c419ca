pub mod analytics_service;
pub mod favorites_service;
pub mod ledger_service;
pub mod quote_service;
pub mod trade_service;
pub mod valuation_service;
