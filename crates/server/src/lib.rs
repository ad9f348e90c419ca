//! Papertrade HTTP API
//!
//! Axum router over `papertrade_core::PaperTrader`. The caller's identity
//! comes from the `x-user-id` header set by the authentication layer in
//! front of this service.

pub mod config;
pub mod handlers;
pub mod state;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Accounts
        .route("/api/accounts", post(handlers::create_account))
        // Trading
        .route("/api/trading/execute", post(handlers::execute_trade))
        .route("/api/trading/history", get(handlers::trade_history))
        .route("/api/trading/quote", get(handlers::get_quote))
        .route("/api/trading/search", get(handlers::search))
        .route("/api/trading/stats", get(handlers::trade_stats))
        .route("/api/trading/top-symbols", get(handlers::top_symbols))
        // Portfolio & market
        .route("/api/portfolio", get(handlers::portfolio))
        .route("/api/market/summary", get(handlers::market_summary))
        // Favorites
        .route(
            "/api/favorites",
            get(handlers::list_favorites).post(handlers::add_favorite),
        )
        .route("/api/favorites/{symbol}", delete(handlers::remove_favorite))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
