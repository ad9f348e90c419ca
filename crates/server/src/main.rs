//! Papertrade HTTP Server

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use papertrade_core::storage::{file::FileStore, memory::MemoryStore, traits::Store};
use papertrade_core::PaperTrader;
use papertrade_server::{config::ServerConfig, router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let store: Arc<dyn Store> = match &config.data_file {
        Some(path) => Arc::new(FileStore::open(path).await?),
        None => {
            tracing::warn!("DATA_FILE not set, accounts and trades live in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let trader = PaperTrader::new(&config.quote, config.trading.clone(), store);
    tracing::info!("Quote providers: {}", trader.quote_service().provider_names().join(" → "));

    let app = router(AppState::new(trader));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Papertrade server running on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
