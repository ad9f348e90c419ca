pub mod config;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;
pub mod validation;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use config::{QuoteConfig, TradingConfig};
use errors::CoreError;
use models::{
    analytics::{StatsWindow, SymbolActivity, TradeStats},
    favorite::{FavoriteRequest, FavoriteView},
    portfolio::Account,
    quote::{MarketMover, Quote},
    trade::{Trade, TradeRequest},
    valuation::PortfolioValuation,
};
use services::{
    analytics_service::AnalyticsService, favorites_service::FavoritesService,
    quote_service::QuoteService, trade_service::TradeService,
    valuation_service::ValuationService,
};
use storage::traits::Store;

/// Main entry point for the paper trading core.
///
/// Holds the quote providers, the store and every service needed to operate
/// on accounts. Cheap to share behind an `Arc`; all methods take `&self`.
#[must_use]
pub struct PaperTrader {
    quotes: QuoteService,
    store: Arc<dyn Store>,
    trading: TradingConfig,
    trade_service: TradeService,
    valuation_service: ValuationService,
    favorites_service: FavoritesService,
    analytics_service: AnalyticsService,
    /// One lock per user; every write to a user's account runs under it.
    /// Entries are dropped once nobody holds or waits on them.
    user_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for PaperTrader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperTrader")
            .field("providers", &self.quotes.provider_names())
            .field("starting_cash", &self.trading.starting_cash)
            .field("trade_fee", &self.trading.trade_fee)
            .finish()
    }
}

impl PaperTrader {
    /// Build with the default provider chain for `quote_config`.
    pub fn new(quote_config: &QuoteConfig, trading: TradingConfig, store: Arc<dyn Store>) -> Self {
        Self::with_quote_service(QuoteService::from_config(quote_config), trading, store)
    }

    /// Build around an already assembled quote service (custom providers).
    pub fn with_quote_service(
        quotes: QuoteService,
        trading: TradingConfig,
        store: Arc<dyn Store>,
    ) -> Self {
        Self {
            trade_service: TradeService::new(&trading),
            quotes,
            store,
            trading,
            valuation_service: ValuationService::new(),
            favorites_service: FavoritesService::new(),
            analytics_service: AnalyticsService::new(),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn quote_service(&self) -> &QuoteService {
        &self.quotes
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Number of users that currently hold or wait on their account lock.
    pub async fn tracked_user_locks(&self) -> usize {
        self.user_locks.lock().await.len()
    }

    /// Run `work` while holding `user_id`'s account lock.
    async fn with_user_lock<T, F>(&self, user_id: Uuid, work: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        let lock = {
            let mut locks = self.user_locks.lock().await;
            locks.entry(user_id).or_default().clone()
        };

        let result = {
            let _guard = lock.lock().await;
            work.await
        };

        drop(lock);
        let mut locks = self.user_locks.lock().await;
        // Clones are only handed out under the map lock, so a count of one
        // means no other caller holds or waits on this entry.
        if locks.get(&user_id).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            locks.remove(&user_id);
        }
        result
    }

    // ── Accounts ────────────────────────────────────────────────────

    /// Provision an account with the configured starting cash.
    pub async fn create_account(&self, user_id: Uuid) -> Result<Account, CoreError> {
        let account = Account::new(user_id, self.trading.starting_cash);
        let account = self.store.create_account(account).await?;
        tracing::info!(%user_id, cash = %account.portfolio.cash, "Account created");
        Ok(account)
    }

    pub async fn account(&self, user_id: Uuid) -> Result<Account, CoreError> {
        self.store.load_account(user_id).await
    }

    // ── Trading ─────────────────────────────────────────────────────

    /// Execute a market order at the current quote.
    pub async fn execute_trade(
        &self,
        user_id: Uuid,
        request: &TradeRequest,
    ) -> Result<Trade, CoreError> {
        self.with_user_lock(
            user_id,
            self.trade_service.execute(&self.quotes, self.store.as_ref(), user_id, request),
        )
        .await
    }

    /// Trade history, newest first. `limit` defaults to 50 and may not
    /// exceed 500.
    pub async fn trade_history(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Trade>, CoreError> {
        let (limit, offset) = validation::validate_page(limit, offset)?;
        self.store.load_account(user_id).await?;
        self.store.list_trades(user_id, limit, offset).await
    }

    // ── Portfolio ───────────────────────────────────────────────────

    /// Value the portfolio at current quotes and cache the totals on the
    /// account.
    ///
    /// Holdings whose quote fails are valued at their last stored price.
    /// Failing to save the refreshed totals does not fail the call.
    pub async fn portfolio_summary(&self, user_id: Uuid) -> Result<PortfolioValuation, CoreError> {
        self.with_user_lock(user_id, self.refresh_portfolio(user_id)).await
    }

    async fn refresh_portfolio(&self, user_id: Uuid) -> Result<PortfolioValuation, CoreError> {
        let mut account = self.store.load_account(user_id).await?;
        let fetched = self
            .quotes
            .get_quotes_batch(&account.portfolio.symbols())
            .await;
        let quotes: HashMap<String, Quote> = fetched
            .into_iter()
            .filter_map(|(symbol, quote)| quote.map(|q| (symbol, q)))
            .collect();

        let valuation = self.valuation_service.valuate(
            account.portfolio.cash,
            &account.portfolio.holdings,
            &quotes,
        );
        self.valuation_service.apply(&mut account.portfolio, &valuation);

        if let Err(e) = self.store.save_account(&account).await {
            tracing::warn!(%user_id, error = %e, "Could not save refreshed portfolio totals");
        }
        Ok(valuation)
    }

    // ── Market Data ─────────────────────────────────────────────────

    pub async fn quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        self.quotes.get_quote(symbol).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Quote>, CoreError> {
        self.quotes.search(query).await
    }

    pub async fn market_summary(&self) -> Vec<MarketMover> {
        self.quotes.market_summary().await
    }

    // ── Favorites ───────────────────────────────────────────────────

    /// Watchlist with refreshed quotes. The refreshed prices are written
    /// back, so this runs under the account lock like any other write.
    pub async fn favorites(&self, user_id: Uuid) -> Result<Vec<FavoriteView>, CoreError> {
        self.with_user_lock(
            user_id,
            self.favorites_service.list(&self.quotes, self.store.as_ref(), user_id),
        )
        .await
    }

    pub async fn add_favorite(
        &self,
        user_id: Uuid,
        request: &FavoriteRequest,
    ) -> Result<FavoriteView, CoreError> {
        self.with_user_lock(
            user_id,
            self.favorites_service.add(&self.quotes, self.store.as_ref(), user_id, request),
        )
        .await
    }

    pub async fn remove_favorite(&self, user_id: Uuid, symbol: &str) -> Result<(), CoreError> {
        self.with_user_lock(
            user_id,
            self.favorites_service.remove(self.store.as_ref(), user_id, symbol),
        )
        .await
    }

    // ── Analytics ───────────────────────────────────────────────────

    pub async fn trade_stats(
        &self,
        user_id: Uuid,
        window: StatsWindow,
    ) -> Result<TradeStats, CoreError> {
        self.store.load_account(user_id).await?;
        let since = window.start(chrono::Utc::now());
        let trades = self.store.trades_since(user_id, since).await?;
        Ok(self.analytics_service.trade_stats(&trades, window))
    }

    pub async fn most_traded_symbols(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<SymbolActivity>, CoreError> {
        self.store.load_account(user_id).await?;
        let trades = self.store.trades_since(user_id, None).await?;
        Ok(self.analytics_service.most_traded_symbols(&trades, limit))
    }
}
