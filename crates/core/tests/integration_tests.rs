// ═══════════════════════════════════════════════════════════════════
// Integration Tests — PaperTrader facade end to end
// ═══════════════════════════════════════════════════════════════════
//
// A scripted quote provider stands in for the market so prices can move
// between calls; everything else is the real stack over a MemoryStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use papertrade_core::config::{QuoteConfig, TradingConfig};
use papertrade_core::errors::CoreError;
use papertrade_core::models::analytics::StatsWindow;
use papertrade_core::models::favorite::FavoriteRequest;
use papertrade_core::models::portfolio::Account;
use papertrade_core::models::quote::{Quote, QuoteSource};
use papertrade_core::models::trade::{Trade, TradeAction, TradeRequest};
use papertrade_core::providers::registry::QuoteProviderRegistry;
use papertrade_core::providers::traits::QuoteProvider;
use papertrade_core::services::quote_service::QuoteService;
use papertrade_core::storage::memory::MemoryStore;
use papertrade_core::storage::traits::Store;
use papertrade_core::PaperTrader;

// ═══════════════════════════════════════════════════════════════════
// Scripted market
// ═══════════════════════════════════════════════════════════════════

#[derive(Default)]
struct MarketState {
    /// symbol → (price, previous close)
    prices: HashMap<String, (Decimal, Decimal)>,
    outages: HashSet<String>,
    delays: HashMap<String, Duration>,
}

#[derive(Clone, Default)]
struct ScriptedMarket {
    state: Arc<Mutex<MarketState>>,
}

impl ScriptedMarket {
    fn set(&self, symbol: &str, price: Decimal, previous_close: Decimal) {
        let mut state = self.state.lock().unwrap();
        state.prices.insert(symbol.into(), (price, previous_close));
        state.outages.remove(symbol);
    }

    fn outage(&self, symbol: &str) {
        self.state.lock().unwrap().outages.insert(symbol.into());
    }

    fn delay(&self, symbol: &str, delay: Duration) {
        self.state.lock().unwrap().delays.insert(symbol.into(), delay);
    }
}

#[async_trait]
impl QuoteProvider for ScriptedMarket {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let delay = self.state.lock().unwrap().delays.get(symbol).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        if state.outages.contains(symbol) {
            return Err(CoreError::Network("connection reset".into()));
        }
        let (price, previous_close) = state
            .prices
            .get(symbol)
            .copied()
            .ok_or_else(|| CoreError::SymbolNotFound(symbol.into()))?;
        Ok(Quote::from_prices(
            symbol,
            price,
            previous_close,
            QuoteSource::Live("Scripted".into()),
        ))
    }
}

fn trader_with(market: &ScriptedMarket, store: Arc<dyn Store>) -> PaperTrader {
    let mut registry = QuoteProviderRegistry::new();
    registry.register(Box::new(market.clone()));
    PaperTrader::with_quote_service(QuoteService::new(registry), TradingConfig::default(), store)
}

async fn setup() -> (PaperTrader, ScriptedMarket, Uuid) {
    let market = ScriptedMarket::default();
    market.set("AAPL", dec!(175.28), dec!(174.18));
    market.set("TSLA", dec!(175.43), dec!(173.62));
    market.set("MSFT", dec!(417.82), dec!(415.73));

    let trader = trader_with(&market, Arc::new(MemoryStore::new()));
    let user = Uuid::new_v4();
    trader.create_account(user).await.unwrap();
    (trader, market, user)
}

// ═══════════════════════════════════════════════════════════════════
// Accounts
// ═══════════════════════════════════════════════════════════════════

mod accounts {
    use super::*;

    #[tokio::test]
    async fn new_account_gets_starting_cash() {
        let (trader, _, user) = setup().await;
        let account = trader.account(user).await.unwrap();
        assert_eq!(account.portfolio.cash, dec!(10000.00));
    }

    #[tokio::test]
    async fn duplicate_account_rejected() {
        let (trader, _, user) = setup().await;
        assert!(matches!(
            trader.create_account(user).await.unwrap_err(),
            CoreError::AccountExists(_)
        ));
    }

    #[tokio::test]
    async fn unknown_user_cannot_trade() {
        let (trader, _, _) = setup().await;
        let err = trader
            .execute_trade(Uuid::new_v4(), &TradeRequest::new("AAPL", 1, "BUY"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn offline_config_trades_against_fallback_table() {
        let trader = PaperTrader::new(
            &QuoteConfig::offline(),
            TradingConfig::default(),
            Arc::new(MemoryStore::new()),
        );
        let user = Uuid::new_v4();
        trader.create_account(user).await.unwrap();

        let trade = trader
            .execute_trade(user, &TradeRequest::new("AAPL", 10, "BUY"))
            .await
            .unwrap();
        assert_eq!(trade.price, dec!(175.28));
        assert_eq!(trade.market_data.quote_source, QuoteSource::Fallback);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Buy / sell lifecycle
// ═══════════════════════════════════════════════════════════════════

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn buy_buy_sell_all() {
        let (trader, market, user) = setup().await;

        let first = trader
            .execute_trade(user, &TradeRequest::new("AAPL", 10, "BUY"))
            .await
            .unwrap();
        assert_eq!(first.total, dec!(1752.80));
        let account = trader.account(user).await.unwrap();
        assert_eq!(account.portfolio.cash, dec!(8247.20));

        market.set("AAPL", dec!(180.00), dec!(174.18));
        trader
            .execute_trade(user, &TradeRequest::new("aapl", 5, "buy"))
            .await
            .unwrap();
        let account = trader.account(user).await.unwrap();
        let holding = account.portfolio.holding("AAPL").unwrap();
        assert_eq!(holding.shares, 15);
        assert_eq!(holding.total_cost, dec!(2652.80));
        assert_eq!(holding.avg_price.round_dp(4), dec!(176.8533));
        assert_eq!(account.portfolio.cash, dec!(7347.20));

        market.set("AAPL", dec!(190.00), dec!(180.00));
        let sell = trader
            .execute_trade(user, &TradeRequest::new("AAPL", 15, "SELL"))
            .await
            .unwrap();
        assert_eq!(sell.total, dec!(2850.00));
        assert_eq!(sell.portfolio_snapshot.cash_before, dec!(7347.20));
        assert_eq!(sell.portfolio_snapshot.cash_after, dec!(10197.20));

        let account = trader.account(user).await.unwrap();
        assert!(account.portfolio.holding("AAPL").is_none());
        assert_eq!(account.portfolio.cash, dec!(10197.20));
        assert_eq!(account.portfolio.version, 3);
    }

    #[tokio::test]
    async fn sell_without_position_changes_nothing() {
        let (trader, _, user) = setup().await;
        let before = trader.account(user).await.unwrap();

        let err = trader
            .execute_trade(user, &TradeRequest::new("TSLA", 100, "SELL"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientShares { requested: 100, available: 0, .. }
        ));

        assert_eq!(trader.account(user).await.unwrap(), before);
        assert!(trader.trade_history(user, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn buy_beyond_cash_changes_nothing() {
        let (trader, _, user) = setup().await;
        let before = trader.account(user).await.unwrap();

        let err = trader
            .execute_trade(user, &TradeRequest::new("MSFT", 100, "BUY"))
            .await
            .unwrap_err();
        match err {
            CoreError::InsufficientFunds { required, available } => {
                assert_eq!(required, dec!(41782.00));
                assert_eq!(available, dec!(10000.00));
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
        assert_eq!(trader.account(user).await.unwrap(), before);
    }

    #[tokio::test]
    async fn malformed_request_rejected_before_pricing() {
        let (trader, market, user) = setup().await;
        market.outage("AAPL");

        let err = trader
            .execute_trade(user, &TradeRequest::new("AAPL", 0, "BUY"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn quote_failure_rejects_trade() {
        let (trader, market, user) = setup().await;
        market.outage("AAPL");

        let err = trader
            .execute_trade(user, &TradeRequest::new("AAPL", 1, "BUY"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::QuoteUnavailable { .. }));

        let err = trader
            .execute_trade(user, &TradeRequest::new("NOPE", 1, "BUY"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::SymbolNotFound(_)));
        assert_eq!(trader.account(user).await.unwrap().portfolio.cash, dec!(10000.00));
    }

    #[tokio::test]
    async fn concurrent_buys_never_overdraw() {
        let (trader, _, user) = setup().await;
        let trader = Arc::new(trader);
        // Each buy costs 5258.40; only one fits in 10000.00.
        let request = TradeRequest::new("AAPL", 30, "BUY");

        let (a, b) = tokio::join!(
            {
                let trader = trader.clone();
                let request = request.clone();
                async move { trader.execute_trade(user, &request).await }
            },
            {
                let trader = trader.clone();
                let request = request.clone();
                async move { trader.execute_trade(user, &request).await }
            }
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(CoreError::InsufficientFunds { .. }))));

        let account = trader.account(user).await.unwrap();
        assert_eq!(account.portfolio.cash, dec!(4741.60));
        assert_eq!(account.portfolio.shares_of("AAPL"), 30);
        assert_eq!(trader.trade_history(user, None, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn favorites_refresh_waits_for_running_trade() {
        let (trader, market, user) = setup().await;
        trader
            .add_favorite(user, &FavoriteRequest::new("AAPL", None))
            .await
            .unwrap();
        market.set("SLOW", dec!(50.00), dec!(49.00));
        market.delay("SLOW", Duration::from_millis(300));

        let slow_buy = TradeRequest::new("SLOW", 1, "BUY");
        let (trade, favorites) = tokio::join!(
            trader.execute_trade(user, &slow_buy),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                trader.favorites(user).await
            }
        );

        let trade = trade.unwrap();
        assert_eq!(trade.total, dec!(50.00));
        assert_eq!(favorites.unwrap().len(), 1);

        let account = trader.account(user).await.unwrap();
        assert_eq!(account.portfolio.shares_of("SLOW"), 1);
        assert_eq!(account.portfolio.cash, dec!(9950.00));
    }

    #[tokio::test]
    async fn user_locks_released_after_use() {
        let (trader, _, user) = setup().await;

        trader
            .execute_trade(user, &TradeRequest::new("AAPL", 1, "BUY"))
            .await
            .unwrap();
        trader.portfolio_summary(user).await.unwrap();
        assert_eq!(trader.tracked_user_locks().await, 0);

        for _ in 0..5 {
            let stranger = Uuid::new_v4();
            let err = trader
                .execute_trade(stranger, &TradeRequest::new("AAPL", 1, "BUY"))
                .await
                .unwrap_err();
            assert!(matches!(err, CoreError::AccountNotFound(_)));
            assert!(trader.portfolio_summary(stranger).await.is_err());
        }
        assert_eq!(trader.tracked_user_locks().await, 0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Persistence failures
// ═══════════════════════════════════════════════════════════════════

mod persistence {
    use super::*;

    /// Delegates to a MemoryStore but refuses every trade commit.
    struct BrokenCommits {
        inner: MemoryStore,
    }

    #[async_trait]
    impl Store for BrokenCommits {
        async fn create_account(&self, account: Account) -> Result<Account, CoreError> {
            self.inner.create_account(account).await
        }

        async fn load_account(&self, user_id: Uuid) -> Result<Account, CoreError> {
            self.inner.load_account(user_id).await
        }

        async fn save_account(&self, account: &Account) -> Result<Account, CoreError> {
            self.inner.save_account(account).await
        }

        async fn append_trade(&self, trade: &Trade) -> Result<(), CoreError> {
            self.inner.append_trade(trade).await
        }

        async fn commit_trade(&self, _: &Account, _: &Trade) -> Result<Account, CoreError> {
            Err(CoreError::Storage("disk full".into()))
        }

        async fn list_trades(
            &self,
            user_id: Uuid,
            limit: usize,
            offset: usize,
        ) -> Result<Vec<Trade>, CoreError> {
            self.inner.list_trades(user_id, limit, offset).await
        }

        async fn trades_since(
            &self,
            user_id: Uuid,
            since: Option<DateTime<Utc>>,
        ) -> Result<Vec<Trade>, CoreError> {
            self.inner.trades_since(user_id, since).await
        }
    }

    #[tokio::test]
    async fn failed_commit_leaves_no_trace() {
        let market = ScriptedMarket::default();
        market.set("AAPL", dec!(175.28), dec!(174.18));
        let trader = trader_with(
            &market,
            Arc::new(BrokenCommits {
                inner: MemoryStore::new(),
            }),
        );
        let user = Uuid::new_v4();
        trader.create_account(user).await.unwrap();

        let err = trader
            .execute_trade(user, &TradeRequest::new("AAPL", 1, "BUY"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));

        let account = trader.account(user).await.unwrap();
        assert_eq!(account.portfolio.cash, dec!(10000.00));
        assert!(account.portfolio.holdings.is_empty());
        assert!(trader.trade_history(user, None, None).await.unwrap().is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Portfolio valuation
// ═══════════════════════════════════════════════════════════════════

mod portfolio {
    use super::*;

    #[tokio::test]
    async fn summary_values_at_current_quotes() {
        let (trader, market, user) = setup().await;
        trader
            .execute_trade(user, &TradeRequest::new("AAPL", 10, "BUY"))
            .await
            .unwrap();

        market.set("AAPL", dec!(180.00), dec!(175.00));
        let v = trader.portfolio_summary(user).await.unwrap();

        assert_eq!(v.cash, dec!(8247.20));
        assert_eq!(v.total_asset_value, dec!(1800.00));
        assert_eq!(v.total_value, dec!(10047.20));
        assert_eq!(v.total_profit_loss, dec!(47.20));
        assert_eq!(v.daily_change, dec!(50.00));

        let account = trader.account(user).await.unwrap();
        assert_eq!(account.portfolio.total_value, dec!(10047.20));
        assert_eq!(account.portfolio.holding("AAPL").unwrap().current_price, dec!(180.00));
    }

    #[tokio::test]
    async fn summary_survives_quote_outage() {
        let (trader, market, user) = setup().await;
        trader
            .execute_trade(user, &TradeRequest::new("AAPL", 10, "BUY"))
            .await
            .unwrap();
        trader
            .execute_trade(user, &TradeRequest::new("TSLA", 2, "BUY"))
            .await
            .unwrap();

        market.outage("TSLA");
        let v = trader.portfolio_summary(user).await.unwrap();

        let tsla = v.holdings.iter().find(|h| h.symbol == "TSLA").unwrap();
        assert!(tsla.quote_stale);
        assert_eq!(tsla.current_price, dec!(175.43));
        assert_eq!(tsla.daily_change, Decimal::ZERO);

        let aapl = v.holdings.iter().find(|h| h.symbol == "AAPL").unwrap();
        assert!(!aapl.quote_stale);
        assert_eq!(v.total_value, v.cash + v.total_asset_value);
    }
}

// ═══════════════════════════════════════════════════════════════════
// History & analytics
// ═══════════════════════════════════════════════════════════════════

mod history {
    use super::*;

    #[tokio::test]
    async fn newest_first_with_paging() {
        let (trader, _, user) = setup().await;
        for symbol in ["AAPL", "TSLA", "MSFT"] {
            trader
                .execute_trade(user, &TradeRequest::new(symbol, 1, "BUY"))
                .await
                .unwrap();
        }

        let all = trader.trade_history(user, None, None).await.unwrap();
        let symbols: Vec<&str> = all.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["MSFT", "TSLA", "AAPL"]);

        let page = trader.trade_history(user, Some(1), Some(1)).await.unwrap();
        assert_eq!(page[0].symbol, "TSLA");

        assert!(matches!(
            trader.trade_history(user, Some(501), None).await.unwrap_err(),
            CoreError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn stats_and_top_symbols() {
        let (trader, _, user) = setup().await;
        trader.execute_trade(user, &TradeRequest::new("AAPL", 2, "BUY")).await.unwrap();
        trader.execute_trade(user, &TradeRequest::new("AAPL", 1, "SELL")).await.unwrap();
        trader.execute_trade(user, &TradeRequest::new("TSLA", 1, "BUY")).await.unwrap();

        let stats = trader.trade_stats(user, StatsWindow::Day).await.unwrap();
        assert_eq!(stats.total_trades, 3);
        assert_eq!(stats.buy_trades, 2);
        assert_eq!(stats.sell_trades, 1);
        assert_eq!(stats.total_volume, dec!(701.27));

        let top = trader.most_traded_symbols(user, 5).await.unwrap();
        assert_eq!(top[0].symbol, "AAPL");
        assert_eq!(top[0].trade_count, 2);
        assert_eq!(top[1].symbol, "TSLA");

        let history = trader.trade_history(user, None, None).await.unwrap();
        assert_eq!(history[1].action, TradeAction::Sell);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Favorites
// ═══════════════════════════════════════════════════════════════════

mod favorites {
    use super::*;

    #[tokio::test]
    async fn add_list_remove() {
        let (trader, _, user) = setup().await;

        let added = trader
            .add_favorite(user, &FavoriteRequest::new("aapl", None))
            .await
            .unwrap();
        assert_eq!(added.symbol, "AAPL");
        assert_eq!(added.name, "AAPL");
        assert_eq!(added.price, dec!(175.28));

        trader
            .add_favorite(user, &FavoriteRequest::new("MSFT", Some("Microsoft")))
            .await
            .unwrap();

        let list = trader.favorites(user).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].name, "Microsoft");

        trader.remove_favorite(user, "aapl").await.unwrap();
        let list = trader.favorites(user).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].symbol, "MSFT");
    }

    #[tokio::test]
    async fn duplicates_and_unknowns() {
        let (trader, _, user) = setup().await;
        trader
            .add_favorite(user, &FavoriteRequest::new("AAPL", None))
            .await
            .unwrap();

        assert!(matches!(
            trader
                .add_favorite(user, &FavoriteRequest::new("AAPL", None))
                .await
                .unwrap_err(),
            CoreError::FavoriteExists(_)
        ));
        assert!(matches!(
            trader
                .add_favorite(user, &FavoriteRequest::new("NOPE", None))
                .await
                .unwrap_err(),
            CoreError::SymbolNotFound(_)
        ));
        assert!(matches!(
            trader.remove_favorite(user, "TSLA").await.unwrap_err(),
            CoreError::FavoriteNotFound(_)
        ));
    }

    #[tokio::test]
    async fn refresh_and_stale_fallback() {
        let (trader, market, user) = setup().await;
        trader
            .add_favorite(user, &FavoriteRequest::new("AAPL", None))
            .await
            .unwrap();
        trader
            .add_favorite(user, &FavoriteRequest::new("TSLA", None))
            .await
            .unwrap();

        market.set("AAPL", dec!(200), dec!(190));
        market.outage("TSLA");

        let list = trader.favorites(user).await.unwrap();
        let aapl = list.iter().find(|f| f.symbol == "AAPL").unwrap();
        assert_eq!(aapl.price, dec!(200));
        assert!(!aapl.stale);

        let tsla = list.iter().find(|f| f.symbol == "TSLA").unwrap();
        assert_eq!(tsla.price, dec!(175.43));
        assert!(tsla.stale);

        let account = trader.account(user).await.unwrap();
        assert_eq!(account.favorite("AAPL").unwrap().last_price, Some(dec!(200)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Market data passthrough
// ═══════════════════════════════════════════════════════════════════

mod market {
    use super::*;

    #[tokio::test]
    async fn quote_and_search() {
        let (trader, _, _) = setup().await;
        assert_eq!(trader.quote("msft").await.unwrap().price, dec!(417.82));
        assert_eq!(trader.search("TSLA").await.unwrap()[0].symbol, "TSLA");
    }

    #[test]
    fn debug_lists_providers() {
        let trader = PaperTrader::new(
            &QuoteConfig::offline(),
            TradingConfig::default(),
            Arc::new(MemoryStore::new()),
        );
        let debug = format!("{trader:?}");
        assert!(debug.contains("PaperTrader"));
        assert!(debug.contains("Fallback"));
    }
}
