use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::TradingConfig;
use crate::errors::CoreError;
use crate::models::portfolio::Account;
use crate::models::quote::Quote;
use crate::models::trade::{
    MarketData, OrderType, PortfolioSnapshot, Trade, TradeAction, TradeOrder, TradeRequest,
    TradeStatus,
};
use crate::services::ledger_service::LedgerService;
use crate::services::quote_service::QuoteService;
use crate::services::valuation_service::ValuationService;
use crate::storage::traits::Store;
use crate::validation;

/// Where a trade is in its lifecycle.
///
/// `Requested → Priced → Validated → Applied → Recorded`; any state before
/// `Applied` may end in `Rejected`, in which case nothing was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeState {
    Requested,
    Priced,
    Validated,
    Applied,
    Recorded,
    Rejected,
}

/// Executes market orders against an account.
///
/// All changes happen on a working copy of the account; the store only sees
/// the result, together with the trade record, in a single commit. Callers
/// must serialize executions per user (see `PaperTrader`), the store's
/// version check catches anything that slips past.
pub struct TradeService {
    ledger: LedgerService,
    valuation: ValuationService,
    trade_fee: Decimal,
}

impl TradeService {
    pub fn new(config: &TradingConfig) -> Self {
        Self {
            ledger: LedgerService::new(),
            valuation: ValuationService::new(),
            trade_fee: config.trade_fee,
        }
    }

    /// Validate, price, apply and record a trade for `user_id`.
    pub async fn execute(
        &self,
        quotes: &QuoteService,
        store: &dyn Store,
        user_id: Uuid,
        request: &TradeRequest,
    ) -> Result<Trade, CoreError> {
        let order = validation::validate_trade_request(request).map_err(|errors| {
            tracing::warn!(
                %user_id,
                error = %errors,
                state = ?TradeState::Rejected,
                "Malformed trade request"
            );
            CoreError::Validation(errors)
        })?;
        Self::transition(user_id, &order, TradeState::Requested);

        let account = store.load_account(user_id).await?;

        let quote = quotes
            .get_quote(&order.symbol)
            .await
            .inspect_err(|e| Self::reject(user_id, &order, e))?;
        Self::transition(user_id, &order, TradeState::Priced);

        let (updated, trade) = self
            .apply_order(&account, &order, &quote)
            .inspect_err(|e| Self::reject(user_id, &order, e))?;

        store.commit_trade(&updated, &trade).await.inspect_err(|e| {
            tracing::error!(
                %user_id,
                symbol = %order.symbol,
                error = %e,
                "Trade commit failed, nothing recorded"
            );
        })?;
        Self::transition(user_id, &order, TradeState::Recorded);

        tracing::info!(
            trade_id = %trade.id,
            %user_id,
            symbol = %trade.symbol,
            action = %trade.action,
            quantity = trade.quantity,
            price = %trade.price,
            total = %trade.total,
            "Trade executed"
        );
        Ok(trade)
    }

    /// Apply a priced order to a copy of `account`.
    ///
    /// Returns the updated account (not yet persisted) and the trade record.
    /// `account` itself is never modified, so a rejection leaves the caller's
    /// copy as it was.
    pub fn apply_order(
        &self,
        account: &Account,
        order: &TradeOrder,
        quote: &Quote,
    ) -> Result<(Account, Trade), CoreError> {
        let price = quote.price;
        let total = Decimal::from(order.quantity) * price;
        let portfolio = &account.portfolio;

        match order.action {
            TradeAction::Buy if portfolio.cash < total => {
                return Err(CoreError::InsufficientFunds {
                    required: total,
                    available: portfolio.cash,
                });
            }
            TradeAction::Sell if portfolio.shares_of(&order.symbol) < order.quantity => {
                return Err(CoreError::InsufficientShares {
                    symbol: order.symbol.clone(),
                    requested: order.quantity,
                    available: portfolio.shares_of(&order.symbol),
                });
            }
            _ => {}
        }
        Self::transition(account.user_id, order, TradeState::Validated);

        let mut working = account.clone();
        let cash_before = working.portfolio.cash;
        let total_value_before = working.portfolio.total_value;

        match order.action {
            TradeAction::Buy => {
                working.portfolio.cash -= total;
                self.ledger.add_shares(
                    &mut working.portfolio.holdings,
                    &order.symbol,
                    order.quantity,
                    price,
                )?;
            }
            TradeAction::Sell => {
                self.ledger
                    .remove_shares(&mut working.portfolio.holdings, &order.symbol, order.quantity)?;
                working.portfolio.cash += total;
            }
        }

        if let Some(holding) = working
            .portfolio
            .holdings
            .iter_mut()
            .find(|h| h.symbol == order.symbol)
        {
            holding.current_price = price;
        }

        // Other holdings keep their stored prices; only the traded symbol
        // has a fresh quote.
        let fresh = HashMap::from([(order.symbol.clone(), quote.clone())]);
        let valuation = self
            .valuation
            .valuate(working.portfolio.cash, &working.portfolio.holdings, &fresh);
        self.valuation.apply(&mut working.portfolio, &valuation);
        Self::transition(account.user_id, order, TradeState::Applied);

        let trade = Trade {
            id: Uuid::new_v4(),
            user_id: account.user_id,
            symbol: order.symbol.clone(),
            action: order.action,
            quantity: order.quantity,
            price,
            total,
            fees: self.trade_fee,
            status: TradeStatus::Executed,
            order_type: OrderType::Market,
            executed_at: Utc::now(),
            portfolio_snapshot: PortfolioSnapshot {
                cash_before,
                cash_after: working.portfolio.cash,
                total_value_before,
                total_value_after: working.portfolio.total_value,
            },
            market_data: MarketData {
                volume: quote.volume,
                previous_close: quote.previous_close,
                quote_source: quote.source.clone(),
            },
        };

        Ok((working, trade))
    }

    fn transition(user_id: Uuid, order: &TradeOrder, state: TradeState) {
        tracing::debug!(
            %user_id,
            symbol = %order.symbol,
            action = %order.action,
            quantity = order.quantity,
            ?state,
            "Trade state changed"
        );
    }

    fn reject(user_id: Uuid, order: &TradeOrder, error: &CoreError) {
        tracing::warn!(
            %user_id,
            symbol = %order.symbol,
            action = %order.action,
            quantity = order.quantity,
            state = ?TradeState::Rejected,
            code = error.code(),
            error = %error,
            "Trade rejected"
        );
    }
}
