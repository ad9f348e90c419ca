use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::holding::Holding;
use crate::models::portfolio::Portfolio;
use crate::models::quote::Quote;
use crate::models::valuation::{HoldingValuation, PortfolioValuation};

/// Computes portfolio figures from cash, holdings and quotes.
///
/// Pure with respect to its inputs. A holding without a quote is valued at
/// its stored `current_price` and contributes no daily change, so one
/// missing quote never fails the whole valuation.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Value `holdings` plus `cash` using `quotes` (keyed by uppercase symbol).
    pub fn valuate(
        &self,
        cash: Decimal,
        holdings: &[Holding],
        quotes: &HashMap<String, Quote>,
    ) -> PortfolioValuation {
        let mut total_asset_value = Decimal::ZERO;
        let mut total_daily_change = Decimal::ZERO;
        let mut total_profit_loss = Decimal::ZERO;

        let holdings: Vec<HoldingValuation> = holdings
            .iter()
            .map(|holding| {
                let valued = Self::valuate_holding(holding, quotes.get(&holding.symbol));
                total_asset_value += valued.current_value;
                total_daily_change += valued.daily_change;
                total_profit_loss += valued.profit_loss;
                valued
            })
            .collect();

        let total_value = cash + total_asset_value;

        // Approximates the previous day's total; cash moved by today's
        // trades is not separated out.
        let previous_total = total_value - total_daily_change;
        let daily_change_percent = if previous_total > Decimal::ZERO {
            total_daily_change / previous_total * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        PortfolioValuation {
            cash,
            total_asset_value,
            total_value,
            total_profit_loss,
            daily_change: total_daily_change,
            daily_change_percent,
            holdings,
            valued_at: Utc::now(),
        }
    }

    /// Write the cached totals and each holding's latest price back onto the
    /// portfolio.
    pub fn apply(&self, portfolio: &mut Portfolio, valuation: &PortfolioValuation) {
        for holding in &mut portfolio.holdings {
            if let Some(valued) = valuation.holdings.iter().find(|v| v.symbol == holding.symbol) {
                holding.current_price = valued.current_price;
            }
        }
        portfolio.total_asset_value = valuation.total_asset_value;
        portfolio.total_value = valuation.total_value;
        portfolio.daily_change = valuation.daily_change;
        portfolio.daily_change_percent = valuation.daily_change_percent;
        portfolio.last_updated = valuation.valued_at;
    }

    fn valuate_holding(holding: &Holding, quote: Option<&Quote>) -> HoldingValuation {
        let shares = Decimal::from(holding.shares);

        let current_price = quote.map_or(holding.current_price, |q| q.price);
        let previous_close = quote
            .map(|q| q.previous_close)
            .filter(|p| *p > Decimal::ZERO)
            .unwrap_or(current_price);

        let current_value = shares * current_price;
        let profit_loss = current_value - holding.total_cost;
        let profit_loss_percent = if holding.total_cost.is_zero() {
            Decimal::ZERO
        } else {
            profit_loss / holding.total_cost * Decimal::ONE_HUNDRED
        };

        let previous_value = shares * previous_close;
        let daily_change = current_value - previous_value;
        let daily_change_percent = if previous_value > Decimal::ZERO {
            daily_change / previous_value * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        HoldingValuation {
            symbol: holding.symbol.clone(),
            shares: holding.shares,
            avg_price: holding.avg_price,
            current_price,
            previous_close,
            current_value,
            total_cost: holding.total_cost,
            profit_loss,
            profit_loss_percent,
            daily_change,
            daily_change_percent,
            quote_stale: quote.is_none(),
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
