use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::analytics::{StatsWindow, SymbolActivity, TradeStats};
use crate::models::trade::{Trade, TradeAction, TradeStatus};

/// Aggregates over a user's trade log.
///
/// Only `EXECUTED` trades count. Callers hand in the trades already
/// narrowed to the window; the window is echoed back on the result.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Trade counts, volume and fees.
    pub fn trade_stats(&self, trades: &[Trade], window: StatsWindow) -> TradeStats {
        let mut stats = TradeStats {
            window,
            total_trades: 0,
            buy_trades: 0,
            sell_trades: 0,
            total_volume: Decimal::ZERO,
            avg_trade_size: Decimal::ZERO,
            total_fees: Decimal::ZERO,
        };

        for trade in executed(trades) {
            stats.total_trades += 1;
            match trade.action {
                TradeAction::Buy => stats.buy_trades += 1,
                TradeAction::Sell => stats.sell_trades += 1,
            }
            stats.total_volume += trade.total;
            stats.total_fees += trade.fees;
        }

        if stats.total_trades > 0 {
            stats.avg_trade_size = stats.total_volume / Decimal::from(stats.total_trades);
        }
        stats
    }

    /// Symbols ranked by number of trades, ties broken by traded volume.
    pub fn most_traded_symbols(&self, trades: &[Trade], limit: usize) -> Vec<SymbolActivity> {
        let mut by_symbol: HashMap<&str, SymbolActivity> = HashMap::new();

        for trade in executed(trades) {
            let entry = by_symbol
                .entry(trade.symbol.as_str())
                .or_insert_with(|| SymbolActivity {
                    symbol: trade.symbol.clone(),
                    trade_count: 0,
                    total_volume: Decimal::ZERO,
                    last_trade_at: trade.executed_at,
                });
            entry.trade_count += 1;
            entry.total_volume += trade.total;
            entry.last_trade_at = entry.last_trade_at.max(trade.executed_at);
        }

        let mut ranked: Vec<SymbolActivity> = by_symbol.into_values().collect();
        ranked.sort_by(|a, b| {
            b.trade_count
                .cmp(&a.trade_count)
                .then_with(|| b.total_volume.cmp(&a.total_volume))
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        ranked.truncate(limit);
        ranked
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}

fn executed(trades: &[Trade]) -> impl Iterator<Item = &Trade> {
    trades.iter().filter(|t| t.status == TradeStatus::Executed)
}
