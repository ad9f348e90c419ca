use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::portfolio::Account;
use crate::models::trade::Trade;

/// Everything a store persists: accounts by user id and the append-only
/// trade log in execution order.
///
/// Mutations validate first and only then write, so a failed call leaves
/// the state exactly as it was.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    pub accounts: HashMap<Uuid, Account>,
    pub trades: Vec<Trade>,
}

impl StoreState {
    pub fn create_account(&mut self, account: Account) -> Result<Account, CoreError> {
        if self.accounts.contains_key(&account.user_id) {
            return Err(CoreError::AccountExists(account.user_id.to_string()));
        }
        self.accounts.insert(account.user_id, account.clone());
        Ok(account)
    }

    pub fn load_account(&self, user_id: Uuid) -> Result<Account, CoreError> {
        self.accounts
            .get(&user_id)
            .cloned()
            .ok_or_else(|| CoreError::AccountNotFound(user_id.to_string()))
    }

    /// Replace the stored account if its version still matches the one the
    /// caller read. Returns the stored copy with the bumped version.
    pub fn save_account(&mut self, account: &Account) -> Result<Account, CoreError> {
        self.check_version(account)?;
        let mut stored = account.clone();
        stored.portfolio.version += 1;
        self.accounts.insert(stored.user_id, stored.clone());
        Ok(stored)
    }

    pub fn append_trade(&mut self, trade: &Trade) -> Result<(), CoreError> {
        if !self.accounts.contains_key(&trade.user_id) {
            return Err(CoreError::AccountNotFound(trade.user_id.to_string()));
        }
        self.trades.push(trade.clone());
        Ok(())
    }

    /// Save the account and append the trade as one unit.
    pub fn commit_trade(&mut self, account: &Account, trade: &Trade) -> Result<Account, CoreError> {
        if trade.user_id != account.user_id {
            return Err(CoreError::Storage(format!(
                "trade {} belongs to {}, not {}",
                trade.id, trade.user_id, account.user_id
            )));
        }
        let stored = self.save_account(account)?;
        self.trades.push(trade.clone());
        Ok(stored)
    }

    /// A user's trades, newest first.
    pub fn list_trades(&self, user_id: Uuid, limit: usize, offset: usize) -> Vec<Trade> {
        self.trades
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// A user's trades executed at or after `since` (all when `None`), in
    /// execution order.
    pub fn trades_since(&self, user_id: Uuid, since: Option<DateTime<Utc>>) -> Vec<Trade> {
        self.trades
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| match since {
                Some(start) => t.executed_at >= start,
                None => true,
            })
            .cloned()
            .collect()
    }

    fn check_version(&self, account: &Account) -> Result<(), CoreError> {
        let stored = self
            .accounts
            .get(&account.user_id)
            .ok_or_else(|| CoreError::AccountNotFound(account.user_id.to_string()))?;
        if stored.portfolio.version != account.portfolio.version {
            return Err(CoreError::ConcurrentModification(account.user_id.to_string()));
        }
        Ok(())
    }
}
