use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::portfolio::Account;
use crate::models::trade::Trade;

/// Persistence for accounts and the trade log.
///
/// Writers pass back the account they loaded; a write whose
/// `portfolio.version` no longer matches the stored one fails with
/// `ConcurrentModification` and changes nothing.
#[async_trait]
pub trait Store: Send + Sync {
    /// Store a new account. Fails with `AccountExists` if the user has one.
    async fn create_account(&self, account: Account) -> Result<Account, CoreError>;

    async fn load_account(&self, user_id: Uuid) -> Result<Account, CoreError>;

    /// Replace an account; returns it with the new version.
    async fn save_account(&self, account: &Account) -> Result<Account, CoreError>;

    async fn append_trade(&self, trade: &Trade) -> Result<(), CoreError>;

    /// Persist the updated account and its trade record atomically: either
    /// both become visible or neither does.
    async fn commit_trade(&self, account: &Account, trade: &Trade) -> Result<Account, CoreError>;

    /// Trades for `user_id`, newest first.
    async fn list_trades(
        &self,
        user_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Trade>, CoreError>;

    /// Trades for `user_id` executed at or after `since` (all when `None`).
    async fn trades_since(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Trade>, CoreError>;
}
