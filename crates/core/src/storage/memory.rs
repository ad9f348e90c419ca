use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::portfolio::Account;
use crate::models::trade::Trade;

use super::state::StoreState;
use super::traits::Store;

/// Store that keeps everything in process memory.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_account(&self, account: Account) -> Result<Account, CoreError> {
        self.state.write().await.create_account(account)
    }

    async fn load_account(&self, user_id: Uuid) -> Result<Account, CoreError> {
        self.state.read().await.load_account(user_id)
    }

    async fn save_account(&self, account: &Account) -> Result<Account, CoreError> {
        self.state.write().await.save_account(account)
    }

    async fn append_trade(&self, trade: &Trade) -> Result<(), CoreError> {
        self.state.write().await.append_trade(trade)
    }

    async fn commit_trade(&self, account: &Account, trade: &Trade) -> Result<Account, CoreError> {
        self.state.write().await.commit_trade(account, trade)
    }

    async fn list_trades(
        &self,
        user_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Trade>, CoreError> {
        Ok(self.state.read().await.list_trades(user_id, limit, offset))
    }

    async fn trades_since(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Trade>, CoreError> {
        Ok(self.state.read().await.trades_since(user_id, since))
    }
}
