use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::portfolio::Account;
use crate::models::trade::Trade;

use super::manager::StorageManager;
use super::state::StoreState;
use super::traits::Store;

/// Store backed by a single PTRD snapshot file.
///
/// Reads are served from memory. Every write applies the change to a copy
/// of the state, writes the copy to disk and only then swaps it in, so a
/// failed disk write leaves both the file and the in-memory state untouched.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl FileStore {
    /// Open the snapshot at `path`, starting empty when the file does not
    /// exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let state = if tokio::fs::try_exists(&path).await? {
            let state = StorageManager::load_from_file(&path).await?;
            tracing::info!(
                path = %path.display(),
                accounts = state.accounts.len(),
                trades = state.trades.len(),
                "Loaded ledger snapshot"
            );
            state
        } else {
            tracing::info!(path = %path.display(), "No ledger snapshot yet, starting empty");
            StoreState::default()
        };
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the state and persist it before making it
    /// visible.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut StoreState) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let out = change(&mut next)?;
        StorageManager::save_to_file(&next, &self.path)
            .await
            .map_err(|e| {
                CoreError::Storage(format!("Failed to write {}: {e}", self.path.display()))
            })?;
        *state = next;
        Ok(out)
    }
}

#[async_trait]
impl Store for FileStore {
    async fn create_account(&self, account: Account) -> Result<Account, CoreError> {
        self.mutate(|s| s.create_account(account)).await
    }

    async fn load_account(&self, user_id: Uuid) -> Result<Account, CoreError> {
        self.state.read().await.load_account(user_id)
    }

    async fn save_account(&self, account: &Account) -> Result<Account, CoreError> {
        self.mutate(|s| s.save_account(account)).await
    }

    async fn append_trade(&self, trade: &Trade) -> Result<(), CoreError> {
        self.mutate(|s| s.append_trade(trade)).await
    }

    async fn commit_trade(&self, account: &Account, trade: &Trade) -> Result<Account, CoreError> {
        let stored = self.mutate(|s| s.commit_trade(account, trade)).await?;
        tracing::debug!(
            trade_id = %trade.id,
            path = %self.path.display(),
            "Trade committed to disk"
        );
        Ok(stored)
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
