use std::path::Path;

use crate::errors::CoreError;

use super::format;
use super::state::StoreState;

/// Serialize and parse whole-ledger snapshots.
pub struct StorageManager;

impl StorageManager {
    /// Flow: StoreState → bincode → PTRD framed bytes
    pub fn save_to_bytes(state: &StoreState) -> Result<Vec<u8>, CoreError> {
        let body = bincode::serialize(state)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))?;
        Ok(format::write_file(format::CURRENT_VERSION, &body))
    }

    /// Flow: PTRD bytes → parse header → bincode → StoreState
    pub fn load_from_bytes(data: &[u8]) -> Result<StoreState, CoreError> {
        let (_header, body) = format::read_file(data)?;
        bincode::deserialize(body)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize ledger: {e}")))
    }

    /// Write a snapshot next to `path` and rename it into place, so a crash
    /// mid-write never leaves a half-written ledger behind.
    pub async fn save_to_file(state: &StoreState, path: &Path) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(state)?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    pub async fn load_from_file(path: &Path) -> Result<StoreState, CoreError> {
        let bytes = tokio::fs::read(path).await?;
        Self::load_from_bytes(&bytes)
    }
}
