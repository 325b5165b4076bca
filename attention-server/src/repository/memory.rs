//! In-memory implementation of `UpdateLogRepository`.
//!
//! Histories are held in a `HashMap` protected by a `RwLock` and lost
//! on restart. Used in tests and as a reference implementation for the
//! trait contract.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use attention_core::AttentionSetUpdate;

use super::{ChangeId, RepositoryError, UpdateLogRepository};

/// In-memory update log repository.
pub struct InMemoryRepository {
    logs: RwLock<HashMap<ChangeId, Vec<AttentionSetUpdate>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpdateLogRepository for InMemoryRepository {
    async fn history(&self, change: &ChangeId) -> Result<Vec<AttentionSetUpdate>, RepositoryError> {
        let logs = self.logs.read().await;
        Ok(logs.get(change).cloned().unwrap_or_default())
    }

    async fn append(
        &self,
        change: &ChangeId,
        updates: &[AttentionSetUpdate],
    ) -> Result<(), RepositoryError> {
        let mut logs = self.logs.write().await;
        logs.entry(change.clone())
            .or_default()
            .extend_from_slice(updates);
        Ok(())
    }
}
