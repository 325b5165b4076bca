//! Coordination between the engine, persistence, and notification.
//!
//! `AttentionStore` owns the per-event sequence: load the change's
//! history, derive current membership, run the engine, persist whatever
//! it appended, then notify. The engine never sees the repository and
//! the repository never sees rules.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use attention_core::{
    AccountId, AttentionEvent, AttentionSetEngine, AttentionSetUpdate, ChangeContext,
    CommentThreads, EngineError, UpdateLog,
};

use crate::notify::Notifier;
use crate::repository::{ChangeId, RepositoryError, UpdateLogRepository};

/// Errors surfaced to event intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The event was rejected by the engine; nothing was persisted.
    Engine(EngineError),
    /// The storage backend failed.
    Repository(RepositoryError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine(e) => write!(f, "{}", e),
            Self::Repository(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            Self::Repository(e) => Some(e),
        }
    }
}

impl From<EngineError> for StoreError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl From<RepositoryError> for StoreError {
    fn from(e: RepositoryError) -> Self {
        Self::Repository(e)
    }
}

/// Per-change attention set coordination.
pub struct AttentionStore {
    engine: AttentionSetEngine,
    repository: Arc<dyn UpdateLogRepository>,
    notifier: Arc<dyn Notifier>,
}

impl AttentionStore {
    pub fn new(
        engine: AttentionSetEngine,
        repository: Arc<dyn UpdateLogRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            engine,
            repository,
            notifier,
        }
    }

    /// Process one event against one change.
    ///
    /// The supplied context is the pre-event snapshot of the change; its
    /// `attention_set` field is overwritten with the membership derived
    /// from the persisted history, so callers cannot hand the engine a
    /// stale view. Returns the updates that were appended, possibly none.
    pub async fn process_event(
        &self,
        change: &ChangeId,
        event: &AttentionEvent,
        mut ctx: ChangeContext,
        comments: &CommentThreads,
    ) -> Result<Vec<AttentionSetUpdate>, StoreError> {
        let history = self.repository.history(change).await?;
        let mut log = UpdateLog::from_history(history);
        ctx.attention_set = log.current_members();

        let applied = self.engine.decide_and_apply(event, &ctx, comments, &mut log)?;
        if applied.is_empty() {
            return Ok(applied);
        }

        self.repository.append(change, &applied).await?;
        self.notifier
            .attention_changed(change, &applied, &log.current_members())
            .await;
        Ok(applied)
    }

    /// Accounts currently expected to act on the change.
    pub async fn current_members(
        &self,
        change: &ChangeId,
    ) -> Result<BTreeSet<AccountId>, StoreError> {
        let history = self.repository.history(change).await?;
        Ok(UpdateLog::from_history(history).current_members())
    }

    /// Full attention update history for the change, oldest first.
    pub async fn history(
        &self,
        change: &ChangeId,
    ) -> Result<Vec<AttentionSetUpdate>, StoreError> {
        Ok(self.repository.history(change).await?)
    }
}
