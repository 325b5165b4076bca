//! Repository abstraction for attention update persistence.
//!
//! This module defines the `UpdateLogRepository` trait that abstracts
//! storage of per-change attention set histories. Implementations can
//! provide different backends (in-memory, SQLite).

mod memory;
mod sqlite;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

use std::fmt;

use async_trait::async_trait;

use attention_core::AttentionSetUpdate;

/// Identifies one change within one project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeId {
    pub project: String,
    pub number: u64,
}

impl ChangeId {
    pub fn new(project: impl Into<String>, number: u64) -> Self {
        Self {
            project: project.into(),
            number,
        }
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.project, self.number)
    }
}

/// Errors from the storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backend failed to perform an operation.
    Storage {
        operation: &'static str,
        detail: String,
    },
    /// Persisted data could not be interpreted.
    Corruption { detail: String },
}

impl RepositoryError {
    pub fn storage(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::Storage {
            operation,
            detail: detail.into(),
        }
    }

    pub fn corruption(detail: impl Into<String>) -> Self {
        Self::Corruption {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage { operation, detail } => {
                write!(f, "storage error during {}: {}", operation, detail)
            }
            Self::Corruption { detail } => write!(f, "corrupt attention history: {}", detail),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Repository trait for persisting attention set histories.
///
/// One logical append-only log per change. Entries are returned in
/// append order; `append` must be atomic per batch.
#[async_trait]
pub trait UpdateLogRepository: Send + Sync {
    /// Full history for a change, oldest first. Empty if the change has
    /// never had an attention update.
    async fn history(&self, change: &ChangeId) -> Result<Vec<AttentionSetUpdate>, RepositoryError>;

    /// Append a batch of updates to a change's history.
    async fn append(
        &self,
        change: &ChangeId,
        updates: &[AttentionSetUpdate],
    ) -> Result<(), RepositoryError>;
}
