//! Service shell around the attention set engine.
//!
//! Wires the pure engine from `attention-core` to persistence, event
//! intake, notification, and a small read-only dashboard.

pub mod config;
pub mod dashboard;
pub mod notify;
pub mod repository;
pub mod store;

pub use config::Config;
pub use notify::{attention_footer, LoggingNotifier, Notifier};
pub use repository::{ChangeId, InMemoryRepository, SqliteRepository, UpdateLogRepository};
pub use store::AttentionStore;
