//! Outbound notification of attention changes.
//!
//! The store calls the notifier once per successfully applied batch.
//! Delivery is best-effort: a notification failure never rolls back the
//! already-persisted updates.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::info;

use attention_core::{AccountId, AttentionSetUpdate};

use crate::repository::ChangeId;

/// Collaborator interface for telling the outside world that attention
/// moved.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn attention_changed(
        &self,
        change: &ChangeId,
        applied: &[AttentionSetUpdate],
        members: &BTreeSet<AccountId>,
    );
}

/// Notifier that only writes to the log. The default until a real
/// email/chat integration is wired in.
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn attention_changed(
        &self,
        change: &ChangeId,
        applied: &[AttentionSetUpdate],
        members: &BTreeSet<AccountId>,
    ) {
        info!(
            "{}: applied {} attention update(s); {}",
            change,
            applied.len(),
            attention_footer(members)
        );
    }
}

/// Render the attention summary line appended to outgoing messages.
pub fn attention_footer(members: &BTreeSet<AccountId>) -> String {
    if members.is_empty() {
        return "Attention is currently required from no one.".to_string();
    }
    let names: Vec<&str> = members.iter().map(|a| a.0.as_str()).collect();
    format!(
        "Attention is currently required from: {}.",
        names.join(", ")
    )
}
