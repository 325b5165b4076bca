//! Attention handling for status transitions.

use crate::change::{ChangeContext, ChangeStatus};
use crate::event::{AttentionEvent, StatusTransition};
use crate::update::Operation;

use super::{
    UpdateIntent, REASON_ABANDONED, REASON_READY_FOR_REVIEW, REASON_SUBMITTED,
    REASON_WORK_IN_PROGRESS,
};

/// Abandoning or submitting a change ends all work on it, so the set is
/// cleared unconditionally, even when automatic rules are blocked.
/// WIP clearing and the ready-for-review reviewer sweep are ordinary
/// automatic rules and honour the block flag.
pub(super) fn on_status_changed(
    event: &AttentionEvent,
    ctx: &ChangeContext,
    to: StatusTransition,
) -> Vec<UpdateIntent> {
    match to {
        StatusTransition::Abandoned => clear_all(ctx, REASON_ABANDONED),
        StatusTransition::Merged => clear_all(ctx, REASON_SUBMITTED),
        StatusTransition::WorkInProgress => {
            // Setting the WIP flag on an already-WIP change is a no-op,
            // not a fresh clearing.
            if event.block_automatic_rules || ctx.status == ChangeStatus::WorkInProgress {
                Vec::new()
            } else {
                clear_all(ctx, REASON_WORK_IN_PROGRESS)
            }
        }
        StatusTransition::ReadyForReview => {
            // Only a genuine WIP-to-ready transition sweeps the
            // reviewers in; marking a ready change ready again does
            // nothing.
            if event.block_automatic_rules || ctx.status != ChangeStatus::WorkInProgress {
                return Vec::new();
            }
            ctx.reviewers
                .iter()
                .map(|reviewer| UpdateIntent::add(reviewer.clone(), REASON_READY_FOR_REVIEW))
                .collect()
        }
    }
}

fn clear_all(ctx: &ChangeContext, reason: &str) -> Vec<UpdateIntent> {
    ctx.attention_set
        .iter()
        .map(|account| UpdateIntent {
            account: account.clone(),
            operation: Operation::Remove,
            reason: reason.to_string(),
        })
        .collect()
}
