//! Attention handling for reviewer and CC changes.

use crate::account::AccountId;
use crate::change::{ChangeContext, ChangeStatus};
use crate::event::AttentionEvent;

use super::{UpdateIntent, REASON_REVIEWER_ADDED, REASON_REVIEWER_REMOVED};

/// An account was added as reviewer or CC.
///
/// Only a genuine new reviewer on an active change draws attention. CCs
/// are informed, not asked to act, so a CC addition adds nothing; the
/// exception is demoting an existing reviewer to CC, which counts as a
/// removal. When the addition rides along with a reply, the reply rules
/// own attention handling for the whole operation.
pub(super) fn on_reviewer_added(
    event: &AttentionEvent,
    ctx: &ChangeContext,
    reviewer: &AccountId,
    as_cc: bool,
    accompanied_by_reply: bool,
) -> Vec<UpdateIntent> {
    if as_cc {
        if ctx.reviewers.contains(reviewer) {
            return vec![UpdateIntent::remove(reviewer.clone(), REASON_REVIEWER_REMOVED)];
        }
        return Vec::new();
    }
    if accompanied_by_reply {
        return Vec::new();
    }
    if ctx.status != ChangeStatus::Active {
        return Vec::new();
    }
    // Self-adds and additions performed by service accounts draw no
    // attention, and re-adding someone already on the change is a no-op.
    if event.actor == *reviewer || ctx.is_service_account(&event.actor) {
        return Vec::new();
    }
    if ctx.reviewers.contains(reviewer) || ctx.ccs.contains(reviewer) {
        return Vec::new();
    }
    vec![UpdateIntent::add(reviewer.clone(), REASON_REVIEWER_ADDED)]
}

/// An account was removed from the reviewers or CCs. Whatever the change
/// status, the departed account no longer needs to act.
pub(super) fn on_reviewer_removed(account: &AccountId) -> Vec<UpdateIntent> {
    vec![UpdateIntent::remove(account.clone(), REASON_REVIEWER_REMOVED)]
}
