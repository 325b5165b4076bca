//! Attention handling for negative robot votes.

use crate::change::{ChangeContext, ChangeStatus};
use crate::event::AttentionEvent;

use super::{UpdateIntent, REASON_ROBOT_VOTED_NEGATIVELY};

/// A service account voted negatively on a label. The owner has to fix
/// something, so they are pulled in; nobody else is.
pub(super) fn on_negative_vote(event: &AttentionEvent, ctx: &ChangeContext) -> Vec<UpdateIntent> {
    if !ctx.is_service_account(&event.actor) {
        return Vec::new();
    }
    if ctx.status != ChangeStatus::Active {
        return Vec::new();
    }
    vec![UpdateIntent::add(
        ctx.owner.clone(),
        REASON_ROBOT_VOTED_NEGATIVELY,
    )]
}
