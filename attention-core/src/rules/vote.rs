//! Attention handling for vote deletions.

use crate::account::AccountId;
use crate::change::ChangeContext;
use crate::event::AttentionEvent;

use super::{UpdateIntent, REASON_VOTE_DELETED};

/// Someone else deleted an account's vote. The affected voter should
/// know and possibly re-vote, so they are pulled in. Deleting your own
/// vote tells you nothing you do not already know.
pub(super) fn on_vote_deleted(
    event: &AttentionEvent,
    ctx: &ChangeContext,
    voter: &AccountId,
) -> Vec<UpdateIntent> {
    if event.actor == *voter {
        return Vec::new();
    }
    if ctx.status.is_closed() {
        return Vec::new();
    }
    vec![UpdateIntent::add(voter.clone(), REASON_VOTE_DELETED)]
}
