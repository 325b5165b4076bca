//! The fixed attention set rule table.
//!
//! `decide` is a pure function from (event, context) to a batch of
//! update intents. Each event family has its own handler module with
//! co-located tests:
//! - `reviewer`: reviewer/CC additions, removals, and CC demotions
//! - `vote`: vote deletions
//! - `reply`: replies, including thread participant resolution
//! - `status`: abandon/submit clearing, WIP clearing, ready-for-review
//! - `robot`: negative votes by service accounts
//! - `manual`: explicit instructions, applied after the automatic rules
//!
//! Within one batch the last writer wins per account (which is how a
//! manual instruction overrides an automatic one), and an update that
//! would leave an account in the state it is already in is suppressed
//! before it ever reaches the log.

mod manual;
mod reply;
mod reviewer;
mod robot;
mod status;
mod vote;

use std::collections::HashMap;

use crate::account::AccountId;
use crate::change::ChangeContext;
use crate::event::{AttentionEvent, EventKind};
use crate::thread::CommentStore;
use crate::update::Operation;

pub const REASON_REVIEWER_ADDED: &str = "Reviewer was added";
pub const REASON_REVIEWER_REMOVED: &str = "Reviewer/Cc was removed";
pub const REASON_VOTE_DELETED: &str = "Their vote was deleted";
pub const REASON_REMOVED_ON_REPLY: &str = "removed on reply";
pub const REASON_REPLIED: &str = "Someone else replied on the change";
pub const REASON_REPLIED_ON_THREAD: &str = "Someone else replied on a comment you posted";
pub const REASON_ABANDONED: &str = "Change was abandoned";
pub const REASON_SUBMITTED: &str = "Change was submitted";
pub const REASON_WORK_IN_PROGRESS: &str = "Change was marked work in progress";
pub const REASON_READY_FOR_REVIEW: &str = "Change was marked ready for review";
pub const REASON_ROBOT_VOTED_NEGATIVELY: &str = "A robot voted negatively on a label";

/// A not-yet-timestamped update produced by rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateIntent {
    pub account: AccountId,
    pub operation: Operation,
    pub reason: String,
}

impl UpdateIntent {
    pub(crate) fn add(account: AccountId, reason: impl Into<String>) -> Self {
        Self {
            account,
            operation: Operation::Add,
            reason: reason.into(),
        }
    }

    pub(crate) fn remove(account: AccountId, reason: impl Into<String>) -> Self {
        Self {
            account,
            operation: Operation::Remove,
            reason: reason.into(),
        }
    }
}

/// Evaluate the rule table for one event.
///
/// The result targets each account at most once and contains no update
/// that would be a no-op against the context's current membership.
/// Explicit instructions are assumed to be validated already.
pub fn decide(
    event: &AttentionEvent,
    ctx: &ChangeContext,
    comments: &dyn CommentStore,
) -> Vec<UpdateIntent> {
    let mut intents = automatic(event, ctx, comments);
    manual::apply(event, &mut intents);
    suppress(coalesce(intents), ctx)
}

/// The automatic rules, keyed on the event tag.
fn automatic(
    event: &AttentionEvent,
    ctx: &ChangeContext,
    comments: &dyn CommentStore,
) -> Vec<UpdateIntent> {
    match &event.kind {
        // Status transitions are handled first: abandon/submit clearing
        // must fire even when automatic rules are blocked.
        EventKind::StatusChanged { to } => status::on_status_changed(event, ctx, *to),
        _ if event.block_automatic_rules => Vec::new(),
        EventKind::ReviewerAdded {
            reviewer,
            as_cc,
            accompanied_by_reply,
        } => reviewer::on_reviewer_added(event, ctx, reviewer, *as_cc, *accompanied_by_reply),
        EventKind::ReviewerOrCcRemoved { account } => reviewer::on_reviewer_removed(account),
        EventKind::VoteDeleted { voter } => vote::on_vote_deleted(event, ctx, voter),
        EventKind::Replied {
            comment_refs,
            has_unresolved_comment,
        } => reply::on_reply(event, ctx, comments, comment_refs, *has_unresolved_comment),
        EventKind::RobotVotedNegatively => robot::on_negative_vote(event, ctx),
    }
}

/// Collapse the batch to one intent per account, last writer wins.
///
/// The replaced intent keeps its position so the batch order stays
/// deterministic.
fn coalesce(intents: Vec<UpdateIntent>) -> Vec<UpdateIntent> {
    let mut result: Vec<UpdateIntent> = Vec::with_capacity(intents.len());
    let mut index: HashMap<AccountId, usize> = HashMap::new();

    for intent in intents {
        match index.get(&intent.account) {
            Some(&i) => result[i] = intent,
            None => {
                index.insert(intent.account.clone(), result.len());
                result.push(intent);
            }
        }
    }
    result
}

/// Drop updates that would leave an account in its current state, and
/// adds that target service accounts (robots are never members).
fn suppress(intents: Vec<UpdateIntent>, ctx: &ChangeContext) -> Vec<UpdateIntent> {
    intents
        .into_iter()
        .filter(|intent| match intent.operation {
            Operation::Add => {
                !ctx.is_attending(&intent.account) && !ctx.is_service_account(&intent.account)
            }
            Operation::Remove => ctx.is_attending(&intent.account),
        })
        .collect()
}
