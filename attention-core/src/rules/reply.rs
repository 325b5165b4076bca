//! Attention handling for replies.
//!
//! A reply is any comment, vote, or change message posted by a human.
//! The replier has acted and leaves the set; the ball moves to the
//! owner and uploaders, plus the authors of any comment threads the
//! reply participates in. On closed changes only an unresolved comment
//! pulls the owner back in.

use std::collections::BTreeSet;

use crate::account::AccountId;
use crate::change::{ChangeContext, ChangeStatus};
use crate::event::AttentionEvent;
use crate::thread::{resolve_participants, CommentId, CommentStore};

use super::{UpdateIntent, REASON_REMOVED_ON_REPLY, REASON_REPLIED, REASON_REPLIED_ON_THREAD};

pub(super) fn on_reply(
    event: &AttentionEvent,
    ctx: &ChangeContext,
    comments: &dyn CommentStore,
    comment_refs: &[CommentId],
    has_unresolved_comment: bool,
) -> Vec<UpdateIntent> {
    // Replies from service accounts shift attention to no one.
    if ctx.is_service_account(&event.actor) {
        return Vec::new();
    }

    let mut intents = vec![UpdateIntent::remove(
        event.actor.clone(),
        REASON_REMOVED_ON_REPLY,
    )];

    match ctx.status {
        ChangeStatus::Active => {
            let mut targeted: BTreeSet<AccountId> = BTreeSet::new();
            for account in std::iter::once(&ctx.owner).chain(ctx.uploaders.iter()) {
                if *account != event.actor && targeted.insert(account.clone()) {
                    intents.push(UpdateIntent::add(account.clone(), REASON_REPLIED));
                }
            }

            let mut participants: BTreeSet<AccountId> = BTreeSet::new();
            for id in comment_refs {
                participants.extend(resolve_participants(comments, id));
            }
            for account in participants {
                // The owner/uploader reason takes precedence when an
                // account qualifies under both rules. Participants who
                // have since left the change are dropped silently.
                if account == event.actor || targeted.contains(&account) {
                    continue;
                }
                if !ctx.is_participant(&account) {
                    continue;
                }
                intents.push(UpdateIntent::add(account, REASON_REPLIED_ON_THREAD));
            }
        }
        // A reply on a WIP change removes the replier but wakes no one:
        // the change is not ready for anyone's action yet.
        ChangeStatus::WorkInProgress => {}
        ChangeStatus::Merged | ChangeStatus::Abandoned => {
            if has_unresolved_comment && ctx.owner != event.actor {
                intents.push(UpdateIntent::add(ctx.owner.clone(), REASON_REPLIED));
            }
        }
    }

    intents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::rules::decide;
    use crate::thread::{Comment, CommentThreads};
    use crate::update::Operation;

    fn reply_event(actor: &str, refs: Vec<&str>, unresolved: bool) -> AttentionEvent {
        AttentionEvent::new(
            actor,
            EventKind::Replied {
                comment_refs: refs.into_iter().map(CommentId::from).collect(),
                has_unresolved_comment: unresolved,
            },
        )
    }

    fn comment(id: &str, author: &str, parent: Option<&str>) -> Comment {
        Comment {
            id: CommentId::from(id),
            author: AccountId::from(author),
            parent: parent.map(CommentId::from),
            is_robot: false,
        }
    }

    fn find<'a>(batch: &'a [UpdateIntent], account: &str) -> Option<&'a UpdateIntent> {
        batch.iter().find(|i| i.account == AccountId::from(account))
    }

    #[test]
    fn test_reply_removes_replier_and_adds_owner() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Active);
        ctx.reviewers.insert(AccountId::from("reviewer"));
        ctx.attention_set.insert(AccountId::from("reviewer"));
        let event = reply_event("reviewer", vec![], false);

        let batch = decide(&event, &ctx, &CommentThreads::new());

        let replier = find(&batch, "reviewer").unwrap();
        assert_eq!(replier.operation, Operation::Remove);
        assert_eq!(replier.reason, REASON_REMOVED_ON_REPLY);

        let owner = find(&batch, "owner").unwrap();
        assert_eq!(owner.operation, Operation::Add);
        assert_eq!(owner.reason, REASON_REPLIED);
    }

    #[test]
    fn test_reply_adds_uploaders() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Active);
        ctx.uploaders.insert(AccountId::from("uploader"));
        ctx.reviewers.insert(AccountId::from("reviewer"));
        let event = reply_event("reviewer", vec![], false);

        let batch = decide(&event, &ctx, &CommentThreads::new());

        assert_eq!(find(&batch, "uploader").unwrap().operation, Operation::Add);
        assert_eq!(find(&batch, "owner").unwrap().operation, Operation::Add);
    }

    #[test]
    fn test_owner_replying_is_not_re_added() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Active);
        ctx.attention_set.insert(AccountId::from("owner"));
        let event = reply_event("owner", vec![], false);

        let batch = decide(&event, &ctx, &CommentThreads::new());

        let owner = find(&batch, "owner").unwrap();
        assert_eq!(owner.operation, Operation::Remove);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_reply_on_thread_adds_ancestor_authors_only() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Active);
        for r in ["u1", "u2", "u3", "replier"] {
            ctx.reviewers.insert(AccountId::from(r));
        }
        // root(u1) <- a(u2)
        //          <- b(u3)   sibling branch, not on the replied path
        let threads = CommentThreads::from_comments([
            comment("root", "u1", None),
            comment("a", "u2", Some("root")),
            comment("b", "u3", Some("root")),
        ]);
        let event = reply_event("replier", vec!["a"], false);

        let batch = decide(&event, &ctx, &threads);

        assert_eq!(find(&batch, "u1").unwrap().reason, REASON_REPLIED_ON_THREAD);
        assert_eq!(find(&batch, "u2").unwrap().reason, REASON_REPLIED_ON_THREAD);
        assert!(find(&batch, "u3").is_none());
    }

    #[test]
    fn test_thread_participant_no_longer_on_change_is_skipped() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Active);
        ctx.reviewers.insert(AccountId::from("replier"));
        // "departed" wrote the root comment but has since been removed
        // from the change entirely.
        let threads = CommentThreads::from_comments([comment("root", "departed", None)]);
        let event = reply_event("replier", vec!["root"], false);

        let batch = decide(&event, &ctx, &threads);

        assert!(find(&batch, "departed").is_none());
    }

    #[test]
    fn test_owner_in_thread_keeps_change_level_reason() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Active);
        ctx.reviewers.insert(AccountId::from("replier"));
        let threads = CommentThreads::from_comments([comment("root", "owner", None)]);
        let event = reply_event("replier", vec!["root"], false);

        let batch = decide(&event, &ctx, &threads);

        assert_eq!(find(&batch, "owner").unwrap().reason, REASON_REPLIED);
    }

    #[test]
    fn test_reply_on_wip_change_only_removes_replier() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::WorkInProgress);
        ctx.reviewers.insert(AccountId::from("reviewer"));
        ctx.attention_set.insert(AccountId::from("reviewer"));
        let event = reply_event("reviewer", vec![], false);

        let batch = decide(&event, &ctx, &CommentThreads::new());

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].account, AccountId::from("reviewer"));
        assert_eq!(batch[0].operation, Operation::Remove);
    }

    #[test]
    fn test_unresolved_comment_on_merged_change_adds_owner() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Merged);
        ctx.reviewers.insert(AccountId::from("reviewer"));
        let event = reply_event("reviewer", vec![], true);

        let batch = decide(&event, &ctx, &CommentThreads::new());

        let owner = find(&batch, "owner").unwrap();
        assert_eq!(owner.operation, Operation::Add);
        assert_eq!(owner.reason, REASON_REPLIED);
    }

    #[test]
    fn test_resolved_reply_on_merged_change_adds_no_one() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Merged);
        ctx.reviewers.insert(AccountId::from("reviewer"));
        let event = reply_event("reviewer", vec![], false);

        let batch = decide(&event, &ctx, &CommentThreads::new());

        assert!(find(&batch, "owner").is_none());
    }

    #[test]
    fn test_robot_reply_shifts_no_attention() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Merged);
        ctx.service_accounts.insert(AccountId::from("ci-bot"));
        let event = reply_event("ci-bot", vec![], true);

        assert!(decide(&event, &ctx, &CommentThreads::new()).is_empty());
    }

    #[test]
    fn test_robot_comment_authors_are_not_added_from_threads() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Active);
        ctx.reviewers.insert(AccountId::from("replier"));
        ctx.reviewers.insert(AccountId::from("lint-bot"));
        let threads = CommentThreads::from_comments([Comment {
            id: CommentId::from("root"),
            author: AccountId::from("lint-bot"),
            parent: None,
            is_robot: true,
        }]);
        let event = reply_event("replier", vec!["root"], false);

        let batch = decide(&event, &ctx, &threads);

        assert!(find(&batch, "lint-bot").is_none());
    }
}
