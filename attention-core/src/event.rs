//! Events that drive attention set updates.
//!
//! The change-mutation service emits one event per state-changing
//! operation. Explicit add/remove instructions and the
//! `block_automatic_rules` flag can accompany *any* event, so they live
//! on the envelope rather than on individual variants: a manual
//! instruction always applies after the automatic rules for the same
//! event and overrides them for the same account.

use crate::account::AccountId;
use crate::thread::CommentId;

/// An explicit, user-supplied add or remove instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub account: AccountId,
    /// Caller-supplied reason, recorded verbatim in the update log.
    pub reason: String,
}

impl Instruction {
    pub fn new(account: impl Into<AccountId>, reason: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            reason: reason.into(),
        }
    }
}

/// Target of a status-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    Abandoned,
    Merged,
    WorkInProgress,
    ReadyForReview,
}

/// What happened on the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// An account was added as reviewer or CC.
    ReviewerAdded {
        reviewer: AccountId,
        /// True when added in the "informed only" CC role. CCs are not
        /// pulled into the attention set; demoting an existing reviewer
        /// to CC counts as a removal.
        as_cc: bool,
        /// True when the addition arrived together with a comment or vote
        /// in the same operation. The reply rules own attention handling
        /// in that case.
        accompanied_by_reply: bool,
    },

    /// An account was removed from the reviewers or CCs.
    ReviewerOrCcRemoved { account: AccountId },

    /// A vote was deleted. The acting account is the deleter; `voter` is
    /// the account whose vote was removed.
    VoteDeleted { voter: AccountId },

    /// The acting account posted a comment, vote, or change message.
    Replied {
        /// Existing comments this reply references (in-reply-to).
        comment_refs: Vec<CommentId>,
        /// True when the reply carries a new unresolved human comment.
        /// Gates the owner re-add on merged/abandoned changes.
        has_unresolved_comment: bool,
    },

    /// The change moved to a new status.
    StatusChanged { to: StatusTransition },

    /// A service account voted negatively on a label.
    RobotVotedNegatively,
}

/// One event as delivered to the engine: the acting account, what
/// happened, and any explicit instructions riding along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttentionEvent {
    pub actor: AccountId,
    pub kind: EventKind,
    pub explicit_adds: Vec<Instruction>,
    pub explicit_removes: Vec<Instruction>,
    /// Skip the automatic rules for this event. Explicit instructions
    /// still apply, and abandon/merge clearing is never skipped.
    pub block_automatic_rules: bool,
}

impl AttentionEvent {
    pub fn new(actor: impl Into<AccountId>, kind: EventKind) -> Self {
        Self {
            actor: actor.into(),
            kind,
            explicit_adds: Vec::new(),
            explicit_removes: Vec::new(),
            block_automatic_rules: false,
        }
    }

    /// Returns a summary of the event suitable for logging.
    ///
    /// Avoids dumping instruction reasons and comment reference lists.
    pub fn log_summary(&self) -> String {
        let kind = match &self.kind {
            EventKind::ReviewerAdded {
                reviewer,
                as_cc,
                accompanied_by_reply,
            } => format!(
                "ReviewerAdded {{ reviewer: {}, as_cc: {}, with_reply: {} }}",
                reviewer, as_cc, accompanied_by_reply
            ),
            EventKind::ReviewerOrCcRemoved { account } => {
                format!("ReviewerOrCcRemoved {{ account: {} }}", account)
            }
            EventKind::VoteDeleted { voter } => format!("VoteDeleted {{ voter: {} }}", voter),
            EventKind::Replied {
                comment_refs,
                has_unresolved_comment,
            } => format!(
                "Replied {{ refs: {}, unresolved: {} }}",
                comment_refs.len(),
                has_unresolved_comment
            ),
            EventKind::StatusChanged { to } => format!("StatusChanged {{ to: {:?} }}", to),
            EventKind::RobotVotedNegatively => "RobotVotedNegatively".to_string(),
        };
        format!(
            "{} by {} (adds: {}, removes: {}, blocked: {})",
            kind,
            self.actor,
            self.explicit_adds.len(),
            self.explicit_removes.len(),
            self.block_automatic_rules
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_summary_counts_instructions() {
        let mut event = AttentionEvent::new(
            "alice",
            EventKind::Replied {
                comment_refs: vec![CommentId::from("c1"), CommentId::from("c2")],
                has_unresolved_comment: true,
            },
        );
        event.explicit_adds.push(Instruction::new("bob", "ping"));

        let summary = event.log_summary();
        assert!(summary.contains("refs: 2"));
        assert!(summary.contains("adds: 1"));
        assert!(summary.contains("by alice"));
        // Reasons never appear in logs.
        assert!(!summary.contains("ping"));
    }
}
