//! Validation of explicit instructions.
//!
//! Runs before the rule engine sees an event, so "last writer wins within
//! a batch" never has to break a tie between two manual instructions:
//! contradictory or duplicate instructions are rejected outright and the
//! whole event is aborted with nothing appended.

use std::collections::BTreeSet;

use crate::account::AccountId;
use crate::change::ChangeContext;
use crate::error::EngineError;
use crate::event::{AttentionEvent, EventKind, Instruction};
use crate::update::MAX_REASON_LEN;

/// Validate the explicit add/remove instructions carried by an event.
pub fn validate_instructions(
    event: &AttentionEvent,
    ctx: &ChangeContext,
) -> Result<(), EngineError> {
    let mut seen: BTreeSet<&AccountId> = BTreeSet::new();
    for instruction in event
        .explicit_adds
        .iter()
        .chain(event.explicit_removes.iter())
    {
        if !seen.insert(&instruction.account) {
            return Err(EngineError::Conflict);
        }
        check_instruction(instruction, event, ctx)?;
    }
    Ok(())
}

fn check_instruction(
    instruction: &Instruction,
    event: &AttentionEvent,
    ctx: &ChangeContext,
) -> Result<(), EngineError> {
    if instruction.reason.is_empty() || instruction.reason.len() > MAX_REASON_LEN {
        return Err(EngineError::InvalidReason {
            account: instruction.account.clone(),
        });
    }
    if ctx.is_service_account(&instruction.account) {
        return Err(EngineError::RobotTarget {
            account: instruction.account.clone(),
        });
    }
    if !is_eligible(&instruction.account, event, ctx) {
        return Err(EngineError::InvalidTarget {
            account: instruction.account.clone(),
        });
    }
    Ok(())
}

/// An account is an eligible target if it is active on the change, or is
/// being added as a reviewer/CC by this very event (an "add as reviewer
/// and put in the attention set" request arrives as one event).
fn is_eligible(account: &AccountId, event: &AttentionEvent, ctx: &ChangeContext) -> bool {
    if ctx.is_participant(account) {
        return true;
    }
    matches!(&event.kind, EventKind::ReviewerAdded { reviewer, .. } if reviewer == account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeStatus;

    fn ctx_with_reviewer(reviewer: &str) -> ChangeContext {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Active);
        ctx.reviewers.insert(AccountId::from(reviewer));
        ctx
    }

    fn reply_event(actor: &str) -> AttentionEvent {
        AttentionEvent::new(
            actor,
            EventKind::Replied {
                comment_refs: vec![],
                has_unresolved_comment: false,
            },
        )
    }

    #[test]
    fn test_valid_instructions_pass() {
        let ctx = ctx_with_reviewer("reviewer");
        let mut event = reply_event("owner");
        event.explicit_adds.push(Instruction::new("reviewer", "ping"));
        event.explicit_removes.push(Instruction::new("owner", "done"));

        assert_eq!(validate_instructions(&event, &ctx), Ok(()));
    }

    #[test]
    fn test_same_account_in_both_lists_is_a_conflict() {
        let ctx = ctx_with_reviewer("reviewer");
        let mut event = reply_event("owner");
        event.explicit_adds.push(Instruction::new("reviewer", "a"));
        event.explicit_removes.push(Instruction::new("reviewer", "b"));

        assert_eq!(validate_instructions(&event, &ctx), Err(EngineError::Conflict));
    }

    #[test]
    fn test_duplicate_within_one_list_is_a_conflict() {
        let ctx = ctx_with_reviewer("reviewer");
        let mut event = reply_event("owner");
        event.explicit_adds.push(Instruction::new("reviewer", "first"));
        event.explicit_adds.push(Instruction::new("reviewer", "second"));

        assert_eq!(validate_instructions(&event, &ctx), Err(EngineError::Conflict));

        let mut event = reply_event("owner");
        event
            .explicit_removes
            .push(Instruction::new("reviewer", "first"));
        event
            .explicit_removes
            .push(Instruction::new("reviewer", "second"));

        assert_eq!(validate_instructions(&event, &ctx), Err(EngineError::Conflict));
    }

    #[test]
    fn test_non_participant_is_invalid_target() {
        let ctx = ctx_with_reviewer("reviewer");
        let mut event = reply_event("owner");
        event.explicit_adds.push(Instruction::new("stranger", "hi"));

        assert_eq!(
            validate_instructions(&event, &ctx),
            Err(EngineError::InvalidTarget {
                account: AccountId::from("stranger")
            })
        );
    }

    #[test]
    fn test_service_account_is_rejected() {
        let mut ctx = ctx_with_reviewer("build-bot");
        ctx.service_accounts.insert(AccountId::from("build-bot"));
        let mut event = reply_event("owner");
        event.explicit_adds.push(Instruction::new("build-bot", "hi"));

        assert_eq!(
            validate_instructions(&event, &ctx),
            Err(EngineError::RobotTarget {
                account: AccountId::from("build-bot")
            })
        );
    }

    #[test]
    fn test_reviewer_added_by_same_event_is_eligible() {
        let ctx = ChangeContext::new("owner", ChangeStatus::Active);
        let mut event = AttentionEvent::new(
            "owner",
            EventKind::ReviewerAdded {
                reviewer: AccountId::from("newcomer"),
                as_cc: false,
                accompanied_by_reply: false,
            },
        );
        event.explicit_adds.push(Instruction::new("newcomer", "look"));

        assert_eq!(validate_instructions(&event, &ctx), Ok(()));
    }

    #[test]
    fn test_empty_reason_is_rejected() {
        let ctx = ctx_with_reviewer("reviewer");
        let mut event = reply_event("owner");
        event.explicit_adds.push(Instruction::new("reviewer", ""));

        assert_eq!(
            validate_instructions(&event, &ctx),
            Err(EngineError::InvalidReason {
                account: AccountId::from("reviewer")
            })
        );
    }

    #[test]
    fn test_overlong_reason_is_rejected() {
        let ctx = ctx_with_reviewer("reviewer");
        let mut event = reply_event("owner");
        event
            .explicit_adds
            .push(Instruction::new("reviewer", "x".repeat(MAX_REASON_LEN + 1)));

        assert!(matches!(
            validate_instructions(&event, &ctx),
            Err(EngineError::InvalidReason { .. })
        ));
    }
}
