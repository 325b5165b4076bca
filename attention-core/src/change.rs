//! Read-only view of a change, supplied by the change-mutation service.
//!
//! The context is a snapshot taken *before* the event being processed is
//! applied to the change itself. Rules that care about "new" participants
//! (e.g. a newly added reviewer) rely on that: an account already present
//! in `reviewers` was a reviewer before the event.

use std::collections::BTreeSet;

use crate::account::AccountId;

/// Status of a change, as far as attention set rules care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// Open and ready for review.
    Active,
    /// Open but marked work-in-progress.
    WorkInProgress,
    /// Submitted.
    Merged,
    /// Abandoned.
    Abandoned,
}

impl ChangeStatus {
    /// Returns true if the change is neither merged nor abandoned.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Active | Self::WorkInProgress)
    }

    /// Returns true if the change is merged or abandoned.
    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }
}

/// Per-event snapshot of a change.
///
/// `attention_set` is the current derived membership (accounts whose most
/// recent update is an ADD); the rule engine uses it to suppress redundant
/// updates, never to mutate it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeContext {
    pub owner: AccountId,
    pub uploaders: BTreeSet<AccountId>,
    pub reviewers: BTreeSet<AccountId>,
    pub ccs: BTreeSet<AccountId>,
    /// Accounts classified as service/bot accounts by the identity
    /// collaborator. Resolved once when the snapshot is built.
    pub service_accounts: BTreeSet<AccountId>,
    pub status: ChangeStatus,
    pub attention_set: BTreeSet<AccountId>,
}

impl ChangeContext {
    /// Create a minimal context: an active change with the given owner and
    /// no other participants.
    pub fn new(owner: impl Into<AccountId>, status: ChangeStatus) -> Self {
        Self {
            owner: owner.into(),
            uploaders: BTreeSet::new(),
            reviewers: BTreeSet::new(),
            ccs: BTreeSet::new(),
            service_accounts: BTreeSet::new(),
            status,
            attention_set: BTreeSet::new(),
        }
    }

    /// Returns true if the account is a service/bot account.
    pub fn is_service_account(&self, account: &AccountId) -> bool {
        self.service_accounts.contains(account)
    }

    /// Returns true if the account is active on the change as an owner,
    /// uploader, reviewer, or CC.
    pub fn is_participant(&self, account: &AccountId) -> bool {
        self.owner == *account
            || self.uploaders.contains(account)
            || self.reviewers.contains(account)
            || self.ccs.contains(account)
    }

    /// Returns true if the account is currently in the attention set.
    pub fn is_attending(&self, account: &AccountId) -> bool {
        self.attention_set.contains(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(ChangeStatus::Active.is_open());
        assert!(ChangeStatus::WorkInProgress.is_open());
        assert!(!ChangeStatus::Merged.is_open());
        assert!(!ChangeStatus::Abandoned.is_open());
        assert!(ChangeStatus::Merged.is_closed());
    }

    #[test]
    fn test_is_participant() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Active);
        ctx.reviewers.insert(AccountId::from("reviewer"));
        ctx.ccs.insert(AccountId::from("cc"));
        ctx.uploaders.insert(AccountId::from("uploader"));

        assert!(ctx.is_participant(&AccountId::from("owner")));
        assert!(ctx.is_participant(&AccountId::from("reviewer")));
        assert!(ctx.is_participant(&AccountId::from("cc")));
        assert!(ctx.is_participant(&AccountId::from("uploader")));
        assert!(!ctx.is_participant(&AccountId::from("stranger")));
    }

    #[test]
    fn test_is_service_account() {
        let mut ctx = ChangeContext::new("owner", ChangeStatus::Active);
        ctx.service_accounts.insert(AccountId::from("build-bot"));

        assert!(ctx.is_service_account(&AccountId::from("build-bot")));
        assert!(!ctx.is_service_account(&AccountId::from("owner")));
    }
}
