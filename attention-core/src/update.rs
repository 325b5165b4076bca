//! Attention set updates and the per-change append-only log.
//!
//! Current membership is always *derived* from the log by a fold, never
//! held as separately mutated state: the audit trail is authoritative and
//! cannot drift from the membership it implies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::account::AccountId;
use crate::error::EngineError;

/// Maximum length for a human-readable update reason.
pub const MAX_REASON_LEN: usize = 255;

/// Whether an update puts an account into the attention set or takes it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Remove,
}

impl Operation {
    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }

    /// Parse from the persisted string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Self::Add),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable entry in a change's attention set history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttentionSetUpdate {
    /// Epoch microseconds; monotonic within one change's log.
    pub timestamp_micros: i64,
    pub account: AccountId,
    pub operation: Operation,
    /// Human-readable reason, non-empty, at most `MAX_REASON_LEN` bytes.
    pub reason: String,
}

/// Append-only, ordered attention set history for a single change.
///
/// Created empty when the change is created, appended to on every
/// qualifying event, never reordered. The log itself does not deduplicate
/// against its history; "already in the desired state" suppression happens
/// in the rule engine before a batch reaches `append`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateLog {
    entries: Vec<AttentionSetUpdate>,
}

impl UpdateLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a log from persisted history. The caller is responsible
    /// for supplying the entries in their original append order.
    pub fn from_history(entries: Vec<AttentionSetUpdate>) -> Self {
        Self { entries }
    }

    /// Append one batch of updates atomically.
    ///
    /// Fails with `EngineError::Validation` if the batch targets the same
    /// account twice; in that case the log is left untouched. Timestamps
    /// are bumped if needed so the log stays monotonic even when the
    /// caller's clock steps backwards.
    pub fn append(&mut self, mut updates: Vec<AttentionSetUpdate>) -> Result<(), EngineError> {
        let mut seen: BTreeSet<&AccountId> = BTreeSet::new();
        for update in &updates {
            if !seen.insert(&update.account) {
                return Err(EngineError::Validation {
                    account: update.account.clone(),
                });
            }
        }

        let mut floor = self.last_timestamp().unwrap_or(i64::MIN);
        for update in &mut updates {
            if update.timestamp_micros < floor {
                update.timestamp_micros = floor;
            }
            floor = update.timestamp_micros;
        }

        self.entries.append(&mut updates);
        Ok(())
    }

    /// Timestamp of the most recent entry, if any.
    pub fn last_timestamp(&self) -> Option<i64> {
        self.entries.last().map(|u| u.timestamp_micros)
    }

    /// Accounts whose most recent update is an ADD.
    pub fn current_members(&self) -> BTreeSet<AccountId> {
        let mut members = BTreeSet::new();
        for update in &self.entries {
            match update.operation {
                Operation::Add => {
                    members.insert(update.account.clone());
                }
                Operation::Remove => {
                    members.remove(&update.account);
                }
            }
        }
        members
    }

    /// Full ordered history.
    pub fn history(&self) -> &[AttentionSetUpdate] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn update(ts: i64, account: &str, operation: Operation) -> AttentionSetUpdate {
        AttentionSetUpdate {
            timestamp_micros: ts,
            account: AccountId::from(account),
            operation,
            reason: "test".to_string(),
        }
    }

    #[test]
    fn test_empty_log_has_no_members() {
        let log = UpdateLog::new();
        assert!(log.current_members().is_empty());
        assert!(log.history().is_empty());
    }

    #[test]
    fn test_membership_follows_latest_operation() {
        let mut log = UpdateLog::new();
        log.append(vec![update(1, "alice", Operation::Add)]).unwrap();
        log.append(vec![update(2, "bob", Operation::Add)]).unwrap();
        log.append(vec![update(3, "alice", Operation::Remove)])
            .unwrap();

        let members = log.current_members();
        assert!(!members.contains(&AccountId::from("alice")));
        assert!(members.contains(&AccountId::from("bob")));
    }

    #[test]
    fn test_append_rejects_duplicate_account_in_batch() {
        let mut log = UpdateLog::new();
        let result = log.append(vec![
            update(1, "alice", Operation::Add),
            update(1, "alice", Operation::Remove),
        ]);

        assert_eq!(
            result,
            Err(EngineError::Validation {
                account: AccountId::from("alice")
            })
        );
        // The failed batch must not be partially applied.
        assert!(log.history().is_empty());
    }

    #[test]
    fn test_append_bumps_backwards_timestamps() {
        let mut log = UpdateLog::new();
        log.append(vec![update(100, "alice", Operation::Add)])
            .unwrap();
        // Clock stepped backwards between events.
        log.append(vec![update(50, "bob", Operation::Add)]).unwrap();

        assert_eq!(log.history()[1].timestamp_micros, 100);
    }

    #[test]
    fn test_history_preserves_order() {
        let mut log = UpdateLog::new();
        log.append(vec![
            update(1, "alice", Operation::Add),
            update(1, "bob", Operation::Add),
        ])
        .unwrap();
        log.append(vec![update(2, "alice", Operation::Remove)])
            .unwrap();

        let accounts: Vec<&str> = log.history().iter().map(|u| u.account.0.as_str()).collect();
        assert_eq!(accounts, vec!["alice", "bob", "alice"]);
    }

    proptest! {
        /// Property: folding the history always matches replaying the
        /// per-account latest operation.
        #[test]
        fn current_members_matches_latest_operation(
            ops in proptest::collection::vec(("[a-e]", any::<bool>()), 0..40)
        ) {
            let mut log = UpdateLog::new();
            for (i, (account, add)) in ops.iter().enumerate() {
                let operation = if *add { Operation::Add } else { Operation::Remove };
                log.append(vec![update(i as i64, account, operation)]).unwrap();
            }

            let mut expected: std::collections::HashMap<String, Operation> =
                std::collections::HashMap::new();
            for (account, add) in &ops {
                let operation = if *add { Operation::Add } else { Operation::Remove };
                expected.insert(account.clone(), operation);
            }

            let members = log.current_members();
            for (account, operation) in expected {
                let attending = members.contains(&AccountId::from(account.as_str()));
                prop_assert_eq!(attending, operation == Operation::Add);
            }
        }

        /// Property: timestamps in the log never decrease, whatever the
        /// caller's clock does.
        #[test]
        fn timestamps_are_monotonic(ts in proptest::collection::vec(any::<i32>(), 0..40)) {
            let mut log = UpdateLog::new();
            for (i, t) in ts.iter().enumerate() {
                log.append(vec![update(*t as i64, &format!("user{}", i), Operation::Add)])
                    .unwrap();
            }

            let stamps: Vec<i64> = log.history().iter().map(|u| u.timestamp_micros).collect();
            for pair in stamps.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }
}
