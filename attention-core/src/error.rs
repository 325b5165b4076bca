//! Error taxonomy for the attention set engine.
//!
//! All errors are raised before any state change: a failed event appends
//! nothing to the update log. Automatic rule evaluation never errors;
//! only explicit instructions (and internal invariant violations) can.

use std::fmt;

use crate::account::AccountId;

/// Errors returned by `AttentionSetEngine::decide_and_apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The same account appears twice across the explicit add/remove lists.
    Conflict,
    /// An explicit instruction names an account that is not an owner,
    /// uploader, reviewer, or CC of the change.
    InvalidTarget { account: AccountId },
    /// An explicit instruction names a service account.
    RobotTarget { account: AccountId },
    /// An explicit instruction carries an empty or over-long reason.
    InvalidReason { account: AccountId },
    /// A computed batch targeted the same account twice. This is a defect
    /// in rule evaluation, surfaced rather than silently fixed.
    Validation { account: AccountId },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict => write!(
                f,
                "user can not be added/removed twice, and can not be added and removed at the same time"
            ),
            Self::InvalidTarget { account } => write!(
                f,
                "{} doesn't exist or is not active on the change as an owner, uploader, reviewer, \
                 or cc so they can't be added to the attention set",
                account
            ),
            Self::RobotTarget { account } => write!(
                f,
                "{} is a robot, and robots can't be added to the attention set.",
                account
            ),
            Self::InvalidReason { account } => {
                write!(f, "missing or over-long reason for {}", account)
            }
            Self::Validation { account } => write!(
                f,
                "attention set batch targets {} more than once",
                account
            ),
        }
    }
}

impl std::error::Error for EngineError {}
