//! Account identity newtype.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype for an opaque account identity to prevent mixing with other strings.
///
/// The engine never interprets the contents; identity resolution (emails,
/// usernames, numeric IDs) is a collaborator's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
