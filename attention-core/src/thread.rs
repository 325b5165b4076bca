//! Comment thread resolution.
//!
//! Comments form a forest: each comment optionally points at a parent,
//! and threads fork when several people reply to the same parent without
//! seeing each other's replies. Resolving a reply's participants walks
//! the parent chain from the referenced comment to the thread root and
//! collects every distinct human author on that path. Sibling branches
//! are *not* pulled in: a reply targets one path through the tree.
//!
//! Comments are immutable once posted and parents always precede their
//! children chronologically, so the walk is bounded by thread depth and
//! cycles cannot occur in well-formed input (the upstream comment store
//! enforces this; it is not re-validated here).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::account::AccountId;

/// Newtype for a comment identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CommentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single comment as the engine sees it. Content is irrelevant here;
/// only authorship and threading matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub author: AccountId,
    pub parent: Option<CommentId>,
    /// True when posted by an automated tool rather than a human.
    pub is_robot: bool,
}

/// Collaborator interface for fetching comments.
///
/// Implementations are expected to hold a snapshot fetched once per
/// event; the engine never triggers I/O per traversal step.
pub trait CommentStore {
    fn get_comment(&self, id: &CommentId) -> Option<&Comment>;
}

/// Parent-indexed snapshot of a change's comments.
#[derive(Debug, Clone, Default)]
pub struct CommentThreads {
    by_id: HashMap<CommentId, Comment>,
}

impl CommentThreads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_comments(comments: impl IntoIterator<Item = Comment>) -> Self {
        Self {
            by_id: comments.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    pub fn insert(&mut self, comment: Comment) {
        self.by_id.insert(comment.id.clone(), comment);
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl CommentStore for CommentThreads {
    fn get_comment(&self, id: &CommentId) -> Option<&Comment> {
        self.by_id.get(id)
    }
}

/// Returns the distinct human authors on the path from `id` to its
/// thread root.
///
/// Robot comment authors are skipped but the walk continues through
/// them, so a human thread rooted in a robot comment still resolves.
/// Returns an empty set when the comment is unknown or the chain
/// contains no human authors.
pub fn resolve_participants(store: &dyn CommentStore, id: &CommentId) -> BTreeSet<AccountId> {
    let mut participants = BTreeSet::new();
    let mut seen: BTreeSet<CommentId> = BTreeSet::new();
    let mut cursor = Some(id.clone());

    while let Some(current) = cursor {
        // Well-formed input has no cycles; stop rather than spin if the
        // snapshot is malformed.
        if !seen.insert(current.clone()) {
            tracing::warn!("comment thread contains a parent cycle at {}", current);
            break;
        }

        let Some(comment) = store.get_comment(&current) else {
            break;
        };
        if !comment.is_robot {
            participants.insert(comment.author.clone());
        }
        cursor = comment.parent.clone();
    }

    participants
}
