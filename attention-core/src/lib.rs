//! Attention set engine for a collaborative review workflow.
//!
//! The engine decides which participants of a change are currently
//! expected to act, and keeps a fully auditable history of that
//! decision. The design separates:
//! - **Context**: what the change looks like right now (`ChangeContext`)
//! - **Events**: what happened (`AttentionEvent`)
//! - **Updates**: what the attention set does about it (`AttentionSetUpdate`)
//! - **Rules**: pure function `(event, context) -> Vec<update>`
//!
//! The engine is stateless between calls and performs no I/O; the
//! caller owns the per-change `UpdateLog` and its persistence.

pub mod account;
pub mod change;
pub mod engine;
pub mod error;
pub mod event;
pub mod rules;
pub mod thread;
pub mod update;
pub mod validate;

pub use account::AccountId;
pub use change::{ChangeContext, ChangeStatus};
pub use engine::AttentionSetEngine;
pub use error::EngineError;
pub use event::{AttentionEvent, EventKind, Instruction, StatusTransition};
pub use thread::{Comment, CommentId, CommentStore, CommentThreads};
pub use update::{AttentionSetUpdate, Operation, UpdateLog};
