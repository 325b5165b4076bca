//! The engine facade: validate, decide, timestamp, append.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::change::ChangeContext;
use crate::error::EngineError;
use crate::event::AttentionEvent;
use crate::rules;
use crate::thread::CommentStore;
use crate::update::{AttentionSetUpdate, UpdateLog};
use crate::validate::validate_instructions;

/// Stateless entry point for processing one event against one change.
///
/// The engine holds no per-change state; the caller supplies the context
/// snapshot and the change's update log and owns their persistence. When
/// the feature toggle is off, every event is a no-op and the log is left
/// exactly as it is.
#[derive(Debug, Clone)]
pub struct AttentionSetEngine {
    enabled: bool,
}

impl Default for AttentionSetEngine {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AttentionSetEngine {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Process one event: validate its explicit instructions, evaluate the
    /// rule table, timestamp the resulting batch, and append it to the log.
    ///
    /// Returns the updates that were appended (possibly none). On error
    /// the log is untouched.
    pub fn decide_and_apply(
        &self,
        event: &AttentionEvent,
        ctx: &ChangeContext,
        comments: &dyn CommentStore,
        log: &mut UpdateLog,
    ) -> Result<Vec<AttentionSetUpdate>, EngineError> {
        if !self.enabled {
            tracing::debug!("attention set disabled, ignoring event: {}", event.log_summary());
            return Ok(Vec::new());
        }

        validate_instructions(event, ctx)?;

        let intents = rules::decide(event, ctx, comments);
        if intents.is_empty() {
            tracing::debug!("no attention updates for event: {}", event.log_summary());
            return Ok(Vec::new());
        }

        // All updates from one event share a timestamp, kept strictly
        // after the previous entry even if the wall clock stalls or
        // steps backwards.
        let now = now_micros();
        let stamp = match log.last_timestamp() {
            Some(last) if last >= now => last + 1,
            _ => now,
        };

        let updates: Vec<AttentionSetUpdate> = intents
            .into_iter()
            .map(|intent| AttentionSetUpdate {
                timestamp_micros: stamp,
                account: intent.account,
                operation: intent.operation,
                reason: intent.reason,
            })
            .collect();

        log.append(updates.clone())?;
        tracing::info!(
            "appended {} attention update(s) for event: {}",
            updates.len(),
            event.log_summary()
        );
        Ok(updates)
    }
}

fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}
