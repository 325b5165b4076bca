//! Explicit attention instructions.
//!
//! Appended after the automatic intents so that last-writer-wins
//! coalescing makes a manual instruction override whatever the
//! automatic rules decided for the same account. Instructions are
//! validated before the engine runs; this module just translates them.

use crate::event::AttentionEvent;

use super::UpdateIntent;

pub(super) fn apply(event: &AttentionEvent, intents: &mut Vec<UpdateIntent>) {
    for instruction in &event.explicit_adds {
        intents.push(UpdateIntent::add(
            instruction.account.clone(),
            instruction.reason.clone(),
        ));
    }
    for instruction in &event.explicit_removes {
        intents.push(UpdateIntent::remove(
            instruction.account.clone(),
            instruction.reason.clone(),
        ));
    }
}
