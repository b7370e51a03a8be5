use crate::shared::core::session_id::SessionId;
use serde::{Deserialize, Serialize};

/// Outcome of a command, sent back to the extension part that issued it.
///
/// `CommandRejected` is the single failure shape: decode errors, processing errors and
/// timeouts all end up here with their message as `reason`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Pong {},
    Session { session_id: SessionId },
    ProductTracked { product_id: String },
    ProductUntracked { product_id: String },
    TrackedProducts { product_ids: Vec<String> },
    UpdatesChecked { checked: usize, checked_at: i64 },
    CommandRejected { reason: String },
}

impl Event {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Event::CommandRejected {
            reason: reason.into(),
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Event::CommandRejected { .. })
    }
}
