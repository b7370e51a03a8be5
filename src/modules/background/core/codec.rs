// String wire form of commands and events.
//
// Responsibilities
// - Turn an opaque message payload into a Command, failing on anything that is not a
//   JSON string holding a known command.
// - Turn an Event into the string sent back as the reply. Encoding never fails.

use crate::modules::background::core::commands::Command;
use crate::modules::background::core::events::Event;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("payload is not a string")]
    NotAString,

    #[error(transparent)]
    Malformed(#[from] serde_json::Error),
}

pub fn decode_command(payload: &Value) -> Result<Command, CodecError> {
    let raw = payload.as_str().ok_or(CodecError::NotAString)?;
    Ok(serde_json::from_str(raw)?)
}

pub fn encode_event(event: &Event) -> String {
    serde_json::to_string(event).unwrap_or_else(|err| {
        json!({ "CommandRejected": { "reason": err.to_string() } }).to_string()
    })
}
