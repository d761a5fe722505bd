//! Newline-delimited JSON framing.
//!
//! One document per line. Blank lines are tolerated on input so a human can
//! drive the gateway from a terminal.

use thiserror::Error;

use crate::wire::{ClientRequest, ServerEvent};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),
    #[error("empty request line")]
    EmptyLine,
}

/// Decode one request line.
pub fn decode_request(line: &str) -> Result<ClientRequest, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::EmptyLine);
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Encode one event as a single line, without the trailing newline.
pub fn encode_event(event: &ServerEvent) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(event)?)
}
