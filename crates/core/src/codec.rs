//! Wire codec for the chat channel.
//!
//! Outbound frames are always `{"text": ...}` JSON. Inbound frames may be JSON
//! objects carrying a `text` field, JSON without one (other event kinds), or
//! plain text. Decoding never fails: anything that is not JSON is taken as
//! the agent's text verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A frame sent from the client to the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundFrame {
    pub text: String,
}

impl OutboundFrame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A chunk of assistant text extracted from an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentTextEvent {
    pub text: String,
}

/// The outcome of decoding one inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Text(AgentTextEvent),
    /// Well-formed but carries no text. `kind` is the frame's `type` field,
    /// if any.
    Ignored { kind: Option<String> },
}

/// Wraps user text in an outbound frame. Performs no trimming or validation.
pub fn encode(text: &str) -> OutboundFrame {
    OutboundFrame {
        text: text.to_string(),
    }
}

/// Decodes one inbound payload: a JSON value with non-empty string `text` is
/// agent text, other JSON is ignored, and anything unparseable (or a bare
/// `null`) is shown verbatim as plain text.
pub fn decode(raw: &str) -> Decoded {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => Decoded::Text(AgentTextEvent {
            text: raw.to_string(),
        }),
        Ok(value) => match value.get("text").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => Decoded::Text(AgentTextEvent {
                text: text.to_string(),
            }),
            _ => Decoded::Ignored {
                kind: value
                    .get("type")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
        },
        Err(_) if raw.is_empty() => Decoded::Ignored { kind: None },
        Err(e) => {
            debug!(error = %e, "Inbound frame is not JSON, treating it as plain text");
            Decoded::Text(AgentTextEvent {
                text: raw.to_string(),
            })
        }
    }
}
