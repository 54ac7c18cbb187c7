//! Frames exchanged between a chat client and the peer.

use serde::Serialize;
use serde_json::Value;

/// Extracts the user's text from a client frame.
///
/// `{"text": "..."}` yields the string; any other payload, JSON or not, is
/// taken verbatim.
pub fn parse_client_text(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|value| value.get("text").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| raw.to_string())
}

/// Frames sent from the peer to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// One chunk of the assistant's reply.
    AgentReply { text: String },
    /// The assistant has finished responding to the last user message.
    TurnComplete,
    /// The turn failed; no text is attached, so clients do not render it.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_text_from_json() {
        assert_eq!(parse_client_text(r#"{"text":"Hello"}"#), "Hello");
        assert_eq!(parse_client_text(r#"{"text":"  padded "}"#), "  padded ");
    }

    #[test]
    fn test_parse_client_text_falls_back_to_raw() {
        assert_eq!(parse_client_text("Hello"), "Hello");
        assert_eq!(parse_client_text(r#"{"other":1}"#), r#"{"other":1}"#);
        assert_eq!(parse_client_text(r#"{"text":5}"#), r#"{"text":5}"#);
        assert_eq!(parse_client_text(""), "");
    }

    #[test]
    fn test_server_frame_serialization() {
        let reply = ServerFrame::AgentReply {
            text: "Hi there".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"type":"AgentReply","text":"Hi there"}"#
        );
        assert_eq!(
            serde_json::to_string(&ServerFrame::TurnComplete).unwrap(),
            r#"{"type":"TurnComplete"}"#
        );

        let error = ServerFrame::Error {
            message: "boom".to_string(),
        };
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["type"], "Error");
        assert!(json.get("text").is_none());
    }
}
