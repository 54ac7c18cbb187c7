//! Reply generation for the peer.

use anyhow::Result;
use async_trait::async_trait;

/// Produces the assistant's side of a turn.
///
/// Each returned string is sent to the client as one `AgentReply` frame, in
/// order. An empty vector is a valid turn with no text.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, session_id: &str, text: &str) -> Result<Vec<String>>;
}

/// Replies with the user's text, prefixed.
#[derive(Debug, Clone, Default)]
pub struct EchoResponder;

#[async_trait]
impl Responder for EchoResponder {
    async fn respond(&self, _session_id: &str, text: &str) -> Result<Vec<String>> {
        Ok(vec![format!("You said: {}", text)])
    }
}
