//! Turns conversation snapshots into terminal lines.

use agentchat_core::{ConnectionStatus, ConversationState, Role};

/// Remembers what has already been printed so each snapshot only yields what
/// is new.
#[derive(Debug, Default)]
pub struct Transcript {
    printed: usize,
    status: Option<ConnectionStatus>,
    composing: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, state: &ConversationState) -> Vec<String> {
        let mut lines = Vec::new();

        if self.status != Some(state.connection_status()) {
            self.status = Some(state.connection_status());
            lines.push(format!("-- {} --", state.connection_status()));
        }

        for message in state.messages().iter().skip(self.printed) {
            let prefix = match message.role() {
                Role::User => "you",
                Role::Agent => "agent",
            };
            lines.push(format!("{prefix}> {}", message.text()));
        }
        self.printed = state.messages().len();

        if state.peer_composing() && !self.composing {
            lines.push("agent is typing...".to_string());
        }
        self.composing = state.peer_composing();

        lines
    }
}
