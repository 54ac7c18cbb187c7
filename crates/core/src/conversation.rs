//! Conversation state and the reducer that drives it.
//!
//! All mutation goes through [`ConversationState::apply`] (or the by-value
//! [`reduce`]). History is append-only and its order is arrival order.

use crate::message::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection state of the transport as last reported to the conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
        }
    }
}

/// Inputs to the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    UserSent(String),
    AgentTextReceived(String),
    ConnectionStatusChanged(ConnectionStatus),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<Message>,
    connection_status: ConnectionStatus,
    peer_composing: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the history with a single agent message.
    pub fn with_greeting(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::agent(text)],
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection_status
    }

    /// True between a user message and the next agent message. Never cleared
    /// by time alone.
    pub fn peer_composing(&self) -> bool {
        self.peer_composing
    }

    /// Applies one event in place. Returns whether anything changed.
    pub fn apply(&mut self, event: Event) -> bool {
        match event {
            Event::UserSent(text) => {
                self.messages.push(Message::user(text));
                self.peer_composing = true;
                true
            }
            Event::AgentTextReceived(text) => {
                self.messages.push(Message::agent(text));
                self.peer_composing = false;
                true
            }
            Event::ConnectionStatusChanged(status) => {
                if self.connection_status == status {
                    return false;
                }
                self.connection_status = status;
                true
            }
        }
    }
}

pub fn reduce(mut state: ConversationState, event: Event) -> ConversationState {
    state.apply(event);
    state
}
