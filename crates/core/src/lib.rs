//! Messaging core for a session-scoped assistant chat.
//!
//! Everything in this crate is free of I/O: session identifiers, the message
//! model, the wire codec and the conversation reducer. The transport and the
//! controller that drives them live in `agentchat-client`.

pub mod codec;
pub mod conversation;
pub mod message;
pub mod session;

pub use codec::{AgentTextEvent, Decoded, OutboundFrame, decode, encode};
pub use conversation::{ConnectionStatus, ConversationState, Event, reduce};
pub use message::{Message, MessageId, Role};
pub use session::{SessionId, new_session_id};
