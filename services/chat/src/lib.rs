//! Terminal front end for the assistant chat.
//!
//! The binary in `bin/chat.rs` wires stdin, the [`agentchat_client::ChatClient`]
//! and a [`transcript::Transcript`] together; this library holds the pieces
//! that can be tested on their own.

pub mod config;
pub mod transcript;
