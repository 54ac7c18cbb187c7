//! Reference Assistant Peer
//!
//! A small WebSocket service that speaks the chat framing the client expects:
//! one connection per session at `/ws/chat/{session_id}`, `{"text": ...}` in,
//! `AgentReply` frames followed by `TurnComplete` out. How replies are produced
//! is delegated to a [`responder::Responder`].

pub mod config;
pub mod responder;
pub mod router;
pub mod state;
pub mod ws;
