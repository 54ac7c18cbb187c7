//! WebSocket Chat Sessions
//!
//! - `protocol`: parsing of client frames and the JSON frames sent back.
//! - `session`: the per-connection loop, from upgrade to close.

pub mod protocol;
pub mod session;

pub use session::ws_handler;
