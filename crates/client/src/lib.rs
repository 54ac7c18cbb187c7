//! Client side of the assistant chat channel.
//!
//! - `transport`: one streaming connection per [`Channel`], pushed events, and
//!   the [`Connector`] seam that decides how the connection is driven.
//! - `ws`: the WebSocket [`Connector`] built on `tokio-tungstenite`.
//! - `controller`: [`ChatClient`], which owns the session and feeds channel
//!   events through the codec into the conversation reducer.

pub mod controller;
pub mod endpoint;
pub mod error;
pub mod transport;
pub mod ws;

pub use controller::{ChatClient, SessionHandle};
pub use endpoint::Endpoint;
pub use error::{ChannelError, SubmitError};
pub use transport::{Channel, ChannelEvent, Connector, DriverLink, Outbound};
pub use ws::WsConnector;
