//! WebSocket driver for [`Channel`](crate::transport::Channel).

use crate::{
    error::ChannelError,
    transport::{Connector, DriverLink, Outbound},
};
use agentchat_core::ConnectionStatus;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as WsMessage};
use tracing::{Instrument, debug, info, info_span, warn};

/// Connects with `tokio-tungstenite` and runs each connection on its own
/// Tokio task. Must be used from within a Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WsConnector {
    fn connect(&self, url: String, link: DriverLink) {
        let span = info_span!("ws_channel", %url);
        tokio::spawn(run(url, link).instrument(span));
    }
}

async fn run(url: String, mut link: DriverLink) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            warn!(error = %e, "Failed to connect to assistant");
            link.error(ChannelError::Establish(e.to_string()));
            link.set_status(ConnectionStatus::Disconnected);
            return;
        }
    };
    info!("Connected to assistant.");
    link.set_status(ConnectionStatus::Connected);

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    loop {
        tokio::select! {
            // Frames queued by the channel handle, in submission order.
            outbound = link.next_outbound() => match outbound {
                Some(Outbound::Frame(payload)) => {
                    if let Err(e) = ws_tx.send(WsMessage::Text(payload.into())).await {
                        warn!(error = %e, "Failed to send frame");
                        link.error(ChannelError::Transport(e.to_string()));
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    info!("Closing connection.");
                    if let Err(e) = ws_tx.close().await {
                        debug!(error = %e, "Close handshake did not complete");
                    }
                    break;
                }
            },
            inbound = ws_rx.next() => match inbound {
                Some(Ok(WsMessage::Text(text))) => link.frame(text.as_str().to_owned()),
                Some(Ok(WsMessage::Binary(data))) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => link.frame(text),
                    Err(_) => warn!(len = data.len(), "Dropping non-UTF-8 binary frame"),
                },
                Some(Ok(WsMessage::Close(frame))) => {
                    info!(?frame, "Assistant closed the connection.");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "Connection lost");
                    link.error(ChannelError::Transport(e.to_string()));
                    break;
                }
                None => {
                    info!("Connection stream ended.");
                    break;
                }
            },
        }
    }

    link.set_status(ConnectionStatus::Disconnected);
}
