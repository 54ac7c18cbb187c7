//! Transport channel: one streaming connection and the events it pushes.
//!
//! A [`Channel`] is the caller's handle. The work of actually moving bytes is
//! done by a driver that a [`Connector`] starts with a [`DriverLink`]. The
//! driver reports every state change, inbound frame and error through the
//! link, on a single queue, so the caller sees them in the order the
//! transport produced them.
//!
//! State machine: `disconnected -> connecting -> connected -> disconnected`,
//! or `connecting -> disconnected` when the connection cannot be established.
//! There is no automatic reconnect.

use crate::error::ChannelError;
use agentchat_core::{ConnectionStatus, OutboundFrame};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// Pushed notifications from a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    StateChange(ConnectionStatus),
    Frame(String),
    Error(ChannelError),
}

/// Work queued for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Frame(String),
    Close,
}

/// Starts the driver for a new connection.
///
/// Implementations must not block: they hand the link to something that runs
/// independently (usually a spawned task) and return.
#[cfg_attr(test, mockall::automock)]
pub trait Connector: Send + Sync {
    fn connect(&self, url: String, link: DriverLink);
}

/// The driver's end of a channel.
///
/// Status is published before the matching `StateChange` event is queued, so
/// a consumer reacting to `Connected` can send immediately. Dropping the link
/// reports `Disconnected` if the driver did not already.
#[derive(Debug)]
pub struct DriverLink {
    outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<ChannelEvent>,
    status: watch::Sender<ConnectionStatus>,
}

impl DriverLink {
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        if self.status.send_replace(status) != status {
            self.emit(ChannelEvent::StateChange(status));
        }
    }

    pub fn frame(&self, raw: String) {
        self.emit(ChannelEvent::Frame(raw));
    }

    pub fn error(&self, err: ChannelError) {
        self.emit(ChannelEvent::Error(err));
    }

    /// Waits for the next outbound item. `None` once the channel handle is
    /// gone.
    pub async fn next_outbound(&mut self) -> Option<Outbound> {
        self.outbound.recv().await
    }

    pub fn try_next_outbound(&mut self) -> Option<Outbound> {
        self.outbound.try_recv().ok()
    }

    fn emit(&self, event: ChannelEvent) {
        if self.events.send(event).is_err() {
            debug!("Channel event dropped: receiver is gone");
        }
    }
}

impl Drop for DriverLink {
    fn drop(&mut self) {
        self.set_status(ConnectionStatus::Disconnected);
    }
}

/// Caller-side handle for one connection.
#[derive(Debug)]
pub struct Channel {
    url: String,
    status: watch::Receiver<ConnectionStatus>,
    outbound: mpsc::UnboundedSender<Outbound>,
    closed: AtomicBool,
}

impl Channel {
    /// Opens a connection to `url` through `connector`.
    ///
    /// Returns immediately with the handle and the receiver of its events.
    /// The first event is always `StateChange(Connecting)`.
    pub fn open<C: Connector + ?Sized>(
        connector: &C,
        url: String,
    ) -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);

        let link = DriverLink {
            outbound: outbound_rx,
            events: events_tx,
            status: status_tx,
        };
        link.set_status(ConnectionStatus::Connecting);
        connector.connect(url.clone(), link);

        let channel = Self {
            url,
            status: status_rx,
            outbound: outbound_tx,
            closed: AtomicBool::new(false),
        };
        (channel, events_rx)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> ConnectionStatus {
        if self.closed.load(Ordering::Acquire) {
            return ConnectionStatus::Disconnected;
        }
        *self.status.borrow()
    }

    /// Pending or connected, and not closed.
    pub fn is_live(&self) -> bool {
        self.status() != ConnectionStatus::Disconnected
    }

    /// Queues one frame for transmission. Sent exactly once, never retried.
    pub fn send(&self, frame: &OutboundFrame) -> Result<(), ChannelError> {
        if self.status() != ConnectionStatus::Connected {
            return Err(ChannelError::NotConnected);
        }
        let payload = frame
            .to_json()
            .map_err(|e| ChannelError::Encode(e.to_string()))?;
        self.outbound
            .send(Outbound::Frame(payload))
            .map_err(|_| ChannelError::NotConnected)
    }

    /// Releases the connection. Later sends fail with `NotConnected`.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.outbound.send(Outbound::Close);
    }
}
