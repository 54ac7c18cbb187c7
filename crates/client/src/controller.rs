//! The client controller: owns the session, routes user input out through the
//! codec and channel, and routes channel events into the conversation.
//!
//! Every mutation happens on the caller's task, one event at a time, through
//! [`ChatClient::next_event`], [`ChatClient::process_pending`] or the user
//! operations. Observers read published snapshots via [`ChatClient::subscribe`].

use crate::{
    endpoint::Endpoint,
    error::SubmitError,
    transport::{Channel, ChannelEvent, Connector},
};
use agentchat_core::{
    ConnectionStatus, ConversationState, Decoded, Event, SessionId, decode, encode,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// One chat lifecycle: its id and the single channel it owns.
#[derive(Debug)]
pub struct SessionHandle {
    session_id: SessionId,
    channel: Channel,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    listening: bool,
}

impl SessionHandle {
    fn open<C: Connector + ?Sized>(
        connector: &C,
        endpoint: &Endpoint,
        session_id: SessionId,
    ) -> Self {
        let (channel, events) = Channel::open(connector, endpoint.url_for(&session_id));
        Self {
            session_id,
            channel,
            events,
            listening: true,
        }
    }

    /// Replaces a dead channel with a fresh one under the same session id.
    /// The caller drains the old event queue first.
    fn reopen<C: Connector + ?Sized>(&mut self, connector: &C, endpoint: &Endpoint) {
        let (channel, events) = Channel::open(connector, endpoint.url_for(&self.session_id));
        self.channel = channel;
        self.events = events;
        self.listening = true;
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }
}

pub struct ChatClient<C: Connector> {
    connector: C,
    endpoint: Endpoint,
    session: Option<SessionHandle>,
    state: watch::Sender<ConversationState>,
}

impl<C: Connector> ChatClient<C> {
    pub fn new(connector: C, endpoint: Endpoint) -> Self {
        Self::with_state(connector, endpoint, ConversationState::new())
    }

    pub fn with_state(connector: C, endpoint: Endpoint, initial: ConversationState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            connector,
            endpoint,
            session: None,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref().map(SessionHandle::session_id)
    }

    /// Whether a channel event stream is still open to wait on.
    pub fn is_listening(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.listening)
    }

    /// Ensures a session with a live channel exists.
    ///
    /// Creates the session on first use. While its channel is pending or
    /// connected this is a no-op; once the channel has dropped to
    /// `disconnected`, a new channel is opened under the same session id.
    /// Events already delivered by the old channel are applied before it is
    /// replaced. Returns whether a channel was opened.
    pub fn activate(&mut self) -> bool {
        match self.session.as_ref().map(|s| s.channel.is_live()) {
            Some(true) => {
                debug!(session_id = ?self.session_id(), "Session already active");
                return false;
            }
            Some(false) => {
                let drained = self.process_pending();
                if let Some(handle) = &mut self.session {
                    info!(
                        session_id = %handle.session_id,
                        drained,
                        "Reopening channel for session"
                    );
                    handle.reopen(&self.connector, &self.endpoint);
                }
                return true;
            }
            None => {}
        }

        let handle = SessionHandle::open(&self.connector, &self.endpoint, SessionId::generate());
        info!(
            session_id = %handle.session_id,
            url = %handle.channel.url(),
            "Session activated"
        );
        self.session = Some(handle);
        true
    }

    /// Sends user text to the assistant.
    ///
    /// Blank text and submissions while not connected are rejected without
    /// touching state. A send failure after the user message was recorded
    /// marks the conversation disconnected.
    pub fn submit(&mut self, text: &str) -> Result<(), SubmitError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.state.borrow().connection_status() != ConnectionStatus::Connected {
            return Err(SubmitError::NotConnected);
        }
        let Some(handle) = &self.session else {
            return Err(SubmitError::NotConnected);
        };

        self.dispatch(Event::UserSent(text.to_string()));
        if let Err(e) = handle.channel.send(&encode(text)) {
            warn!(
                session_id = %handle.session_id,
                error = %e,
                "Send failed, marking session disconnected"
            );
            self.dispatch(Event::ConnectionStatusChanged(
                ConnectionStatus::Disconnected,
            ));
            return Err(e.into());
        }
        Ok(())
    }

    /// Closes the channel and ends the session. History is kept; the next
    /// `activate` starts a new session id.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.session.take() {
            info!(session_id = %handle.session_id, "Tearing down session");
            handle.channel.close();
        }
        self.dispatch(Event::ConnectionStatusChanged(
            ConnectionStatus::Disconnected,
        ));
    }

    /// Waits for the next channel event and applies it.
    ///
    /// Returns `None` without waiting when there is no session, or once the
    /// channel's event stream has ended.
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        let handle = self.session.as_mut().filter(|s| s.listening)?;
        match handle.events.recv().await {
            Some(event) => {
                self.handle_channel_event(event.clone());
                Some(event)
            }
            None => {
                handle.listening = false;
                None
            }
        }
    }

    /// Applies every channel event already queued. Returns how many.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let Some(handle) = self.session.as_mut().filter(|s| s.listening) else {
                break;
            };
            match handle.events.try_recv() {
                Ok(event) => {
                    self.handle_channel_event(event);
                    applied += 1;
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    handle.listening = false;
                    break;
                }
            }
        }
        applied
    }

    fn handle_channel_event(&self, event: ChannelEvent) {
        match event {
            ChannelEvent::StateChange(status) => {
                info!(%status, "Connection status changed");
                self.dispatch(Event::ConnectionStatusChanged(status));
            }
            ChannelEvent::Frame(raw) => match decode(&raw) {
                Decoded::Text(event) => self.dispatch(Event::AgentTextReceived(event.text)),
                Decoded::Ignored { kind } => debug!(?kind, "Ignoring frame without text"),
            },
            ChannelEvent::Error(e) => warn!(error = %e, "Channel error"),
        }
    }

    fn dispatch(&self, event: Event) {
        self.state.send_if_modified(|state| state.apply(event));
    }
}
