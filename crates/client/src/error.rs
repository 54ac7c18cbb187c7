/// Failures of the transport channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel is not connected")]
    NotConnected,
    #[error("Failed to establish connection: {0}")]
    Establish(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Failed to encode frame: {0}")]
    Encode(String),
}

/// Why a user submission did not go out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Message is empty")]
    Empty,
    #[error("Not connected to the assistant")]
    NotConnected,
    #[error("Send failed: {0}")]
    Send(#[from] ChannelError),
}
