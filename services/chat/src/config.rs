use tracing::Level;

const DEFAULT_GREETING: &str = "Hello! I'm your assistant. How can I help you today?";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base WebSocket address; the session id is appended as a path segment.
    pub endpoint: String,
    /// First agent message shown before anything is sent. `None` when
    /// `CHAT_GREETING` is set to an empty string.
    pub greeting: Option<String>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let endpoint = std::env::var("CHAT_ENDPOINT")
            .unwrap_or_else(|_| "ws://localhost:8005/ws/chat".to_string());
        if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
            return Err(ConfigError::InvalidValue(
                "CHAT_ENDPOINT".to_string(),
                format!("'{}' is not a ws:// or wss:// address", endpoint),
            ));
        }

        let greeting = match std::env::var("CHAT_GREETING") {
            Ok(text) if text.trim().is_empty() => None,
            Ok(text) => Some(text),
            Err(_) => Some(DEFAULT_GREETING.to_string()),
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            endpoint,
            greeting,
            log_level,
        })
    }
}
