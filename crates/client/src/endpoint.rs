use agentchat_core::SessionId;

/// Base address of the assistant; the session id is appended as the last
/// path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
}

impl Endpoint {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url_for(&self, session_id: &SessionId) -> String {
        format!("{}/{}", self.base.trim_end_matches('/'), session_id)
    }
}
