//! Session identifier generation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const PREFIX: &str = "session-";
const SUFFIX_LEN: usize = 10;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identifies one chat lifecycle. Embedded in the transport address, so it is
/// restricted to path-safe characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh id of the form `session-<10 base36 chars>`.
    ///
    /// There is no coordination between generators and no collision check;
    /// 36^10 possible suffixes make a clash between concurrent sessions
    /// negligible.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Self(format!("{PREFIX}{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shorthand for [`SessionId::generate`].
pub fn new_session_id() -> SessionId {
    SessionId::generate()
}
