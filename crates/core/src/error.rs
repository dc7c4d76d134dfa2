//! Error types for sdiag-core
//!
//! Provides a unified error type for configuration, local I/O and remote
//! storage failures. Display text always carries the service's own message so
//! that the hint classifier can inspect it.

use thiserror::Error;

use crate::hint::Hint;

/// Result type alias for sdiag-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sdiag operations
#[derive(Error, Debug)]
pub enum Error {
    /// Settings file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Missing or malformed user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication or permission failure
    #[error("Unauthorized: {0}")]
    Auth(String),

    /// Bucket or object not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Request did not complete in time
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Conflict, usually an existing object or bucket
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The auth service holds no user session for this key
    #[error("Auth session missing")]
    SessionMissing,

    /// Any other error reported by the remote API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl Error {
    /// Best-effort remediation hint for this error
    ///
    /// The service's own message is classified first so that variant
    /// prefixes cannot outrank its keywords; the full text is the fallback.
    pub fn hint(&self) -> Hint {
        let from_message = self.service_message().map(Hint::classify);
        match from_message {
            Some(hint) if !matches!(hint, Hint::Generic(_)) => hint,
            _ => Hint::classify(&self.to_string()),
        }
    }

    /// Message reported by the remote service, without the variant prefix
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Error::Auth(message)
            | Error::NotFound(message)
            | Error::Network(message)
            | Error::Timeout(message)
            | Error::Conflict(message)
            | Error::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether this error came back from the remote service rather than local code
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Auth(_)
                | Error::NotFound(_)
                | Error::Network(_)
                | Error::Timeout(_)
                | Error::Conflict(_)
                | Error::SessionMissing
                | Error::Api { .. }
        )
    }
}
