//! Error types for the grade-watch system
//!
//! Every failure is scoped to a single account's run; nothing here is
//! retried automatically.

use thiserror::Error;

/// Result type alias for sinuwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the grade-watch system
#[derive(Error, Debug)]
pub enum Error {
    /// Transport or HTTP failure while talking to the portal
    #[error("network error: {0}")]
    Network(String),

    /// Credentials rejected or status-based login failure
    #[error("authentication failed (HTTP {status}): {excerpt}")]
    Auth {
        /// HTTP status of the rejected login response
        status: u16,
        /// Truncated body excerpt for diagnostics
        excerpt: String,
    },

    /// Expected markup or token absent; the portal page shape may have changed
    #[error("protocol error during {context}: {snippet}")]
    Protocol {
        /// Which handshake stage noticed the mismatch
        context: String,
        /// Raw snippet of the offending markup
        snippet: String,
    },

    /// The records-page trigger (anchor or its script call) was not found
    #[error("extraction error: {0}")]
    Extraction(String),

    /// Snapshot unreadable or unwritable
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Notification delivery failure (logged, never escalated by the engine)
    #[error("notify error: {0}")]
    Notify(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an authentication error with status and body excerpt
    pub fn auth(status: u16, excerpt: impl Into<String>) -> Self {
        Self::Auth {
            status,
            excerpt: excerpt.into(),
        }
    }

    /// Create a protocol error for a handshake stage
    pub fn protocol(context: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self::Protocol {
            context: context.into(),
            snippet: snippet.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create a snapshot store error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Create a notification error
    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short category label used in log lines and failure notifications
    pub fn category(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Auth { .. } => "auth",
            Self::Protocol { .. } => "protocol",
            Self::Extraction(_) => "extraction",
            Self::Snapshot(_) => "snapshot",
            Self::Notify(_) => "notify",
            Self::Config(_) => "config",
            Self::Json(_) => "json",
            Self::Other(_) => "other",
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
