//! Error types for cloudpulse

use std::fmt;

/// Result type alias for cloudpulse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cloudpulse
#[derive(Debug)]
pub enum Error {
    /// Transport failure talking to the monitoring service
    Transport(reqwest::Error),
    /// Monitoring service rejected our credentials (401/403)
    Auth(String),
    /// Monitoring service returned a non-success status
    MonitoringApi { status: u16, message: String },
    /// Document store driver errors
    Store(mongodb::error::Error),
    /// Serialization errors
    Serialization(String),
    /// Configuration errors
    Config(String),
    /// Query window violates start <= end
    InvalidWindow { start: i64, end: i64 },
    /// IO errors
    Io(std::io::Error),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            Error::Store(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "Transport error: {}", e),
            Error::Auth(msg) => write!(f, "Authentication rejected: {}", msg),
            Error::MonitoringApi { status, message } => {
                write!(f, "Monitoring API error (status {}): {}", status, message)
            }
            Error::Store(e) => write!(f, "Document store error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::InvalidWindow { start, end } => {
                write!(f, "Invalid query window: start {} is after end {}", start, end)
            }
            Error::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e)
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(e: mongodb::error::Error) -> Self {
        Error::Store(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<bson::ser::Error> for Error {
    fn from(e: bson::ser::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
