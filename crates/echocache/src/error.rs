//! Error types for echocache

use std::fmt;
use std::io;

/// Result type alias for echocache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug)]
pub enum Error {
    /// The underlying store failed or was unreachable
    Store(echostore::Error),

    /// A decoder rejected the stored bytes
    Decode(String),

    /// The page fetch failed
    Fetch(String),

    /// Writing a report failed
    Io(io::Error),
}

impl Error {
    /// True when the store could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_unavailable())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Store(e) => write!(f, "Store error: {}", e),
            Error::Decode(msg) => write!(f, "Decode error: {}", msg),
            Error::Fetch(msg) => write!(f, "Fetch error: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<echostore::Error> for Error {
    fn from(err: echostore::Error) -> Self {
        Error::Store(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
