//! Error types for echostore

use std::fmt;

/// Result type alias for echostore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for store operations
#[derive(Debug)]
pub enum Error {
    /// The store could not be reached (connection refused, dropped, I/O)
    Unavailable(String),

    /// The store rejected the command
    Command(String),

    /// Operation against a key holding the wrong kind of value
    WrongType(String),
}

impl Error {
    /// True when the failure came from the connection rather than the command
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Unavailable(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
            Error::Command(msg) => write!(f, "Command rejected: {}", msg),
            Error::WrongType(key) => write!(
                f,
                "WRONGTYPE operation against key '{}' holding the wrong kind of value",
                key
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
            Error::Unavailable(err.to_string())
        } else if err.code() == Some("WRONGTYPE") {
            Error::WrongType(err.detail().unwrap_or_default().to_string())
        } else {
            Error::Command(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::WrongType("fruits".to_string());
        assert_eq!(
            err.to_string(),
            "WRONGTYPE operation against key 'fruits' holding the wrong kind of value"
        );
        assert!(Error::Unavailable("refused".into()).is_unavailable());
        assert!(!Error::Command("bad".into()).is_unavailable());
    }

    #[test]
    fn test_from_io_redis_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: Error = redis::RedisError::from(io).into();
        assert!(err.is_unavailable());
    }
}
