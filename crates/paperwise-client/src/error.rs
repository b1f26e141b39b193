//! Client error types.

use thiserror::Error;

/// Result alias used across the client.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the client.
///
/// Authentication failures (missing or expired token) come back as a plain
/// [`Error::Status`]; the client does not tell them apart from other HTTP errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never reached the backend or no response came back.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend answered 200 but flagged the operation as unsuccessful.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The operation needs a signed-in session.
    #[error("Not signed in")]
    NotSignedIn,

    /// The paper has neither a link nor a paper id to address it by.
    #[error("Paper has no identifying key")]
    MissingKey,

    /// Durable storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Message carried by the backend, when the error came from a response.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Error::Status { message, .. } | Error::Rejected(message) if !message.is_empty() => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            Error::Status {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            Error::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Status {
            status: 401,
            message: "Invalid token".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: Invalid token");

        assert_eq!(Error::NotSignedIn.to_string(), "Not signed in");
    }

    #[test]
    fn test_backend_message() {
        let err = Error::Rejected("Rate limited".to_string());
        assert_eq!(err.backend_message(), Some("Rate limited"));

        let err = Error::Status {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.backend_message(), None);

        assert_eq!(Error::Network("refused".to_string()).backend_message(), None);
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Storage(_)));
    }
}
