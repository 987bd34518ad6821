//! Errors raised by the client.
//!
//! HTTP 401, 404 and 429 map onto their own variants. Every other failure is
//! a generic [`SubstackError::Api`].

use thiserror::Error;

/// Coarse classification of a [`SubstackError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Generic,
    Authentication,
    NotFound,
    RateLimit,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubstackError {
    /// Any failure that is not one of the classified HTTP statuses, including
    /// network errors, undecodable bodies and invalid constructor input.
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
    },
    /// HTTP 401.
    #[error("{message}")]
    Authentication { message: String },
    /// HTTP 404, possibly renamed for the entity that was looked up.
    #[error("{message}")]
    NotFound { message: String },
    /// HTTP 429. Not retried.
    #[error("{message}")]
    RateLimit { message: String },
}

pub type Result<T> = std::result::Result<T, SubstackError>;

impl SubstackError {
    pub fn api(message: impl Into<String>) -> Self {
        SubstackError::Api {
            message: message.into(),
            status: None,
        }
    }

    pub fn api_with_status(message: impl Into<String>, status: u16) -> Self {
        SubstackError::Api {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        SubstackError::Authentication {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        SubstackError::NotFound {
            message: message.into(),
        }
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        SubstackError::RateLimit {
            message: message.into(),
        }
    }

    /// Wrap a transport-level failure where no response was received.
    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::api(format!("Network error: {err}"))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SubstackError::Api { .. } => ErrorKind::Generic,
            SubstackError::Authentication { .. } => ErrorKind::Authentication,
            SubstackError::NotFound { .. } => ErrorKind::NotFound,
            SubstackError::RateLimit { .. } => ErrorKind::RateLimit,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            SubstackError::Api { status, .. } => *status,
            SubstackError::Authentication { .. } => Some(401),
            SubstackError::NotFound { .. } => Some(404),
            SubstackError::RateLimit { .. } => Some(429),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SubstackError::Api { message, .. }
            | SubstackError::Authentication { message }
            | SubstackError::NotFound { message }
            | SubstackError::RateLimit { message } => message,
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Replace the message of a not-found error, leaving every other kind untouched.
    pub(crate) fn with_not_found_message(self, message: impl Into<String>) -> Self {
        match self {
            SubstackError::NotFound { .. } => SubstackError::not_found(message),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_kind() {
        assert_eq!(SubstackError::authentication("x").status_code(), Some(401));
        assert_eq!(SubstackError::not_found("x").status_code(), Some(404));
        assert_eq!(SubstackError::rate_limit("x").status_code(), Some(429));
        assert_eq!(SubstackError::api("x").status_code(), None);
        assert_eq!(SubstackError::api_with_status("x", 503).status_code(), Some(503));
    }

    #[test]
    fn test_network_error_message() {
        let err = SubstackError::network("connection refused");
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_with_not_found_message_only_touches_not_found() {
        let err = SubstackError::not_found("Resource not found")
            .with_not_found_message("Newsletter not found: https://a.substack.com");
        assert_eq!(err.message(), "Newsletter not found: https://a.substack.com");
        assert!(err.is_not_found());

        let err = SubstackError::rate_limit("slow down").with_not_found_message("ignored");
        assert_eq!(err, SubstackError::rate_limit("slow down"));
    }
}
