//! Errors surfaced at the API boundary

use scoreguard_core::{Role, ScoreguardError, LOGIN_ENTRY};
use std::fmt;
use thiserror::Error;

/// Flavour of an authentication failure
///
/// The messages are deliberately generic: they never reveal whether an
/// email address is known to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Login rejected
    InvalidCredentials,
    /// A previously valid token was rejected; the session has been cleared
    SessionExpired,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::InvalidCredentials => f.write_str("Invalid email or password"),
            AuthFailure::SessionExpired => f.write_str("Session expired, please log in again"),
        }
    }
}

/// Client error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    AuthFailure(AuthFailure),

    #[error("This account is not authorized for {portal} access.")]
    RoleMismatch { portal: Role },

    #[error("Insufficient permissions: {0}")]
    Forbidden(String),

    #[error("Failed to analyze transactions: {0}")]
    UploadFailure(String),

    #[error("API error ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Core(#[from] ScoreguardError),
}

impl ApiError {
    /// Whether the error cleared the session and must send the user to login
    pub fn escalates(&self) -> bool {
        matches!(self, ApiError::AuthFailure(AuthFailure::SessionExpired))
    }

    /// Navigation target forced by the error, if any
    pub fn redirect(&self) -> Option<&'static str> {
        self.escalates().then_some(LOGIN_ENTRY)
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_expired_sessions_escalate() {
        assert!(ApiError::AuthFailure(AuthFailure::SessionExpired).escalates());
        assert_eq!(
            ApiError::AuthFailure(AuthFailure::SessionExpired).redirect(),
            Some("/login")
        );
        assert!(!ApiError::AuthFailure(AuthFailure::InvalidCredentials).escalates());
        assert!(!ApiError::Forbidden("nope".into()).escalates());
        assert!(!ApiError::UploadFailure("bad csv".into()).escalates());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::RoleMismatch { portal: Role::Citizen }.to_string(),
            "This account is not authorized for citizen access."
        );
        assert_eq!(
            ApiError::AuthFailure(AuthFailure::InvalidCredentials).to_string(),
            "Invalid email or password"
        );
    }
}
