//! Error types for the duet client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, input validation and storage errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for duet operations.
///
/// Callers that only need to know whether the user has to log in again
/// should use [`Error::is_auth_failure`].
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (invalid credentials, expired session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Protocol errors (error statuses, unexpected responses).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (bad URL, bad registration fields).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Session storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns true if the session is unusable and the user must log in again.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Error::Auth(_) => true,
            Error::Protocol(err) => err.is_auth_error(),
            _ => false,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend rejected the username or password.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// No session is stored.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The request was rejected again after a successful refresh.
    #[error("session expired")]
    SessionExpired,

    /// Refreshing the session failed and the session was cleared.
    ///
    /// `cleanup` is set when clearing the store failed too; the rejected
    /// session is then still stored.
    #[error("session refresh failed: {source}{}", cleanup_note(.cleanup))]
    RefreshFailed {
        #[source]
        source: Box<Error>,
        cleanup: Option<Box<Error>>,
    },

    /// The session was cleared while the request was in flight, by a failed
    /// refresh or a logout.
    #[error("session cleared while the request was in flight")]
    SessionCleared,
}

impl AuthError {
    /// Wrap an error raised while refreshing the session.
    pub fn refresh_failed(source: impl Into<Error>) -> Self {
        AuthError::RefreshFailed {
            source: Box::new(source.into()),
            cleanup: None,
        }
    }

    /// Record that clearing the session after a failed refresh failed as well.
    pub fn with_cleanup_error(self, err: impl Into<Error>) -> Self {
        match self {
            AuthError::RefreshFailed { source, .. } => AuthError::RefreshFailed {
                source,
                cleanup: Some(Box::new(err.into())),
            },
            other => other,
        }
    }
}

fn cleanup_note(cleanup: &Option<Box<Error>>) -> String {
    match cleanup {
        Some(err) => format!(" (clearing the stored session also failed: {})", err),
        None => String::new(),
    }
}

/// Protocol-level errors from backend responses.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// The backend's `detail` text, if present.
    pub detail: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, detail: Option<String>) -> Self {
        Self { status, detail }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid request path.
    #[error("invalid path '{value}': {reason}")]
    Path { value: String, reason: String },

    /// A registration or profile field is out of bounds.
    #[error("invalid {field}: {reason}")]
    Field { field: &'static str, reason: String },

    /// A value could not be encoded or decoded as JSON.
    #[error("JSON error: {message}")]
    Json { message: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

impl From<serde_json::Error> for InvalidInputError {
    fn from(err: serde_json::Error) -> Self {
        InvalidInputError::Json {
            message: err.to_string(),
        }
    }
}

/// Session storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing store failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored document could not be parsed.
    #[error("corrupt session store {path}: {message}")]
    Corrupt { path: String, message: String },
}
