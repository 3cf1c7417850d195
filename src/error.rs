//! Error types for the chat client.
//!
//! [`ApiError`] describes what went wrong on the wire. [`ChatError`] is the
//! taxonomy the controllers work with; its `Display` output is the exact
//! message shown to the user.

use thiserror::Error;

/// Fallback shown when the server rejects credentials without saying why.
pub const GENERIC_AUTH_FAILURE: &str = "Authentication failed. Please try again.";

/// Shown when username or password is blank.
pub const MISSING_CREDENTIALS: &str = "Username and password are required.";

/// Shown when a message is blank after trimming.
pub const EMPTY_MESSAGE: &str = "Message cannot be empty.";

/// Transport-level error from the HTTP client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, undecodable body).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no error message"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the response body, if any.
        message: Option<String>,
    },

    /// A success response was missing something the client needs.
    #[error("Malformed response: {0}")]
    Malformed(&'static str),
}

impl ApiError {
    /// The server-supplied `error` message, if the failure carried one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Everything a controller command can fail with.
#[derive(Error, Debug)]
pub enum ChatError {
    /// A required field was blank. Caught before any network call.
    #[error("{0}")]
    Validation(&'static str),

    /// The service rejected login or register.
    #[error("{message}")]
    Auth {
        message: String,
        #[source]
        source: ApiError,
    },

    /// History retrieval failed.
    #[error("Failed to load chat history.")]
    Fetch(#[source] ApiError),

    /// Message submission failed.
    #[error("Failed to send message.")]
    Send(#[source] ApiError),

    /// An authenticated operation was attempted without a session.
    #[error("You must be logged in to do that.")]
    Precondition,
}

impl ChatError {
    /// Build an auth error, preferring the server's own wording.
    pub(crate) fn auth(source: ApiError) -> Self {
        let message = source
            .server_message()
            .filter(|m| !m.trim().is_empty())
            .map_or_else(|| GENERIC_AUTH_FAILURE.to_string(), str::to_string);
        Self::Auth { message, source }
    }
}

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, ChatError>;
