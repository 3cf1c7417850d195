//! Authenticated session management.
//!
//! The session is the bearer token plus the display name the service
//! returned for it. Both are present or the session does not exist at all.
//!
//! # Architecture
//!
//! - [`Session`]: the authenticated identity
//! - [`SessionController`]: owns the login state machine and the persisted mirror
//!
//! # Example
//!
//! ```rust
//! use chat_sync::session::Session;
//!
//! let session = Session::new("tok-1", "alice").unwrap();
//! assert_eq!(session.display_name(), "alice");
//! assert!(Session::new("", "alice").is_none());
//! ```

mod controller;

pub use controller::{AuthState, SessionController};

use std::fmt;

/// An authenticated identity.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    display_name: String,
}

impl Session {
    /// Build a session. Returns `None` if either part is blank, since a half
    /// authenticated session is not a thing.
    #[must_use]
    pub fn new(token: impl Into<String>, display_name: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let display_name = display_name.into();
        if token.trim().is_empty() || display_name.trim().is_empty() {
            return None;
        }
        Some(Self {
            token,
            display_name,
        })
    }

    /// The opaque bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}
