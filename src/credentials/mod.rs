//! Durable storage for the session credential.
//!
//! The store is a passive mirror of the in-memory [`Session`]: the session
//! controller writes to it on login and logout and reads it once on startup.
//!
//! - [`FileCredentialStore`]: JSON file on disk
//! - [`MemoryCredentialStore`]: process-local, for tests and ephemeral runs

mod file;
mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Session;

/// Storage failure. Never shown to the user; callers log and carry on.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("credential storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential record is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence port for the session credential.
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Load the persisted session, or `None` if nothing is stored.
    fn load(&self) -> Result<Option<Session>, CredentialError>;

    /// Persist `session`, replacing whatever was stored.
    fn save(&self, session: &Session) -> Result<(), CredentialError>;

    /// Remove any persisted session. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// On-disk shape of a persisted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
    username: String,
}

impl StoredCredential {
    /// Blank fields count as nothing persisted.
    fn into_session(self) -> Option<Session> {
        Session::new(self.token, self.username)
    }
}

impl From<&Session> for StoredCredential {
    fn from(session: &Session) -> Self {
        Self {
            token: session.token().to_string(),
            username: session.display_name().to_string(),
        }
    }
}
