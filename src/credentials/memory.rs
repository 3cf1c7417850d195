use std::sync::{Mutex, PoisonError};

use super::{CredentialError, CredentialStore};
use crate::session::Session;

/// Credential store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Session>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `session`, as if persisted by an
    /// earlier run.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    /// Current contents, for assertions.
    #[must_use]
    pub fn snapshot(&self) -> Option<Session> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Session>, CredentialError> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &Session) -> Result<(), CredentialError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}
