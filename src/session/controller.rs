//! Login state machine.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use super::Session;
use crate::api::{AuthMode, ChatApi, Credentials};
use crate::credentials::CredentialStore;
use crate::error::{ApiError, ChatError, MISSING_CREDENTIALS, Result};

/// Where the client is in the login lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    LoggedOut,
    Authenticating,
    LoggedIn,
}

#[derive(Debug, Default)]
struct Inner {
    auth: AuthState,
    session: Option<Session>,
}

/// Owns the current [`Session`] and keeps the credential store in step with it.
///
/// The credential store is only written here and only read by [`restore`].
/// Storage failures are logged and otherwise ignored.
///
/// [`restore`]: SessionController::restore
#[derive(Debug)]
pub struct SessionController {
    api: Arc<dyn ChatApi>,
    credentials: Arc<dyn CredentialStore>,
    inner: RwLock<Inner>,
}

impl SessionController {
    /// Create a logged-out controller.
    pub fn new(api: Arc<dyn ChatApi>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            api,
            credentials,
            inner: RwLock::new(Inner::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.read().auth
    }

    /// Current session, if logged in.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.read().session.clone()
    }

    /// Current bearer token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read().session.as_ref().map(|s| s.token().to_string())
    }

    /// Whether `token` is still the active token. Responses issued under any
    /// other token are stale.
    #[must_use]
    pub fn is_current(&self, token: &str) -> bool {
        self.read()
            .session
            .as_ref()
            .is_some_and(|s| s.token() == token)
    }

    /// Load a persisted session and, if there is one, enter `LoggedIn`
    /// without asking the service whether the token is still good.
    pub fn restore(&self) -> Option<Session> {
        let loaded = match self.credentials.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(
                    name: "session.restore.storage_failed",
                    error = %e,
                    "Credential storage unavailable, starting logged out"
                );
                None
            }
        };

        let mut inner = self.write();
        inner.auth = if loaded.is_some() {
            AuthState::LoggedIn
        } else {
            AuthState::LoggedOut
        };
        inner.session.clone_from(&loaded);
        drop(inner);

        if let Some(session) = &loaded {
            info!(
                name: "session.restored",
                user = %session.display_name(),
                "Session restored from credential store"
            );
        }
        loaded
    }

    /// Log in or register.
    ///
    /// Both fields are trimmed; blank input fails with a validation error
    /// before anything goes over the wire. On rejection the controller keeps
    /// whatever session it holds at that point and the credential store is
    /// untouched.
    pub async fn authenticate(
        &self,
        mode: AuthMode,
        username: &str,
        password: &str,
    ) -> Result<Session> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ChatError::Validation(MISSING_CREDENTIALS));
        }

        self.write().auth = AuthState::Authenticating;

        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let outcome = self
            .api
            .authenticate(mode, &credentials)
            .await
            .and_then(|resp| {
                Session::new(resp.token, resp.username)
                    .ok_or(ApiError::Malformed("empty token or username"))
            });

        match outcome {
            Ok(session) => {
                {
                    let mut inner = self.write();
                    inner.auth = AuthState::LoggedIn;
                    inner.session = Some(session.clone());
                }
                if let Err(e) = self.credentials.save(&session) {
                    warn!(
                        name: "session.persist.failed",
                        error = %e,
                        "Could not persist session, it will not survive a restart"
                    );
                }
                info!(
                    name: "session.authenticated",
                    mode = %mode,
                    user = %session.display_name(),
                    "Authenticated"
                );
                Ok(session)
            }
            Err(e) => {
                {
                    // A logout may have landed while the request was out, so
                    // derive the state from the session as it is now.
                    let mut inner = self.write();
                    inner.auth = if inner.session.is_some() {
                        AuthState::LoggedIn
                    } else {
                        AuthState::LoggedOut
                    };
                }
                warn!(
                    name: "session.authenticate.failed",
                    mode = %mode,
                    user = %username,
                    error = %e,
                    "Authentication rejected"
                );
                Err(ChatError::auth(e))
            }
        }
    }

    /// Drop the session locally and forget the persisted credential.
    /// Nothing is sent to the service.
    pub fn logout(&self) {
        {
            let mut inner = self.write();
            inner.auth = AuthState::LoggedOut;
            inner.session = None;
        }
        if let Err(e) = self.credentials.clear() {
            warn!(
                name: "session.clear.failed",
                error = %e,
                "Could not clear persisted credential"
            );
        }
        info!(name: "session.logged_out", "Logged out");
    }
}
