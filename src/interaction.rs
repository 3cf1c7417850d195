//! The command surface a user interface binds to.
//!
//! [`InteractionController`] ties the session and conversation together and
//! owns the transient UI state: the input buffer, the in-flight flags and the
//! single error banner. Commands never return errors. Every failure ends up
//! as [`UiState::error_message`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chat_sync::api::{AuthMode, HttpClient};
//! use chat_sync::credentials::MemoryCredentialStore;
//! use chat_sync::interaction::InteractionController;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(HttpClient::new("http://localhost:5000")?);
//! let chat = InteractionController::new(api, Arc::new(MemoryCredentialStore::new()));
//!
//! chat.start().await;
//! chat.submit_credentials(AuthMode::Login, "alice", "pw123").await;
//! chat.set_input("hello");
//! chat.submit_input().await;
//!
//! for message in chat.messages() {
//!     println!("{}", message.text);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::api::{AuthMode, ChatApi, Message};
use crate::conversation::{ConversationStore, SyncOutcome};
use crate::credentials::CredentialStore;
use crate::error::ChatError;
use crate::session::{AuthState, Session, SessionController};

/// Transient state a view renders. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    /// What the user has typed but not yet sent.
    pub input: String,
    /// A send is in flight.
    pub sending: bool,
    /// A login/register is in flight.
    pub authenticating: bool,
    /// The one error currently shown, if any.
    pub error_message: Option<String>,
}

/// Coordinates session and conversation on behalf of a UI.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct InteractionController {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    session: SessionController,
    conversation: ConversationStore,
    ui: Mutex<UiState>,
}

#[derive(Debug, Clone, Copy)]
enum Flight {
    Send,
    Auth,
}

impl Flight {
    fn flag(self, ui: &mut UiState) -> &mut bool {
        match self {
            Self::Send => &mut ui.sending,
            Self::Auth => &mut ui.authenticating,
        }
    }
}

/// Holds a single-flight slot. The flag is released on drop, whether the
/// operation succeeded, failed or was cancelled.
struct FlightGuard<'a> {
    ui: &'a Mutex<UiState>,
    flight: Flight,
}

impl<'a> FlightGuard<'a> {
    /// Claim the slot and clear the error banner, or return `None` if an
    /// operation of this kind is already running.
    fn acquire(ui: &'a Mutex<UiState>, flight: Flight) -> Option<Self> {
        let mut state = ui.lock().unwrap_or_else(PoisonError::into_inner);
        let flag = flight.flag(&mut state);
        if *flag {
            return None;
        }
        *flag = true;
        state.error_message = None;
        Some(Self { ui, flight })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.ui.lock().unwrap_or_else(PoisonError::into_inner);
        *self.flight.flag(&mut state) = false;
    }
}

impl InteractionController {
    /// Create a controller over the given service and credential store.
    /// Call [`start`](Self::start) to pick up a persisted session.
    pub fn new(api: Arc<dyn ChatApi>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: SessionController::new(Arc::clone(&api), credentials),
                conversation: ConversationStore::new(api),
                ui: Mutex::new(UiState::default()),
            }),
        }
    }

    fn ui(&self) -> MutexGuard<'_, UiState> {
        self.inner.ui.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn show_error(&self, err: &ChatError) {
        self.ui().error_message = Some(err.to_string());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Projections
    // ─────────────────────────────────────────────────────────────────────────

    /// Current session, if logged in.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.inner.session.session()
    }

    /// Current login lifecycle state.
    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        self.inner.session.state()
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.auth_state() == AuthState::LoggedIn
    }

    /// The conversation, in service order.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.inner.conversation.messages()
    }

    /// Snapshot of the transient UI state.
    #[must_use]
    pub fn ui_state(&self) -> UiState {
        self.ui().clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Restore a persisted session and, if there was one, load its history.
    pub async fn start(&self) {
        if self.inner.session.restore().is_some() {
            self.refresh_history().await;
        }
    }

    /// Reload the history for the current session.
    ///
    /// A failure leaves the history alone and does not log the user out.
    pub async fn refresh_history(&self) {
        self.ui().error_message = None;
        if let Err(e) = self
            .inner
            .conversation
            .fetch_history(&self.inner.session)
            .await
        {
            self.show_error(&e);
        }
    }

    /// Log in or register. Ignored while another attempt is running.
    ///
    /// On success the history is loaded for the new session.
    pub async fn submit_credentials(&self, mode: AuthMode, username: &str, password: &str) {
        let Some(guard) = FlightGuard::acquire(&self.inner.ui, Flight::Auth) else {
            debug!(name: "interaction.auth.ignored", "Authentication already in progress");
            return;
        };

        let result = self
            .inner
            .session
            .authenticate(mode, username, password)
            .await;
        drop(guard);

        match result {
            Ok(_) => {
                self.inner.conversation.clear();
                self.refresh_history().await;
            }
            Err(e) => self.show_error(&e),
        }
    }

    /// Replace the input buffer.
    pub fn set_input(&self, text: impl Into<String>) {
        self.ui().input = text.into();
    }

    /// Send whatever is in the input buffer.
    pub async fn submit_input(&self) {
        let text = self.ui().input.clone();
        self.send_message(&text).await;
    }

    /// Send `text`. Ignored while another send is in flight.
    ///
    /// On success the input buffer is cleared. On failure it is kept so the
    /// user can retry without retyping.
    pub async fn send_message(&self, text: &str) {
        let Some(_guard) = FlightGuard::acquire(&self.inner.ui, Flight::Send) else {
            debug!(name: "interaction.send.ignored", "Send already in progress");
            return;
        };

        match self.inner.conversation.send(&self.inner.session, text).await {
            Ok(SyncOutcome::Applied) => {
                self.ui().input.clear();
            }
            Ok(SyncOutcome::Discarded) => {}
            Err(e) => self.show_error(&e),
        }
    }

    /// Log out locally, drop the history and reset the form state.
    pub fn logout(&self) {
        self.inner.session.logout();
        self.inner.conversation.clear();
        let mut ui = self.ui();
        ui.input.clear();
        ui.error_message = None;
    }

    /// Hide the current error banner.
    pub fn dismiss_error(&self) {
        self.ui().error_message = None;
    }
}
