use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::api::{ChatApi, Message};
use crate::error::{ChatError, EMPTY_MESSAGE, Result};
use crate::session::SessionController;

/// What happened to a response once it came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The history was replaced with the response.
    Applied,
    /// The session changed while the request was in flight; the response was
    /// dropped.
    Discarded,
}

/// Ordered message history, scoped to one session.
#[derive(Debug)]
pub struct ConversationStore {
    api: Arc<dyn ChatApi>,
    messages: RwLock<Vec<Message>>,
}

impl ConversationStore {
    /// Create an empty store.
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            messages: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of the history, in service order.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of messages held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget all messages.
    pub fn clear(&self) {
        self.messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Replace the history, but only if `token` is still the active one.
    fn apply(
        &self,
        session: &SessionController,
        token: &str,
        history: Vec<Message>,
    ) -> SyncOutcome {
        // Hold the write lock across the check so a concurrent logout's
        // `clear` cannot slip in between them.
        let mut messages = self.messages.write().unwrap_or_else(PoisonError::into_inner);
        if !session.is_current(token) {
            debug!(
                name: "conversation.response.discarded",
                count = history.len(),
                "Session changed while request was in flight"
            );
            return SyncOutcome::Discarded;
        }
        let count = history.len();
        *messages = history;
        drop(messages);
        debug!(name: "conversation.history.replaced", count, "History replaced");
        SyncOutcome::Applied
    }

    /// Reload the whole history from the service.
    ///
    /// On failure the current history is kept as-is, so a flaky connection
    /// never blanks out what is already on screen.
    pub async fn fetch_history(&self, session: &SessionController) -> Result<SyncOutcome> {
        let token = session.token().ok_or(ChatError::Precondition)?;

        match self.api.fetch_messages(&token).await {
            Ok(history) => Ok(self.apply(session, &token, history)),
            Err(e) => {
                warn!(
                    name: "conversation.fetch.failed",
                    error = %e,
                    "Failed to load chat history"
                );
                Err(ChatError::Fetch(e))
            }
        }
    }

    /// Send `text` (trimmed) and adopt the history the service returns.
    ///
    /// On failure the history is untouched.
    pub async fn send(&self, session: &SessionController, text: &str) -> Result<SyncOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::Validation(EMPTY_MESSAGE));
        }
        let token = session.token().ok_or(ChatError::Precondition)?;

        match self.api.send_message(&token, text).await {
            Ok(history) => Ok(self.apply(session, &token, history)),
            Err(e) => {
                warn!(
                    name: "conversation.send.failed",
                    error = %e,
                    "Failed to send message"
                );
                Err(ChatError::Send(e))
            }
        }
    }
}
