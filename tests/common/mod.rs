//! Shared test doubles.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chat_sync::api::{AuthMode, AuthResponse, ChatApi, Credentials, Message, MessageId, Sender};
use chat_sync::credentials::{CredentialError, CredentialStore, MemoryCredentialStore};
use chat_sync::error::ApiError;
use chat_sync::interaction::InteractionController;
use chat_sync::session::Session;
use tokio::sync::Notify;

type ApiResult<T> = Result<T, ApiError>;

/// A recorded call against the fake service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Auth {
        mode: AuthMode,
        username: String,
        password: String,
    },
    Fetch {
        token: String,
    },
    Send {
        token: String,
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Auth,
    Fetch,
    Send,
}

/// Scripted stand-in for the chat service.
///
/// Replies are queued per operation and consumed in order when the call is
/// made. An unscripted fetch returns an empty history; an unscripted auth or
/// send fails with a 500. A gate makes the next call of that kind wait until
/// the returned `Notify` fires.
#[derive(Debug, Default)]
pub struct FakeApi {
    auth: Mutex<VecDeque<ApiResult<AuthResponse>>>,
    fetch: Mutex<VecDeque<ApiResult<Vec<Message>>>>,
    send: Mutex<VecDeque<ApiResult<Vec<Message>>>>,
    gates: Mutex<HashMap<Op, Arc<Notify>>>,
    calls: Mutex<Vec<Call>>,
}

pub fn rejected(status: u16, message: Option<&str>) -> ApiError {
    ApiError::Api {
        status,
        message: message.map(String::from),
    }
}

/// Stand-in for a dropped connection.
pub fn unreachable_service() -> ApiError {
    rejected(503, None)
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_auth_ok(&self, token: &str, username: &str) {
        self.auth.lock().unwrap().push_back(Ok(AuthResponse {
            token: token.into(),
            username: username.into(),
        }));
    }

    pub fn push_auth_err(&self, err: ApiError) {
        self.auth.lock().unwrap().push_back(Err(err));
    }

    pub fn push_fetch(&self, history: Vec<Message>) {
        self.fetch.lock().unwrap().push_back(Ok(history));
    }

    pub fn push_fetch_err(&self, err: ApiError) {
        self.fetch.lock().unwrap().push_back(Err(err));
    }

    pub fn push_send(&self, history: Vec<Message>) {
        self.send.lock().unwrap().push_back(Ok(history));
    }

    pub fn push_send_err(&self, err: ApiError) {
        self.send.lock().unwrap().push_back(Err(err));
    }

    /// Hold the next call of kind `op` until the returned handle is notified.
    pub fn gate(&self, op: Op) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(op, Arc::clone(&notify));
        notify
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                matches!(
                    (op, call),
                    (Op::Auth, Call::Auth { .. })
                        | (Op::Fetch, Call::Fetch { .. })
                        | (Op::Send, Call::Send { .. })
                )
            })
            .count()
    }

    async fn wait_at_gate(&self, op: Op) {
        let gate = self.gates.lock().unwrap().remove(&op);
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl ChatApi for FakeApi {
    async fn authenticate(
        &self,
        mode: AuthMode,
        credentials: &Credentials,
    ) -> ApiResult<AuthResponse> {
        self.calls.lock().unwrap().push(Call::Auth {
            mode,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        });
        let reply = self
            .auth
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(rejected(500, Some("unscripted auth"))));
        self.wait_at_gate(Op::Auth).await;
        reply
    }

    async fn fetch_messages(&self, token: &str) -> ApiResult<Vec<Message>> {
        self.calls.lock().unwrap().push(Call::Fetch {
            token: token.into(),
        });
        let reply = self
            .fetch
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        self.wait_at_gate(Op::Fetch).await;
        reply
    }

    async fn send_message(&self, token: &str, text: &str) -> ApiResult<Vec<Message>> {
        self.calls.lock().unwrap().push(Call::Send {
            token: token.into(),
            text: text.into(),
        });
        let reply = self
            .send
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(rejected(500, Some("unscripted send"))));
        self.wait_at_gate(Op::Send).await;
        reply
    }
}

/// Credential store whose backing storage is always unavailable.
#[derive(Debug, Default)]
pub struct BrokenCredentialStore;

fn unavailable() -> CredentialError {
    CredentialError::Io(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "storage unavailable",
    ))
}

impl CredentialStore for BrokenCredentialStore {
    fn load(&self) -> Result<Option<Session>, CredentialError> {
        Err(unavailable())
    }

    fn save(&self, _session: &Session) -> Result<(), CredentialError> {
        Err(unavailable())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        Err(unavailable())
    }
}

pub fn message(id: i64, sender: Sender, text: &str, created_at: &str) -> Message {
    Message {
        id: MessageId::Number(id),
        sender,
        text: text.into(),
        created_at: created_at.into(),
    }
}

/// The two-message exchange from a successful "hello".
pub fn hello_exchange() -> Vec<Message> {
    vec![
        message(1, Sender::User, "hello", "2024-05-01T10:00:00Z"),
        message(2, Sender::Ai, "hi!", "2024-05-01T10:00:01Z"),
    ]
}

pub fn session(token: &str, name: &str) -> Session {
    Session::new(token, name).expect("non-empty session parts")
}

/// A controller that starts logged out with an empty credential store.
pub fn logged_out() -> (InteractionController, Arc<FakeApi>, Arc<MemoryCredentialStore>) {
    let api = FakeApi::new();
    let store = Arc::new(MemoryCredentialStore::new());
    let chat = InteractionController::new(
        Arc::clone(&api) as Arc<dyn ChatApi>,
        Arc::clone(&store) as Arc<dyn CredentialStore>,
    );
    (chat, api, store)
}

/// A controller with `tok-1`/alice already persisted, not yet started.
pub fn persisted() -> (InteractionController, Arc<FakeApi>, Arc<MemoryCredentialStore>) {
    let api = FakeApi::new();
    let store = Arc::new(MemoryCredentialStore::with_session(session("tok-1", "alice")));
    let chat = InteractionController::new(
        Arc::clone(&api) as Arc<dyn ChatApi>,
        Arc::clone(&store) as Arc<dyn CredentialStore>,
    );
    (chat, api, store)
}
