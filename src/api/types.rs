//! Wire types for the chat service.
//!
//! These mirror the JSON bodies exchanged with the backend and double as the
//! client-side domain types for messages.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Auth API Types
// =============================================================================

/// Which auth endpoint a credential submission targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// `POST /api/login`
    #[default]
    Login,
    /// `POST /api/register`
    Register,
}

impl AuthMode {
    /// Endpoint path for this mode.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/api/login",
            Self::Register => "/api/register",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(f, "login"),
            Self::Register => write!(f, "register"),
        }
    }
}

/// Request body for login and register.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Account name, already trimmed.
    pub username: String,
    /// Account password, already trimmed.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login/register response.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    /// Opaque bearer token.
    pub token: String,
    /// Display name as the server knows it.
    pub username: String,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

/// Failure body. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

// =============================================================================
// Messages API Types
// =============================================================================

/// Request body for `POST /api/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    /// The trimmed message text.
    pub text: String,
}

/// Server-assigned message identifier (numeric row id or string key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Number(i64),
    Text(String),
}

/// Author of a message. Anything that is not `"user"` is an AI reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sender {
    User,
    Ai,
}

impl From<String> for Sender {
    fn from(value: String) -> Self {
        if value == "user" { Self::User } else { Self::Ai }
    }
}

impl From<Sender> for String {
    fn from(value: Sender) -> Self {
        match value {
            Sender::User => "user".to_string(),
            Sender::Ai => "ai".to_string(),
        }
    }
}

/// A single message as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned identifier.
    pub id: MessageId,
    /// Who wrote it.
    pub sender: Sender,
    /// Message body.
    pub text: String,
    /// Creation time exactly as the server sent it.
    pub created_at: String,
}

impl Message {
    /// Whether the user wrote this message.
    #[must_use]
    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Parse `created_at` as RFC 3339, falling back to a naive
    /// `YYYY-MM-DD HH:MM:SS` timestamp interpreted as UTC.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.created_at) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_deserializes_in_order() {
        let json = r#"[
            {"id": 1, "sender": "user", "text": "hello", "created_at": "2024-05-01T10:00:00Z"},
            {"id": 2, "sender": "ai", "text": "hi!", "created_at": "2024-05-01T10:00:01Z"}
        ]"#;
        let messages: Vec<Message> = serde_json::from_str(json).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, MessageId::Number(1));
        assert!(messages[0].is_from_user());
        assert_eq!(messages[1].sender, Sender::Ai);
        assert_eq!(messages[1].text, "hi!");
    }

    #[test]
    fn test_unknown_sender_is_ai() {
        let json = r#"{"id": "abc", "sender": "assistant", "text": "x", "created_at": ""}"#;
        let message: Message = serde_json::from_str(json).unwrap();

        assert_eq!(message.id, MessageId::Text("abc".into()));
        assert_eq!(message.sender, Sender::Ai);
        assert!(message.timestamp().is_none());
    }

    #[test]
    fn test_timestamp_formats() {
        let mut message = Message {
            id: MessageId::Number(1),
            sender: Sender::User,
            text: String::new(),
            created_at: "2024-05-01T10:00:00+02:00".into(),
        };
        let ts = message.timestamp().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T08:00:00+00:00");

        message.created_at = "2024-05-01 10:00:00".into();
        let ts = message.timestamp().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let creds = Credentials {
            username: "alice".into(),
            password: "pw123".into(),
        };
        assert!(!format!("{creds:?}").contains("pw123"));

        let auth: AuthResponse =
            serde_json::from_str(r#"{"token": "tok-1", "username": "alice"}"#).unwrap();
        assert!(!format!("{auth:?}").contains("tok-1"));
    }

    #[test]
    fn test_auth_mode_paths() {
        assert_eq!(AuthMode::Login.path(), "/api/login");
        assert_eq!(AuthMode::Register.path(), "/api/register");
        assert_eq!(AuthMode::default(), AuthMode::Login);
    }
}
