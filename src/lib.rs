//! Chat session and conversation sync client.
//!
//! Lets an authenticated user exchange messages with an AI responder through
//! a remote chat service, keeping the login across restarts and the message
//! history in step with the server.
//!
//! # Architecture
//!
//! - **API**: typed JSON-over-HTTP client behind the [`api::ChatApi`] port
//! - **Credentials**: durable mirror of the login ([`credentials::CredentialStore`])
//! - **Session**: login state machine and bearer token ownership
//! - **Conversation**: server-authoritative message history with stale-response discard
//! - **Interaction**: the command façade a UI binds to, with single-flight sends
//!
//! # Modules
//!
//! - [`api`]: remote service client and wire types
//! - [`config`]: layered client configuration
//! - [`conversation`]: message history store
//! - [`credentials`]: credential persistence
//! - [`error`]: error taxonomy and user-facing messages
//! - [`interaction`]: UI-facing controller
//! - [`repl`]: terminal front end
//! - [`session`]: session controller

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod config;
pub mod conversation;
pub mod credentials;
pub mod error;
pub mod interaction;
pub mod repl;
pub mod session;

pub use error::{ApiError, ChatError};
pub use interaction::{InteractionController, UiState};
pub use session::{AuthState, Session};
