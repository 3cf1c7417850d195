//! Remote chat service client.
//!
//! - [`ChatApi`]: the port the controllers call through
//! - [`HttpClient`]: `reqwest` implementation speaking JSON over HTTP

mod client;
mod types;

pub use client::{ChatApi, HttpClient};
pub use types::{AuthMode, AuthResponse, Credentials, Message, MessageId, SendMessageRequest, Sender};
