//! Message history for the current session.
//!
//! The service is the single source of truth. Every successful fetch or send
//! returns the complete history, which replaces the local copy wholesale.
//! Nothing is appended, merged or reordered on the client.

mod store;

pub use store::{ConversationStore, SyncOutcome};
