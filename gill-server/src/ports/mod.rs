//! External interface boundaries.
//!
//! The matching core coordinates exclusively through these ports: a
//! document store for requests, routes, and match records; a push
//! notification gateway; and a chat service. Each port ships with an
//! in-memory implementation used by the demo binary and tests.

mod chat;
mod memory;
mod notify;
mod store;

pub use chat::{ChatError, ChatService};
pub use memory::{InMemoryChat, InMemoryStore, RecordingNotifier};
pub use notify::{LoggingNotifier, Notification, Notifier, NotifyError};
pub use store::{MatchStore, StoreError};
