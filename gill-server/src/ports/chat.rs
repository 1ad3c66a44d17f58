//! Chat service port.

use async_trait::async_trait;

use crate::domain::{ChannelId, UserId};

/// Error from the chat service.
#[derive(Debug, Clone, thiserror::Error)]
#[error("chat operation failed: {0}")]
pub struct ChatError(pub String);

/// Chat channel management, invoked once on a successful accept.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Create the channel if it does not already exist.
    ///
    /// Implementations must be idempotent on `channel`: the core derives
    /// channel ids deterministically from the request id, so concurrent
    /// accepts converge on one channel instead of creating duplicates.
    async fn ensure_channel(
        &self,
        channel: &ChannelId,
        requester: &UserId,
        giller: &UserId,
    ) -> Result<(), ChatError>;

    async fn post_system_message(&self, channel: &ChannelId, text: &str) -> Result<(), ChatError>;
}
