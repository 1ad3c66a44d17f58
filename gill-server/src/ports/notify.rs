//! Push notification port.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::domain::UserId;

/// A push notification payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Free-form payload forwarded to the client app.
    pub data: Value,
}

/// Error from the notification gateway.
#[derive(Debug, Clone, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Push notification gateway.
///
/// Fire-and-forget from the core's perspective: delivery failures are
/// logged by the caller and never fault the matching pipeline.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user: &UserId, notification: Notification) -> Result<(), NotifyError>;
}

/// Notifier that writes to the log instead of a push gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(&self, user: &UserId, notification: Notification) -> Result<(), NotifyError> {
        info!(
            user = %user,
            title = %notification.title,
            body = %notification.body,
            "notification dispatched"
        );
        Ok(())
    }
}
