use async_trait::async_trait;

/// Error from the downstream notification channel.
#[derive(Debug, thiserror::Error)]
#[error("notification dispatch failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound notification port. Implementations deliver in-app messages and
/// email; the engine treats every call as fire-and-forget and never fails a
/// settlement or contest operation on a dispatch error.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(
        &self,
        user_id: i32,
        kind: &str,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError>;

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Default dispatcher: logs the payload and reports success. Deployments
/// wire a real channel behind the same trait.
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn notify(
        &self,
        user_id: i32,
        kind: &str,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        tracing::info!(user_id, kind, title, body, "notification");
        Ok(())
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(to, subject, body_len = body.len(), "email");
        Ok(())
    }
}
