use crate::domain::account::NotificationPreference;
use crate::domain::ports::Notifier;
use async_trait::async_trait;
use tracing::info;

/// Notifier that logs the delivery and always reports success.
///
/// Stands in for a real email/SMS gateway; the workflow only consumes the
/// boolean outcome, so swapping in a real transport is a drop-in change.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        preference: NotificationPreference,
        recipient: &str,
        message: &str,
    ) -> bool {
        info!(%preference, recipient, message, "notification dispatched");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_reports_success() {
        let notifier = LogNotifier;
        assert!(
            notifier
                .send(NotificationPreference::Email, "user123", "hello")
                .await
        );
    }
}
