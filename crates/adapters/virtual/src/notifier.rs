//! Logging notifier.

use std::future::Future;
use std::sync::Mutex;

use courier_app::ports::Notifier;
use courier_domain::error::DispatchError;

/// Notifier that logs messages through `tracing` and retains them for
/// inspection. Stands in for a real notification channel in demos and
/// tests.
#[derive(Default)]
pub struct TracingNotifier {
    sent: Mutex<Vec<String>>,
}

impl TracingNotifier {
    /// Messages delivered so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) -> impl Future<Output = Result<(), DispatchError>> + Send {
        tracing::info!(message, "notification sent");
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.to_string());
        }
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_retain_sent_messages_in_order() {
        let notifier = TracingNotifier::default();
        notifier.notify("first").await.unwrap();
        notifier.notify("second").await.unwrap();
        assert_eq!(notifier.sent(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn should_start_with_no_messages() {
        let notifier = TracingNotifier::default();
        assert!(notifier.sent().is_empty());
    }
}
