//! Cancellation of an in-flight turn.
//!
//! The Ctrl+C handler runs on its own thread and calls [`Interrupt::trigger`].
//! The chat loop races [`Interrupt::triggered`] against the pending turn.

use tokio::sync::Notify;

/// Wakes whoever is currently waiting for an interrupt.
///
/// A trigger with nobody waiting is dropped, so a Ctrl+C pressed between
/// turns never cancels the next one.
#[derive(Debug, Default)]
pub struct Interrupt {
    notify: Notify,
}

impl Interrupt {
    /// Creates an interrupt with no waiters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wakes every pending [`Interrupt::triggered`] future.
    pub fn trigger(&self) {
        self.notify.notify_waiters();
    }

    /// Resolves on the next trigger after this future is created.
    pub async fn triggered(&self) {
        self.notify.notified().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_wakes_waiter() {
        let interrupt = Arc::new(Interrupt::new());
        let waiting = interrupt.triggered();

        let trigger = interrupt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.trigger();
        });

        tokio::time::timeout(Duration::from_secs(5), waiting)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn trigger_without_waiter_is_dropped() {
        let interrupt = Interrupt::new();
        interrupt.trigger();

        let result = tokio::time::timeout(Duration::from_millis(20), interrupt.triggered()).await;
        assert!(result.is_err());
    }
}
