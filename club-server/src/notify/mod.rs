//! Notification Dispatch
//!
//! Fire-and-forget reminders at the external-provider boundary. The ledger
//! enqueues and moves on: a full queue or a failing sink never rolls back
//! the mutation that triggered the alert.

use std::sync::Arc;

use async_trait::async_trait;
use shared::models::AlertCode;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Delivery boundary. Production wires a real provider (email/push);
/// the default sink just logs.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, player_id: i64, alert_code: AlertCode) -> anyhow::Result<()>;
}

/// Default sink: structured log line per alert
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, player_id: i64, alert_code: AlertCode) -> anyhow::Result<()> {
        tracing::info!(player_id, alert = alert_code.as_str(), "notification sent");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Reminder {
    pub player_id: i64,
    pub alert_code: AlertCode,
}

/// Channel-backed dispatcher handle (廉价 clone)
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<Reminder>,
}

impl NotificationDispatcher {
    pub fn new(buffer_size: usize) -> (Self, mpsc::Receiver<Reminder>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        (Self { tx }, rx)
    }

    /// Best-effort enqueue; returns whether the reminder was accepted
    pub fn enqueue(&self, player_id: i64, alert_code: AlertCode) -> bool {
        let accepted = self
            .tx
            .try_send(Reminder {
                player_id,
                alert_code,
            })
            .is_ok();
        if !accepted {
            tracing::warn!(player_id, alert = alert_code.as_str(), "reminder dropped");
        }
        accepted
    }

    /// 测试用：没有 worker 的黑洞句柄
    #[cfg(test)]
    pub fn disabled() -> Self {
        let (tx, mut rx) = mpsc::channel(64);
        // Keep the receiver alive so enqueue still succeeds
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        Self { tx }
    }

    /// Worker loop: drains the queue into the sink. Sink failures are
    /// logged, never propagated.
    pub async fn run_worker(
        sink: Arc<dyn NotificationSink>,
        mut rx: mpsc::Receiver<Reminder>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                maybe = rx.recv() => match maybe {
                    Some(reminder) => {
                        if let Err(e) = sink.send(reminder.player_id, reminder.alert_code).await {
                            tracing::warn!(
                                player_id = reminder.player_id,
                                alert = reminder.alert_code.as_str(),
                                error = %e,
                                "notification sink failed"
                            );
                        }
                    }
                    None => break,
                },
                _ = cancel.cancelled() => break,
            }
        }
        tracing::debug!("notification worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSink {
        sent: Mutex<Vec<(i64, AlertCode)>>,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn send(&self, player_id: i64, alert_code: AlertCode) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push((player_id, alert_code));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_enqueue_reaches_sink() {
        let sink = Arc::new(RecordingSink {
            sent: Mutex::new(Vec::new()),
        });
        let (dispatcher, rx) = NotificationDispatcher::new(8);
        let cancel = CancellationToken::new();
        let worker = tokio::spawn(NotificationDispatcher::run_worker(
            sink.clone(),
            rx,
            cancel.clone(),
        ));

        assert!(dispatcher.enqueue(1, AlertCode::ClassesExhausted));
        assert!(dispatcher.enqueue(2, AlertCode::RenewalReminder));
        drop(dispatcher);
        worker.await.unwrap();

        let sent = sink.sent.lock().unwrap();
        assert_eq!(*sent, vec![
            (1, AlertCode::ClassesExhausted),
            (2, AlertCode::RenewalReminder)
        ]);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_error() {
        // No worker draining: capacity 1, second enqueue is rejected quietly
        let (dispatcher, _rx) = NotificationDispatcher::new(1);
        assert!(dispatcher.enqueue(1, AlertCode::NegativeBalance));
        assert!(!dispatcher.enqueue(2, AlertCode::NegativeBalance));
    }
}
