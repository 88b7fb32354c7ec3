use crate::application::ports::event_sink::{QueueEvent, QueueEventSink};
use tokio::sync::broadcast;

/// Writes every queue event to the `offline::queue` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl QueueEventSink for TracingEventSink {
    fn emit(&self, event: &QueueEvent) -> Result<(), String> {
        match event {
            QueueEvent::Enqueued {
                id,
                op_type,
                target,
                priority,
                parent_id,
                group_id,
            } => tracing::debug!(
                target: "offline::queue",
                operation_id = %id,
                op_type = %op_type,
                collection = %target,
                priority,
                parent_id = parent_id.as_ref().map(|p| p.as_str()),
                group_id = %group_id,
                "operation enqueued"
            ),
            QueueEvent::StatusChanged {
                id,
                status,
                error_detail,
            } => tracing::debug!(
                target: "offline::queue",
                operation_id = %id,
                status = %status,
                error = error_detail.as_deref(),
                "operation status changed"
            ),
            QueueEvent::Removed { id } => tracing::debug!(
                target: "offline::queue",
                operation_id = %id,
                "operation removed"
            ),
            QueueEvent::Recovered { count } => tracing::info!(
                target: "offline::queue",
                count,
                "interrupted operations returned to pending"
            ),
            QueueEvent::Cleared => tracing::info!(
                target: "offline::queue",
                "local data cleared"
            ),
        }
        Ok(())
    }
}

/// Fans queue events out to in-process subscribers.
pub struct BroadcastEventSink {
    sender: broadcast::Sender<QueueEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.sender.subscribe()
    }
}

impl QueueEventSink for BroadcastEventSink {
    fn emit(&self, event: &QueueEvent) -> Result<(), String> {
        self.sender
            .send(event.clone())
            .map(|_| ())
            .map_err(|_| "no active subscribers".to_string())
    }
}
