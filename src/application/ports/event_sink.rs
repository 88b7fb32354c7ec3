use crate::domain::value_objects::offline::{
    GroupId, OperationId, OperationStatus, OperationType, TargetCollection,
};
use serde::{Deserialize, Serialize};

/// Diagnostic notifications emitted by the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueueEvent {
    Enqueued {
        id: OperationId,
        op_type: OperationType,
        target: TargetCollection,
        priority: i32,
        parent_id: Option<OperationId>,
        group_id: GroupId,
    },
    StatusChanged {
        id: OperationId,
        status: OperationStatus,
        error_detail: Option<String>,
    },
    Removed {
        id: OperationId,
    },
    Recovered {
        count: u64,
    },
    Cleared,
}

/// Fire-and-forget channel. Errors are reported back only so the caller can log them;
/// they never affect queue state.
pub trait QueueEventSink: Send + Sync {
    fn emit(&self, event: &QueueEvent) -> Result<(), String>;
}
