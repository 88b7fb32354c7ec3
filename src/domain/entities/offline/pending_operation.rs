use crate::domain::value_objects::offline::{
    GroupId, OperationId, OperationPayload, OperationStatus, OperationType, TargetCollection,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable unit of pending work awaiting remote application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingOperation {
    pub id: OperationId,
    pub op_type: OperationType,
    pub target: TargetCollection,
    pub payload: OperationPayload,
    pub created_at: DateTime<Utc>,
    pub status: OperationStatus,
    pub error_detail: Option<String>,
    pub retry_count: u32,
    pub priority: i32,
    pub parent_id: Option<OperationId>,
    pub group_id: GroupId,
    pub updated_at: DateTime<Utc>,
}

impl PendingOperation {
    /// Builds a freshly enqueued record: `pending`, zero retries.
    pub fn from_draft(draft: OperationDraft, created_at: DateTime<Utc>) -> Self {
        let OperationDraft {
            op_type,
            target,
            payload,
            priority,
            parent_id,
            group_id,
        } = draft;

        Self {
            id: OperationId::generate(),
            op_type,
            target,
            payload,
            created_at,
            status: OperationStatus::Pending,
            error_detail: None,
            retry_count: 0,
            priority,
            parent_id,
            group_id: group_id.unwrap_or_else(GroupId::generate),
            updated_at: created_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == OperationStatus::Pending
    }
}

/// Caller input for `enqueue`. Everything here is fixed once the record exists.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDraft {
    pub op_type: OperationType,
    pub target: TargetCollection,
    pub payload: OperationPayload,
    pub priority: i32,
    pub parent_id: Option<OperationId>,
    pub group_id: Option<GroupId>,
}

impl OperationDraft {
    pub fn new(op_type: OperationType, target: TargetCollection, payload: OperationPayload) -> Self {
        Self {
            op_type,
            target,
            payload,
            priority: 0,
            parent_id: None,
            group_id: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_parent(mut self, parent_id: OperationId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }
}
