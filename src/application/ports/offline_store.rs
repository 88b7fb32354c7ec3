use crate::domain::entities::offline::{PendingOperation, QueueStats, SaleReminder};
use crate::domain::replay::ReplaySnapshot;
use crate::domain::value_objects::offline::{
    EntityCollection, GroupId, OperationId, OperationStatus, ReminderId, ReminderStatus,
};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Filtered scan over the operation queue. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationFilter {
    pub status: Option<OperationStatus>,
    pub group_id: Option<GroupId>,
    /// Only records whose last transition happened strictly before this instant.
    pub updated_before: Option<DateTime<Utc>>,
}

impl OperationFilter {
    pub fn with_status(status: OperationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait OperationStore: Send + Sync {
    async fn insert(&self, operation: &PendingOperation) -> Result<(), AppError>;
    /// Inserts every record or none of them.
    async fn insert_group(&self, operations: &[PendingOperation]) -> Result<(), AppError>;
    async fn get(&self, id: &OperationId) -> Result<Option<PendingOperation>, AppError>;
    /// Returns whether a record was actually deleted.
    async fn delete(&self, id: &OperationId) -> Result<bool, AppError>;
    /// Applies a status transition in a single statement. Entering `error` increments
    /// `retry_count`; any other status resets it and clears the error detail.
    /// Returns `None` when the id is unknown.
    async fn update_status(
        &self,
        id: &OperationId,
        status: OperationStatus,
        error_detail: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<PendingOperation>, AppError>;
    /// Moves a record from `pending` to `processing`. False when it was not pending.
    async fn claim(&self, id: &OperationId, updated_at: DateTime<Utc>) -> Result<bool, AppError>;
    async fn scan(&self, filter: &OperationFilter) -> Result<Vec<PendingOperation>, AppError>;
    async fn replay_snapshot(&self) -> Result<ReplaySnapshot, AppError>;
    /// Resets every `processing` record to `pending`.
    async fn recover_processing(&self, updated_at: DateTime<Utc>) -> Result<u64, AppError>;
    async fn stats(&self) -> Result<QueueStats, AppError>;
    /// Newest `created_at` still stored, if any.
    async fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>, AppError>;
    /// Empties the queue and every entity collection in one transaction.
    async fn clear_all_data(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait LocalRecordStore: Send + Sync {
    async fn upsert_record(
        &self,
        collection: EntityCollection,
        id: &str,
        data: &Value,
    ) -> Result<(), AppError>;
    async fn get_record(
        &self,
        collection: EntityCollection,
        id: &str,
    ) -> Result<Option<Value>, AppError>;
    async fn delete_record(&self, collection: EntityCollection, id: &str)
    -> Result<bool, AppError>;
    async fn count_records(&self, collection: EntityCollection) -> Result<u64, AppError>;
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn insert_reminder(&self, reminder: &SaleReminder) -> Result<(), AppError>;
    async fn get_reminder(&self, id: &ReminderId) -> Result<Option<SaleReminder>, AppError>;
    async fn list_reminders_by_status(
        &self,
        status: ReminderStatus,
    ) -> Result<Vec<SaleReminder>, AppError>;
    /// Returns false when the id is unknown.
    async fn set_reminder_status(
        &self,
        id: &ReminderId,
        status: ReminderStatus,
    ) -> Result<bool, AppError>;
}
