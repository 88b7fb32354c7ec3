use super::rows::{PendingOperationRow, SaleReminderRow};
use crate::domain::entities::offline::{PendingOperation, SaleReminder};
use crate::domain::value_objects::offline::{
    GroupId, OperationId, OperationPayload, OperationStatus, OperationType, ReminderId,
    ReminderStatus, TargetCollection,
};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use std::convert::TryInto;

pub fn domain_operation_from_row(row: PendingOperationRow) -> Result<PendingOperation, AppError> {
    let id = OperationId::new(row.id).map_err(AppError::DeserializationError)?;
    let op_type = OperationType::parse(&row.op_type).map_err(AppError::DeserializationError)?;
    let target = TargetCollection::new(row.target).map_err(AppError::DeserializationError)?;
    let payload =
        OperationPayload::from_json_str(&row.payload).map_err(AppError::DeserializationError)?;
    let status = OperationStatus::parse(&row.status).map_err(AppError::DeserializationError)?;
    let parent_id = row
        .parent_id
        .map(|value| OperationId::new(value).map_err(AppError::DeserializationError))
        .transpose()?;
    let group_id = GroupId::new(row.group_id).map_err(AppError::DeserializationError)?;

    Ok(PendingOperation {
        id,
        op_type,
        target,
        payload,
        created_at: timestamp_to_datetime(row.created_at, "created_at")?,
        status,
        error_detail: row.error_detail,
        retry_count: try_i64_to_u32(row.retry_count, "retry_count")?,
        priority: row
            .priority
            .try_into()
            .map_err(|_| AppError::DeserializationError("priority out of range".to_string()))?,
        parent_id,
        group_id,
        updated_at: timestamp_to_datetime(row.updated_at, "updated_at")?,
    })
}

pub fn domain_reminder_from_row(row: SaleReminderRow) -> Result<SaleReminder, AppError> {
    Ok(SaleReminder {
        id: ReminderId::new(row.id).map_err(AppError::DeserializationError)?,
        sale_id: row.sale_id,
        note: row.note,
        created_at: timestamp_to_datetime(row.created_at, "created_at")?,
        status: ReminderStatus::parse(&row.status).map_err(AppError::DeserializationError)?,
    })
}

pub fn payload_to_json(operation: &PendingOperation) -> Result<String, AppError> {
    serde_json::to_string(operation.payload.as_json())
        .map_err(|err| AppError::SerializationError(err.to_string()))
}

fn timestamp_to_datetime(value: i64, label: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(value)
        .ok_or_else(|| AppError::DeserializationError(format!("Invalid {label} timestamp")))
}

fn try_i64_to_u32(value: i64, label: &str) -> Result<u32, AppError> {
    value
        .try_into()
        .map_err(|_| AppError::DeserializationError(format!("{label} out of range")))
}
