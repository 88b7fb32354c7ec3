use super::SqliteOfflineStore;
use crate::application::ports::offline_store::{OperationFilter, OperationStore};
use crate::domain::entities::offline::{PendingOperation, QueueStats};
use crate::domain::replay::ReplaySnapshot;
use crate::domain::value_objects::offline::{OperationId, OperationStatus};
use crate::infrastructure::offline::mappers::{domain_operation_from_row, payload_to_json};
use crate::infrastructure::offline::queries::{
    CLAIM_OPERATION, CLEAR_ALL_DATA, COUNT_OPERATIONS_BY_STATUS, DELETE_OPERATION,
    INSERT_OPERATION, RECOVER_PROCESSING_OPERATIONS, SELECT_OPERATION_BY_ID,
    SELECT_LATEST_CREATED_AT, SELECT_OPERATION_IDS, SELECT_OPERATIONS_FILTERED, SELECT_PENDING_OPERATIONS,
    UPDATE_OPERATION_STATUS,
};
use crate::infrastructure::offline::rows::{PendingOperationRow, StatusCountRow};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use std::collections::HashSet;

async fn insert_with<'e, E>(executor: E, operation: &PendingOperation) -> Result<(), AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let payload = payload_to_json(operation)?;
    sqlx::query(INSERT_OPERATION)
        .bind(operation.id.as_str())
        .bind(operation.op_type.as_str())
        .bind(operation.target.as_str())
        .bind(payload)
        .bind(operation.created_at.timestamp_millis())
        .bind(operation.status.as_str())
        .bind(operation.error_detail.as_deref())
        .bind(i64::from(operation.retry_count))
        .bind(i64::from(operation.priority))
        .bind(operation.parent_id.as_ref().map(OperationId::as_str))
        .bind(operation.group_id.as_str())
        .bind(operation.updated_at.timestamp_millis())
        .execute(executor)
        .await?;
    Ok(())
}

async fn abort(tx: Transaction<'_, Sqlite>, context: &str, err: AppError) -> AppError {
    if let Err(rollback_err) = tx.rollback().await {
        tracing::error!(
            target: "offline::store",
            error = %rollback_err,
            "rollback failed after {context}"
        );
    }
    AppError::Transaction(format!("{context}: {err}"))
}

#[async_trait]
impl OperationStore for SqliteOfflineStore {
    async fn insert(&self, operation: &PendingOperation) -> Result<(), AppError> {
        insert_with(&self.pool, operation).await
    }

    async fn insert_group(&self, operations: &[PendingOperation]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for operation in operations {
            let inserted = insert_with(&mut *tx, operation).await;
            if let Err(err) = inserted {
                return Err(abort(tx, "group insert", err).await);
            }
        }
        tx.commit()
            .await
            .map_err(|err| AppError::Transaction(format!("group insert commit: {err}")))
    }

    async fn get(&self, id: &OperationId) -> Result<Option<PendingOperation>, AppError> {
        let row = sqlx::query_as::<_, PendingOperationRow>(SELECT_OPERATION_BY_ID)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(domain_operation_from_row).transpose()
    }

    async fn delete(&self, id: &OperationId) -> Result<bool, AppError> {
        let result = sqlx::query(DELETE_OPERATION)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_status(
        &self,
        id: &OperationId,
        status: OperationStatus,
        error_detail: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<PendingOperation>, AppError> {
        let row = sqlx::query_as::<_, PendingOperationRow>(UPDATE_OPERATION_STATUS)
            .bind(id.as_str())
            .bind(status.as_str())
            .bind(error_detail)
            .bind(updated_at.timestamp_millis())
            .fetch_optional(&self.pool)
            .await?;

        row.map(domain_operation_from_row).transpose()
    }

    async fn claim(&self, id: &OperationId, updated_at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(CLAIM_OPERATION)
            .bind(id.as_str())
            .bind(updated_at.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn scan(&self, filter: &OperationFilter) -> Result<Vec<PendingOperation>, AppError> {
        let rows = sqlx::query_as::<_, PendingOperationRow>(SELECT_OPERATIONS_FILTERED)
            .bind(filter.status.map(|status| status.as_str()))
            .bind(filter.group_id.as_ref().map(|group| group.as_str().to_string()))
            .bind(filter.updated_before.map(|at| at.timestamp_millis()))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(domain_operation_from_row).collect()
    }

    async fn replay_snapshot(&self) -> Result<ReplaySnapshot, AppError> {
        // 同一トランザクション内で読み取り、pending と ID 集合の整合を保つ
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query_as::<_, PendingOperationRow>(SELECT_PENDING_OPERATIONS)
            .fetch_all(&mut *tx)
            .await?;
        let ids: Vec<(String,)> = sqlx::query_as(SELECT_OPERATION_IDS)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let pending = rows
            .into_iter()
            .map(domain_operation_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let present_ids = ids
            .into_iter()
            .map(|(id,)| OperationId::new(id).map_err(AppError::DeserializationError))
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(ReplaySnapshot::new(pending, present_ids))
    }

    async fn recover_processing(&self, updated_at: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(RECOVER_PROCESSING_OPERATIONS)
            .bind(updated_at.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn stats(&self) -> Result<QueueStats, AppError> {
        let rows = sqlx::query_as::<_, StatusCountRow>(COUNT_OPERATIONS_BY_STATUS)
            .fetch_all(&self.pool)
            .await?;

        let mut stats = QueueStats::default();
        for row in rows {
            let count = u64::try_from(row.count).unwrap_or(0);
            match OperationStatus::parse(&row.status) {
                Ok(OperationStatus::Pending) => stats.pending = count,
                Ok(OperationStatus::Processing) => stats.processing = count,
                Ok(OperationStatus::Error) => stats.error = count,
                Err(err) => {
                    tracing::warn!(target: "offline::store", error = %err, "ignoring unknown status");
                }
            }
        }
        Ok(stats)
    }

    async fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        let (latest,): (Option<i64>,) = sqlx::query_as(SELECT_LATEST_CREATED_AT)
            .fetch_one(&self.pool)
            .await?;

        latest
            .map(|ms| {
                DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| {
                    AppError::DeserializationError("Invalid created_at timestamp".to_string())
                })
            })
            .transpose()
    }

    async fn clear_all_data(&self) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for statement in CLEAR_ALL_DATA {
            let deleted = sqlx::query(statement).execute(&mut *tx).await;
            if let Err(err) = deleted {
                return Err(abort(tx, "clear all data", err.into()).await);
            }
        }
        tx.commit()
            .await
            .map_err(|err| AppError::Transaction(format!("clear all data commit: {err}")))
    }
}
