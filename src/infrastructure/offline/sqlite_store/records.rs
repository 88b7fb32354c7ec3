use super::SqliteOfflineStore;
use crate::application::ports::offline_store::LocalRecordStore;
use crate::domain::value_objects::offline::EntityCollection;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

// テーブル名は EntityCollection の固定値のみなので format! で埋め込んでよい
#[async_trait]
impl LocalRecordStore for SqliteOfflineStore {
    async fn upsert_record(
        &self,
        collection: EntityCollection,
        id: &str,
        data: &Value,
    ) -> Result<(), AppError> {
        if id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Record id cannot be empty".to_string(),
            ));
        }
        let sql = format!(
            "INSERT INTO {table} (id, data, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            table = collection.table_name()
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(serde_json::to_string(data)?)
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_record(
        &self,
        collection: EntityCollection,
        id: &str,
    ) -> Result<Option<Value>, AppError> {
        let sql = format!(
            "SELECT data FROM {table} WHERE id = ?1",
            table = collection.table_name()
        );
        let row: Option<(String,)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(data,)| {
            serde_json::from_str(&data)
                .map_err(|err| AppError::DeserializationError(err.to_string()))
        })
        .transpose()
    }

    async fn delete_record(
        &self,
        collection: EntityCollection,
        id: &str,
    ) -> Result<bool, AppError> {
        let sql = format!(
            "DELETE FROM {table} WHERE id = ?1",
            table = collection.table_name()
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_records(&self, collection: EntityCollection) -> Result<u64, AppError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {table}",
            table = collection.table_name()
        );
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
