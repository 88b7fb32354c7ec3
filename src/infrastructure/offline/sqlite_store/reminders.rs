use super::SqliteOfflineStore;
use crate::application::ports::offline_store::ReminderStore;
use crate::domain::entities::offline::SaleReminder;
use crate::domain::value_objects::offline::{ReminderId, ReminderStatus};
use crate::infrastructure::offline::mappers::domain_reminder_from_row;
use crate::infrastructure::offline::queries::{
    INSERT_REMINDER, SELECT_REMINDER_BY_ID, SELECT_REMINDERS_BY_STATUS, UPDATE_REMINDER_STATUS,
};
use crate::infrastructure::offline::rows::SaleReminderRow;
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
impl ReminderStore for SqliteOfflineStore {
    async fn insert_reminder(&self, reminder: &SaleReminder) -> Result<(), AppError> {
        sqlx::query(INSERT_REMINDER)
            .bind(reminder.id.as_str())
            .bind(&reminder.sale_id)
            .bind(reminder.note.as_deref())
            .bind(reminder.created_at.timestamp_millis())
            .bind(reminder.status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_reminder(&self, id: &ReminderId) -> Result<Option<SaleReminder>, AppError> {
        let row = sqlx::query_as::<_, SaleReminderRow>(SELECT_REMINDER_BY_ID)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(domain_reminder_from_row).transpose()
    }

    async fn list_reminders_by_status(
        &self,
        status: ReminderStatus,
    ) -> Result<Vec<SaleReminder>, AppError> {
        let rows = sqlx::query_as::<_, SaleReminderRow>(SELECT_REMINDERS_BY_STATUS)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(domain_reminder_from_row).collect()
    }

    async fn set_reminder_status(
        &self,
        id: &ReminderId,
        status: ReminderStatus,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(UPDATE_REMINDER_STATUS)
            .bind(id.as_str())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
