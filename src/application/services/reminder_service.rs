use crate::application::ports::offline_store::ReminderStore;
use crate::domain::entities::offline::SaleReminder;
use crate::domain::value_objects::offline::{ReminderId, ReminderStatus};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct ReminderService {
    store: Arc<dyn ReminderStore>,
}

impl ReminderService {
    pub fn new(store: Arc<dyn ReminderStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        sale_id: String,
        note: Option<String>,
    ) -> Result<SaleReminder, AppError> {
        if sale_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Reminder sale id cannot be empty".to_string(),
            ));
        }

        // 保存はミリ秒精度なので、返す値も揃えておく
        let now_ms = Utc::now().timestamp_millis();
        let created_at = DateTime::<Utc>::from_timestamp_millis(now_ms).unwrap_or_else(Utc::now);
        let reminder = SaleReminder::new(sale_id, note, created_at);
        self.store.insert_reminder(&reminder).await?;
        Ok(reminder)
    }

    pub async fn get(&self, id: &ReminderId) -> Result<Option<SaleReminder>, AppError> {
        self.store.get_reminder(id).await
    }

    /// Newest first.
    pub async fn list_by_status(
        &self,
        status: ReminderStatus,
    ) -> Result<Vec<SaleReminder>, AppError> {
        self.store.list_reminders_by_status(status).await
    }

    pub async fn set_status(&self, id: &ReminderId, status: ReminderStatus) -> Result<(), AppError> {
        if !self.store.set_reminder_status(id, status).await? {
            return Err(AppError::NotFound(format!("Reminder {id}")));
        }
        Ok(())
    }
}
