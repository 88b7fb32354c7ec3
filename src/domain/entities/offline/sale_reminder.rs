use crate::domain::value_objects::offline::{ReminderId, ReminderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Follow-up note attached to a sale. Not part of the replay ordering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleReminder {
    pub id: ReminderId,
    pub sale_id: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: ReminderStatus,
}

impl SaleReminder {
    pub fn new(sale_id: String, note: Option<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ReminderId::generate(),
            sale_id,
            note,
            created_at,
            status: ReminderStatus::Pending,
        }
    }
}
