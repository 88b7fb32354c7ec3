use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingOperationRow {
    pub id: String,
    pub op_type: String,
    pub target: String,
    pub payload: String,
    pub created_at: i64,
    pub status: String,
    pub error_detail: Option<String>,
    pub retry_count: i64,
    pub priority: i64,
    pub parent_id: Option<String>,
    pub group_id: String,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SaleReminderRow {
    pub id: String,
    pub sale_id: String,
    pub note: Option<String>,
    pub created_at: i64,
    pub status: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct StatusCountRow {
    pub status: String,
    pub count: i64,
}
