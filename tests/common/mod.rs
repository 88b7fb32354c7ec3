#![allow(dead_code)]

use chrono::{DateTime, Utc};
use offline_sync::infrastructure::database::ConnectionPool;
use offline_sync::infrastructure::offline::{SqliteOfflineStore, TracingEventSink};
use offline_sync::{
    OperationDraft, OperationPayload, OperationStore, OperationType, PendingOperation,
    QueueService, TargetCollection,
};
use serde_json::json;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;

pub struct QueueTestContext {
    pub queue: Arc<QueueService>,
    pub store: Arc<SqliteOfflineStore>,
    pub pool: Pool<Sqlite>,
}

pub async fn setup_queue() -> QueueTestContext {
    let pool = ConnectionPool::from_memory().await.expect("in-memory sqlite");
    pool.migrate().await.expect("migrations");

    let store = Arc::new(SqliteOfflineStore::new(pool.get_pool().clone()));
    let operations: Arc<dyn OperationStore> = store.clone();
    let queue = Arc::new(QueueService::new(operations, Arc::new(TracingEventSink)));

    QueueTestContext {
        queue,
        store,
        pool: pool.get_pool().clone(),
    }
}

pub fn at(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).expect("timestamp")
}

pub fn draft(op_type: OperationType, target: &str, priority: i32) -> OperationDraft {
    OperationDraft::new(
        op_type,
        TargetCollection::new(target.to_string()).expect("target"),
        OperationPayload::new(json!({ "target": target, "priority": priority })).expect("payload"),
    )
    .with_priority(priority)
}

/// Inserts a record with a fixed creation time, bypassing the queue clock.
pub async fn insert_at(
    store: &SqliteOfflineStore,
    draft: OperationDraft,
    created_ms: i64,
) -> PendingOperation {
    let operation = PendingOperation::from_draft(draft, at(created_ms));
    store.insert(&operation).await.expect("insert");
    operation
}
