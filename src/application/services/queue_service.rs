use crate::application::ports::event_sink::{QueueEvent, QueueEventSink};
use crate::application::ports::offline_store::{OperationFilter, OperationStore};
use crate::domain::entities::offline::{OperationDraft, PendingOperation, QueueStats};
use crate::domain::replay::plan_batch;
use crate::domain::value_objects::offline::{GroupId, OperationId, OperationStatus};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

#[async_trait]
pub trait QueueServiceTrait: Send + Sync {
    async fn enqueue(&self, draft: OperationDraft) -> Result<PendingOperation, AppError>;
    async fn enqueue_group(
        &self,
        group_id: Option<GroupId>,
        drafts: Vec<OperationDraft>,
    ) -> Result<Vec<PendingOperation>, AppError>;
    async fn list_failed(&self) -> Result<Vec<PendingOperation>, AppError>;
    async fn list_group(&self, group_id: &GroupId) -> Result<Vec<PendingOperation>, AppError>;
    async fn next_batch(&self) -> Result<Vec<PendingOperation>, AppError>;
    async fn update_status(
        &self,
        id: &OperationId,
        status: OperationStatus,
        error_detail: Option<String>,
    ) -> Result<PendingOperation, AppError>;
    async fn claim(&self, id: &OperationId) -> Result<bool, AppError>;
    async fn remove_completed(&self, id: &OperationId) -> Result<(), AppError>;
    async fn retry_failed(&self, id: &OperationId) -> Result<PendingOperation, AppError>;
    async fn requeue_failed(&self, older_than: Option<DateTime<Utc>>) -> Result<u64, AppError>;
    async fn recover_interrupted(&self) -> Result<u64, AppError>;
    async fn stats(&self) -> Result<QueueStats, AppError>;
    async fn clear_all_data(&self) -> Result<(), AppError>;
}

/// Millisecond clock that never hands out the same instant twice.
#[derive(Debug, Default)]
struct MonotonicClock {
    last_ms: AtomicI64,
}

impl MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_millis();
        let previous = self
            .last_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(wall.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        let issued = wall.max(previous + 1);
        DateTime::<Utc>::from_timestamp_millis(issued).unwrap_or_else(Utc::now)
    }

    /// Never issue an instant at or before `at`.
    fn observe(&self, at: DateTime<Utc>) {
        self.last_ms
            .fetch_max(at.timestamp_millis(), Ordering::SeqCst);
    }
}

pub struct QueueService {
    store: Arc<dyn OperationStore>,
    events: Arc<dyn QueueEventSink>,
    clock: MonotonicClock,
}

impl QueueService {
    pub fn new(store: Arc<dyn OperationStore>, events: Arc<dyn QueueEventSink>) -> Self {
        Self {
            store,
            events,
            clock: MonotonicClock::default(),
        }
    }

    /// Continues the creation clock after the newest stored record, so FIFO order holds
    /// across restarts and backward wall-clock steps.
    pub async fn seed_clock(&self) -> Result<(), AppError> {
        if let Some(latest) = self.store.latest_created_at().await? {
            self.clock.observe(latest);
        }
        Ok(())
    }

    fn publish(&self, event: QueueEvent) {
        if let Err(err) = self.events.emit(&event) {
            tracing::warn!(
                target: "offline::queue",
                error = %err,
                "failed to emit queue event"
            );
        }
    }

    fn enqueued_event(operation: &PendingOperation) -> QueueEvent {
        QueueEvent::Enqueued {
            id: operation.id.clone(),
            op_type: operation.op_type,
            target: operation.target.clone(),
            priority: operation.priority,
            parent_id: operation.parent_id.clone(),
            group_id: operation.group_id.clone(),
        }
    }

    async fn transition(
        &self,
        id: &OperationId,
        status: OperationStatus,
        error_detail: Option<&str>,
    ) -> Result<PendingOperation, AppError> {
        let updated = self
            .store
            .update_status(id, status, error_detail, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pending operation {id}")))?;

        self.publish(QueueEvent::StatusChanged {
            id: updated.id.clone(),
            status: updated.status,
            error_detail: updated.error_detail.clone(),
        });
        Ok(updated)
    }
}

#[async_trait]
impl QueueServiceTrait for QueueService {
    async fn enqueue(&self, draft: OperationDraft) -> Result<PendingOperation, AppError> {
        let operation = PendingOperation::from_draft(draft, self.clock.now());
        self.store.insert(&operation).await?;
        self.publish(Self::enqueued_event(&operation));
        Ok(operation)
    }

    async fn enqueue_group(
        &self,
        group_id: Option<GroupId>,
        drafts: Vec<OperationDraft>,
    ) -> Result<Vec<PendingOperation>, AppError> {
        if drafts.is_empty() {
            return Err(AppError::ValidationError(
                "Operation group cannot be empty".to_string(),
            ));
        }

        let group_id = group_id.unwrap_or_else(GroupId::generate);
        let operations: Vec<PendingOperation> = drafts
            .into_iter()
            .map(|draft| {
                PendingOperation::from_draft(draft.with_group(group_id.clone()), self.clock.now())
            })
            .collect();

        self.store.insert_group(&operations).await?;
        for operation in &operations {
            self.publish(Self::enqueued_event(operation));
        }
        Ok(operations)
    }

    async fn list_failed(&self) -> Result<Vec<PendingOperation>, AppError> {
        self.store
            .scan(&OperationFilter::with_status(OperationStatus::Error))
            .await
    }

    async fn list_group(&self, group_id: &GroupId) -> Result<Vec<PendingOperation>, AppError> {
        self.store
            .scan(&OperationFilter::with_group(group_id.clone()))
            .await
    }

    async fn next_batch(&self) -> Result<Vec<PendingOperation>, AppError> {
        let snapshot = self.store.replay_snapshot().await?;
        Ok(plan_batch(snapshot))
    }

    async fn update_status(
        &self,
        id: &OperationId,
        status: OperationStatus,
        error_detail: Option<String>,
    ) -> Result<PendingOperation, AppError> {
        self.transition(id, status, error_detail.as_deref()).await
    }

    async fn claim(&self, id: &OperationId) -> Result<bool, AppError> {
        let claimed = self.store.claim(id, Utc::now()).await?;
        if claimed {
            self.publish(QueueEvent::StatusChanged {
                id: id.clone(),
                status: OperationStatus::Processing,
                error_detail: None,
            });
        }
        Ok(claimed)
    }

    async fn remove_completed(&self, id: &OperationId) -> Result<(), AppError> {
        if self.store.delete(id).await? {
            self.publish(QueueEvent::Removed { id: id.clone() });
        }
        Ok(())
    }

    async fn retry_failed(&self, id: &OperationId) -> Result<PendingOperation, AppError> {
        let current = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pending operation {id}")))?;
        if !current.status.is_error() {
            return Err(AppError::ValidationError(format!(
                "Operation {id} is {} and cannot be retried",
                current.status
            )));
        }
        self.transition(id, OperationStatus::Pending, None).await
    }

    async fn requeue_failed(&self, older_than: Option<DateTime<Utc>>) -> Result<u64, AppError> {
        let filter = OperationFilter {
            status: Some(OperationStatus::Error),
            updated_before: older_than,
            ..OperationFilter::default()
        };

        let mut requeued = 0u64;
        for operation in self.store.scan(&filter).await? {
            match self
                .transition(&operation.id, OperationStatus::Pending, None)
                .await
            {
                Ok(_) => requeued += 1,
                // 走査後に削除されたレコードは対象外
                Err(err) if err.is_not_found() => continue,
                Err(err) => return Err(err),
            }
        }

        if requeued > 0 {
            tracing::info!(target: "offline::queue", count = requeued, "failed operations requeued");
        }
        Ok(requeued)
    }

    async fn recover_interrupted(&self) -> Result<u64, AppError> {
        let count = self.store.recover_processing(Utc::now()).await?;
        if count > 0 {
            self.publish(QueueEvent::Recovered { count });
        }
        Ok(count)
    }

    async fn stats(&self) -> Result<QueueStats, AppError> {
        self.store.stats().await
    }

    async fn clear_all_data(&self) -> Result<(), AppError> {
        self.store.clear_all_data().await?;
        self.publish(QueueEvent::Cleared);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::offline::{OperationPayload, OperationType, TargetCollection};
    use crate::infrastructure::database::ConnectionPool;
    use crate::infrastructure::offline::SqliteOfflineStore;
    use mockall::mock;
    use serde_json::json;

    mock! {
        pub Sink {}

        impl QueueEventSink for Sink {
            fn emit(&self, event: &QueueEvent) -> Result<(), String>;
        }
    }

    async fn setup_service(sink: MockSink) -> QueueService {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let store: Arc<dyn OperationStore> =
            Arc::new(SqliteOfflineStore::new(pool.get_pool().clone()));
        QueueService::new(store, Arc::new(sink))
    }

    fn quiet_sink() -> MockSink {
        let mut sink = MockSink::new();
        sink.expect_emit().returning(|_| Ok(()));
        sink
    }

    fn draft(op_type: OperationType, target: &str) -> OperationDraft {
        OperationDraft::new(
            op_type,
            TargetCollection::new(target.to_string()).unwrap(),
            OperationPayload::new(json!({"id": target})).unwrap(),
        )
    }

    #[test]
    fn clock_is_strictly_increasing() {
        let clock = MonotonicClock::default();
        let mut previous = clock.now();
        for _ in 0..1_000 {
            let next = clock.now();
            assert!(next > previous);
            previous = next;
        }
    }

    #[tokio::test]
    async fn seeded_clock_continues_after_stored_records() {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let store = Arc::new(SqliteOfflineStore::new(pool.get_pool().clone()));

        // 壁時計より未来の created_at を持つ既存レコード
        let ahead = Utc::now() + chrono::Duration::hours(1);
        let existing =
            PendingOperation::from_draft(draft(OperationType::Create, "sales"), ahead);
        store.insert(&existing).await.unwrap();

        let service = QueueService::new(store, Arc::new(quiet_sink()));
        service.seed_clock().await.unwrap();
        let next = service
            .enqueue(draft(OperationType::Create, "sales"))
            .await
            .unwrap();

        assert!(next.created_at > existing.created_at);
        let group = service.list_group(&next.group_id).await.unwrap();
        assert_eq!(group.len(), 1);
    }

    #[tokio::test]
    async fn enqueue_persists_pending_record_and_emits_event() {
        let mut sink = MockSink::new();
        sink.expect_emit()
            .withf(|event| matches!(event, QueueEvent::Enqueued { priority: 4, .. }))
            .times(1)
            .returning(|_| Ok(()));
        let service = setup_service(sink).await;

        let record = service
            .enqueue(draft(OperationType::Create, "sales").with_priority(4))
            .await
            .unwrap();

        assert_eq!(record.status, OperationStatus::Pending);
        assert_eq!(record.retry_count, 0);
        assert_eq!(service.stats().await.unwrap().pending, 1);
    }

    #[tokio::test]
    async fn sink_failure_does_not_fail_enqueue() {
        let mut sink = MockSink::new();
        sink.expect_emit()
            .returning(|_| Err("listener gone".to_string()));
        let service = setup_service(sink).await;

        let record = service
            .enqueue(draft(OperationType::Update, "products"))
            .await
            .unwrap();
        service
            .update_status(&record.id, OperationStatus::Error, Some("boom".into()))
            .await
            .unwrap();
        service.remove_completed(&record.id).await.unwrap();
    }

    #[tokio::test]
    async fn update_status_unknown_id_is_not_found() {
        let service = setup_service(quiet_sink()).await;
        let err = service
            .update_status(
                &OperationId::new("missing".into()).unwrap(),
                OperationStatus::Error,
                Some("x".into()),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn retry_accounting_follows_transitions() {
        let service = setup_service(quiet_sink()).await;
        let record = service
            .enqueue(draft(OperationType::Update, "sales"))
            .await
            .unwrap();

        let failed = service
            .update_status(&record.id, OperationStatus::Error, Some("timeout".into()))
            .await
            .unwrap();
        assert_eq!(failed.retry_count, 1);
        assert_eq!(failed.error_detail.as_deref(), Some("timeout"));
        assert_eq!(service.list_failed().await.unwrap().len(), 1);

        let retried = service.retry_failed(&record.id).await.unwrap();
        assert_eq!(retried.retry_count, 0);
        assert!(retried.error_detail.is_none());
        assert!(service.list_failed().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn retry_failed_rejects_pending_record() {
        let service = setup_service(quiet_sink()).await;
        let record = service
            .enqueue(draft(OperationType::Delete, "sales"))
            .await
            .unwrap();
        let err = service.retry_failed(&record.id).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn requeue_failed_honours_cutoff() {
        let service = setup_service(quiet_sink()).await;
        let record = service
            .enqueue(draft(OperationType::Create, "sales"))
            .await
            .unwrap();
        service
            .update_status(&record.id, OperationStatus::Error, Some("offline".into()))
            .await
            .unwrap();

        let past = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(service.requeue_failed(Some(past)).await.unwrap(), 0);

        let future = Utc::now() + chrono::Duration::seconds(5);
        assert_eq!(service.requeue_failed(Some(future)).await.unwrap(), 1);
        assert_eq!(service.stats().await.unwrap().pending, 1);
    }

    #[tokio::test]
    async fn enqueue_group_shares_group_id() {
        let service = setup_service(quiet_sink()).await;
        let group = GroupId::new("sale-7".into()).unwrap();
        let records = service
            .enqueue_group(
                Some(group.clone()),
                vec![
                    draft(OperationType::Create, "sales"),
                    draft(OperationType::Create, "sale_items")
                        .with_group(GroupId::new("ignored".into()).unwrap()),
                ],
            )
            .await
            .unwrap();

        assert!(records.iter().all(|record| record.group_id == group));
        let listed = service.list_group(&group).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at < listed[1].created_at);
    }

    #[tokio::test]
    async fn enqueue_group_rejects_empty_input() {
        let service = setup_service(quiet_sink()).await;
        let err = service.enqueue_group(None, Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn remove_completed_is_idempotent() {
        let mut sink = MockSink::new();
        sink.expect_emit()
            .withf(|event| matches!(event, QueueEvent::Removed { .. }))
            .times(1)
            .returning(|_| Ok(()));
        sink.expect_emit().returning(|_| Ok(()));
        let service = setup_service(sink).await;

        let record = service
            .enqueue(draft(OperationType::Create, "sales"))
            .await
            .unwrap();
        service.remove_completed(&record.id).await.unwrap();
        service.remove_completed(&record.id).await.unwrap();
        assert_eq!(service.stats().await.unwrap().total(), 0);
    }

    #[tokio::test]
    async fn claim_and_recover() {
        let service = setup_service(quiet_sink()).await;
        let record = service
            .enqueue(draft(OperationType::Create, "sales"))
            .await
            .unwrap();

        assert!(service.claim(&record.id).await.unwrap());
        assert!(!service.claim(&record.id).await.unwrap());
        assert!(service.next_batch().await.unwrap().is_empty());

        assert_eq!(service.recover_interrupted().await.unwrap(), 1);
        let batch = service.next_batch().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id, record.id);
    }
}
