use crate::application::ports::remote_applier::RemoteApplier;
use crate::application::services::queue_service::QueueServiceTrait;
use crate::domain::entities::offline::{PendingOperation, ReplayReport};
use crate::domain::value_objects::offline::OperationStatus;
use crate::infrastructure::offline::metrics::{ReplayMetrics, ReplayMetricsSnapshot};
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Drains the queue against the remote store in replay order.
pub struct ReplayService {
    queue: Arc<dyn QueueServiceTrait>,
    applier: Arc<dyn RemoteApplier>,
    metrics: ReplayMetrics,
    gate: Mutex<()>,
}

impl ReplayService {
    pub fn new(queue: Arc<dyn QueueServiceTrait>, applier: Arc<dyn RemoteApplier>) -> Self {
        Self {
            queue,
            applier,
            metrics: ReplayMetrics::new(),
            gate: Mutex::new(()),
        }
    }

    pub fn metrics(&self) -> ReplayMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Applies every eligible record, re-planning after each pass so that dependents
    /// unblocked by removals are picked up. Only one drain runs at a time.
    pub async fn drain(&self) -> Result<ReplayReport, AppError> {
        let _guard = self.gate.lock().await;
        let mut report = ReplayReport::default();

        loop {
            let batch = self.queue.next_batch().await?;
            if batch.is_empty() {
                break;
            }
            report.passes += 1;

            for operation in batch {
                self.replay_one(&operation, &mut report).await?;
            }
        }

        self.metrics.record_drain();
        if report.is_idle() {
            tracing::debug!(target: "offline::replay", "nothing to replay");
        } else {
            tracing::info!(
                target: "offline::replay",
                applied = report.applied,
                failed = report.failed,
                skipped = report.skipped,
                passes = report.passes,
                "replay drain finished"
            );
        }
        Ok(report)
    }

    async fn replay_one(
        &self,
        operation: &PendingOperation,
        report: &mut ReplayReport,
    ) -> Result<(), AppError> {
        if !self.queue.claim(&operation.id).await? {
            report.skipped += 1;
            return Ok(());
        }

        if let Err(err) = self.apply_claimed(operation, report).await {
            self.release(operation).await;
            return Err(err);
        }
        Ok(())
    }

    /// Returns a claimed record to `pending` after its outcome could not be stored.
    async fn release(&self, operation: &PendingOperation) {
        match self
            .queue
            .update_status(&operation.id, OperationStatus::Pending, None)
            .await
        {
            Ok(_) => tracing::warn!(
                target: "offline::replay",
                operation_id = %operation.id,
                "claimed operation released back to pending"
            ),
            Err(err) if err.is_not_found() => {}
            Err(err) => tracing::error!(
                target: "offline::replay",
                operation_id = %operation.id,
                error = %err,
                "failed to release claimed operation; it stays processing until recovery"
            ),
        }
    }

    async fn apply_claimed(
        &self,
        operation: &PendingOperation,
        report: &mut ReplayReport,
    ) -> Result<(), AppError> {
        match self.applier.apply(operation).await {
            Ok(()) => {
                self.queue.remove_completed(&operation.id).await?;
                self.metrics
                    .record_success(operation.id.as_str(), operation.target.as_str());
                report.applied += 1;
            }
            Err(failure) => {
                tracing::warn!(
                    target: "offline::replay",
                    operation_id = %operation.id,
                    collection = %operation.target,
                    error = %failure,
                    "remote apply failed"
                );
                self.metrics.record_failure(
                    operation.id.as_str(),
                    operation.target.as_str(),
                    &failure.reason,
                );
                report.failed += 1;

                match self
                    .queue
                    .update_status(&operation.id, OperationStatus::Error, Some(failure.reason))
                    .await
                {
                    Ok(_) => {}
                    // 適用中にクリアされた場合は記録先がない
                    Err(err) if err.is_not_found() => {
                        tracing::warn!(
                            target: "offline::replay",
                            operation_id = %operation.id,
                            "operation vanished before its failure was recorded"
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(())
    }
}
