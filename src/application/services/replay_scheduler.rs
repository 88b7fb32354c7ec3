use crate::application::services::queue_service::QueueServiceTrait;
use crate::application::services::replay_service::ReplayService;
use crate::domain::entities::offline::ReplayReport;
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify, RwLock, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub is_running: bool,
    pub runs: u64,
    pub run_errors: u64,
    pub requeued: u64,
    pub last_run_ms: Option<i64>,
    pub last_report: Option<ReplayReport>,
}

/// Runs the replay engine periodically and whenever connectivity comes back.
pub struct ReplayScheduler {
    queue: Arc<dyn QueueServiceTrait>,
    replay: Arc<ReplayService>,
    config: SyncConfig,
    wake: Notify,
    shutdown: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
    status: RwLock<SchedulerStatus>,
}

impl ReplayScheduler {
    pub fn new(
        queue: Arc<dyn QueueServiceTrait>,
        replay: Arc<ReplayService>,
        config: SyncConfig,
    ) -> Arc<Self> {
        let (shutdown, _) = watch::channel(false);
        Arc::new(Self {
            queue,
            replay,
            config,
            wake: Notify::new(),
            shutdown,
            handle: Mutex::new(None),
            status: RwLock::new(SchedulerStatus::default()),
        })
    }

    /// Starts the background loop. Calling it again while running is a no-op.
    pub async fn spawn(self: &Arc<Self>) {
        let mut handle = self.handle.lock().await;
        if handle.is_some() {
            return;
        }

        self.shutdown.send_replace(false);
        let scheduler = Arc::clone(self);
        let mut shutdown_rx = self.shutdown.subscribe();
        *handle = Some(tokio::spawn(async move {
            scheduler.run_loop(&mut shutdown_rx).await;
        }));
        self.status.write().await.is_running = true;
    }

    /// Requests an immediate run, e.g. after connectivity is regained.
    pub fn trigger(&self) {
        self.wake.notify_one();
    }

    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);
        let handle = self.handle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                tracing::error!(target: "offline::scheduler", error = %err, "scheduler task panicked");
            }
        }
        self.status.write().await.is_running = false;
    }

    pub async fn status(&self) -> SchedulerStatus {
        self.status.read().await.clone()
    }

    /// One scheduled run: optional re-queue of old failures, then a drain.
    pub async fn run_once(&self) -> Result<ReplayReport, AppError> {
        let mut requeued = 0;
        if self.config.auto_retry_failed {
            if let Some(cutoff) = self.retry_cutoff() {
                requeued = self.queue.requeue_failed(Some(cutoff)).await?;
            }
        }

        let report = self.replay.drain().await?;

        let mut status = self.status.write().await;
        status.runs += 1;
        status.requeued += requeued;
        status.last_run_ms = Some(Utc::now().timestamp_millis());
        status.last_report = Some(report.clone());
        Ok(report)
    }

    fn retry_cutoff(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.config.retry_backoff_secs).ok()?;
        let backoff = chrono::Duration::try_seconds(secs)?;
        Utc::now().checked_sub_signed(backoff)
    }

    async fn run_loop(&self, shutdown_rx: &mut watch::Receiver<bool>) {
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.sync_interval.max(1)));
        let periodic = self.config.auto_sync;

        tracing::info!(
            target: "offline::scheduler",
            periodic,
            interval_secs = self.config.sync_interval,
            auto_retry = self.config.auto_retry_failed,
            "replay scheduler started"
        );

        loop {
            tokio::select! {
                _ = interval.tick(), if periodic => {}
                _ = self.wake.notified() => {
                    tracing::debug!(target: "offline::scheduler", "replay triggered");
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                    continue;
                }
            }

            if let Err(err) = self.run_once().await {
                tracing::error!(target: "offline::scheduler", error = %err, "scheduled replay failed");
                self.status.write().await.run_errors += 1;
            }
        }

        tracing::info!(target: "offline::scheduler", "replay scheduler stopped");
    }
}
