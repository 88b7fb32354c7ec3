use crate::application::ports::event_sink::QueueEventSink;
use crate::application::ports::offline_store::{LocalRecordStore, OperationStore, ReminderStore};
use crate::application::ports::remote_applier::RemoteApplier;
use crate::application::services::{
    QueueService, QueueServiceTrait, ReminderService, ReplayScheduler, ReplayService,
};
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::offline::{SqliteOfflineStore, TracingEventSink};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::path::Path;
use std::sync::Arc;

/// Wired offline stack: pool, store, queue and reminder services.
#[derive(Clone)]
pub struct OfflineRuntime {
    config: AppConfig,
    pool: ConnectionPool,
    queue: Arc<QueueService>,
    reminders: Arc<ReminderService>,
    records: Arc<dyn LocalRecordStore>,
}

impl OfflineRuntime {
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        Self::open_with_sink(config, Arc::new(TracingEventSink)).await
    }

    /// Opens the database, applies migrations and returns interrupted work to `pending`.
    pub async fn open_with_sink(
        config: &AppConfig,
        events: Arc<dyn QueueEventSink>,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        if let Some(dir) = database_parent_dir(&config.database.url) {
            tokio::fs::create_dir_all(dir).await.map_err(|err| {
                AppError::ConfigurationError(format!("Failed to create database directory: {err}"))
            })?;
        }

        let pool = ConnectionPool::from_config(&config.database).await?;
        pool.migrate().await?;

        let store = Arc::new(SqliteOfflineStore::new(pool.get_pool().clone()));
        let operations: Arc<dyn OperationStore> = store.clone();
        let reminder_store: Arc<dyn ReminderStore> = store.clone();
        let records: Arc<dyn LocalRecordStore> = store;

        let queue = Arc::new(QueueService::new(operations, events));
        queue.seed_clock().await?;
        let recovered = queue.recover_interrupted().await?;

        tracing::info!(
            target: "offline::queue",
            database = %config.database.url,
            recovered,
            "offline runtime ready"
        );

        Ok(Self {
            config: config.clone(),
            pool,
            queue,
            reminders: Arc::new(ReminderService::new(reminder_store)),
            records,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn queue(&self) -> Arc<QueueService> {
        Arc::clone(&self.queue)
    }

    pub fn reminders(&self) -> Arc<ReminderService> {
        Arc::clone(&self.reminders)
    }

    pub fn records(&self) -> Arc<dyn LocalRecordStore> {
        Arc::clone(&self.records)
    }

    pub fn replay_service(&self, applier: Arc<dyn RemoteApplier>) -> Arc<ReplayService> {
        let queue: Arc<dyn QueueServiceTrait> = self.queue.clone();
        Arc::new(ReplayService::new(queue, applier))
    }

    pub fn scheduler(&self, replay: Arc<ReplayService>) -> Arc<ReplayScheduler> {
        let queue: Arc<dyn QueueServiceTrait> = self.queue.clone();
        ReplayScheduler::new(queue, replay, self.config.sync.clone())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Directory holding a file-backed SQLite database, if the url names one.
fn database_parent_dir(url: &str) -> Option<&Path> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}
