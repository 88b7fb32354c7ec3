//! Durable offline operation queue with ordered replay against a remote store.
//!
//! Local mutations are recorded as [`PendingOperation`]s in SQLite and later applied through a
//! [`RemoteApplier`] in a deterministic order that respects priority, the foundational
//! `products` collection, operation type and parent dependencies.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{
    ApplyFailure, LocalRecordStore, OperationStore, QueueEvent, QueueEventSink, RemoteApplier,
    ReminderStore,
};
pub use application::services::{
    QueueService, QueueServiceTrait, ReminderService, ReplayScheduler, ReplayService,
};
pub use domain::entities::offline::{
    OperationDraft, PendingOperation, QueueStats, ReplayReport, SaleReminder,
};
pub use domain::value_objects::offline::{
    EntityCollection, GroupId, OperationId, OperationPayload, OperationStatus, OperationType,
    ReminderId, ReminderStatus, TargetCollection,
};
pub use shared::logging::init_logging;
pub use shared::{AppConfig, AppError, Result};
pub use state::OfflineRuntime;
