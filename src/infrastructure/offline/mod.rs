pub mod event_sink;
mod mappers;
pub mod metrics;
mod queries;
mod rows;
pub mod sqlite_store;

pub use event_sink::{BroadcastEventSink, TracingEventSink};
pub use metrics::{ApplyOutcome, ReplayMetrics, ReplayMetricsSnapshot};
pub use sqlite_store::SqliteOfflineStore;
