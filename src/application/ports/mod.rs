pub mod event_sink;
pub mod offline_store;
pub mod remote_applier;

pub use event_sink::{QueueEvent, QueueEventSink};
pub use offline_store::{LocalRecordStore, OperationFilter, OperationStore, ReminderStore};
pub use remote_applier::{ApplyFailure, RemoteApplier};
