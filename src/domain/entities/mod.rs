pub mod offline;

pub use offline::{OperationDraft, PendingOperation, QueueStats, ReplayReport, SaleReminder};
