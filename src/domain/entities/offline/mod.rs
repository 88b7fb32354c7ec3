pub mod pending_operation;
pub mod queue_stats;
pub mod replay_report;
pub mod sale_reminder;

pub use pending_operation::{OperationDraft, PendingOperation};
pub use queue_stats::QueueStats;
pub use replay_report::ReplayReport;
pub use sale_reminder::SaleReminder;
