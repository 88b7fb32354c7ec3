pub mod queue_service;
pub mod reminder_service;
pub mod replay_scheduler;
pub mod replay_service;

pub use queue_service::{QueueService, QueueServiceTrait};
pub use reminder_service::ReminderService;
pub use replay_scheduler::{ReplayScheduler, SchedulerStatus};
pub use replay_service::ReplayService;
