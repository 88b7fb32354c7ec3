#![allow(unused_imports)]

pub mod entities;
pub mod replay;
pub mod value_objects;

pub use entities::{OperationDraft, PendingOperation, QueueStats, ReplayReport, SaleReminder};
pub use replay::{ReplaySnapshot, plan_batch};
pub use value_objects::{
    EntityCollection, GroupId, OperationId, OperationPayload, OperationStatus, OperationType,
    ReminderId, ReminderStatus, TargetCollection,
};
