pub mod offline;

pub use offline::{
    EntityCollection, GroupId, OperationId, OperationPayload, OperationStatus, OperationType,
    ReminderId, ReminderStatus, TargetCollection,
};
