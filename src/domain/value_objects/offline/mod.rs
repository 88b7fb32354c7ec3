pub mod entity_collection;
pub mod group_id;
pub mod operation_id;
pub mod operation_status;
pub mod operation_type;
pub mod payload;
pub mod reminder;
pub mod target_collection;

pub use entity_collection::EntityCollection;
pub use group_id::GroupId;
pub use operation_id::OperationId;
pub use operation_status::OperationStatus;
pub use operation_type::OperationType;
pub use payload::OperationPayload;
pub use reminder::{ReminderId, ReminderStatus};
pub use target_collection::{FOUNDATIONAL_COLLECTION, TargetCollection};
