use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of local mutation recorded in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Create,
    Update,
    Delete,
    StockUpdate,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Create => "create",
            OperationType::Update => "update",
            OperationType::Delete => "delete",
            OperationType::StockUpdate => "stock_update",
        }
    }

    /// Replay precedence within equal priority and target. Lower replays first.
    pub fn replay_rank(&self) -> u8 {
        match self {
            OperationType::StockUpdate => 0,
            OperationType::Create => 1,
            OperationType::Update => 2,
            OperationType::Delete => 3,
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "create" => Ok(OperationType::Create),
            "update" => Ok(OperationType::Update),
            "delete" => Ok(OperationType::Delete),
            "stock_update" => Ok(OperationType::StockUpdate),
            other => Err(format!("Unknown operation type: {other}")),
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
