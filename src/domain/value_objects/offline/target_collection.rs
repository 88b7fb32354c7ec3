use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Collection that replays ahead of every other target at equal priority.
pub const FOUNDATIONAL_COLLECTION: &str = "products";

/// Domain collection a queued mutation applies to (e.g. `products`, `sales`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetCollection(String);

impl TargetCollection {
    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn products() -> Self {
        Self(FOUNDATIONAL_COLLECTION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_foundational(&self) -> bool {
        self.0 == FOUNDATIONAL_COLLECTION
    }

    /// Ascending order with the foundational collection pinned first.
    pub fn replay_cmp(&self, other: &Self) -> Ordering {
        match (self.is_foundational(), other.is_foundational()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.0.cmp(&other.0),
        }
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Target collection cannot be empty".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for TargetCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
