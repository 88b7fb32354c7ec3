use serde::{Deserialize, Serialize};

/// Outcome of one replay drain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: u32,
    pub failed: u32,
    /// Records that left `pending` before they could be claimed.
    pub skipped: u32,
    pub passes: u32,
}

impl ReplayReport {
    pub fn attempted(&self) -> u32 {
        self.applied + self.failed
    }

    pub fn is_idle(&self) -> bool {
        self.attempted() == 0 && self.skipped == 0
    }
}
