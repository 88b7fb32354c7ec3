use crate::domain::entities::offline::PendingOperation;
use async_trait::async_trait;
use thiserror::Error;

/// The remote system rejected or could not process an operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct ApplyFailure {
    pub reason: String,
}

impl ApplyFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Applies one queued mutation to the authoritative store.
///
/// The same operation may be submitted again after a crash, so implementations must be
/// idempotent (or check before applying). `operation.id` is stable across attempts.
#[async_trait]
pub trait RemoteApplier: Send + Sync {
    async fn apply(&self, operation: &PendingOperation) -> Result<(), ApplyFailure>;
}
