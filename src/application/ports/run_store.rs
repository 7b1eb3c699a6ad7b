//! Processing run store port interface

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::note::{ProcessingRun, RunStatus, StatusTransitionError};

/// Run store errors
#[derive(Debug, Clone, Error)]
pub enum RunStoreError {
    #[error("No processing run exists for recording {0}")]
    NotFound(Uuid),

    #[error("A processing run already exists for recording {0}")]
    AlreadyExists(Uuid),

    #[error(transparent)]
    InvalidTransition(#[from] StatusTransitionError),

    #[error("Run storage failed: {0}")]
    StorageFailed(String),
}

/// Port for the durable per-run record.
///
/// The pipeline orchestrator is the only writer; the store just enforces the
/// domain's monotone status machine on every mutation.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Create a pending run for a recording
    async fn create(&self, recording_id: Uuid) -> Result<ProcessingRun, RunStoreError>;

    /// Advance a run's status (forward-only)
    async fn advance(
        &self,
        recording_id: Uuid,
        status: RunStatus,
    ) -> Result<ProcessingRun, RunStoreError>;

    /// Mark a run failed with its stage error
    async fn fail(&self, recording_id: Uuid, error: String)
        -> Result<ProcessingRun, RunStoreError>;

    /// Fetch a run if one exists
    async fn get(&self, recording_id: Uuid) -> Result<Option<ProcessingRun>, RunStoreError>;
}
