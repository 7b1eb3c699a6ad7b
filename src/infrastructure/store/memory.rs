//! In-memory processing run store
//!
//! Backs a single CLI invocation; the domain state machine enforces
//! transition rules, this store just keys runs by recording id.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::ports::{RunStore, RunStoreError};
use crate::domain::note::{ProcessingRun, RunStatus};

/// Run store holding runs in process memory
#[derive(Default)]
pub struct InMemoryRunStore {
    runs: RwLock<HashMap<Uuid, ProcessingRun>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn create(&self, recording_id: Uuid) -> Result<ProcessingRun, RunStoreError> {
        let mut runs = self.runs.write().await;
        if runs.contains_key(&recording_id) {
            return Err(RunStoreError::AlreadyExists(recording_id));
        }
        let run = ProcessingRun::new(recording_id);
        runs.insert(recording_id, run.clone());
        Ok(run)
    }

    async fn advance(
        &self,
        recording_id: Uuid,
        status: RunStatus,
    ) -> Result<ProcessingRun, RunStoreError> {
        let mut runs = self.runs.write().await;
        let run = runs
            .get_mut(&recording_id)
            .ok_or(RunStoreError::NotFound(recording_id))?;
        run.advance(status)?;
        Ok(run.clone())
    }

    async fn fail(
        &self,
        recording_id: Uuid,
        error: String,
    ) -> Result<ProcessingRun, RunStoreError> {
        let mut runs = self.runs.write().await;
        let run = runs
            .get_mut(&recording_id)
            .ok_or(RunStoreError::NotFound(recording_id))?;
        run.fail(error)?;
        Ok(run.clone())
    }

    async fn get(&self, recording_id: Uuid) -> Result<Option<ProcessingRun>, RunStoreError> {
        Ok(self.runs.read().await.get(&recording_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get() {
        let store = InMemoryRunStore::new();
        let id = Uuid::new_v4();

        let run = store.create(id).await.unwrap();
        assert_eq!(run.status, RunStatus::Pending);

        let fetched = store.get(id).await.unwrap().unwrap();
        assert_eq!(fetched.recording_id, id);
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let store = InMemoryRunStore::new();
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();

        let err = store.create(id).await.unwrap_err();
        assert!(matches!(err, RunStoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn advance_unknown_run_is_not_found() {
        let store = InMemoryRunStore::new();
        let err = store
            .advance(Uuid::new_v4(), RunStatus::Transcribing)
            .await
            .unwrap_err();
        assert!(matches!(err, RunStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn advance_enforces_monotone_order() {
        let store = InMemoryRunStore::new();
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();
        store.advance(id, RunStatus::Transcribing).await.unwrap();
        store.advance(id, RunStatus::Redacting).await.unwrap();

        let err = store.advance(id, RunStatus::Transcribing).await.unwrap_err();
        assert!(matches!(err, RunStoreError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn fail_records_error_message() {
        let store = InMemoryRunStore::new();
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();
        store.advance(id, RunStatus::Transcribing).await.unwrap();

        let run = store.fail(id, "provider timeout".to_string()).await.unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.error.as_deref(), Some("provider timeout"));

        let err = store
            .advance(id, RunStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, RunStoreError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn get_missing_run_is_none() {
        let store = InMemoryRunStore::new();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
