//! Test repositories — mock `StateRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use guestbridge_core::error::DomainError;
use guestbridge_core::repository::{StateRepository, StoredState};

/// A state repository that returns a configured list from every
/// `load_states` call and records every `save_states` call.
#[derive(Debug)]
pub struct RecordingStateRepository {
    load_result: Mutex<Vec<StoredState>>,
    saved: Mutex<Vec<(String, Vec<StoredState>)>>,
}

impl RecordingStateRepository {
    /// Create a repository that will return `load_result` from every load.
    #[must_use]
    pub fn new(load_result: Vec<StoredState>) -> Self {
        Self {
            load_result: Mutex::new(load_result),
            saved: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of every `(scope_id, states)` pair that was saved.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_states(&self) -> Vec<(String, Vec<StoredState>)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl StateRepository for RecordingStateRepository {
    async fn load_states(&self, _scope_id: &str) -> Result<Vec<StoredState>, DomainError> {
        Ok(self.load_result.lock().unwrap().clone())
    }

    async fn save_states(&self, scope_id: &str, states: &[StoredState]) -> Result<(), DomainError> {
        self.saved
            .lock()
            .unwrap()
            .push((scope_id.to_owned(), states.to_vec()));
        Ok(())
    }
}

/// A state repository that holds nothing and silently accepts saves.
#[derive(Debug)]
pub struct EmptyStateRepository;

#[async_trait]
impl StateRepository for EmptyStateRepository {
    async fn load_states(&self, _scope_id: &str) -> Result<Vec<StoredState>, DomainError> {
        Ok(vec![])
    }

    async fn save_states(
        &self,
        _scope_id: &str,
        _states: &[StoredState],
    ) -> Result<(), DomainError> {
        Ok(())
    }
}

/// A state repository that always returns an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug)]
pub struct FailingStateRepository;

#[async_trait]
impl StateRepository for FailingStateRepository {
    async fn load_states(&self, _scope_id: &str) -> Result<Vec<StoredState>, DomainError> {
        Err(DomainError::Infrastructure("storage unavailable".into()))
    }

    async fn save_states(
        &self,
        _scope_id: &str,
        _states: &[StoredState],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("storage unavailable".into()))
    }
}
