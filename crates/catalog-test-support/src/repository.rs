//! Test repositories: mock `EventRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use catalog_core::error::DomainError;
use catalog_core::repository::{CommittedEvent, EventRepository, StoredEvent};
use uuid::Uuid;

/// An event repository that records all `append_events` calls. Returns the
/// configured history from every `load_events` call and always succeeds on
/// `append_events`, without checking versions.
///
/// `load_committed_after` exposes the configured history followed by every
/// appended event, numbered from position 1.
#[derive(Debug)]
pub struct RecordingEventRepository {
    history: Vec<StoredEvent>,
    appended: Mutex<Vec<(Uuid, i64, Vec<StoredEvent>)>>,
}

impl RecordingEventRepository {
    /// Create a new recording repository that will return `history` from
    /// every `load_events` call. Use `FailingEventRepository` for error
    /// scenarios.
    #[must_use]
    pub fn new(history: Vec<StoredEvent>) -> Self {
        Self {
            history,
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all append calls as
    /// `(aggregate_id, expected_version, events)`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<(Uuid, i64, Vec<StoredEvent>)> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for RecordingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.history.clone())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        self.appended
            .lock()
            .unwrap()
            .push((aggregate_id, expected_version, events.to_vec()));
        Ok(())
    }

    async fn load_committed_after(
        &self,
        after: i64,
        limit: usize,
    ) -> Result<Vec<CommittedEvent>, DomainError> {
        let appended = self.appended.lock().unwrap();
        let all = self
            .history
            .iter()
            .cloned()
            .chain(appended.iter().flat_map(|(_, _, events)| events.iter().cloned()));
        Ok((1_i64..)
            .zip(all)
            .filter(|(position, _)| *position > after)
            .take(limit)
            .map(|(position, event)| CommittedEvent { position, event })
            .collect())
    }
}

/// An event repository that always returns an empty event list and silently
/// accepts appends. Useful for testing "aggregate not found" scenarios and
/// creation commands.
#[derive(Debug)]
pub struct EmptyEventRepository;

#[async_trait]
impl EventRepository for EmptyEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Ok(())
    }

    async fn load_committed_after(
        &self,
        _after: i64,
        _limit: usize,
    ) -> Result<Vec<CommittedEvent>, DomainError> {
        Ok(vec![])
    }
}

/// An event repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn load_committed_after(
        &self,
        _after: i64,
        _limit: usize,
    ) -> Result<Vec<CommittedEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
