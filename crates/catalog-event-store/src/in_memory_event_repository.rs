//! In-process implementation of the `EventRepository` trait.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use catalog_core::error::DomainError;
use catalog_core::repository::{CommittedEvent, EventRepository, StoredEvent};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Log {
    streams: HashMap<Uuid, Vec<StoredEvent>>,
    committed: Vec<CommittedEvent>,
}

/// Event repository held in memory. Suitable for a single process running
/// both the command and query sides, and for tests.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    log: Mutex<Log>,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Log>, DomainError> {
        self.log
            .lock()
            .map_err(|_| DomainError::Infrastructure("event log lock poisoned".into()))
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let log = self.lock()?;
        Ok(log.streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    #[allow(clippy::cast_possible_wrap)]
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }
        let mut log = self.lock()?;
        let actual = log.streams.get(&aggregate_id).map_or(0, |s| s.len() as i64);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }
        for (offset, event) in (1_i64..).zip(events) {
            if event.aggregate_id != aggregate_id
                || event.sequence_number != expected_version + offset
            {
                return Err(DomainError::Infrastructure(format!(
                    "event {} does not continue stream {aggregate_id} at version {}",
                    event.event_id,
                    expected_version + offset
                )));
            }
        }

        let log = &mut *log;
        let stream = log.streams.entry(aggregate_id).or_default();
        for event in events {
            stream.push(event.clone());
            let position = log.committed.len() as i64 + 1;
            log.committed.push(CommittedEvent {
                position,
                event: event.clone(),
            });
        }
        debug!(%aggregate_id, count = events.len(), "appended events");
        Ok(())
    }

    async fn load_committed_after(
        &self,
        after: i64,
        limit: usize,
    ) -> Result<Vec<CommittedEvent>, DomainError> {
        let log = self.lock()?;
        let start = usize::try_from(after.max(0)).unwrap_or(usize::MAX);
        Ok(log.committed.iter().skip(start).take(limit).cloned().collect())
    }
}
