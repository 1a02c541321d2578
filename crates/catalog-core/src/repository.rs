//! Event repository abstraction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::event::DomainEvent;

/// Stored representation of a domain event.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Aggregate this event belongs to.
    pub aggregate_id: Uuid,
    /// Event type name for deserialization routing.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Sequence number within the aggregate stream.
    pub sequence_number: i64,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Causation ID linking to the causing event/command.
    pub causation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

impl StoredEvent {
    /// Captures a domain event in its persistable form.
    pub fn from_domain_event<E: DomainEvent>(event: &E) -> Self {
        let meta = event.metadata();
        Self {
            event_id: meta.event_id,
            aggregate_id: meta.aggregate_id,
            event_type: event.event_type().to_owned(),
            payload: event.to_payload(),
            sequence_number: meta.sequence_number,
            correlation_id: meta.correlation_id,
            causation_id: meta.causation_id,
            occurred_at: meta.occurred_at,
        }
    }
}

/// A stored event together with its position in the global commit log.
///
/// Positions are strictly increasing in commit order across all aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedEvent {
    /// Position in the global commit log.
    pub position: i64,
    /// The committed event.
    pub event: StoredEvent,
}

/// Repository trait for loading and appending domain events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Load all events for a given aggregate, ordered by sequence number.
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError>;

    /// Append new events to an aggregate stream with optimistic concurrency.
    /// `expected_version` is the last known sequence number; the append fails
    /// with `DomainError::ConcurrencyConflict` if the stream has moved on.
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError>;

    /// Load up to `limit` committed events with a position greater than
    /// `after`, ordered by position. Never skips an event that a later call
    /// could still observe below the returned positions.
    async fn load_committed_after(
        &self,
        after: i64,
        limit: usize,
    ) -> Result<Vec<CommittedEvent>, DomainError>;
}
