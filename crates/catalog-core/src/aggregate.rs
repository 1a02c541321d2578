//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots that reconstitute from event history.
///
/// Command methods record events and update in-memory state immediately;
/// `version` counts only events that have been persisted.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the committed version (number of persisted events applied).
    fn version(&self) -> i64;

    /// Apply a persisted event during reconstitution. Advances `version`.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events recorded by command handling but not yet persisted.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Marks all uncommitted events as persisted, advancing `version`.
    fn mark_committed(&mut self);
}
