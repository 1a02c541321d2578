//! Identity generation abstraction for determinism.
//!
//! Aggregate and event identifiers are produced by an injected generator so
//! that tests and replays can supply predictable values.

use uuid::Uuid;

/// Abstraction over identifier generation.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh, never-before-issued identifier.
    fn next_id(&self) -> Uuid;
}

/// Production generator issuing time-ordered UUIDv7 values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn next_id(&self) -> Uuid {
        Uuid::now_v7()
    }
}
