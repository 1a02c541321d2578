//! Test id generator: deterministic `IdGenerator` implementation for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use catalog_core::id::IdGenerator;
use uuid::Uuid;

/// Issues `Uuid::from_u128(start)`, `Uuid::from_u128(start + 1)`, ... so
/// tests can predict every aggregate and event id.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Create a generator whose first id is `Uuid::from_u128(start)`.
    #[must_use]
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    /// The id that the `n`-th call (zero-based) of a generator created with
    /// `starting_at(start)` returns.
    #[must_use]
    pub fn nth(start: u64, n: u64) -> Uuid {
        Uuid::from_u128(u128::from(start + n))
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::from_u128(u128::from(self.next.fetch_add(1, Ordering::SeqCst)))
    }
}
