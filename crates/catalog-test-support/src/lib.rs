//! Shared test mocks and utilities for the product catalog.

mod clock;
mod id;
mod repository;

pub use clock::FixedClock;
pub use id::SequentialIdGenerator;
pub use repository::{EmptyEventRepository, FailingEventRepository, RecordingEventRepository};
