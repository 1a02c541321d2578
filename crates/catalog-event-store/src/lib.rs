//! Write-side event storage for the product catalog.
//!
//! Both implementations enforce optimistic concurrency per aggregate stream:
//! an append succeeds only when the caller's expected version matches the
//! stream's current version.

pub mod in_memory_event_repository;
pub mod pg_event_repository;
