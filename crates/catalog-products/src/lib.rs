//! Product catalog: Product bounded context.
//!
//! The command side registers, renames, re-describes and retires products
//! through the event-sourced `Product` aggregate. The query side keeps a
//! denormalized read model fed from the committed event log and serves
//! search and point lookups from it.

pub mod application;
pub mod domain;
pub mod read_model;
