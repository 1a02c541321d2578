//! Domain model for the Product context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod lifecycle;
pub mod sku;
