//! Application services: command handlers, query handlers, and the
//! projection that feeds the read model.

pub mod command_handlers;
pub mod projection;
pub mod query_handlers;
pub mod worker;
