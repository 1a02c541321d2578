//! Command handlers for the Product context.
//!
//! This module contains application-level command handler functions that
//! orchestrate domain logic: load aggregate, execute command, persist events.
//! Each handler owns its `Product` for the duration of one command; the
//! repository's optimistic version check rejects a concurrent writer on the
//! same id.

use catalog_core::aggregate::AggregateRoot;
use catalog_core::clock::Clock;
use catalog_core::command::Command;
use catalog_core::error::DomainError;
use catalog_core::id::IdGenerator;
use catalog_core::repository::{EventRepository, StoredEvent};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::aggregates::{EventContext, Product};
use crate::domain::commands::{RedescribeProduct, RegisterProduct, RenameProduct, RetireProduct};
use crate::domain::events::ProductEvent;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct ProductCommandResult {
    /// The aggregate ID affected by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted. Empty when the command
    /// changed nothing.
    pub stored_events: Vec<StoredEvent>,
}

/// Reconstitutes a `Product` from stored events.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if there are no events and
/// `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    product_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Product, DomainError> {
    let history = existing_events
        .iter()
        .map(ProductEvent::from_stored)
        .collect::<Result<Vec<_>, _>>()?;
    Product::from_history(product_id, &history)
}

async fn load(product_id: Uuid, repo: &dyn EventRepository) -> Result<Product, DomainError> {
    let existing_events = repo.load_events(product_id).await?;
    reconstitute(product_id, &existing_events)
}

/// Persists the product's pending events, if any.
async fn persist(
    mut product: Product,
    repo: &dyn EventRepository,
) -> Result<ProductCommandResult, DomainError> {
    let stored_events: Vec<StoredEvent> = product
        .uncommitted_events()
        .iter()
        .map(StoredEvent::from_domain_event)
        .collect();

    if stored_events.is_empty() {
        debug!(product_id = %product.id(), "command produced no events");
    } else {
        repo.append_events(product.id(), product.version(), &stored_events)
            .await?;
        product.mark_committed();
    }

    Ok(ProductCommandResult {
        aggregate_id: product.id(),
        stored_events,
    })
}

fn context<'a>(
    command: &impl Command,
    clock: &'a dyn Clock,
    ids: &'a dyn IdGenerator,
) -> EventContext<'a> {
    EventContext {
        correlation_id: command.correlation_id(),
        clock,
        ids,
    }
}

/// Handles the `RegisterProduct` command: creates a new aggregate with a
/// generated id and persists the registration.
///
/// # Errors
///
/// Returns `DomainError::Validation` if any field is blank (nothing is
/// persisted), or the repository's error if appending fails.
#[instrument(skip_all, fields(command = command.command_type(), correlation_id = %command.correlation_id))]
pub async fn handle_register_product(
    command: &RegisterProduct,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &dyn EventRepository,
) -> Result<ProductCommandResult, DomainError> {
    let product = Product::create(
        &command.name,
        &command.description,
        &command.sku,
        context(command, clock, ids),
    )?;
    debug!(product_id = %product.id(), sku = %product.sku(), "registering product");
    persist(product, repo).await
}

/// Handles the `RenameProduct` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound`, `DomainError::IllegalState`,
/// `DomainError::Validation`, or a repository error.
#[instrument(skip_all, fields(command = command.command_type(), product_id = %command.product_id))]
pub async fn handle_rename_product(
    command: &RenameProduct,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &dyn EventRepository,
) -> Result<ProductCommandResult, DomainError> {
    let mut product = load(command.product_id, repo).await?;
    product.update_name(&command.name, context(command, clock, ids))?;
    persist(product, repo).await
}

/// Handles the `RedescribeProduct` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound`, `DomainError::IllegalState`,
/// `DomainError::Validation`, or a repository error.
#[instrument(skip_all, fields(command = command.command_type(), product_id = %command.product_id))]
pub async fn handle_redescribe_product(
    command: &RedescribeProduct,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &dyn EventRepository,
) -> Result<ProductCommandResult, DomainError> {
    let mut product = load(command.product_id, repo).await?;
    product.update_description(&command.description, context(command, clock, ids))?;
    persist(product, repo).await
}

/// Handles the `RetireProduct` command.
///
/// A missing product (`AggregateNotFound`) and an already retired one
/// (`IllegalState`) stay distinct here.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound`, `DomainError::IllegalState`, or
/// a repository error.
#[instrument(skip_all, fields(command = command.command_type(), product_id = %command.product_id))]
pub async fn handle_retire_product(
    command: &RetireProduct,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &dyn EventRepository,
) -> Result<ProductCommandResult, DomainError> {
    let mut product = load(command.product_id, repo).await?;
    product.retire(context(command, clock, ids))?;
    persist(product, repo).await
}
