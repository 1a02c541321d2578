//! Query handlers for the Product context.
//!
//! Queries read only the projected read model and never touch the event
//! store, so they see committed writes once the projection has caught up.

use catalog_core::error::DomainError;
use tracing::instrument;
use uuid::Uuid;

use crate::read_model::{PageRequest, ProductFilter, ProductPage, ProductReadRepository, ProductView};

/// Retrieves a product by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the read model has no such
/// product, or the repository's own error.
#[instrument(skip(repo))]
pub async fn get_product_by_id(
    product_id: Uuid,
    repo: &dyn ProductReadRepository,
) -> Result<ProductView, DomainError> {
    repo.find_by_id(product_id)
        .await?
        .ok_or(DomainError::AggregateNotFound(product_id))
}

/// Searches products, optionally by exact SKU, one page at a time.
///
/// A filter that matches nothing yields an empty page, never an error.
///
/// # Errors
///
/// Returns the repository's error if the read model is unavailable.
#[instrument(skip(repo))]
pub async fn search_products(
    filter: &ProductFilter,
    page: PageRequest,
    repo: &dyn ProductReadRepository,
) -> Result<ProductPage, DomainError> {
    repo.search(filter, page).await
}
