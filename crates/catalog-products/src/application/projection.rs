//! Projection of committed product events into the read model.
//!
//! Delivery is at-least-once, so applying an event must be idempotent: each
//! view remembers the sequence number of the last event folded into it and
//! anything at or below that number is skipped.

use std::sync::Arc;

use catalog_core::error::DomainError;
use catalog_core::repository::StoredEvent;
use thiserror::Error;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::domain::events::{ProductEvent, ProductEventKind};
use crate::domain::lifecycle::ProductStatus;
use crate::read_model::{ProductReadRepository, ProductView};

/// Reasons an event could not be projected.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The event skipped ahead of what the view has seen.
    #[error("sequence gap on product {product_id}: last applied {last}, received {found}")]
    SequenceGap {
        /// The product whose stream has a gap.
        product_id: Uuid,
        /// Last sequence number folded into the view (0 if none).
        last: i64,
        /// Sequence number of the rejected event.
        found: i64,
    },

    /// The event could not be decoded or the read model failed.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// What happened to a projected event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The view was created or updated.
    Updated,
    /// The event had already been applied.
    Duplicate,
}

/// Folds product events into a `ProductReadRepository`.
#[derive(Clone)]
pub struct ProductProjector {
    read_model: Arc<dyn ProductReadRepository>,
}

impl ProductProjector {
    /// Creates a projector writing into `read_model`.
    #[must_use]
    pub fn new(read_model: Arc<dyn ProductReadRepository>) -> Self {
        Self { read_model }
    }

    /// Applies one committed event.
    ///
    /// # Errors
    ///
    /// Returns `ProjectionError::SequenceGap` if the event is not the next
    /// one for its product, and `ProjectionError::Domain` if it cannot be
    /// decoded or stored.
    pub async fn apply(&self, stored: &StoredEvent) -> Result<Applied, ProjectionError> {
        let event = ProductEvent::from_stored(stored)?;
        let product_id = event.metadata.aggregate_id;
        let found = event.metadata.sequence_number;
        let current = self.read_model.find_by_id(product_id).await?;
        let last = current.as_ref().map_or(0, |view| view.version);

        if found <= last {
            trace!(%product_id, found, last, "skipping already projected event");
            return Ok(Applied::Duplicate);
        }
        if found != last + 1 {
            return Err(ProjectionError::SequenceGap {
                product_id,
                last,
                found,
            });
        }

        let mut view = match (current, &event.kind) {
            (Some(view), _) => view,
            (None, ProductEventKind::ProductRegistered(payload)) => ProductView {
                id: product_id,
                name: payload.name.clone(),
                description: payload.description.clone(),
                sku: payload.sku.to_string(),
                status: ProductStatus::Active,
                version: 0,
            },
            (None, _) => {
                return Err(ProjectionError::SequenceGap {
                    product_id,
                    last,
                    found,
                });
            }
        };
        match event.kind {
            // Fields were taken from the registration when the view was built.
            ProductEventKind::ProductRegistered(_) => {}
            ProductEventKind::ProductRenamed(payload) => view.name = payload.name,
            ProductEventKind::ProductRedescribed(payload) => view.description = payload.description,
            ProductEventKind::ProductRetired(_) => view.status = ProductStatus::Retired,
        }
        view.version = found;

        debug!(%product_id, version = found, event_type = %stored.event_type, "projected event");
        self.read_model.upsert(view).await?;
        Ok(Applied::Updated)
    }
}
