//! Domain events for the Product context.

use catalog_core::error::DomainError;
use catalog_core::event::{DomainEvent, EventMetadata};
use catalog_core::repository::StoredEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sku::SkuId;

/// Event type name for `ProductRegistered`.
pub const PRODUCT_REGISTERED_EVENT_TYPE: &str = "product.registered";
/// Event type name for `ProductRenamed`.
pub const PRODUCT_RENAMED_EVENT_TYPE: &str = "product.renamed";
/// Event type name for `ProductRedescribed`.
pub const PRODUCT_REDESCRIBED_EVENT_TYPE: &str = "product.redescribed";
/// Event type name for `ProductRetired`.
pub const PRODUCT_RETIRED_EVENT_TYPE: &str = "product.retired";

/// Emitted when a product enters the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRegistered {
    /// The product identifier.
    pub product_id: Uuid,
    /// Initial name.
    pub name: String,
    /// Initial description.
    pub description: String,
    /// The product's SKU.
    pub sku: SkuId,
}

/// Emitted when a product's name changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRenamed {
    /// The product identifier.
    pub product_id: Uuid,
    /// The new name.
    pub name: String,
}

/// Emitted when a product's description changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRedescribed {
    /// The product identifier.
    pub product_id: Uuid,
    /// The new description.
    pub description: String,
}

/// Emitted when a product is retired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRetired {
    /// The product identifier.
    pub product_id: Uuid,
}

/// Event payload variants for the Product context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEventKind {
    /// A product has been registered.
    ProductRegistered(ProductRegistered),
    /// A product has been renamed.
    ProductRenamed(ProductRenamed),
    /// A product has been re-described.
    ProductRedescribed(ProductRedescribed),
    /// A product has been retired.
    ProductRetired(ProductRetired),
}

impl ProductEventKind {
    /// The type name stored alongside this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ProductRegistered(_) => PRODUCT_REGISTERED_EVENT_TYPE,
            Self::ProductRenamed(_) => PRODUCT_RENAMED_EVENT_TYPE,
            Self::ProductRedescribed(_) => PRODUCT_REDESCRIBED_EVENT_TYPE,
            Self::ProductRetired(_) => PRODUCT_RETIRED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Product context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ProductEventKind,
}

impl ProductEvent {
    /// Rebuilds a typed event from its stored form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the payload does not
    /// deserialize or does not match the stored event type.
    pub fn from_stored(stored: &StoredEvent) -> Result<Self, DomainError> {
        let kind: ProductEventKind = serde_json::from_value(stored.payload.clone())
            .map_err(|e| DomainError::Infrastructure(format!("event deserialization failed: {e}")))?;
        if kind.event_type() != stored.event_type {
            return Err(DomainError::Infrastructure(format!(
                "event {} has type {} but payload {}",
                stored.event_id,
                stored.event_type,
                kind.event_type()
            )));
        }
        Ok(Self {
            metadata: EventMetadata {
                event_id: stored.event_id,
                event_type: stored.event_type.clone(),
                aggregate_id: stored.aggregate_id,
                sequence_number: stored.sequence_number,
                correlation_id: stored.correlation_id,
                causation_id: stored.causation_id,
                occurred_at: stored.occurred_at,
            },
            kind,
        })
    }
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("ProductEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
