//! Aggregate roots for the Product context.

use catalog_core::aggregate::AggregateRoot;
use catalog_core::clock::Clock;
use catalog_core::error::{DomainError, FieldViolation};
use catalog_core::event::EventMetadata;
use catalog_core::id::IdGenerator;
use uuid::Uuid;

use super::events::{
    ProductEvent, ProductEventKind, ProductRedescribed, ProductRegistered, ProductRenamed,
    ProductRetired,
};
use super::lifecycle::ProductStatus;
use super::sku::SkuId;

/// Ambient inputs every recorded event needs.
#[derive(Clone, Copy)]
pub struct EventContext<'a> {
    /// Correlation ID of the command being handled.
    pub correlation_id: Uuid,
    /// Source of `occurred_at`.
    pub clock: &'a dyn Clock,
    /// Source of aggregate and event ids.
    pub ids: &'a dyn IdGenerator,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// The aggregate root for a catalog product.
#[derive(Debug)]
pub struct Product {
    /// Assigned once at registration.
    id: Uuid,
    /// Committed version (persisted event count).
    pub(crate) version: i64,
    name: String,
    description: String,
    sku: SkuId,
    status: ProductStatus,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<ProductEvent>,
}

impl Product {
    /// Registers a new product with a freshly generated id.
    ///
    /// All three inputs are validated before anything is recorded; every
    /// failing field is reported in the one error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming each blank field.
    pub fn create(
        name: &str,
        description: &str,
        sku: &str,
        ctx: EventContext<'_>,
    ) -> Result<Self, DomainError> {
        let mut violations = Vec::new();
        if is_blank(name) {
            violations.push(FieldViolation::blank("name"));
        }
        if is_blank(description) {
            violations.push(FieldViolation::blank("description"));
        }
        let sku = SkuId::new(sku).map_err(FieldViolation::from);
        let sku = match sku {
            Ok(sku) if violations.is_empty() => sku,
            Ok(_) => return Err(DomainError::Validation(violations)),
            Err(violation) => {
                violations.push(violation);
                return Err(DomainError::Validation(violations));
            }
        };

        let id = ctx.ids.next_id();
        let mut product = Self {
            id,
            version: 0,
            name: name.to_owned(),
            description: description.to_owned(),
            sku: sku.clone(),
            status: ProductStatus::Active,
            uncommitted_events: Vec::new(),
        };
        product.record(
            ProductEventKind::ProductRegistered(ProductRegistered {
                product_id: id,
                name: name.to_owned(),
                description: description.to_owned(),
                sku,
            }),
            ctx,
        );
        Ok(product)
    }

    /// Rebuilds a product from its persisted history.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateNotFound` if `history` is empty and
    /// `DomainError::Infrastructure` if it does not begin with a registration.
    pub fn from_history(id: Uuid, history: &[ProductEvent]) -> Result<Self, DomainError> {
        let Some((first, rest)) = history.split_first() else {
            return Err(DomainError::AggregateNotFound(id));
        };
        let ProductEventKind::ProductRegistered(registered) = &first.kind else {
            return Err(DomainError::Infrastructure(format!(
                "event stream for product {id} does not start with a registration"
            )));
        };
        let mut product = Self {
            id,
            version: 1,
            name: registered.name.clone(),
            description: registered.description.clone(),
            sku: registered.sku.clone(),
            status: ProductStatus::Active,
            uncommitted_events: Vec::new(),
        };
        for event in rest {
            product.apply(event);
        }
        Ok(product)
    }

    /// Aggregate identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The SKU assigned at registration.
    #[must_use]
    pub fn sku(&self) -> &SkuId {
        &self.sku
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> ProductStatus {
        self.status
    }

    /// Replaces the name. Setting the current name again records nothing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::IllegalState` if the product is retired and
    /// `DomainError::Validation` if `new_name` is blank.
    pub fn update_name(&mut self, new_name: &str, ctx: EventContext<'_>) -> Result<(), DomainError> {
        self.ensure_mutable("rename")?;
        if is_blank(new_name) {
            return Err(DomainError::Validation(vec![FieldViolation::blank("name")]));
        }
        if self.name == new_name {
            return Ok(());
        }
        self.record(
            ProductEventKind::ProductRenamed(ProductRenamed {
                product_id: self.id,
                name: new_name.to_owned(),
            }),
            ctx,
        );
        Ok(())
    }

    /// Replaces the description. Setting the current text again records
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::IllegalState` if the product is retired and
    /// `DomainError::Validation` if `new_description` is blank.
    pub fn update_description(
        &mut self,
        new_description: &str,
        ctx: EventContext<'_>,
    ) -> Result<(), DomainError> {
        self.ensure_mutable("redescribe")?;
        if is_blank(new_description) {
            return Err(DomainError::Validation(vec![FieldViolation::blank(
                "description",
            )]));
        }
        if self.description == new_description {
            return Ok(());
        }
        self.record(
            ProductEventKind::ProductRedescribed(ProductRedescribed {
                product_id: self.id,
                description: new_description.to_owned(),
            }),
            ctx,
        );
        Ok(())
    }

    /// Retires the product. Retiring twice is always an error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::IllegalState` unless the product is active.
    pub fn retire(&mut self, ctx: EventContext<'_>) -> Result<(), DomainError> {
        if !self.status.can_retire() {
            return Err(self.illegal("retire"));
        }
        self.record(
            ProductEventKind::ProductRetired(ProductRetired {
                product_id: self.id,
            }),
            ctx,
        );
        Ok(())
    }

    fn ensure_mutable(&self, operation: &'static str) -> Result<(), DomainError> {
        if self.status.can_mutate() {
            Ok(())
        } else {
            Err(self.illegal(operation))
        }
    }

    fn illegal(&self, operation: &'static str) -> DomainError {
        DomainError::IllegalState {
            aggregate_id: self.id,
            state: self.status.as_str(),
            operation,
        }
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    /// Applies `kind` to in-memory state and queues it for persistence.
    fn record(&mut self, kind: ProductEventKind, ctx: EventContext<'_>) {
        let event = ProductEvent {
            metadata: EventMetadata {
                event_id: ctx.ids.next_id(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id: ctx.correlation_id,
                causation_id: ctx.correlation_id,
                occurred_at: ctx.clock.now(),
            },
            kind,
        };
        self.mutate(&event.kind);
        self.uncommitted_events.push(event);
    }

    fn mutate(&mut self, kind: &ProductEventKind) {
        match kind {
            ProductEventKind::ProductRegistered(payload) => {
                self.name.clone_from(&payload.name);
                self.description.clone_from(&payload.description);
                self.sku = payload.sku.clone();
                self.status = ProductStatus::Active;
            }
            ProductEventKind::ProductRenamed(payload) => {
                self.name.clone_from(&payload.name);
            }
            ProductEventKind::ProductRedescribed(payload) => {
                self.description.clone_from(&payload.description);
            }
            ProductEventKind::ProductRetired(_) => {
                self.status = ProductStatus::Retired;
            }
        }
    }
}

impl AggregateRoot for Product {
    type Event = ProductEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.mutate(&event.kind);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    #[allow(clippy::cast_possible_wrap)]
    fn mark_committed(&mut self) {
        self.version += self.uncommitted_events.len() as i64;
        self.uncommitted_events.clear();
    }
}
