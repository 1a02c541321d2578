//! Query model for the Product context.
//!
//! The read model is a denormalized copy of committed product state. It is
//! never the source of truth and may lag the event store.

mod in_memory;

use async_trait::async_trait;
use catalog_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::lifecycle::ProductStatus;

pub use in_memory::InMemoryProductReadRepository;

/// Page index used when the caller does not give one.
pub const DEFAULT_PAGE: u32 = 0;
/// Page size used when the caller does not give one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page a single search returns.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Read-only view of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    /// The product identifier.
    pub id: Uuid,
    /// Current name.
    pub name: String,
    /// Current description.
    pub description: String,
    /// The SKU text.
    pub sku: String,
    /// Lifecycle state.
    pub status: ProductStatus,
    /// Sequence number of the last event folded into this view.
    pub version: i64,
}

/// Search criteria. An absent SKU matches every product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilter {
    /// Exact, case-sensitive SKU to match.
    pub sku: Option<String>,
}

impl ProductFilter {
    /// Filter on an exact SKU.
    #[must_use]
    pub fn by_sku(sku: impl Into<String>) -> Self {
        Self {
            sku: Some(sku.into()),
        }
    }

    /// Whether `view` satisfies this filter.
    #[must_use]
    pub fn matches(&self, view: &ProductView) -> bool {
        self.sku.as_deref().is_none_or(|sku| view.sku == sku)
    }
}

/// Zero-based page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    /// Items per page, within `1..=MAX_PAGE_SIZE`.
    pub size: u32,
}

impl PageRequest {
    /// Builds a page request, defaulting missing values and clamping `size`
    /// into `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn new(page: Option<u32>, size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of matching items that precede this page.
    #[must_use]
    pub fn offset(self) -> usize {
        (self.page as usize).saturating_mul(self.size as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPage {
    /// Zero-based page index that was requested.
    pub page: u32,
    /// Effective page size.
    pub size: u32,
    /// Number of products matching the filter across all pages.
    pub total: usize,
    /// The products on this page, in registration order.
    pub products: Vec<ProductView>,
}

/// Storage for the product read model.
///
/// Implementations keep products in registration order so unfiltered search
/// results are stable for a fixed data set.
#[async_trait]
pub trait ProductReadRepository: Send + Sync {
    /// Inserts or replaces the view with `view.id`. A first insert places
    /// the product at the end of the registration order.
    async fn upsert(&self, view: ProductView) -> Result<(), DomainError>;

    /// Looks up a single product. Absence is `Ok(None)`.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError>;

    /// Returns the requested page of products matching `filter`.
    async fn search(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<ProductPage, DomainError>;
}
