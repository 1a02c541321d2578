//! In-process product read model.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use catalog_core::error::DomainError;
use uuid::Uuid;

use super::{PageRequest, ProductFilter, ProductPage, ProductReadRepository, ProductView};

#[derive(Debug, Default)]
struct Store {
    views: HashMap<Uuid, ProductView>,
    registration_order: Vec<Uuid>,
}

/// A `ProductReadRepository` held in memory behind a `RwLock`.
///
/// Readers share the lock with the projection only; command handling never
/// touches it.
#[derive(Debug, Default)]
pub struct InMemoryProductReadRepository {
    store: RwLock<Store>,
}

impl InMemoryProductReadRepository {
    /// Creates an empty read model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> DomainError {
    DomainError::Infrastructure("read model lock poisoned".into())
}

#[async_trait]
impl ProductReadRepository for InMemoryProductReadRepository {
    async fn upsert(&self, view: ProductView) -> Result<(), DomainError> {
        let mut store = self.store.write().map_err(|_| poisoned())?;
        if !store.views.contains_key(&view.id) {
            store.registration_order.push(view.id);
        }
        store.views.insert(view.id, view);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let store = self.store.read().map_err(|_| poisoned())?;
        Ok(store.views.get(&id).cloned())
    }

    async fn search(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<ProductPage, DomainError> {
        let store = self.store.read().map_err(|_| poisoned())?;
        let matching: Vec<&ProductView> = store
            .registration_order
            .iter()
            .filter_map(|id| store.views.get(id))
            .filter(|view| filter.matches(view))
            .collect();
        let products = matching
            .iter()
            .skip(page.offset())
            .take(page.size as usize)
            .map(|view| (*view).clone())
            .collect();

        Ok(ProductPage {
            page: page.page,
            size: page.size,
            total: matching.len(),
            products,
        })
    }
}
