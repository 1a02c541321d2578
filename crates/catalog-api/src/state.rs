//! Shared application state.

use std::sync::Arc;

use catalog_core::clock::Clock;
use catalog_core::id::IdGenerator;
use catalog_core::repository::EventRepository;
use catalog_products::read_model::ProductReadRepository;
use tokio::sync::Notify;

use crate::config::ServiceRole;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Timestamp source for recorded events.
    pub clock: Arc<dyn Clock>,
    /// Identifier source for new products and events.
    pub ids: Arc<dyn IdGenerator>,
    /// Write-side event store.
    pub event_repository: Arc<dyn EventRepository>,
    /// Query-side product views.
    pub read_model: Arc<dyn ProductReadRepository>,
    /// The half of the catalog this process serves.
    pub role: ServiceRole,
    projection_waker: Option<Arc<Notify>>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        event_repository: Arc<dyn EventRepository>,
        read_model: Arc<dyn ProductReadRepository>,
        role: ServiceRole,
    ) -> Self {
        Self {
            clock,
            ids,
            event_repository,
            read_model,
            role,
            projection_waker: None,
        }
    }

    /// Lets command handlers wake an in-process projection worker.
    #[must_use]
    pub fn with_projection_waker(mut self, waker: Arc<Notify>) -> Self {
        self.projection_waker = Some(waker);
        self
    }

    /// Signals that new events were committed.
    pub fn nudge_projection(&self) {
        if let Some(waker) = &self.projection_waker {
            waker.notify_one();
        }
    }
}
