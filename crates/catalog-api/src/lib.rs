//! HTTP transport for the product catalog.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the application router for the state's role, without middleware.
pub fn build_router(state: AppState) -> Router {
    let role = state.role;
    Router::new()
        .merge(routes::health::router())
        .merge(routes::products::router(role))
        .with_state(state)
}
