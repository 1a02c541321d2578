//! Routes for the Product catalog.
//!
//! Command routes write to the event store and return once the events are
//! committed; query routes read the projected view, which may lag behind.

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use catalog_products::application::{command_handlers, query_handlers};
use catalog_products::domain::commands;
use catalog_products::read_model::{PageRequest, ProductFilter, ProductPage, ProductView};

use crate::config::ServiceRole;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

const COLLECTION: &str = "/api/products";
const MEMBER: &str = "/api/products/{id}";

/// Request body for POST /api/products.
///
/// Missing fields deserialize as blank and are rejected by validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterProductRequest {
    /// Display name.
    pub name: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Stock keeping unit.
    pub sku: Option<String>,
}

/// Request body for PATCH /api/products/{id}/name.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenameProductRequest {
    /// The new name.
    pub name: Option<String>,
}

/// Request body for PATCH /api/products/{id}/description.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RedescribeProductRequest {
    /// The new description.
    pub description: Option<String>,
}

/// Query string for GET /api/products.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Exact SKU to match.
    pub sku: Option<String>,
    /// Zero-based page index.
    pub page: Option<u32>,
    /// Page size.
    pub size: Option<u32>,
}

/// Response body for a registered product.
#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    /// The new product's identifier.
    pub id: Uuid,
}

fn product_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::UnknownProduct(raw.to_owned()))
}

/// POST /api/products
#[instrument(skip_all)]
async fn register_product(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = commands::RegisterProduct {
        correlation_id: Uuid::new_v4(),
        name: request.name.unwrap_or_default(),
        description: request.description.unwrap_or_default(),
        sku: request.sku.unwrap_or_default(),
    };

    info!(correlation_id = %command.correlation_id, "handling register_product command");

    let result = command_handlers::handle_register_product(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        &*state.event_repository,
    )
    .await?;
    state.nudge_projection();

    let id = result.aggregate_id;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("{COLLECTION}/{id}"))],
        Json(RegisteredResponse { id }),
    ))
}

/// PATCH /api/products/{id}/name
#[instrument(skip(state, request))]
async fn rename_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<RenameProductRequest>,
) -> Result<StatusCode, ApiError> {
    let command = commands::RenameProduct {
        correlation_id: Uuid::new_v4(),
        product_id: product_id(&id)?,
        name: request.name.unwrap_or_default(),
    };

    info!(correlation_id = %command.correlation_id, "handling rename_product command");

    command_handlers::handle_rename_product(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        &*state.event_repository,
    )
    .await?;
    state.nudge_projection();

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/products/{id}/description
#[instrument(skip(state, request))]
async fn redescribe_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<RedescribeProductRequest>,
) -> Result<StatusCode, ApiError> {
    let command = commands::RedescribeProduct {
        correlation_id: Uuid::new_v4(),
        product_id: product_id(&id)?,
        description: request.description.unwrap_or_default(),
    };

    info!(correlation_id = %command.correlation_id, "handling redescribe_product command");

    command_handlers::handle_redescribe_product(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        &*state.event_repository,
    )
    .await?;
    state.nudge_projection();

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/products/{id}
///
/// Retires the product; its history and read view are kept. An unknown id
/// answers 404 `not_found`, where the earlier catalog service answered 400.
#[instrument(skip(state))]
async fn retire_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let command = commands::RetireProduct {
        correlation_id: Uuid::new_v4(),
        product_id: product_id(&id)?,
    };

    info!(correlation_id = %command.correlation_id, "handling retire_product command");

    command_handlers::handle_retire_product(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        &*state.event_repository,
    )
    .await?;
    state.nudge_projection();

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/products
#[instrument(skip(state))]
async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ProductPage>, ApiError> {
    // `?sku=` with nothing after it lists everything.
    let filter = ProductFilter {
        sku: params.sku.filter(|sku| !sku.trim().is_empty()),
    };
    let page = PageRequest::new(params.page, params.size);
    let result = query_handlers::search_products(&filter, page, &*state.read_model).await?;
    Ok(Json(result))
}

/// GET /api/products/{id}
#[instrument(skip(state))]
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    let view = query_handlers::get_product_by_id(product_id(&id)?, &*state.read_model).await?;
    Ok(Json(view))
}

/// Returns the product routes this role serves.
pub fn router(role: ServiceRole) -> Router<AppState> {
    let mut router = Router::new();
    if role.serves_commands() {
        router = router
            .route(COLLECTION, post(register_product))
            .route(MEMBER, delete(retire_product))
            .route("/api/products/{id}/name", patch(rename_product))
            .route("/api/products/{id}/description", patch(redescribe_product));
    }
    if role.serves_queries() {
        router = router
            .route(COLLECTION, get(search_products))
            .route(MEMBER, get(get_product));
    }
    router
}
