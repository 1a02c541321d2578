//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use catalog_api::config::ServiceRole;
use catalog_api::state::AppState;
use catalog_event_store::in_memory_event_repository::InMemoryEventRepository;
use catalog_products::application::projection::ProductProjector;
use catalog_products::application::worker::{ProjectionWorker, WorkerConfig};
use catalog_products::read_model::InMemoryProductReadRepository;
use catalog_test_support::{FixedClock, SequentialIdGenerator};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// An app wired to in-memory stores whose projection runs only on demand.
pub struct TestApp {
    pub router: Router,
    pub worker: Arc<ProjectionWorker>,
}

impl TestApp {
    /// Projects everything committed so far into the read model.
    pub async fn sync(&self) {
        self.worker.catch_up().await.unwrap();
    }
}

/// A captured response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// Build the app router for `role` with a deterministic clock and ids.
pub fn build_test_app(role: ServiceRole) -> TestApp {
    let events = Arc::new(InMemoryEventRepository::new());
    let read_model = Arc::new(InMemoryProductReadRepository::new());
    let worker = Arc::new(ProjectionWorker::new(
        events.clone(),
        ProductProjector::new(read_model.clone()),
        WorkerConfig::default(),
    ));
    let app_state = AppState::new(
        Arc::new(FixedClock::standard()),
        Arc::new(SequentialIdGenerator::default()),
        events,
        read_model,
        role,
    );

    TestApp {
        router: catalog_api::build_router(app_state),
        worker,
    }
}

/// Send a request with an optional JSON body and capture the response.
pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    dispatch(app, request).await
}

/// Send a request declared as JSON whose body is `raw`, verbatim.
pub async fn send_raw(app: &TestApp, method: &str, uri: &str, raw: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(raw.to_owned()))
        .unwrap();
    dispatch(app, request).await
}

async fn dispatch(app: &TestApp, request: Request<Body>) -> TestResponse {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Register a product and return its id.
pub async fn register(app: &TestApp, name: &str, sku: &str) -> String {
    let response = send(
        app,
        "POST",
        "/api/products",
        Some(&serde_json::json!({
            "name": name,
            "description": format!("Description for {name}"),
            "sku": sku
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.body["id"].as_str().unwrap().to_owned()
}
