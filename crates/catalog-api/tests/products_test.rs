//! Integration tests for the product catalog routes.

mod common;

use axum::http::{StatusCode, header};
use catalog_api::config::ServiceRole;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_register_then_get_round_trip() {
    // Arrange
    let app = common::build_test_app(ServiceRole::Combined);

    // Act
    let created = common::send(
        &app,
        "POST",
        "/api/products",
        Some(&json!({
            "name": "Laptop",
            "description": "Gaming Laptop",
            "sku": "  ABC-12345  "
        })),
    )
    .await;
    app.sync().await;

    // Assert
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_str().unwrap();
    assert_eq!(
        created.headers[header::LOCATION].to_str().unwrap(),
        format!("/api/products/{id}")
    );

    let fetched = common::send(&app, "GET", &format!("/api/products/{id}"), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["id"], id);
    assert_eq!(fetched.body["name"], "Laptop");
    assert_eq!(fetched.body["description"], "Gaming Laptop");
    assert_eq!(fetched.body["sku"], "ABC-12345");
    assert_eq!(fetched.body["status"], "ACTIVE");
    assert_eq!(fetched.body["version"], 1);
}

#[tokio::test]
async fn test_read_model_lags_until_projection_runs() {
    let app = common::build_test_app(ServiceRole::Combined);
    let id = common::register(&app, "Laptop", "ABC-12345").await;

    let before = common::send(&app, "GET", &format!("/api/products/{id}"), None).await;
    app.sync().await;
    let after = common::send(&app, "GET", &format!("/api/products/{id}"), None).await;

    assert_eq!(before.status, StatusCode::NOT_FOUND);
    assert_eq!(after.status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_with_blank_fields_reports_each_field() {
    let app = common::build_test_app(ServiceRole::Combined);

    let response = common::send(
        &app,
        "POST",
        "/api/products",
        Some(&json!({ "name": "   ", "description": "Gaming Laptop", "sku": "" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "validation_error");
    let fields: Vec<_> = response.body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "sku"]);
}

#[tokio::test]
async fn test_register_with_missing_fields_is_validation_error() {
    let app = common::build_test_app(ServiceRole::Combined);

    let response = common::send(&app, "POST", "/api/products", Some(&json!({}))).await;
    app.sync().await;
    let listing = common::send(&app, "GET", "/api/products", None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["fields"].as_array().unwrap().len(), 3);
    assert_eq!(listing.body["total"], 0);
}

#[tokio::test]
async fn test_register_without_body_is_validation_error() {
    let app = common::build_test_app(ServiceRole::Combined);

    let response = common::send_raw(&app, "POST", "/api/products", "").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "validation_error");
    assert!(response.body["message"].as_str().unwrap().contains("JSON"));
    assert!(response.body.get("fields").is_none());
}

#[tokio::test]
async fn test_updates_without_body_are_validation_errors() {
    // Arrange
    let app = common::build_test_app(ServiceRole::Combined);
    let id = common::register(&app, "Laptop", "ABC-12345").await;

    // Act
    let rename = common::send_raw(&app, "PATCH", &format!("/api/products/{id}/name"), "").await;
    let redescribe =
        common::send_raw(&app, "PATCH", &format!("/api/products/{id}/description"), "").await;
    app.sync().await;

    // Assert
    assert_eq!(rename.status, StatusCode::BAD_REQUEST);
    assert_eq!(rename.body["error"], "validation_error");
    assert_eq!(redescribe.status, StatusCode::BAD_REQUEST);
    assert_eq!(redescribe.body["error"], "validation_error");
    let fetched = common::send(&app, "GET", &format!("/api/products/{id}"), None).await;
    assert_eq!(fetched.body["version"], 1);
}

#[tokio::test]
async fn test_register_without_content_type_is_validation_error() {
    let app = common::build_test_app(ServiceRole::Combined);

    let response = common::send(&app, "POST", "/api/products", None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "validation_error");
}

#[tokio::test]
async fn test_rename_and_redescribe_update_the_view() {
    // Arrange
    let app = common::build_test_app(ServiceRole::Combined);
    let id = common::register(&app, "Laptop", "ABC-12345").await;

    // Act
    let renamed = common::send(
        &app,
        "PATCH",
        &format!("/api/products/{id}/name"),
        Some(&json!({ "name": "Workstation" })),
    )
    .await;
    let redescribed = common::send(
        &app,
        "PATCH",
        &format!("/api/products/{id}/description"),
        Some(&json!({ "description": "Quiet and fast" })),
    )
    .await;
    app.sync().await;

    // Assert
    assert_eq!(renamed.status, StatusCode::NO_CONTENT);
    assert_eq!(redescribed.status, StatusCode::NO_CONTENT);
    let fetched = common::send(&app, "GET", &format!("/api/products/{id}"), None).await;
    assert_eq!(fetched.body["name"], "Workstation");
    assert_eq!(fetched.body["description"], "Quiet and fast");
    assert_eq!(fetched.body["sku"], "ABC-12345");
    assert_eq!(fetched.body["version"], 3);
}

#[tokio::test]
async fn test_rename_with_blank_name_leaves_product_unchanged() {
    let app = common::build_test_app(ServiceRole::Combined);
    let id = common::register(&app, "Laptop", "ABC-12345").await;

    let response = common::send(
        &app,
        "PATCH",
        &format!("/api/products/{id}/name"),
        Some(&json!({ "name": "" })),
    )
    .await;
    app.sync().await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["fields"][0]["field"], "name");
    let fetched = common::send(&app, "GET", &format!("/api/products/{id}"), None).await;
    assert_eq!(fetched.body["name"], "Laptop");
    assert_eq!(fetched.body["version"], 1);
}

#[tokio::test]
async fn test_retire_then_retire_again_is_conflict() {
    // Arrange
    let app = common::build_test_app(ServiceRole::Combined);
    let id = common::register(&app, "Laptop", "ABC-12345").await;
    let uri = format!("/api/products/{id}");

    // Act
    let first = common::send(&app, "DELETE", &uri, None).await;
    let second = common::send(&app, "DELETE", &uri, None).await;
    app.sync().await;

    // Assert
    assert_eq!(first.status, StatusCode::NO_CONTENT);
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["error"], "illegal_lifecycle_state");
    let fetched = common::send(&app, "GET", &uri, None).await;
    assert_eq!(fetched.body["status"], "RETIRED");
}

#[tokio::test]
async fn test_retired_product_rejects_changes() {
    let app = common::build_test_app(ServiceRole::Combined);
    let id = common::register(&app, "Laptop", "ABC-12345").await;
    common::send(&app, "DELETE", &format!("/api/products/{id}"), None).await;

    let rename = common::send(
        &app,
        "PATCH",
        &format!("/api/products/{id}/name"),
        Some(&json!({ "name": "Workstation" })),
    )
    .await;
    let redescribe = common::send(
        &app,
        "PATCH",
        &format!("/api/products/{id}/description"),
        Some(&json!({ "description": "" })),
    )
    .await;

    assert_eq!(rename.status, StatusCode::CONFLICT);
    assert_eq!(redescribe.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_commands_on_unknown_product_return_404() {
    let app = common::build_test_app(ServiceRole::Combined);
    let unknown = Uuid::new_v4();

    let retire = common::send(&app, "DELETE", &format!("/api/products/{unknown}"), None).await;
    let rename = common::send(
        &app,
        "PATCH",
        &format!("/api/products/{unknown}/name"),
        Some(&json!({ "name": "Laptop" })),
    )
    .await;

    assert_eq!(retire.status, StatusCode::NOT_FOUND);
    assert_eq!(retire.body["error"], "not_found");
    assert_eq!(rename.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_with_unknown_or_malformed_id_returns_404() {
    let app = common::build_test_app(ServiceRole::Combined);

    let unknown = common::send(
        &app,
        "GET",
        &format!("/api/products/{}", Uuid::new_v4()),
        None,
    )
    .await;
    let malformed = common::send(&app, "GET", "/api/products/not-a-uuid", None).await;

    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_by_sku_returns_exact_matches_only() {
    let app = common::build_test_app(ServiceRole::Combined);
    common::register(&app, "Mouse", "MSE-001").await;
    let id = common::register(&app, "Laptop", "ABC-12345").await;
    common::register(&app, "Lower", "abc-12345").await;
    app.sync().await;

    let response = common::send(&app, "GET", "/api/products?sku=ABC-12345", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["products"][0]["id"], id);
}

#[tokio::test]
async fn test_blank_sku_parameter_lists_all_products() {
    let app = common::build_test_app(ServiceRole::Combined);
    common::register(&app, "Mouse", "MSE-001").await;
    common::register(&app, "Laptop", "ABC-12345").await;
    app.sync().await;

    let empty = common::send(&app, "GET", "/api/products?sku=", None).await;
    let spaces = common::send(&app, "GET", "/api/products?sku=%20%20", None).await;

    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body["total"], 2);
    assert_eq!(spaces.body["total"], 2);
}

#[tokio::test]
async fn test_duplicate_sku_is_accepted() {
    let app = common::build_test_app(ServiceRole::Combined);
    common::register(&app, "Laptop", "DUP-1").await;
    common::register(&app, "Laptop Mk II", "DUP-1").await;
    app.sync().await;

    let response = common::send(&app, "GET", "/api/products?sku=DUP-1", None).await;

    assert_eq!(response.body["total"], 2);
    assert_eq!(response.body["products"][0]["name"], "Laptop");
    assert_eq!(response.body["products"][1]["name"], "Laptop Mk II");
}

#[tokio::test]
async fn test_search_pages_in_registration_order() {
    // Arrange
    let app = common::build_test_app(ServiceRole::Combined);
    for n in 0..12 {
        common::register(&app, &format!("Product {n}"), &format!("SKU-{n}")).await;
    }
    app.sync().await;

    // Act
    let first = common::send(&app, "GET", "/api/products", None).await;
    let second = common::send(&app, "GET", "/api/products?page=1", None).await;
    let small = common::send(&app, "GET", "/api/products?page=2&size=5", None).await;

    // Assert
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["page"], 0);
    assert_eq!(first.body["size"], 10);
    assert_eq!(first.body["total"], 12);
    assert_eq!(first.body["products"].as_array().unwrap().len(), 10);
    assert_eq!(first.body["products"][0]["name"], "Product 0");
    assert_eq!(second.body["products"].as_array().unwrap().len(), 2);
    assert_eq!(second.body["products"][0]["name"], "Product 10");
    assert_eq!(small.body["products"].as_array().unwrap().len(), 2);
    assert_eq!(small.body["products"][0]["name"], "Product 10");
}

#[tokio::test]
async fn test_command_role_does_not_serve_queries() {
    let app = common::build_test_app(ServiceRole::Command);
    let id = common::register(&app, "Laptop", "ABC-12345").await;

    let listing = common::send(&app, "GET", "/api/products", None).await;
    let fetched = common::send(&app, "GET", &format!("/api/products/{id}"), None).await;

    assert_eq!(listing.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(fetched.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_query_role_does_not_accept_commands() {
    let app = common::build_test_app(ServiceRole::Query);

    let response = common::send(
        &app,
        "POST",
        "/api/products",
        Some(&json!({ "name": "Laptop", "description": "Gaming Laptop", "sku": "ABC-12345" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}
