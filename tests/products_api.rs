#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use product_catalog::{
    api::{AppState, build_router, middleware::CORRELATION_ID_HEADER},
    config::Settings,
    repository::InMemoryProductRepository,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let settings = Settings::default();
    let state = AppState::new(Arc::new(InMemoryProductRepository::new()), "test");
    build_router(state, &settings).expect("router builds")
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_product_lifecycle() {
    let app = app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/products",
        Some(json!({"name": "Laptop", "price": 999.99, "stock": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Laptop");
    assert_eq!(created["stock"], 5);
    assert!(created["updated_at"].is_null());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/products",
        Some(json!({"name": "laptop", "price": 10.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "PRODUCT_NAME_ALREADY_EXISTS");
    assert_eq!(body["path"], "/api/v1/products");

    let (status, fetched) = send(&app, Method::GET, &format!("/api/v1/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, by_name) = send(&app, Method::GET, "/api/v1/products/by-name/LAPTOP", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_name["id"], created["id"]);

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/products/{id}"),
        Some(json!({"name": "Gaming Laptop"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Gaming Laptop");
    assert_eq!(updated["price"], 999.99);
    assert!(updated["updated_at"].is_string());

    let (status, body) = send(&app, Method::DELETE, &format!("/api/v1/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "PRODUCT_NOT_FOUND");
    assert_eq!(body["error"], "Application Service Error");
    assert_eq!(body["service"], "ProductService");
}

#[tokio::test]
async fn test_listing_respects_pagination() {
    let app = app();
    for i in 0..5 {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/products/",
            Some(json!({"name": format!("Item {i}"), "price": 1.5})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = send(&app, Method::GET, "/api/v1/products?skip=1&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = page
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Item 1", "Item 2"]);

    let (status, page) = send(&app, Method::GET, "/api/v1/products?skip=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page, json!([]));
}

#[tokio::test]
async fn test_create_trims_name() {
    let app = app();
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/products",
        Some(json!({"name": "  Desk  ", "price": 120.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Desk");
    assert_eq!(created["stock"], 0);
}

#[tokio::test]
async fn test_validation_errors() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/products",
        Some(json!({"name": "   ", "price": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    assert_eq!(body["errors"][0]["field"], "body.name");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/products",
        Some(json!({"name": "Chair"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "body.price");
    assert_eq!(body["errors"][0]["type"], "missing");

    let (status, body) = send(&app, Method::GET, "/api/v1/products/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "path.product_id");

    let (status, body) = send(&app, Method::GET, "/api/v1/products?limit=1001", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "query.limit");
    assert_eq!(body["path"], "/api/v1/products");
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "HTTP Exception");
    assert_eq!(body["error_code"], "NOT_FOUND");
    assert_eq!(body["path"], "/nowhere");

    let (status, body) = send(&app, Method::DELETE, "/api/v1/products", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error_code"], "HTTP_ERROR");
    assert_eq!(body["status_code"], 405);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app();
    for uri in ["/health", "/health/", "/api/v1/health"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], "test");
    }
}

#[tokio::test]
async fn test_correlation_id_is_echoed() {
    let app = app();
    let request = Request::builder()
        .uri("/health")
        .header(CORRELATION_ID_HEADER, "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()[CORRELATION_ID_HEADER], "abc-123");

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().contains_key(CORRELATION_ID_HEADER));
}

#[tokio::test]
async fn test_put_updates_supplied_fields() {
    let app = app();
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/v1/products",
        Some(json!({"name": "Lamp", "description": "desk lamp", "price": 25.0, "stock": 4})),
    )
    .await;
    let uri = format!("/api/v1/products/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"price": 30.0, "description": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Lamp");
    assert_eq!(updated["price"], 30.0);
    assert_eq!(updated["stock"], 4);
    assert!(updated["description"].is_null());
    assert!(updated["updated_at"].is_string());

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"stock": null}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "body.stock");
    assert_eq!(body["errors"][0]["type"], "none_forbidden");
}

#[tokio::test]
async fn test_type_errors_are_reported_per_field() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/products",
        Some(json!({"name": "Chair", "price": "abc", "stock": 1.5})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");

    let errors = body["errors"].as_array().unwrap();
    let fields: Vec<&str> = errors.iter().map(|e| e["field"].as_str().unwrap()).collect();
    assert_eq!(fields, ["body.price", "body.stock"]);
    assert!(errors.iter().all(|e| e["type"] == "type_error"));
}

#[tokio::test]
async fn test_oversized_body_keeps_transport_status() {
    let app = app();
    let description = "x".repeat(3 * 1024 * 1024);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/products",
        Some(json!({"name": "Huge", "price": 1.0, "description": description})),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "HTTP Exception");
    assert_eq!(body["error_code"], "HTTP_ERROR");
    assert_eq!(body["path"], "/api/v1/products");
}
