mod common;

use axum::http::StatusCode;
use common::{InMemoryStore, create_test_app, create_test_app_with_store};

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = create_test_app().await;
    let server = app.server();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["broker"]["status"], "ok");
    assert_eq!(
        json["checks"]["broker"]["message"],
        "Running, listeners: recency-cache, store-listener"
    );
    assert_eq!(json["checks"]["cache"]["status"], "ok");

    app.stop().await;
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let app = create_test_app().await;
    let server = app.server();

    let response = server.get("/health").await;

    let json = response.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json.get("checks").is_some());
    assert!(json["checks"].get("database").is_some());
    assert!(json["checks"].get("broker").is_some());
    assert!(json["checks"].get("cache").is_some());

    app.stop().await;
}

#[tokio::test]
async fn test_health_degraded_when_database_unreachable() {
    let store = InMemoryStore::new();
    store.set_unhealthy();
    let app = create_test_app_with_store(store).await;
    let server = app.server();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["database"]["status"], "error");

    app.stop().await;
}

#[tokio::test]
async fn test_health_degraded_when_broker_stopped() {
    let app = create_test_app().await;
    let server = app.server();

    app.broker.shutdown();
    let broker = app.broker.clone();
    common::wait_for(|| !broker.is_running()).await;

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["checks"]["broker"]["status"], "error");

    app.stop().await;
}
