mod common;

use axum::http::StatusCode;
use common::{create_test_app, identity_cookie, wait_for};
use serde_json::json;

const KUBECTL: &str = "https://dl.k8s.io/v1.30.0/bin/linux/amd64/kubectl";

#[tokio::test]
async fn test_link_copied_with_identity() {
    let app = create_test_app().await;
    let server = app.server();

    let response = server
        .post("/link-copied")
        .add_header("Cookie", identity_cookie("USER000001"))
        .json(&json!({ "url": KUBECTL }))
        .await;

    response.assert_status_ok();
    assert!(response.text().is_empty());

    let recents = app.recents.clone();
    wait_for(|| recents.recents("USER000001") == vec![KUBECTL.to_string()]).await;

    let store = app.store.clone();
    wait_for(|| store.link_copies.lock().len() == 1).await;
    assert_eq!(store.link_copies.lock()[0].user_id, "USER000001");

    app.stop().await;
}

#[tokio::test]
async fn test_link_copied_without_identity_is_anonymous() {
    let app = create_test_app().await;
    let server = app.server();

    let response = server
        .post("/link-copied")
        .json(&json!({ "url": KUBECTL }))
        .await;

    response.assert_status_ok();

    let store = app.store.clone();
    wait_for(|| store.link_copies.lock().len() == 1).await;
    assert!(store.link_copies.lock()[0].is_anonymous());

    app.stop().await;
}

#[tokio::test]
async fn test_link_copied_accepts_uppercase_field() {
    let app = create_test_app().await;
    let server = app.server();

    let response = server
        .post("/link-copied")
        .json(&json!({ "URL": KUBECTL }))
        .await;

    response.assert_status_ok();

    app.stop().await;
}

#[tokio::test]
async fn test_link_copied_invalid_url() {
    let app = create_test_app().await;
    let server = app.server();

    let response = server
        .post("/link-copied")
        .json(&json!({ "url": "not a url" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");

    app.stop().await;
}

#[tokio::test]
async fn test_link_copied_malformed_body() {
    let app = create_test_app().await;
    let server = app.server();

    let response = server
        .post("/link-copied")
        .text("{not json")
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.post("/link-copied").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(app.store.link_copies.lock().is_empty());

    app.stop().await;
}

#[tokio::test]
async fn test_link_copied_rejects_get() {
    let app = create_test_app().await;
    let server = app.server();

    let response = server.get("/link-copied").await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);

    app.stop().await;
}
