mod common;

use axum::http::StatusCode;
use common::{create_test_app, identity_cookie, wait_for};
use serde_json::json;

#[tokio::test]
async fn test_recents_requires_identity() {
    let app = create_test_app().await;
    let server = app.server();

    let response = server.get("/recent-downloads").await;

    response.assert_status(StatusCode::FORBIDDEN);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "forbidden");

    let response = server
        .get("/recent-downloads")
        .add_header("Cookie", "downloadkubernetes=")
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    app.stop().await;
}

#[tokio::test]
async fn test_recents_unknown_identity_is_empty() {
    let app = create_test_app().await;
    let server = app.server();

    let response = server
        .get("/recent-downloads")
        .add_header("Cookie", identity_cookie("NOBODY0001"))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!([]));

    app.stop().await;
}

#[tokio::test]
async fn test_recents_are_distinct_and_bounded() {
    let app = create_test_app().await;
    let server = app.server();

    let urls = ["a", "b", "a", "c", "d", "e", "f"]
        .map(|name| format!("https://dl.k8s.io/{name}"));
    for (i, url) in urls.iter().enumerate() {
        server
            .post("/link-copied")
            .add_header("Cookie", identity_cookie("USER000001"))
            .json(&json!({ "url": url }))
            .await
            .assert_status_ok();
        // Keep publish order equal to request order.
        let store = app.store.clone();
        wait_for(move || store.link_copies.lock().len() > i).await;
    }

    let response = server
        .get("/recent-downloads")
        .add_header("Cookie", identity_cookie("USER000001"))
        .await;

    response.assert_status_ok();
    // The ring holds the last five writes: a, c, d, e, f.
    response.assert_json(&json!([
        "https://dl.k8s.io/a",
        "https://dl.k8s.io/c",
        "https://dl.k8s.io/d",
        "https://dl.k8s.io/e",
        "https://dl.k8s.io/f",
    ]));

    app.stop().await;
}
