mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{create_test_app, identity_cookie, wait_for};
use serde_json::json;

#[tokio::test]
async fn test_forget_requires_identity() {
    let app = create_test_app().await;
    let server = app.server();

    let response = server.post("/forget").await;

    response.assert_status(StatusCode::FORBIDDEN);

    app.stop().await;
}

#[tokio::test]
async fn test_forget_expires_identity_and_clears_recents() {
    let app = create_test_app().await;
    let server = app.server();

    let minted = server.get("/cookie").await.header("set-cookie");
    let id = minted
        .to_str()
        .unwrap()
        .trim_start_matches("downloadkubernetes=")
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let store = app.store.clone();
    wait_for(|| store.users.lock().len() == 1).await;

    server
        .post("/link-copied")
        .add_header("Cookie", identity_cookie(&id))
        .json(&json!({ "url": "https://dl.k8s.io/kubectl" }))
        .await
        .assert_status_ok();
    let recents = app.recents.clone();
    let user_id = id.clone();
    wait_for(move || !recents.recents(&user_id).is_empty()).await;

    let response = server
        .post("/forget")
        .add_header("Cookie", identity_cookie(&id))
        .await;

    response.assert_status_ok();
    let cookie = response.header("set-cookie");
    assert!(cookie.to_str().unwrap().contains("Max-Age=0"));

    wait_for(|| store.identity_actions() == vec!["created", "expired"]).await;
    assert!(store.user(&id).unwrap().is_expired_at(Utc::now()));
    assert!(app.recents.recents(&id).is_empty());

    app.stop().await;
}
