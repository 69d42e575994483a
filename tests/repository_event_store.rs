//! PostgreSQL event store tests.
//!
//! Need a database: `DATABASE_URL=postgres://... cargo test -- --ignored`

use chrono::{Duration, Utc};
use copy_recents::domain::entities::User;
use copy_recents::domain::events::{IdentityEvent, LinkCopyEvent};
use copy_recents::domain::repositories::EventStore;
use copy_recents::error::AppError;
use copy_recents::infrastructure::persistence::PgEventStore;
use sqlx::PgPool;
use std::sync::Arc;

fn active_user(id: &str) -> User {
    let now = Utc::now();
    User::new(id, now, now + Duration::days(30))
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_save_user(pool: PgPool) {
    let repo = PgEventStore::new(Arc::new(pool.clone()));

    repo.save_user(&active_user("USER000001")).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = $1")
        .bind("USER000001")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_save_user_twice_fails(pool: PgPool) {
    let repo = PgEventStore::new(Arc::new(pool));
    let user = active_user("USER000001");

    repo.save_user(&user).await.unwrap();
    let result = repo.save_user(&user).await;

    assert!(matches!(result, Err(AppError::Database(_))));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_expire_user(pool: PgPool) {
    let repo = PgEventStore::new(Arc::new(pool));
    repo.save_user(&active_user("USER000001")).await.unwrap();

    repo.expire_user("USER000001").await.unwrap();

    assert!(repo.list_active_users().await.unwrap().is_empty());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_list_all_users_includes_expired(pool: PgPool) {
    let repo = PgEventStore::new(Arc::new(pool));
    repo.save_user(&active_user("USER000001")).await.unwrap();
    repo.save_user(&active_user("USER000002")).await.unwrap();
    repo.expire_user("USER000001").await.unwrap();

    let users = repo.list_all_users().await.unwrap();
    let now = Utc::now();

    assert_eq!(users.len(), 2);
    let expired: Vec<_> = users.iter().filter(|u| u.is_expired_at(now)).collect();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, "USER000001");
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_expire_unknown_user(pool: PgPool) {
    let repo = PgEventStore::new(Arc::new(pool));

    let result = repo.expire_user("NOBODY0001").await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_fetch_clicks_for_unexpired_users(pool: PgPool) {
    let repo = PgEventStore::new(Arc::new(pool));
    let now = Utc::now();

    repo.save_user(&active_user("ACTIVE0001")).await.unwrap();
    repo.save_user(&User::new(
        "GONE000001",
        now - Duration::days(60),
        now - Duration::days(30),
    ))
    .await
    .unwrap();

    for (offset, user, url) in [
        (3, "ACTIVE0001", "https://dl.k8s.io/a"),
        (2, "GONE000001", "https://dl.k8s.io/b"),
        (1, "ACTIVE0001", "https://dl.k8s.io/c"),
        (0, "", "https://dl.k8s.io/d"),
    ] {
        repo.save_link_copy_event(&LinkCopyEvent::at(
            now - Duration::minutes(offset),
            user,
            url,
        ))
        .await
        .unwrap();
    }

    let clicks = repo.fetch_clicks_for_unexpired_users().await.unwrap();
    let urls: Vec<&str> = clicks.iter().map(|c| c.url.as_str()).collect();

    assert_eq!(urls, vec!["https://dl.k8s.io/a", "https://dl.k8s.io/c"]);
    assert!(clicks.iter().all(|c| c.user_id == "ACTIVE0001"));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_save_identity_event(pool: PgPool) {
    let repo = PgEventStore::new(Arc::new(pool.clone()));

    repo.save_identity_event(&IdentityEvent::expired("USER000001"))
        .await
        .unwrap();

    let action: String =
        sqlx::query_scalar("SELECT action FROM identity_events WHERE user_id = $1")
            .bind("USER000001")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(action, "expired");
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_health_check(pool: PgPool) {
    let repo = PgEventStore::new(Arc::new(pool));

    assert!(repo.health_check().await);
}
