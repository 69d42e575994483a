#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use copy_recents::application::services::{IdentityService, StoreListener};
use copy_recents::domain::entities::User;
use copy_recents::domain::events::{IdentityEvent, LinkCopyEvent};
use copy_recents::domain::repositories::EventStore;
use copy_recents::error::AppError;
use copy_recents::events::{Broker, BrokerError};
use copy_recents::infrastructure::cache::RecencyCache;
use copy_recents::routes::{RouterOptions, app_router};
use copy_recents::state::AppState;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Event store keeping everything in memory.
#[derive(Default)]
pub struct InMemoryStore {
    pub users: Mutex<Vec<User>>,
    pub link_copies: Mutex<Vec<LinkCopyEvent>>,
    pub identity_events: Mutex<Vec<IdentityEvent>>,
    unhealthy: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_unhealthy(&self) {
        self.unhealthy.store(true, Ordering::SeqCst);
    }

    pub fn user(&self, id: &str) -> Option<User> {
        self.users.lock().iter().find(|u| u.id == id).cloned()
    }

    pub fn identity_actions(&self) -> Vec<String> {
        self.identity_events
            .lock()
            .iter()
            .map(|e| e.action.as_str().to_string())
            .collect()
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        self.users.lock().push(user.clone());
        Ok(())
    }

    async fn save_link_copy_event(&self, event: &LinkCopyEvent) -> Result<(), AppError> {
        self.link_copies.lock().push(event.clone());
        Ok(())
    }

    async fn save_identity_event(&self, event: &IdentityEvent) -> Result<(), AppError> {
        self.identity_events.lock().push(event.clone());
        Ok(())
    }

    async fn expire_user(&self, user_id: &str) -> Result<(), AppError> {
        let mut users = self.users.lock();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::not_found("User not found", json!({ "user_id": user_id })))?;
        user.expires_at = Utc::now();
        Ok(())
    }

    async fn fetch_clicks_for_unexpired_users(&self) -> Result<Vec<LinkCopyEvent>, AppError> {
        let now = Utc::now();
        let users = self.users.lock();
        let mut clicks: Vec<LinkCopyEvent> = self
            .link_copies
            .lock()
            .iter()
            .filter(|click| {
                users
                    .iter()
                    .any(|u| u.id == click.user_id && !u.is_expired_at(now))
            })
            .cloned()
            .collect();
        clicks.sort_by_key(|click| click.happened_at);
        Ok(clicks)
    }

    async fn health_check(&self) -> bool {
        !self.unhealthy.load(Ordering::SeqCst)
    }
}

/// Running broker wired the way the server wires it, over an in-memory store.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
    pub recents: Arc<RecencyCache>,
    pub broker: Arc<Broker>,
    pub dispatch: JoinHandle<Result<(), BrokerError>>,
    pub store_listener: Arc<StoreListener>,
    pub store_worker: JoinHandle<()>,
}

impl TestApp {
    pub fn server(&self) -> TestServer {
        self.server_with(RouterOptions {
            dev_mode: false,
            rate_limit: false,
        })
    }

    pub fn server_with(&self, options: RouterOptions) -> TestServer {
        TestServer::new(app_router(self.state.clone(), options)).unwrap()
    }

    /// Stops dispatching, then waits for every queued write to land.
    pub async fn stop(self) {
        self.broker.shutdown();
        self.dispatch.await.unwrap().unwrap();
        self.store_listener.close();
        self.store_worker.await.unwrap();
    }
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with_store(InMemoryStore::new()).await
}

/// Warms the cache from `store`, registers listeners, and starts dispatching.
pub async fn create_test_app_with_store(store: Arc<InMemoryStore>) -> TestApp {
    let recents = Arc::new(RecencyCache::new());
    recents.warm(store.as_ref()).await.unwrap();

    let broker = Arc::new(Broker::default());
    let (store_listener, store_worker) = StoreListener::spawn(store.clone(), 1_000);
    let store_listener = Arc::new(store_listener);
    broker.register_link_copy_listener(recents.clone());
    broker.register_identity_listener(recents.clone());
    broker.register_link_copy_listener(store_listener.clone());
    broker.register_identity_listener(store_listener.clone());

    let dispatch = tokio::spawn({
        let broker = broker.clone();
        async move { broker.run().await }
    });
    wait_for(|| broker.is_running()).await;

    let state = AppState::new(
        broker.clone(),
        recents.clone(),
        store.clone(),
        Arc::new(IdentityService::new(10, 30)),
    );

    TestApp {
        state,
        store,
        recents,
        broker,
        dispatch,
        store_listener,
        store_worker,
    }
}

/// Polls `condition` until it holds, panicking after two seconds.
pub async fn wait_for(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 2s");
}

/// `Cookie` header value carrying the identity `id`.
pub fn identity_cookie(id: &str) -> String {
    format!("downloadkubernetes={id}")
}
