//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache hydration, the broker dispatch loop, and
//! the Axum server lifecycle.

use crate::application::services::{IdentityService, StoreListener};
use crate::config::Config;
use crate::events::{Broker, BrokerConfig};
use crate::infrastructure::cache::RecencyCache;
use crate::infrastructure::persistence::PgEventStore;
use crate::routes::{RouterOptions, app_router};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

/// Runs the HTTP server with the given configuration.
///
/// Initializes, in order:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Recency cache hydrated from stored clicks
/// - Event broker with the cache and store listeners, dispatch loop and store
///   worker spawned
/// - Axum HTTP server
///
/// On shutdown the server stops accepting requests first, then the dispatch
/// loop is stopped and the store worker drains its queue.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Cache hydration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let store = Arc::new(PgEventStore::new(Arc::new(pool)));

    let recents = Arc::new(RecencyCache::new());
    recents
        .warm(store.as_ref())
        .await
        .context("Failed to hydrate recency cache")?;

    let broker = Arc::new(Broker::new(BrokerConfig {
        publish_timeout: config.publish_timeout(),
    }));
    let (store_listener, store_worker) =
        StoreListener::spawn(store.clone(), config.store_queue_capacity);
    let store_listener = Arc::new(store_listener);
    broker.register_link_copy_listener(recents.clone());
    broker.register_identity_listener(recents.clone());
    broker.register_link_copy_listener(store_listener.clone());
    broker.register_identity_listener(store_listener.clone());

    let dispatch = tokio::spawn({
        let broker = broker.clone();
        async move { broker.run().await }
    });

    let identity_service = Arc::new(IdentityService::new(
        config.user_id_length,
        config.cookie_ttl_days,
    ));
    let state = AppState::new(broker.clone(), recents, store, identity_service);

    let router = app_router(
        state,
        RouterOptions {
            dev_mode: config.dev_mode,
            rate_limit: config.rate_limit_enabled,
        },
    );
    let app = NormalizePathLayer::trim_trailing_slash().layer(router);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    broker.shutdown();
    dispatch
        .await
        .context("Dispatch loop panicked")?
        .context("Dispatch loop failed")?;

    store_listener.close();
    store_worker.await.context("Store worker panicked")?;
    tracing::info!("Store worker drained");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
