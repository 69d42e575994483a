//! CLI administration tool for copy-recents.
//!
//! Provides commands for inspecting and expiring identities, viewing
//! statistics, and performing database checks without the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List unexpired identities (add --all for expired ones too)
//! cargo run --bin admin -- user list
//!
//! # Expire an identity
//! cargo run --bin admin -- user expire ABC123XYZ0
//!
//! # Show what the server would return for an identity
//! cargo run --bin admin -- recents ABC123XYZ0
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or the `DB_*` components): PostgreSQL connection string

use copy_recents::application::services::store_listener::persist_event;
use copy_recents::config::Config;
use copy_recents::domain::entities::User;
use copy_recents::domain::events::IdentityEvent;
use copy_recents::infrastructure::cache::RecencyCache;
use copy_recents::infrastructure::persistence::PgEventStore;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing copy-recents.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage identities
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show the recent downloads the server would serve for an identity
    Recents {
        /// Identity id (the cookie value)
        user_id: String,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Identity management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// List unexpired identities
    List {
        /// Include expired identities
        #[arg(short, long)]
        all: bool,
    },

    /// Expire an identity and record the expiry
    Expire {
        /// Identity id (the cookie value)
        user_id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Recents { user_id } => show_recents(&pool, &user_id).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches identity management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let store = Arc::new(PgEventStore::new(Arc::new(pool.clone())));

    match action {
        UserAction::List { all } => list_users(&store, all).await?,
        UserAction::Expire { user_id, yes } => expire_user(store, user_id, yes).await?,
    }

    Ok(())
}

/// Lists identities, only unexpired ones unless `all` is set.
///
/// # Output Format
///
/// ```text
/// 👥 Identities
///
///   ID                 Created              Expires              Status
///   ──────────────────────────────────────────────────────────────────────
///   ABC123XYZ0         2024-01-15 10:30     2024-02-14 10:30     active
/// ```
async fn list_users(store: &PgEventStore, all: bool) -> Result<()> {
    println!("{}", "👥 Identities".bright_blue().bold());
    println!();

    let users = if all {
        store.list_all_users().await
    } else {
        store.list_active_users().await
    }
    .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

    if users.is_empty() {
        println!("{}", "  No identities".yellow());
        return Ok(());
    }

    println!(
        "  {:<18} {:<20} {:<20} {}",
        "ID".bright_white().bold(),
        "Created".bright_white().bold(),
        "Expires".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(70).bright_black());

    let now = Utc::now();
    for user in &users {
        let status = match status_label(user, now) {
            "expired" => "expired".red(),
            label => label.green(),
        };

        println!(
            "  {:<18} {:<20} {:<20} {}",
            user.id.cyan(),
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            user.expires_at.format("%Y-%m-%d %H:%M").to_string(),
            status
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

fn status_label(user: &User, now: DateTime<Utc>) -> &'static str {
    if user.is_expired_at(now) {
        "expired"
    } else {
        "active"
    }
}

/// Expires an identity through the same write path the server's store
/// listener uses.
///
/// The user row is marked expired and an `expired` identity event is
/// recorded. A running server keeps the identity's cached recents until it
/// restarts.
async fn expire_user(store: Arc<PgEventStore>, user_id: String, skip_confirm: bool) -> Result<()> {
    println!("{}", "🔒 Expire identity".bright_blue().bold());
    println!();
    println!("  Identity: {}", user_id.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Expire this identity?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    persist_event(store.as_ref(), &IdentityEvent::expired(user_id).into())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to expire identity: {}", e))?;

    println!();
    println!("{}", "✅ Identity expired".green().bold());
    println!(
        "{}",
        "   Running servers drop its recents on restart.".bright_black()
    );
    println!();

    Ok(())
}

/// Rebuilds the recency cache from storage and prints one identity's recents.
async fn show_recents(pool: &PgPool, user_id: &str) -> Result<()> {
    println!(
        "{} {}",
        "🕑 Recent downloads for".bright_blue().bold(),
        user_id.cyan()
    );
    println!();

    let store = PgEventStore::new(Arc::new(pool.clone()));
    let cache = RecencyCache::new();
    cache
        .warm(&store)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load stored clicks: {}", e))?;

    let urls = cache.recents(user_id);
    if urls.is_empty() {
        println!("{}", "  Nothing recorded for this identity".yellow());
    }

    for (i, url) in urls.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).bright_black(), url);
    }
    println!();

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Active and total identities
/// - Recorded link copies, and how many were anonymous
/// - Recorded identity events
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let active_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE expires_at > NOW()")
            .fetch_one(pool)
            .await?;

    let copies_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_copy_events")
        .fetch_one(pool)
        .await?;

    let anonymous_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM link_copy_events WHERE user_id = ''")
            .fetch_one(pool)
            .await?;

    let identity_events_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM identity_events")
        .fetch_one(pool)
        .await?;

    println!(
        "  Identities:       {} ({} active)",
        users_count.to_string().bright_green().bold(),
        active_count.to_string().bright_green()
    );
    println!(
        "  Link copies:      {} ({} anonymous)",
        copies_count.to_string().bright_green().bold(),
        anonymous_count.to_string().bright_black()
    );
    println!(
        "  Identity events:  {}",
        identity_events_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
