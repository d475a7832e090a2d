//! Server startup and initialization functions.
//!
//! This module provides functions for initializing all long-lived resources
//! during application startup: the database connection (with migrations),
//! the Valkey cache pool, the upstream clients, the token cipher, and the
//! background scheduler. Each function handles one aspect of initialization
//! with proper error handling.

use fred::prelude::*;
use sea_orm::DatabaseConnection;
use tracing::error;

use crate::cache::CacheService;
use crate::client::discord::DiscordClient;
use crate::client::esi::EsiClient;
use crate::config::Config;
use crate::error::Error;
use crate::scheduler::{Scheduler, SchedulerState};
use crate::service::discord::oauth::{build_oauth_client, OAuth2Client, DISCORD_OAUTH_BASE_URL};
use crate::service::groups::DbGroupsService;
use crate::util::cancel::CancellationFlag;
use crate::util::crypto::TokenCipher;

/// Connects to the PostgreSQL database and runs pending migrations.
///
/// Establishes a connection pool using the connection string from
/// configuration, then runs all pending SeaORM migrations so collections and
/// indexes exist before any repository is used. Index creation is
/// idempotent; restarting against an up-to-date schema is a no-op.
///
/// # Arguments
/// - `config` - Application configuration containing the database URL
///
/// # Returns
/// - `Ok(DatabaseConnection)` - Connected database with migrations applied
/// - `Err(Error)` - Failed to connect to database or run migrations
pub async fn connect_to_database(config: &Config) -> Result<DatabaseConnection, Error> {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Connects to Valkey and wraps the pool in the entity cache.
///
/// The pool is configured with 6 connections; this function waits for the
/// connection to be established before returning.
///
/// # Arguments
/// - `config` - Application configuration containing the Valkey URL
///
/// # Returns
/// - `Ok(CacheService)` - Connected cache ready for use
/// - `Err(Error)` - Failed to parse URL, create pool, or establish connection
pub async fn connect_to_cache(config: &Config) -> Result<CacheService, Error> {
    let valkey_config = fred::prelude::Config::from_url(&config.valkey_url)?;
    let pool = Pool::new(valkey_config, None, None, None, 6)?;

    pool.connect();
    pool.wait_for_connect().await?;

    Ok(CacheService::valkey(pool))
}

/// Builds the ESI client with the configured user agent.
pub fn build_esi_client(config: &Config) -> Result<EsiClient, Error> {
    Ok(EsiClient::new(&config.user_agent)?)
}

/// Builds the Discord REST client with the configured user agent.
pub fn build_discord_client(config: &Config) -> Result<DiscordClient, Error> {
    Ok(DiscordClient::new(&config.user_agent)?)
}

/// Builds the OAuth2 client for Discord's authorization-code flow.
pub fn build_discord_oauth_client(config: &Config) -> Result<OAuth2Client, Error> {
    build_oauth_client(
        &config.discord_client_id,
        &config.discord_client_secret,
        &config.discord_redirect_uri,
        DISCORD_OAUTH_BASE_URL,
    )
}

/// Derives the token cipher from the configured secret.
pub fn build_token_cipher(config: &Config) -> Result<TokenCipher, Error> {
    TokenCipher::from_secret(&config.token_cipher_secret)
}

/// Initializes and starts the scheduler in a background task.
///
/// The scheduler runs fire-and-forget: registration errors are logged but do
/// not propagate back to the caller once the task is spawned.
pub async fn start_scheduler(state: SchedulerState) -> Result<(), Error> {
    let scheduler = Scheduler::new(state).await?;

    tokio::spawn(async move {
        if let Err(e) = scheduler.start().await {
            error!("Scheduler error: {:?}", e);
        }
    });

    Ok(())
}

/// Assembles the scheduler state from initialized resources.
#[allow(clippy::too_many_arguments)]
pub fn build_scheduler_state(
    config: &Config,
    db: DatabaseConnection,
    cache: CacheService,
    esi_client: EsiClient,
    discord_client: DiscordClient,
    http_client: reqwest::Client,
    oauth_client: OAuth2Client,
    cipher: TokenCipher,
    shutdown: CancellationFlag,
) -> SchedulerState {
    SchedulerState {
        groups: DbGroupsService::new(db.clone()),
        db,
        cache,
        esi_client,
        discord_client,
        http_client,
        oauth_client,
        cipher,
        affiliation_workers: config.affiliation_workers,
        shutdown,
    }
}
