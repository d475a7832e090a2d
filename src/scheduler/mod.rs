//! Periodic task scheduling.
//!
//! Registers the recurring core work on a cron scheduler: the affiliation
//! reconciler and token refresh loop every thirty minutes, role
//! synchronization across all enabled guilds every fifteen, the expired
//! OAuth-state sweep hourly, and a daily SyncRun retention trim. Admin
//! commands invoke the same services on demand; the scheduler only supplies
//! cadence.

pub mod config;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::cache::CacheService;
use crate::client::discord::DiscordClient;
use crate::client::esi::EsiClient;
use crate::data::discord::{GuildConfigRepository, OAuthStateRepository, SyncStatusRepository};
use crate::error::Error;
use crate::service::affiliation::AffiliationService;
use crate::service::discord::oauth::{DiscordOAuthService, OAuth2Client};
use crate::service::discord::RoleSyncService;
use crate::service::groups::DbGroupsService;
use crate::util::cancel::CancellationFlag;
use crate::util::crypto::TokenCipher;

/// Shared state for scheduled jobs.
///
/// Cheaply cloneable: every field is either `Arc`-backed or a handle over
/// one, so the `'static` closures the cron scheduler requires can each own a
/// copy.
#[derive(Clone)]
pub struct SchedulerState {
    pub db: DatabaseConnection,
    pub cache: CacheService,
    pub esi_client: EsiClient,
    pub discord_client: DiscordClient,
    pub http_client: reqwest::Client,
    pub oauth_client: OAuth2Client,
    pub cipher: TokenCipher,
    pub groups: DbGroupsService,
    /// Parallel workers for the affiliation pool.
    pub affiliation_workers: usize,
    /// Process-wide shutdown signal; long-running jobs check it at iteration
    /// boundaries.
    pub shutdown: CancellationFlag,
}

/// Cron scheduler over the core's periodic jobs.
pub struct Scheduler {
    state: SchedulerState,
    sched: JobScheduler,
}

impl Scheduler {
    /// Creates a new instance of [`Scheduler`].
    pub async fn new(state: SchedulerState) -> Result<Self, Error> {
        let sched = JobScheduler::new().await?;

        Ok(Self { state, sched })
    }

    /// Registers every periodic job and starts the scheduler.
    pub async fn start(self) -> Result<(), Error> {
        self.add_job(
            config::affiliation::CRON_EXPRESSION,
            "affiliation reconciliation",
            |state| async move {
                let service = AffiliationService::new(
                    state.db.clone(),
                    state.esi_client.clone(),
                    state.affiliation_workers,
                );
                let stats = service.run(&state.shutdown).await?;
                Ok(format!(
                    "{} updated, {} failed, {} skipped over {} batch(es)",
                    stats.updated, stats.failed, stats.skipped, stats.batches
                ))
            },
        )
        .await?;

        self.add_job(
            config::token_refresh::CRON_EXPRESSION,
            "token refresh",
            |state| async move {
                let service = DiscordOAuthService::new(
                    &state.db,
                    &state.http_client,
                    &state.oauth_client,
                    &state.discord_client,
                    &state.cipher,
                    &state.groups,
                );
                let stats = service
                    .refresh_expiring_tokens(config::token_refresh::BATCH_SIZE)
                    .await?;
                Ok(format!(
                    "{} refreshed, {} failed",
                    stats.refreshed, stats.failed
                ))
            },
        )
        .await?;

        self.add_job(
            config::role_sync::CRON_EXPRESSION,
            "role synchronization",
            |state| async move {
                let service = RoleSyncService::new(
                    &state.db,
                    &state.discord_client,
                    &state.esi_client,
                    &state.cache,
                    &state.cipher,
                    &state.groups,
                );
                let reports = service.sync_all_guilds(false, &state.shutdown).await?;
                let succeeded: usize = reports.iter().map(|r| r.users_succeeded).sum();
                let failed: usize = reports.iter().map(|r| r.users_failed).sum();
                Ok(format!(
                    "{} guild(s), {} user(s) succeeded, {} failed",
                    reports.len(),
                    succeeded,
                    failed
                ))
            },
        )
        .await?;

        self.add_job(
            config::oauth_state_cleanup::CRON_EXPRESSION,
            "OAuth state cleanup",
            |state| async move {
                let removed = OAuthStateRepository::new(&state.db).delete_expired().await?;
                Ok(format!("{removed} expired state(s) removed"))
            },
        )
        .await?;

        self.add_job(
            config::sync_run_retention::CRON_EXPRESSION,
            "SyncRun retention trim",
            |state| async move {
                let repo = SyncStatusRepository::new(&state.db);
                let mut removed = repo
                    .trim_history("", config::sync_run_retention::KEEP_PER_GUILD)
                    .await?;
                for guild in GuildConfigRepository::new(&state.db).all_enabled().await? {
                    removed += repo
                        .trim_history(&guild.guild_id, config::sync_run_retention::KEEP_PER_GUILD)
                        .await?;
                }
                Ok(format!("{removed} old run(s) removed"))
            },
        )
        .await?;

        self.sched.start().await?;

        info!("Job scheduler started");

        Ok(())
    }

    /// Registers one recurring job; outcomes are logged, never propagated.
    async fn add_job<F, Fut>(&self, cron: &str, name: &'static str, function: F) -> Result<(), Error>
    where
        F: Fn(SchedulerState) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<String, Error>> + Send + 'static,
    {
        let state = self.state.clone();
        let function = Arc::new(function);

        self.sched
            .add(Job::new_async(cron, move |_, _| {
                let state = state.clone();
                let function = Arc::clone(&function);

                Box::pin(async move {
                    if state.shutdown.is_cancelled() {
                        return;
                    }

                    match function(state).await {
                        Ok(summary) => info!("{name}: {summary}"),
                        Err(e) => error!("{name} failed: {e:?}"),
                    }
                })
            })?)
            .await?;

        Ok(())
    }
}
