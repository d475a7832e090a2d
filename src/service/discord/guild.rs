//! Whole-guild and whole-fleet convergence, plus the role sweep.
//!
//! Guild syncs validate the bot token and its Manage Roles capability before
//! touching members, then run single-pair convergence for every active
//! linked account with a small inter-user pacing delay. A SyncRun record
//! brackets each non-dry run. Guilds in a sync-all pass run serially to
//! bound aggregate rate-limit pressure.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::data::discord::sync_status::{STATUS_COMPLETED, STATUS_FAILED};
use crate::data::discord::{
    DiscordUserRepository, GuildConfigRepository, RoleMappingRepository, SyncStatusRepository,
};
use crate::error::{auth::AuthError, domain::DomainError, Error};
use crate::model::sync::{GuildSyncReport, UserSyncReport};
use crate::service::groups::GroupsService;
use crate::util::cancel::CancellationFlag;

use super::{RoleSyncService, INTER_USER_PACING};

/// Permission bits that allow role management.
const MANAGE_ROLES: u64 = 1 << 28;
const ADMINISTRATOR: u64 = 1 << 3;

impl<G: GroupsService> RoleSyncService<'_, G> {
    /// Checks that the bot holds Manage Roles (or Administrator) in the
    /// guild by intersecting its member roles with the guild role table.
    async fn bot_can_manage_roles(
        &self,
        bot_token: &str,
        guild_id: &str,
        bot_user_id: &str,
    ) -> Result<bool, Error> {
        let roles = self.discord.get_guild_roles(bot_token, guild_id).await?;
        let permissions_by_id: HashMap<&str, u64> = roles
            .iter()
            .map(|role| {
                let bits = role
                    .permissions
                    .as_deref()
                    .and_then(|p| p.parse::<u64>().ok())
                    .unwrap_or(0);
                (role.id.as_str(), bits)
            })
            .collect();

        let Some(bot_member) = self
            .discord
            .get_guild_member(bot_token, guild_id, bot_user_id)
            .await?
        else {
            return Ok(false);
        };

        Ok(bot_member.roles.iter().any(|role_id| {
            let bits = permissions_by_id.get(role_id.as_str()).copied().unwrap_or(0);
            bits & (MANAGE_ROLES | ADMINISTRATOR) != 0
        }))
    }

    /// Converges every active linked account against one guild.
    ///
    /// A non-dry run is bracketed by a SyncRun record: `running` at start,
    /// `completed` at the end, or `failed` when the run aborted (invalid bot
    /// token, missing capability, cancellation) or no user succeeded while
    /// some failed.
    pub async fn sync_guild(
        &self,
        guild: &entity::discord_guild_config::Model,
        dry_run: bool,
        cancel: &CancellationFlag,
    ) -> Result<GuildSyncReport, Error> {
        let started = Instant::now();

        let sync_repo = SyncStatusRepository::new(self.db);
        let run = if dry_run {
            None
        } else {
            Some(sync_repo.create_running(&guild.guild_id).await?)
        };

        let mut report = GuildSyncReport {
            guild_id: guild.guild_id.clone(),
            sync_run_id: run.as_ref().map(|r| r.id),
            ..Default::default()
        };

        let converged = self
            .converge_guild(&mut report, guild, dry_run, cancel)
            .await;

        report.duration_ms = started.elapsed().as_millis() as u64;

        let status = match &converged {
            Ok(true) => STATUS_COMPLETED,
            Ok(false) => STATUS_FAILED,
            Err(error) => {
                report.errors.push(error.to_string());
                STATUS_FAILED
            }
        };

        if let Some(run) = run {
            sync_repo.finalize(run.id, status, &report).await?;
        }

        info!(
            guild_id = %guild.guild_id,
            status = status,
            users_processed = report.users_processed,
            roles_added = report.roles_added,
            roles_removed = report.roles_removed,
            duration_ms = report.duration_ms,
            "Guild sync finished"
        );

        converged?;
        Ok(report)
    }

    /// Inner guild loop; `Ok(true)` means the run completed normally.
    ///
    /// Abort conditions (bot auth, missing capability, cancellation, zero
    /// successes with failures present) resolve to `Ok(false)` with the
    /// reason recorded on the report; `Err` is reserved for infrastructure
    /// failures.
    async fn converge_guild(
        &self,
        report: &mut GuildSyncReport,
        guild: &entity::discord_guild_config::Model,
        dry_run: bool,
        cancel: &CancellationFlag,
    ) -> Result<bool, Error> {
        let bot_token = match self.cipher.decrypt(&guild.bot_token) {
            Ok(token) => token,
            Err(error) => {
                report
                    .errors
                    .push(format!("bot token could not be decrypted: {error}"));
                return Ok(false);
            }
        };

        let bot_user = match self.discord.validate_bot_token(&bot_token).await {
            Ok(bot_user) => bot_user,
            Err(error) => {
                report.errors.push(format!("bot token rejected: {error}"));
                return Ok(false);
            }
        };

        match self
            .bot_can_manage_roles(&bot_token, &guild.guild_id, &bot_user.id)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                report
                    .errors
                    .push("bot lacks the Manage Roles permission in this guild".to_string());
                return Ok(false);
            }
            Err(error) => {
                report
                    .errors
                    .push(format!("bot capability check failed: {error}"));
                return Ok(false);
            }
        }

        let mappings = RoleMappingRepository::new(self.db)
            .all_active_for_guild(&guild.guild_id)
            .await?;
        if mappings.is_empty() {
            info!(
                guild_id = %guild.guild_id,
                "No active role mappings; nothing to converge"
            );
            return Ok(true);
        }

        let users = DiscordUserRepository::new(self.db).all_active().await?;

        for user in &users {
            if cancel.is_cancelled() {
                report.cancelled = true;
                report.errors.push("cancelled".to_string());
                return Ok(false);
            }

            match self
                .sync_user_in_guild(user, &guild.guild_id, &bot_token, &mappings, dry_run)
                .await
            {
                Ok(user_report) => report.absorb(&user_report),
                Err(error) => {
                    if matches!(
                        &error,
                        Error::DiscordError(discord_error) if discord_error.is_auth()
                    ) {
                        // Every subsequent user would fail identically.
                        report
                            .errors
                            .push(format!("bot token rejected mid-run: {error}"));
                        return Ok(false);
                    }

                    let failed = UserSyncReport {
                        user_id: user.user_id,
                        discord_id: user.discord_id.clone(),
                        error: Some(error.to_string()),
                        ..Default::default()
                    };
                    report.absorb(&failed);
                }
            }

            tokio::time::sleep(INTER_USER_PACING).await;
        }

        Ok(report.users_failed == 0 || report.users_succeeded > 0)
    }

    /// Converges one user against a single guild or all enabled guilds.
    pub async fn sync_user(
        &self,
        user_id: i32,
        guild_id: Option<&str>,
        dry_run: bool,
    ) -> Result<Vec<UserSyncReport>, Error> {
        let user = DiscordUserRepository::new(self.db)
            .find_active_by_user_id(user_id)
            .await?
            .ok_or(AuthError::DiscordAccountNotLinked(user_id))?;

        let guild_repo = GuildConfigRepository::new(self.db);
        let guilds = match guild_id {
            Some(guild_id) => {
                let guild = guild_repo
                    .find_by_guild_id(guild_id)
                    .await?
                    .ok_or_else(|| DomainError::NotFound(format!("guild {guild_id}")))?;
                vec![guild]
            }
            None => guild_repo.all_enabled().await?,
        };

        let mapping_repo = RoleMappingRepository::new(self.db);
        let mut reports = Vec::with_capacity(guilds.len());

        for guild in guilds.iter().filter(|g| g.is_enabled) {
            let mappings = mapping_repo.all_active_for_guild(&guild.guild_id).await?;
            let bot_token = match self.cipher.decrypt(&guild.bot_token) {
                Ok(token) => token,
                Err(error) => {
                    warn!(
                        guild_id = %guild.guild_id,
                        "Skipping guild with undecryptable bot token: {error}"
                    );
                    continue;
                }
            };

            match self
                .sync_user_in_guild(&user, &guild.guild_id, &bot_token, &mappings, dry_run)
                .await
            {
                Ok(report) => reports.push(report),
                Err(error) => {
                    error!(
                        guild_id = %guild.guild_id,
                        user_id = user_id,
                        "User sync aborted in guild: {error}"
                    );
                    reports.push(UserSyncReport {
                        user_id,
                        discord_id: user.discord_id.clone(),
                        dry_run,
                        error: Some(error.to_string()),
                        ..Default::default()
                    });
                }
            }
        }

        Ok(reports)
    }

    /// Converges every enabled guild, serially, aggregating per-guild
    /// reports.
    pub async fn sync_all_guilds(
        &self,
        dry_run: bool,
        cancel: &CancellationFlag,
    ) -> Result<Vec<GuildSyncReport>, Error> {
        let guilds = GuildConfigRepository::new(self.db).all_enabled().await?;
        let mut reports = Vec::with_capacity(guilds.len());

        for guild in &guilds {
            if cancel.is_cancelled() {
                warn!("Sync-all cancelled; remaining guilds skipped");
                break;
            }

            reports.push(self.sync_guild(guild, dry_run, cancel).await?);
        }

        Ok(reports)
    }

    /// Removes one role from every member that holds it.
    ///
    /// Used by the mapping lifecycle before a re-sync when a mapping is
    /// disabled, re-pointed, or deleted. Members are visited with the same
    /// pacing as a guild sync; per-member failures are logged and skipped, a
    /// rejected bot token aborts the sweep.
    pub async fn sweep_role_from_members(
        &self,
        guild_id: &str,
        bot_token: &str,
        role_id: &str,
    ) -> Result<usize, Error> {
        let users = DiscordUserRepository::new(self.db).all_active().await?;
        let mut removed = 0;

        for user in &users {
            let member = match self
                .discord
                .get_guild_member(bot_token, guild_id, &user.discord_id)
                .await
            {
                Ok(member) => member,
                Err(error) if error.is_auth() => return Err(error.into()),
                Err(error) => {
                    warn!(
                        discord_id = %user.discord_id,
                        "Member lookup failed during sweep; skipping: {error}"
                    );
                    continue;
                }
            };

            let holds_role = member
                .map(|m| m.roles.iter().any(|r| r == role_id))
                .unwrap_or(false);
            if !holds_role {
                continue;
            }

            match self
                .discord
                .remove_member_role(bot_token, guild_id, &user.discord_id, role_id)
                .await
            {
                Ok(()) => removed += 1,
                Err(error) if error.is_auth() => return Err(error.into()),
                Err(error) => {
                    warn!(
                        discord_id = %user.discord_id,
                        role_id = role_id,
                        "Role removal failed during sweep; skipping: {error}"
                    );
                }
            }

            tokio::time::sleep(INTER_USER_PACING).await;
        }

        info!(
            guild_id = %guild_id,
            role_id = role_id,
            removed = removed,
            "Role sweep finished"
        );

        Ok(removed)
    }
}
