//! Single-pair convergence.
//!
//! Computes the required role set for one `(user, guild)` pair from the
//! user's active group memberships and the guild's active mappings, diffs it
//! against the live member state, and issues the minimal mutation sequence.
//! Only managed roles (those on the right-hand side of an active mapping)
//! are ever removed; roles the operator has not mapped are left untouched.

use std::collections::HashSet;

use tracing::debug;

use crate::error::Error;
use crate::model::sync::UserSyncReport;
use crate::service::groups::GroupsService;

use super::RoleSyncService;

/// Minimal mutation set for one member.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleChanges {
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
}

/// Diffs a member's current roles against the required and managed sets.
///
/// `to_add` is every required role the member lacks; `to_remove` is every
/// managed role the member holds that is no longer required. Unmanaged roles
/// never appear in either set. Output order is deterministic (sorted) so
/// repeated runs issue identical sequences.
pub fn compute_role_changes(
    current: &[String],
    required: &HashSet<String>,
    managed: &HashSet<String>,
) -> RoleChanges {
    let current_set: HashSet<&str> = current.iter().map(String::as_str).collect();

    let mut to_add: Vec<String> = required
        .iter()
        .filter(|role| !current_set.contains(role.as_str()))
        .cloned()
        .collect();
    to_add.sort();

    let mut to_remove: Vec<String> = current
        .iter()
        .filter(|role| managed.contains(*role) && !required.contains(*role))
        .cloned()
        .collect();
    to_remove.sort();
    to_remove.dedup();

    RoleChanges { to_add, to_remove }
}

impl<G: GroupsService> RoleSyncService<'_, G> {
    /// Converges one user's roles in one guild.
    ///
    /// Re-running on an already-converged pair is a no-op: no upstream
    /// mutations and no nickname update. The first failed role mutation
    /// short-circuits the user while keeping partial progress in the report.
    ///
    /// # Returns
    /// - `Ok(UserSyncReport)` - Outcome, including per-user failures
    ///   (`success == false` with a reason)
    /// - `Err(Error)` - Abort-class failure: the bot token was rejected
    ///   (every later user would fail identically) or infrastructure failed
    pub async fn sync_user_in_guild(
        &self,
        user: &entity::discord_user::Model,
        guild_id: &str,
        bot_token: &str,
        mappings: &[entity::discord_role_mapping::Model],
        dry_run: bool,
    ) -> Result<UserSyncReport, Error> {
        let mut report = UserSyncReport {
            user_id: user.user_id,
            discord_id: user.discord_id.clone(),
            dry_run,
            ..Default::default()
        };

        let groups = self.groups.active_group_ids(user.user_id).await?;

        let required: HashSet<String> = mappings
            .iter()
            .filter(|m| m.is_active && groups.contains(&m.group_id))
            .map(|m| m.discord_role_id.clone())
            .collect();
        let managed: HashSet<String> = mappings
            .iter()
            .filter(|m| m.is_active)
            .map(|m| m.discord_role_id.clone())
            .collect();

        let member = match self
            .discord
            .get_guild_member(bot_token, guild_id, &user.discord_id)
            .await
        {
            Ok(member) => member,
            Err(error) if error.is_auth() => return Err(error.into()),
            Err(error) => {
                report.error = Some(format!("member lookup failed: {error}"));
                return Ok(report);
            }
        };

        let Some(member) = member else {
            return self
                .join_missing_member(report, guild_id, bot_token, user, required, dry_run)
                .await;
        };

        let changes = compute_role_changes(&member.roles, &required, &managed);

        if dry_run {
            report.roles_added = changes.to_add;
            report.roles_removed = changes.to_remove;
            report.success = true;
            return Ok(report);
        }

        if changes.to_add.is_empty() && changes.to_remove.is_empty() {
            debug!(
                user_id = user.user_id,
                guild_id = %guild_id,
                "Member already converged; nothing to do"
            );
            report.success = true;
            return Ok(report);
        }

        for role_id in &changes.to_add {
            match self
                .discord
                .add_member_role(bot_token, guild_id, &user.discord_id, role_id)
                .await
            {
                Ok(()) => report.roles_added.push(role_id.clone()),
                Err(error) if error.is_auth() => return Err(error.into()),
                Err(error) => {
                    report.error = Some(format!("adding role {role_id} failed: {error}"));
                    self.finish_with_nickname(&mut report, user, guild_id, bot_token, member.nick.as_deref())
                        .await;
                    return Ok(report);
                }
            }
        }

        for role_id in &changes.to_remove {
            match self
                .discord
                .remove_member_role(bot_token, guild_id, &user.discord_id, role_id)
                .await
            {
                Ok(()) => report.roles_removed.push(role_id.clone()),
                Err(error) if error.is_auth() => return Err(error.into()),
                Err(error) => {
                    report.error = Some(format!("removing role {role_id} failed: {error}"));
                    self.finish_with_nickname(&mut report, user, guild_id, bot_token, member.nick.as_deref())
                        .await;
                    return Ok(report);
                }
            }
        }

        report.success = true;
        self.finish_with_nickname(&mut report, user, guild_id, bot_token, member.nick.as_deref())
            .await;

        Ok(report)
    }

    /// Auto-join path for a user who is not yet a member.
    async fn join_missing_member(
        &self,
        mut report: UserSyncReport,
        guild_id: &str,
        bot_token: &str,
        user: &entity::discord_user::Model,
        required: HashSet<String>,
        dry_run: bool,
    ) -> Result<UserSyncReport, Error> {
        if required.is_empty() {
            report.success = true;
            return Ok(report);
        }

        let mut role_ids: Vec<String> = required.into_iter().collect();
        role_ids.sort();

        if dry_run {
            report.roles_added = role_ids;
            report.success = true;
            return Ok(report);
        }

        let access_token = match self.cipher.decrypt(&user.access_token) {
            Ok(token) => token,
            Err(error) => {
                report.error = Some(format!("user access token unavailable: {error}"));
                return Ok(report);
            }
        };

        match self
            .discord
            .add_guild_member(bot_token, guild_id, &user.discord_id, &access_token, &role_ids)
            .await
        {
            Ok(outcome) => {
                report.joined = outcome == crate::model::discord::AddMemberOutcome::Joined;
                report.roles_added = role_ids;
                report.success = true;
                self.finish_with_nickname(&mut report, user, guild_id, bot_token, None)
                    .await;
            }
            Err(error) if error.is_auth() => return Err(error.into()),
            Err(error) => {
                report.error = Some(format!("auto-join failed: {error}"));
            }
        }

        Ok(report)
    }

    /// Runs nickname reconciliation after role mutations, recording the
    /// outcome on the report. Nickname failures never fail the sync step.
    async fn finish_with_nickname(
        &self,
        report: &mut UserSyncReport,
        user: &entity::discord_user::Model,
        guild_id: &str,
        bot_token: &str,
        current_nick: Option<&str>,
    ) {
        if report.roles_added.is_empty() && report.roles_removed.is_empty() {
            return;
        }

        report.nickname_updated = self
            .reconcile_nickname(user, guild_id, bot_token, current_nick)
            .await;
    }
}
