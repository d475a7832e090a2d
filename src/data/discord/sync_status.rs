//! Sync run history repository.

use chrono::Utc;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use entity::discord_sync_status::SyncErrorList;

use crate::model::sync::GuildSyncReport;

/// Run is still executing.
pub const STATUS_RUNNING: &str = "running";
/// Run finished with at least one success (or nothing to do).
pub const STATUS_COMPLETED: &str = "completed";
/// Run aborted, was cancelled, or every user failed.
pub const STATUS_FAILED: &str = "failed";

/// Repository for the `discord_sync_status` collection.
pub struct SyncStatusRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SyncStatusRepository<'a> {
    /// Creates a new instance of [`SyncStatusRepository`].
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a run record in `running` state.
    ///
    /// `guild_id` is empty for runs spanning every enabled guild.
    pub async fn create_running(
        &self,
        guild_id: &str,
    ) -> Result<entity::discord_sync_status::Model, DbErr> {
        let now = Utc::now().naive_utc();

        entity::prelude::DiscordSyncStatus::insert(entity::discord_sync_status::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            status: ActiveValue::Set(STATUS_RUNNING.to_string()),
            users_processed: ActiveValue::Set(0),
            users_succeeded: ActiveValue::Set(0),
            users_failed: ActiveValue::Set(0),
            roles_added: ActiveValue::Set(0),
            roles_removed: ActiveValue::Set(0),
            errors: ActiveValue::Set(SyncErrorList(Vec::new())),
            duration_ms: ActiveValue::Set(None),
            last_sync_at: ActiveValue::Set(now),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        })
        .exec_with_returning(self.db)
        .await
    }

    /// Finalizes a run with its aggregate counters and terminal status.
    pub async fn finalize(
        &self,
        id: i32,
        status: &str,
        report: &GuildSyncReport,
    ) -> Result<entity::discord_sync_status::Model, DbErr> {
        let now = Utc::now().naive_utc();

        let model = entity::discord_sync_status::ActiveModel {
            id: ActiveValue::Unchanged(id),
            status: ActiveValue::Set(status.to_string()),
            users_processed: ActiveValue::Set(report.users_processed as i32),
            users_succeeded: ActiveValue::Set(report.users_succeeded as i32),
            users_failed: ActiveValue::Set(report.users_failed as i32),
            roles_added: ActiveValue::Set(report.roles_added as i32),
            roles_removed: ActiveValue::Set(report.roles_removed as i32),
            errors: ActiveValue::Set(SyncErrorList(report.errors.clone())),
            duration_ms: ActiveValue::Set(Some(report.duration_ms as i64)),
            last_sync_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };

        entity::prelude::DiscordSyncStatus::update(model)
            .exec(self.db)
            .await
    }

    /// Returns the most recent runs for a guild, newest first.
    pub async fn recent_for_guild(
        &self,
        guild_id: &str,
        limit: u64,
    ) -> Result<Vec<entity::discord_sync_status::Model>, DbErr> {
        entity::prelude::DiscordSyncStatus::find()
            .filter(entity::discord_sync_status::Column::GuildId.eq(guild_id))
            .order_by_desc(entity::discord_sync_status::Column::Id)
            .limit(limit)
            .all(self.db)
            .await
    }

    /// Returns the latest run for a guild, if any.
    pub async fn latest_for_guild(
        &self,
        guild_id: &str,
    ) -> Result<Option<entity::discord_sync_status::Model>, DbErr> {
        Ok(self.recent_for_guild(guild_id, 1).await?.pop())
    }

    /// Trims a guild's history to its most recent `keep` runs.
    pub async fn trim_history(&self, guild_id: &str, keep: u64) -> Result<u64, DbErr> {
        let keep_ids: Vec<i32> = entity::prelude::DiscordSyncStatus::find()
            .select_only()
            .column(entity::discord_sync_status::Column::Id)
            .filter(entity::discord_sync_status::Column::GuildId.eq(guild_id))
            .order_by_desc(entity::discord_sync_status::Column::Id)
            .limit(keep)
            .into_tuple::<i32>()
            .all(self.db)
            .await?;

        let mut delete = entity::prelude::DiscordSyncStatus::delete_many()
            .filter(entity::discord_sync_status::Column::GuildId.eq(guild_id));
        if !keep_ids.is_empty() {
            delete =
                delete.filter(entity::discord_sync_status::Column::Id.is_not_in(keep_ids));
        }

        let result = delete.exec(self.db).await?;

        Ok(result.rows_affected)
    }
}
