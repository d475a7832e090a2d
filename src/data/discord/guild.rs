//! Guild configuration repository.

use chrono::Utc;
use migration::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

/// Repository for the `discord_guild_configs` collection.
pub struct GuildConfigRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GuildConfigRepository<'a> {
    /// Creates a new instance of [`GuildConfigRepository`].
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts or updates a guild configuration keyed by `guild_id`.
    ///
    /// `bot_token` carries ciphertext; encryption happens in the service
    /// layer.
    pub async fn upsert(
        &self,
        guild_id: &str,
        guild_name: &str,
        bot_token: String,
        is_enabled: bool,
    ) -> Result<entity::discord_guild_config::Model, DbErr> {
        let now = Utc::now().naive_utc();

        entity::prelude::DiscordGuildConfig::insert(
            entity::discord_guild_config::ActiveModel {
                guild_id: ActiveValue::Set(guild_id.to_string()),
                guild_name: ActiveValue::Set(guild_name.to_string()),
                bot_token: ActiveValue::Set(bot_token),
                is_enabled: ActiveValue::Set(is_enabled),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            },
        )
        .on_conflict(
            OnConflict::column(entity::discord_guild_config::Column::GuildId)
                .update_columns([
                    entity::discord_guild_config::Column::GuildName,
                    entity::discord_guild_config::Column::BotToken,
                    entity::discord_guild_config::Column::IsEnabled,
                    entity::discord_guild_config::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await
    }

    /// Looks up one guild configuration.
    pub async fn find_by_guild_id(
        &self,
        guild_id: &str,
    ) -> Result<Option<entity::discord_guild_config::Model>, DbErr> {
        entity::prelude::DiscordGuildConfig::find()
            .filter(entity::discord_guild_config::Column::GuildId.eq(guild_id))
            .one(self.db)
            .await
    }

    /// Enumerates every enabled guild, in configuration order.
    pub async fn all_enabled(
        &self,
    ) -> Result<Vec<entity::discord_guild_config::Model>, DbErr> {
        entity::prelude::DiscordGuildConfig::find()
            .filter(entity::discord_guild_config::Column::IsEnabled.eq(true))
            .order_by_asc(entity::discord_guild_config::Column::Id)
            .all(self.db)
            .await
    }

    /// Deletes a guild configuration, cascading over its role mappings.
    ///
    /// Callers that want the retired roles stripped from members must sweep
    /// them before calling this; once the rows are gone the synchronizer no
    /// longer manages those roles.
    pub async fn delete(&self, guild_id: &str) -> Result<u64, DbErr> {
        entity::prelude::DiscordRoleMapping::delete_many()
            .filter(entity::discord_role_mapping::Column::GuildId.eq(guild_id))
            .exec(self.db)
            .await?;

        let result = entity::prelude::DiscordGuildConfig::delete_many()
            .filter(entity::discord_guild_config::Column::GuildId.eq(guild_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
