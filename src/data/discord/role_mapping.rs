//! Role mapping repository.

use chrono::Utc;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

/// Field set for creating or updating a role mapping.
#[derive(Clone, Debug)]
pub struct RoleMappingFields {
    pub guild_id: String,
    pub group_id: String,
    pub discord_role_id: String,
    pub group_name: String,
    pub discord_role_name: String,
    pub is_active: bool,
}

/// Repository for the `discord_role_mappings` collection.
///
/// A partial unique index holds the `(guild_id, group_id)` pair unique among
/// ACTIVE mappings; retired rows may coexist with the active mapping that
/// replaced them. The service layer surfaces an active duplicate as a
/// conflict before the index would reject it.
pub struct RoleMappingRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RoleMappingRepository<'a> {
    /// Creates a new instance of [`RoleMappingRepository`].
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a new mapping.
    pub async fn create(
        &self,
        fields: RoleMappingFields,
    ) -> Result<entity::discord_role_mapping::Model, DbErr> {
        let now = Utc::now().naive_utc();

        entity::prelude::DiscordRoleMapping::insert(
            entity::discord_role_mapping::ActiveModel {
                guild_id: ActiveValue::Set(fields.guild_id),
                group_id: ActiveValue::Set(fields.group_id),
                discord_role_id: ActiveValue::Set(fields.discord_role_id),
                group_name: ActiveValue::Set(fields.group_name),
                discord_role_name: ActiveValue::Set(fields.discord_role_name),
                is_active: ActiveValue::Set(fields.is_active),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            },
        )
        .exec_with_returning(self.db)
        .await
    }

    /// Replaces a mapping's mutable fields.
    pub async fn update(
        &self,
        id: i32,
        fields: RoleMappingFields,
    ) -> Result<entity::discord_role_mapping::Model, DbErr> {
        let model = entity::discord_role_mapping::ActiveModel {
            id: ActiveValue::Unchanged(id),
            guild_id: ActiveValue::Set(fields.guild_id),
            group_id: ActiveValue::Set(fields.group_id),
            discord_role_id: ActiveValue::Set(fields.discord_role_id),
            group_name: ActiveValue::Set(fields.group_name),
            discord_role_name: ActiveValue::Set(fields.discord_role_name),
            is_active: ActiveValue::Set(fields.is_active),
            updated_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        entity::prelude::DiscordRoleMapping::update(model)
            .exec(self.db)
            .await
    }

    /// Looks up one mapping by primary key.
    pub async fn find_by_id(
        &self,
        id: i32,
    ) -> Result<Option<entity::discord_role_mapping::Model>, DbErr> {
        entity::prelude::DiscordRoleMapping::find_by_id(id)
            .one(self.db)
            .await
    }

    /// Looks up the active mapping for one `(guild_id, group_id)` pair.
    ///
    /// At most one exists by the partial unique index; inactive rows for the
    /// same pair are ignored.
    pub async fn find_active_by_guild_and_group(
        &self,
        guild_id: &str,
        group_id: &str,
    ) -> Result<Option<entity::discord_role_mapping::Model>, DbErr> {
        entity::prelude::DiscordRoleMapping::find()
            .filter(entity::discord_role_mapping::Column::GuildId.eq(guild_id))
            .filter(entity::discord_role_mapping::Column::GroupId.eq(group_id))
            .filter(entity::discord_role_mapping::Column::IsActive.eq(true))
            .one(self.db)
            .await
    }

    /// Enumerates the active mappings of one guild.
    pub async fn all_active_for_guild(
        &self,
        guild_id: &str,
    ) -> Result<Vec<entity::discord_role_mapping::Model>, DbErr> {
        entity::prelude::DiscordRoleMapping::find()
            .filter(entity::discord_role_mapping::Column::GuildId.eq(guild_id))
            .filter(entity::discord_role_mapping::Column::IsActive.eq(true))
            .order_by_asc(entity::discord_role_mapping::Column::Id)
            .all(self.db)
            .await
    }

    /// Enumerates every active mapping across all guilds.
    pub async fn all_active(
        &self,
    ) -> Result<Vec<entity::discord_role_mapping::Model>, DbErr> {
        entity::prelude::DiscordRoleMapping::find()
            .filter(entity::discord_role_mapping::Column::IsActive.eq(true))
            .order_by_asc(entity::discord_role_mapping::Column::Id)
            .all(self.db)
            .await
    }

    /// Deletes one mapping.
    pub async fn delete(&self, id: i32) -> Result<u64, DbErr> {
        let result = entity::prelude::DiscordRoleMapping::delete_many()
            .filter(entity::discord_role_mapping::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Deletes every mapping of a guild (guild-config deletion cascade).
    pub async fn delete_by_guild(&self, guild_id: &str) -> Result<u64, DbErr> {
        let result = entity::prelude::DiscordRoleMapping::delete_many()
            .filter(entity::discord_role_mapping::Column::GuildId.eq(guild_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
