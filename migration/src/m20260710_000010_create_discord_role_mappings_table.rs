use sea_orm_migration::{prelude::*, schema::*};

static IDX_ROLE_MAPPINGS_ACTIVE_GUILD_GROUP: &str = "idx_discord_role_mappings_active_guild_group";
static IDX_ROLE_MAPPINGS_GUILD_ID: &str = "idx_discord_role_mappings_guild_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiscordRoleMappings::Table)
                    .if_not_exists()
                    .col(pk_auto(DiscordRoleMappings::Id))
                    .col(string(DiscordRoleMappings::GuildId))
                    .col(string(DiscordRoleMappings::GroupId))
                    .col(string(DiscordRoleMappings::DiscordRoleId))
                    .col(string(DiscordRoleMappings::GroupName))
                    .col(string(DiscordRoleMappings::DiscordRoleName))
                    .col(boolean(DiscordRoleMappings::IsActive))
                    .col(timestamp(DiscordRoleMappings::CreatedAt))
                    .col(timestamp(DiscordRoleMappings::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Uniqueness holds for ACTIVE mappings only: a retired (inactive) row
        // may coexist with the active mapping that replaced it, so the unique
        // index is partial.
        let conn = manager.get_connection();
        conn.execute_unprepared(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {IDX_ROLE_MAPPINGS_ACTIVE_GUILD_GROUP} \
             ON discord_role_mappings (guild_id, group_id) WHERE is_active"
        ))
        .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_ROLE_MAPPINGS_GUILD_ID)
                    .table(DiscordRoleMappings::Table)
                    .col(DiscordRoleMappings::GuildId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_ROLE_MAPPINGS_GUILD_ID)
                    .table(DiscordRoleMappings::Table)
                    .to_owned(),
            )
            .await?;

        let conn = manager.get_connection();
        conn.execute_unprepared(&format!(
            "DROP INDEX IF EXISTS {IDX_ROLE_MAPPINGS_ACTIVE_GUILD_GROUP}"
        ))
        .await?;

        manager
            .drop_table(Table::drop().table(DiscordRoleMappings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DiscordRoleMappings {
    Table,
    Id,
    GuildId,
    GroupId,
    DiscordRoleId,
    GroupName,
    DiscordRoleName,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
