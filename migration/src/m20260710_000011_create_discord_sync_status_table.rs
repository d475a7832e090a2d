use sea_orm_migration::{prelude::*, schema::*};

static IDX_SYNC_STATUS_GUILD_CREATED: &str = "idx_discord_sync_status_guild_created";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiscordSyncStatus::Table)
                    .if_not_exists()
                    .col(pk_auto(DiscordSyncStatus::Id))
                    .col(string(DiscordSyncStatus::GuildId))
                    .col(string(DiscordSyncStatus::Status))
                    .col(integer(DiscordSyncStatus::UsersProcessed))
                    .col(integer(DiscordSyncStatus::UsersSucceeded))
                    .col(integer(DiscordSyncStatus::UsersFailed))
                    .col(integer(DiscordSyncStatus::RolesAdded))
                    .col(integer(DiscordSyncStatus::RolesRemoved))
                    .col(json(DiscordSyncStatus::Errors))
                    .col(big_integer_null(DiscordSyncStatus::DurationMs))
                    .col(timestamp(DiscordSyncStatus::LastSyncAt))
                    .col(timestamp(DiscordSyncStatus::CreatedAt))
                    .col(timestamp(DiscordSyncStatus::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_SYNC_STATUS_GUILD_CREATED)
                    .table(DiscordSyncStatus::Table)
                    .col(DiscordSyncStatus::GuildId)
                    .col(DiscordSyncStatus::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_SYNC_STATUS_GUILD_CREATED)
                    .table(DiscordSyncStatus::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(DiscordSyncStatus::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DiscordSyncStatus {
    Table,
    Id,
    GuildId,
    Status,
    UsersProcessed,
    UsersSucceeded,
    UsersFailed,
    RolesAdded,
    RolesRemoved,
    Errors,
    DurationMs,
    LastSyncAt,
    CreatedAt,
    UpdatedAt,
}
