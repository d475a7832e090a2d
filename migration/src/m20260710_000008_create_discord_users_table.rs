use sea_orm_migration::{prelude::*, schema::*};

static IDX_DISCORD_USERS_USER_ID: &str = "idx_discord_users_user_id";
static IDX_DISCORD_USERS_TOKEN_EXPIRY: &str = "idx_discord_users_token_expiry";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiscordUsers::Table)
                    .if_not_exists()
                    .col(pk_auto(DiscordUsers::Id))
                    .col(integer(DiscordUsers::UserId))
                    .col(string_uniq(DiscordUsers::DiscordId))
                    .col(string(DiscordUsers::Username))
                    .col(string_null(DiscordUsers::GlobalName))
                    .col(string_null(DiscordUsers::Avatar))
                    .col(text(DiscordUsers::AccessToken))
                    .col(text(DiscordUsers::RefreshToken))
                    .col(timestamp(DiscordUsers::TokenExpiry))
                    .col(string(DiscordUsers::Scopes))
                    .col(boolean(DiscordUsers::IsActive))
                    .col(timestamp(DiscordUsers::LinkedAt))
                    .col(timestamp(DiscordUsers::CreatedAt))
                    .col(timestamp(DiscordUsers::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_DISCORD_USERS_USER_ID)
                    .table(DiscordUsers::Table)
                    .col(DiscordUsers::UserId)
                    .to_owned(),
            )
            .await?;

        // Backs the token refresh loop's expiring-before selection.
        manager
            .create_index(
                Index::create()
                    .name(IDX_DISCORD_USERS_TOKEN_EXPIRY)
                    .table(DiscordUsers::Table)
                    .col(DiscordUsers::IsActive)
                    .col(DiscordUsers::TokenExpiry)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_DISCORD_USERS_TOKEN_EXPIRY)
                    .table(DiscordUsers::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name(IDX_DISCORD_USERS_USER_ID)
                    .table(DiscordUsers::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(DiscordUsers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DiscordUsers {
    Table,
    Id,
    UserId,
    DiscordId,
    Username,
    GlobalName,
    Avatar,
    AccessToken,
    RefreshToken,
    TokenExpiry,
    Scopes,
    IsActive,
    LinkedAt,
    CreatedAt,
    UpdatedAt,
}
