use sea_orm_migration::{prelude::*, schema::*};

static IDX_OAUTH_STATES_EXPIRES_AT: &str = "idx_discord_oauth_states_expires_at";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiscordOauthStates::Table)
                    .if_not_exists()
                    .col(pk_auto(DiscordOauthStates::Id))
                    .col(string_uniq(DiscordOauthStates::State))
                    .col(integer_null(DiscordOauthStates::UserId))
                    .col(timestamp(DiscordOauthStates::ExpiresAt))
                    .col(timestamp(DiscordOauthStates::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Backs the hourly expiry sweep; the consume path also constrains on
        // expires_at so stale states are rejected between sweeps.
        manager
            .create_index(
                Index::create()
                    .name(IDX_OAUTH_STATES_EXPIRES_AT)
                    .table(DiscordOauthStates::Table)
                    .col(DiscordOauthStates::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_OAUTH_STATES_EXPIRES_AT)
                    .table(DiscordOauthStates::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(DiscordOauthStates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DiscordOauthStates {
    Table,
    Id,
    State,
    UserId,
    ExpiresAt,
    CreatedAt,
}
