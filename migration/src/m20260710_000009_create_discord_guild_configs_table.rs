use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiscordGuildConfigs::Table)
                    .if_not_exists()
                    .col(pk_auto(DiscordGuildConfigs::Id))
                    .col(string_uniq(DiscordGuildConfigs::GuildId))
                    .col(string(DiscordGuildConfigs::GuildName))
                    .col(text(DiscordGuildConfigs::BotToken))
                    .col(boolean(DiscordGuildConfigs::IsEnabled))
                    .col(timestamp(DiscordGuildConfigs::CreatedAt))
                    .col(timestamp(DiscordGuildConfigs::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiscordGuildConfigs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DiscordGuildConfigs {
    Table,
    Id,
    GuildId,
    GuildName,
    BotToken,
    IsEnabled,
    CreatedAt,
    UpdatedAt,
}
