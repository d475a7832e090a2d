use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CharacterClones::Table)
                    .if_not_exists()
                    .col(pk_auto(CharacterClones::Id))
                    .col(integer_uniq(CharacterClones::CharacterId))
                    .col(json_null(CharacterClones::HomeLocation))
                    .col(json(CharacterClones::JumpClones))
                    .col(json(CharacterClones::ActiveImplants))
                    .col(timestamp_null(CharacterClones::LastCloneJumpDate))
                    .col(timestamp_null(CharacterClones::LastStationChangeDate))
                    .col(timestamp(CharacterClones::CreatedAt))
                    .col(timestamp(CharacterClones::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CharacterClones::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CharacterClones {
    Table,
    Id,
    CharacterId,
    HomeLocation,
    JumpClones,
    ActiveImplants,
    LastCloneJumpDate,
    LastStationChangeDate,
    CreatedAt,
    UpdatedAt,
}
