use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CharacterAttributes::Table)
                    .if_not_exists()
                    .col(pk_auto(CharacterAttributes::Id))
                    .col(integer_uniq(CharacterAttributes::CharacterId))
                    .col(integer(CharacterAttributes::Charisma))
                    .col(integer(CharacterAttributes::Intelligence))
                    .col(integer(CharacterAttributes::Memory))
                    .col(integer(CharacterAttributes::Perception))
                    .col(integer(CharacterAttributes::Willpower))
                    .col(integer_null(CharacterAttributes::BonusRemaps))
                    .col(timestamp_null(CharacterAttributes::AccruedRemapCooldownDate))
                    .col(timestamp_null(CharacterAttributes::LastRemapDate))
                    .col(timestamp(CharacterAttributes::CreatedAt))
                    .col(timestamp(CharacterAttributes::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CharacterAttributes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CharacterAttributes {
    Table,
    Id,
    CharacterId,
    Charisma,
    Intelligence,
    Memory,
    Perception,
    Willpower,
    BonusRemaps,
    AccruedRemapCooldownDate,
    LastRemapDate,
    CreatedAt,
    UpdatedAt,
}
