use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CharacterCorporationHistory::Table)
                    .if_not_exists()
                    .col(pk_auto(CharacterCorporationHistory::Id))
                    .col(integer_uniq(CharacterCorporationHistory::CharacterId))
                    .col(json(CharacterCorporationHistory::Records))
                    .col(timestamp(CharacterCorporationHistory::CreatedAt))
                    .col(timestamp(CharacterCorporationHistory::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(CharacterCorporationHistory::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
pub enum CharacterCorporationHistory {
    Table,
    Id,
    CharacterId,
    Records,
    CreatedAt,
    UpdatedAt,
}
