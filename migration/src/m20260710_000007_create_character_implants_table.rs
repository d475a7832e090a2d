use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CharacterImplants::Table)
                    .if_not_exists()
                    .col(pk_auto(CharacterImplants::Id))
                    .col(integer_uniq(CharacterImplants::CharacterId))
                    .col(json(CharacterImplants::Implants))
                    .col(timestamp(CharacterImplants::CreatedAt))
                    .col(timestamp(CharacterImplants::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CharacterImplants::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CharacterImplants {
    Table,
    Id,
    CharacterId,
    Implants,
    CreatedAt,
    UpdatedAt,
}
