use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CharacterSkills::Table)
                    .if_not_exists()
                    .col(pk_auto(CharacterSkills::Id))
                    .col(integer_uniq(CharacterSkills::CharacterId))
                    .col(big_integer(CharacterSkills::TotalSp))
                    .col(integer_null(CharacterSkills::UnallocatedSp))
                    .col(json(CharacterSkills::Skills))
                    .col(timestamp(CharacterSkills::CreatedAt))
                    .col(timestamp(CharacterSkills::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CharacterSkills::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CharacterSkills {
    Table,
    Id,
    CharacterId,
    TotalSp,
    UnallocatedSp,
    Skills,
    CreatedAt,
    UpdatedAt,
}
