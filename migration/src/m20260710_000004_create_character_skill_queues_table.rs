use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CharacterSkillQueues::Table)
                    .if_not_exists()
                    .col(pk_auto(CharacterSkillQueues::Id))
                    .col(integer_uniq(CharacterSkillQueues::CharacterId))
                    .col(json(CharacterSkillQueues::Entries))
                    .col(timestamp(CharacterSkillQueues::CreatedAt))
                    .col(timestamp(CharacterSkillQueues::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CharacterSkillQueues::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CharacterSkillQueues {
    Table,
    Id,
    CharacterId,
    Entries,
    CreatedAt,
    UpdatedAt,
}
