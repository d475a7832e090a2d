use sea_orm_migration::{prelude::*, schema::*};

static IDX_CHARACTERS_NAME_LOWER: &str = "idx_characters_name_lower";
static IDX_CHARACTERS_NAME_FULLTEXT: &str = "idx_characters_name_fulltext";
static IDX_CHARACTERS_CORPORATION_ID: &str = "idx_characters_corporation_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Characters::Table)
                    .if_not_exists()
                    .col(pk_auto(Characters::Id))
                    .col(integer_uniq(Characters::CharacterId))
                    .col(string(Characters::Name))
                    .col(integer(Characters::CorporationId))
                    .col(integer_null(Characters::AllianceId))
                    .col(integer_null(Characters::FactionId))
                    .col(date_time_null(Characters::Birthday))
                    .col(double_null(Characters::SecurityStatus))
                    .col(integer_null(Characters::RaceId))
                    .col(integer_null(Characters::BloodlineId))
                    .col(integer_null(Characters::AncestryId))
                    .col(string_null(Characters::Gender))
                    .col(text_null(Characters::Description))
                    .col(string_null(Characters::Title))
                    .col(timestamp(Characters::CreatedAt))
                    .col(timestamp(Characters::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_CHARACTERS_CORPORATION_ID)
                    .table(Characters::Table)
                    .col(Characters::CorporationId)
                    .to_owned(),
            )
            .await?;

        // Expression indexes for the two name-search strategies: a lower(name)
        // index backing the case-insensitive prefix scan and a GIN tsvector
        // index backing multi-token full-text search.
        let conn = manager.get_connection();
        conn.execute_unprepared(&format!(
            "CREATE INDEX IF NOT EXISTS {IDX_CHARACTERS_NAME_LOWER} ON characters (LOWER(name) varchar_pattern_ops)"
        ))
        .await?;
        conn.execute_unprepared(&format!(
            "CREATE INDEX IF NOT EXISTS {IDX_CHARACTERS_NAME_FULLTEXT} ON characters USING GIN (to_tsvector('simple', name))"
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared(&format!("DROP INDEX IF EXISTS {IDX_CHARACTERS_NAME_FULLTEXT}"))
            .await?;
        conn.execute_unprepared(&format!("DROP INDEX IF EXISTS {IDX_CHARACTERS_NAME_LOWER}"))
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name(IDX_CHARACTERS_CORPORATION_ID)
                    .table(Characters::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Characters::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Characters {
    Table,
    Id,
    CharacterId,
    Name,
    CorporationId,
    AllianceId,
    FactionId,
    Birthday,
    SecurityStatus,
    RaceId,
    BloodlineId,
    AncestryId,
    Gender,
    Description,
    Title,
    CreatedAt,
    UpdatedAt,
}
