//! Character repository.
//!
//! Manages the `characters` collection: profile upserts from ESI, the
//! reconciler's bulk affiliation writes, projection-only id enumeration, and
//! the two name-search strategies.

use chrono::Utc;
use migration::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use sea_orm::sea_query::{Expr, ExprTrait, Func};

use crate::error::domain::DomainError;
use crate::model::esi::{CharacterAffiliation, CharacterPublicInfo};

/// Result cap shared by both search strategies.
pub const SEARCH_RESULT_LIMIT: u64 = 50;

/// Search strategy selected deterministically from the input shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Single token: case-insensitive prefix match, alphabetical order.
    Prefix,
    /// Multiple whitespace-separated tokens: full-text search, relevance
    /// order.
    FullText,
}

impl SearchStrategy {
    /// Picks the strategy for a search input, rejecting strings shorter than
    /// three characters.
    pub fn for_input(name: &str) -> Result<Self, DomainError> {
        let trimmed = name.trim();
        if trimmed.chars().count() < 3 {
            return Err(DomainError::Validation(
                "search name must be at least 3 characters".to_string(),
            ));
        }

        if trimmed.split_whitespace().nth(1).is_some() {
            Ok(Self::FullText)
        } else {
            Ok(Self::Prefix)
        }
    }
}

/// Ordered search results with an attached count.
#[derive(Clone, Debug)]
pub struct CharacterSearchResult {
    pub characters: Vec<entity::character::Model>,
    pub count: u64,
}

/// Repository for the `characters` collection.
pub struct CharacterRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CharacterRepository<'a> {
    /// Creates a new instance of [`CharacterRepository`].
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Looks up a character by its ESI character ID.
    pub async fn find_by_character_id(
        &self,
        character_id: i32,
    ) -> Result<Option<entity::character::Model>, DbErr> {
        entity::prelude::Character::find()
            .filter(entity::character::Column::CharacterId.eq(character_id))
            .one(self.db)
            .await
    }

    /// Inserts or updates a character's full profile from ESI.
    ///
    /// On conflict with an existing `character_id` every profile field is
    /// replaced and `updated_at` advances; `created_at` is only written on
    /// insert. Concurrent first-insert races resolve through the conflict
    /// clause, leaving exactly one row.
    pub async fn upsert_profile(
        &self,
        character_id: i32,
        profile: CharacterPublicInfo,
    ) -> Result<entity::character::Model, DbErr> {
        let now = Utc::now().naive_utc();

        entity::prelude::Character::insert(entity::character::ActiveModel {
            character_id: ActiveValue::Set(character_id),
            name: ActiveValue::Set(profile.name),
            corporation_id: ActiveValue::Set(profile.corporation_id),
            alliance_id: ActiveValue::Set(profile.alliance_id),
            faction_id: ActiveValue::Set(profile.faction_id),
            birthday: ActiveValue::Set(profile.birthday.map(|b| b.naive_utc())),
            security_status: ActiveValue::Set(profile.security_status),
            race_id: ActiveValue::Set(profile.race_id),
            bloodline_id: ActiveValue::Set(profile.bloodline_id),
            ancestry_id: ActiveValue::Set(profile.ancestry_id),
            gender: ActiveValue::Set(profile.gender),
            description: ActiveValue::Set(profile.description),
            title: ActiveValue::Set(profile.title),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(entity::character::Column::CharacterId)
                .update_columns([
                    entity::character::Column::Name,
                    entity::character::Column::CorporationId,
                    entity::character::Column::AllianceId,
                    entity::character::Column::FactionId,
                    entity::character::Column::Birthday,
                    entity::character::Column::SecurityStatus,
                    entity::character::Column::RaceId,
                    entity::character::Column::BloodlineId,
                    entity::character::Column::AncestryId,
                    entity::character::Column::Gender,
                    entity::character::Column::Description,
                    entity::character::Column::Title,
                    entity::character::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await
    }

    /// Bulk-upserts affiliation tuples from one reconciler batch.
    ///
    /// Existing characters get their (corporation, alliance, faction)
    /// replaced with `updated_at` advanced; characters present upstream but
    /// absent from the store are inserted with an empty name, to be filled by
    /// the next profile read.
    pub async fn upsert_affiliations(
        &self,
        affiliations: &[CharacterAffiliation],
    ) -> Result<(), DbErr> {
        if affiliations.is_empty() {
            return Ok(());
        }

        let now = Utc::now().naive_utc();
        let models = affiliations
            .iter()
            .map(|affiliation| entity::character::ActiveModel {
                character_id: ActiveValue::Set(affiliation.character_id),
                name: ActiveValue::Set(String::new()),
                corporation_id: ActiveValue::Set(affiliation.corporation_id),
                alliance_id: ActiveValue::Set(affiliation.alliance_id),
                faction_id: ActiveValue::Set(affiliation.faction_id),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            });

        entity::prelude::Character::insert_many(models)
            .on_conflict(
                OnConflict::column(entity::character::Column::CharacterId)
                    .update_columns([
                        entity::character::Column::CorporationId,
                        entity::character::Column::AllianceId,
                        entity::character::Column::FactionId,
                        entity::character::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Enumerates every known character ID (projection only).
    pub async fn all_character_ids(&self) -> Result<Vec<i32>, DbErr> {
        entity::prelude::Character::find()
            .select_only()
            .column(entity::character::Column::CharacterId)
            .order_by_asc(entity::character::Column::CharacterId)
            .into_tuple::<i32>()
            .all(self.db)
            .await
    }

    /// Searches characters by name using the strategy derived from the input.
    ///
    /// Single tokens run a case-insensitive prefix match sorted
    /// alphabetically; multi-token inputs run Postgres full-text search
    /// sorted by relevance. Both cap at [`SEARCH_RESULT_LIMIT`].
    pub async fn search_by_name(
        &self,
        name: &str,
    ) -> Result<CharacterSearchResult, crate::error::Error> {
        let strategy = SearchStrategy::for_input(name)?;
        let trimmed = name.trim();

        let query = match strategy {
            SearchStrategy::Prefix => {
                // Escape LIKE metacharacters so a literal % or _ in the input
                // cannot widen the scan.
                let escaped = trimmed.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
                let pattern = format!("{}%", escaped.to_lowercase());

                entity::prelude::Character::find()
                    .filter(
                        Expr::expr(Func::lower(Expr::col((
                            entity::character::Entity,
                            entity::character::Column::Name,
                        ))))
                        .like(pattern),
                    )
                    .order_by_asc(entity::character::Column::Name)
            }
            SearchStrategy::FullText => entity::prelude::Character::find()
                .filter(Expr::cust_with_values(
                    "to_tsvector('simple', name) @@ plainto_tsquery('simple', ?)",
                    [trimmed],
                ))
                .order_by(
                    Expr::cust_with_values(
                        "ts_rank(to_tsvector('simple', name), plainto_tsquery('simple', ?))",
                        [trimmed],
                    ),
                    Order::Desc,
                ),
        };

        let characters = query.limit(SEARCH_RESULT_LIMIT).all(self.db).await?;
        let count = characters.len() as u64;

        Ok(CharacterSearchResult { characters, count })
    }

    /// Counts every stored character.
    pub async fn count(&self) -> Result<u64, DbErr> {
        entity::prelude::Character::find().count(self.db).await
    }
}

#[cfg(test)]
mod strategy_tests {
    use super::SearchStrategy;
    use crate::error::domain::DomainError;

    /// Expect short inputs to be rejected by validation
    #[test]
    fn rejects_short_inputs() {
        assert!(matches!(
            SearchStrategy::for_input("ab"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            SearchStrategy::for_input("  a  "),
            Err(DomainError::Validation(_))
        ));
    }

    /// Expect single tokens to select the prefix strategy
    #[test]
    fn selects_prefix_for_single_tokens() {
        assert_eq!(
            SearchStrategy::for_input("Alice").unwrap(),
            SearchStrategy::Prefix
        );
    }

    /// Expect multi-token inputs to select full-text search
    #[test]
    fn selects_full_text_for_multiple_tokens() {
        assert_eq!(
            SearchStrategy::for_input("Alice Auduin").unwrap(),
            SearchStrategy::FullText
        );
        assert_eq!(
            SearchStrategy::for_input("  three word name ").unwrap(),
            SearchStrategy::FullText
        );
    }
}
