//! One-time OAuth state repository.
//!
//! States are random 256-bit strings valid for fifteen minutes. The consume
//! path fuses lookup and deletion so a state can be redeemed at most once;
//! an hourly sweep clears rows that expired without being redeemed.

use chrono::{NaiveDateTime, Utc};
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

/// Repository for the `discord_oauth_states` collection.
pub struct OAuthStateRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OAuthStateRepository<'a> {
    /// Creates a new instance of [`OAuthStateRepository`].
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores a freshly allocated state.
    pub async fn create(
        &self,
        state: &str,
        user_id: Option<i32>,
        expires_at: NaiveDateTime,
    ) -> Result<entity::discord_oauth_state::Model, DbErr> {
        entity::prelude::DiscordOauthState::insert(entity::discord_oauth_state::ActiveModel {
            state: ActiveValue::Set(state.to_string()),
            user_id: ActiveValue::Set(user_id),
            expires_at: ActiveValue::Set(expires_at),
            created_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        })
        .exec_with_returning(self.db)
        .await
    }

    /// Atomically redeems a state, enforcing one-time use.
    ///
    /// Looks up the row constrained to `expires_at > now`, then deletes it by
    /// id. Two racing callers both find the row but only the one whose delete
    /// removes it wins; the loser observes zero rows affected and gets
    /// `None`, exactly as if the state never existed.
    pub async fn consume(
        &self,
        state: &str,
    ) -> Result<Option<entity::discord_oauth_state::Model>, DbErr> {
        let now = Utc::now().naive_utc();

        let Some(row) = entity::prelude::DiscordOauthState::find()
            .filter(entity::discord_oauth_state::Column::State.eq(state))
            .filter(entity::discord_oauth_state::Column::ExpiresAt.gt(now))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let deleted = entity::prelude::DiscordOauthState::delete_many()
            .filter(entity::discord_oauth_state::Column::Id.eq(row.id))
            .exec(self.db)
            .await?;

        if deleted.rows_affected == 1 {
            Ok(Some(row))
        } else {
            Ok(None)
        }
    }

    /// Sweeps states that expired without being redeemed.
    pub async fn delete_expired(&self) -> Result<u64, DbErr> {
        let now = Utc::now().naive_utc();

        let result = entity::prelude::DiscordOauthState::delete_many()
            .filter(entity::discord_oauth_state::Column::ExpiresAt.lte(now))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
