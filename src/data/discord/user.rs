//! Linked Discord account repository.

use chrono::{NaiveDateTime, Utc};
use migration::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Field set for linking or relinking a Discord account.
///
/// Token fields carry ciphertext; encryption happens in the service layer
/// before the repository is reached.
#[derive(Clone, Debug)]
pub struct UpsertDiscordUser {
    pub user_id: i32,
    pub discord_id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub avatar: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub token_expiry: NaiveDateTime,
    pub scopes: String,
}

/// Repository for the `discord_users` collection.
pub struct DiscordUserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DiscordUserRepository<'a> {
    /// Creates a new instance of [`DiscordUserRepository`].
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts or updates a linked account keyed by `discord_id`.
    ///
    /// On update the tokens, names, avatar, scopes, and owning `user_id` are
    /// replaced, the account is reactivated, and `updated_at` advances.
    /// `linked_at` and `created_at` are only written on insert.
    pub async fn upsert(
        &self,
        user: UpsertDiscordUser,
    ) -> Result<entity::discord_user::Model, DbErr> {
        let now = Utc::now().naive_utc();

        entity::prelude::DiscordUser::insert(entity::discord_user::ActiveModel {
            user_id: ActiveValue::Set(user.user_id),
            discord_id: ActiveValue::Set(user.discord_id),
            username: ActiveValue::Set(user.username),
            global_name: ActiveValue::Set(user.global_name),
            avatar: ActiveValue::Set(user.avatar),
            access_token: ActiveValue::Set(user.access_token),
            refresh_token: ActiveValue::Set(user.refresh_token),
            token_expiry: ActiveValue::Set(user.token_expiry),
            scopes: ActiveValue::Set(user.scopes),
            is_active: ActiveValue::Set(true),
            linked_at: ActiveValue::Set(now),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(entity::discord_user::Column::DiscordId)
                .update_columns([
                    entity::discord_user::Column::UserId,
                    entity::discord_user::Column::Username,
                    entity::discord_user::Column::GlobalName,
                    entity::discord_user::Column::Avatar,
                    entity::discord_user::Column::AccessToken,
                    entity::discord_user::Column::RefreshToken,
                    entity::discord_user::Column::TokenExpiry,
                    entity::discord_user::Column::Scopes,
                    entity::discord_user::Column::IsActive,
                    entity::discord_user::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await
    }

    /// Looks up an account by Discord snowflake.
    pub async fn find_by_discord_id(
        &self,
        discord_id: &str,
    ) -> Result<Option<entity::discord_user::Model>, DbErr> {
        entity::prelude::DiscordUser::find()
            .filter(entity::discord_user::Column::DiscordId.eq(discord_id))
            .one(self.db)
            .await
    }

    /// Looks up the active account linked to an internal user.
    pub async fn find_active_by_user_id(
        &self,
        user_id: i32,
    ) -> Result<Option<entity::discord_user::Model>, DbErr> {
        entity::prelude::DiscordUser::find()
            .filter(entity::discord_user::Column::UserId.eq(user_id))
            .filter(entity::discord_user::Column::IsActive.eq(true))
            .one(self.db)
            .await
    }

    /// Enumerates every active linked account.
    pub async fn all_active(&self) -> Result<Vec<entity::discord_user::Model>, DbErr> {
        entity::prelude::DiscordUser::find()
            .filter(entity::discord_user::Column::IsActive.eq(true))
            .order_by_asc(entity::discord_user::Column::Id)
            .all(self.db)
            .await
    }

    /// Selects active accounts whose token expires before the cutoff, oldest
    /// expiry first, capped at `limit` for one refresh batch.
    pub async fn expiring_before(
        &self,
        cutoff: NaiveDateTime,
        limit: u64,
    ) -> Result<Vec<entity::discord_user::Model>, DbErr> {
        entity::prelude::DiscordUser::find()
            .filter(entity::discord_user::Column::IsActive.eq(true))
            .filter(entity::discord_user::Column::TokenExpiry.lt(cutoff))
            .order_by_asc(entity::discord_user::Column::TokenExpiry)
            .limit(limit)
            .all(self.db)
            .await
    }

    /// Replaces an account's token bundle after a successful refresh grant.
    pub async fn update_tokens(
        &self,
        id: i32,
        access_token: String,
        refresh_token: String,
        token_expiry: NaiveDateTime,
    ) -> Result<entity::discord_user::Model, DbErr> {
        let model = entity::discord_user::ActiveModel {
            id: ActiveValue::Unchanged(id),
            access_token: ActiveValue::Set(access_token),
            refresh_token: ActiveValue::Set(refresh_token),
            token_expiry: ActiveValue::Set(token_expiry),
            updated_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        entity::prelude::DiscordUser::update(model).exec(self.db).await
    }

    /// Soft-deletes an account on unlink.
    pub async fn deactivate(&self, discord_id: &str) -> Result<u64, DbErr> {
        let result = entity::prelude::DiscordUser::update_many()
            .col_expr(
                entity::discord_user::Column::IsActive,
                sea_orm::sea_query::Expr::value(false),
            )
            .col_expr(
                entity::discord_user::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(Utc::now().naive_utc()),
            )
            .filter(entity::discord_user::Column::DiscordId.eq(discord_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
