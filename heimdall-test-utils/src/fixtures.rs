//! Row fixtures for common test state.

use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use heimdall::util::crypto::TokenCipher;

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Inserts a character with the given affiliation.
pub async fn character(
    db: &DatabaseConnection,
    character_id: i32,
    name: &str,
    corporation_id: i32,
    alliance_id: Option<i32>,
) -> Result<entity::character::Model, DbErr> {
    entity::character::ActiveModel {
        character_id: ActiveValue::Set(character_id),
        name: ActiveValue::Set(name.to_string()),
        corporation_id: ActiveValue::Set(corporation_id),
        alliance_id: ActiveValue::Set(alliance_id),
        faction_id: ActiveValue::Set(None),
        created_at: ActiveValue::Set(now()),
        updated_at: ActiveValue::Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Inserts an active linked Discord account with encrypted placeholder
/// tokens expiring in seven days.
pub async fn discord_user(
    db: &DatabaseConnection,
    cipher: &TokenCipher,
    user_id: i32,
    discord_id: &str,
) -> Result<entity::discord_user::Model, DbErr> {
    discord_user_with_expiry(db, cipher, user_id, discord_id, now() + Duration::days(7)).await
}

/// Inserts an active linked Discord account with a chosen token expiry.
pub async fn discord_user_with_expiry(
    db: &DatabaseConnection,
    cipher: &TokenCipher,
    user_id: i32,
    discord_id: &str,
    token_expiry: NaiveDateTime,
) -> Result<entity::discord_user::Model, DbErr> {
    let access_token = cipher
        .encrypt(&format!("access-{discord_id}"))
        .expect("fixture token encryption failed");
    let refresh_token = cipher
        .encrypt(&format!("refresh-{discord_id}"))
        .expect("fixture token encryption failed");

    entity::discord_user::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        discord_id: ActiveValue::Set(discord_id.to_string()),
        username: ActiveValue::Set(format!("user{user_id}")),
        global_name: ActiveValue::Set(None),
        avatar: ActiveValue::Set(None),
        access_token: ActiveValue::Set(access_token),
        refresh_token: ActiveValue::Set(refresh_token),
        token_expiry: ActiveValue::Set(token_expiry),
        scopes: ActiveValue::Set("identify guilds guilds.join".to_string()),
        is_active: ActiveValue::Set(true),
        linked_at: ActiveValue::Set(now()),
        created_at: ActiveValue::Set(now()),
        updated_at: ActiveValue::Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Inserts an enabled guild configuration with an encrypted bot token.
pub async fn guild_config(
    db: &DatabaseConnection,
    cipher: &TokenCipher,
    guild_id: &str,
    bot_token: &str,
) -> Result<entity::discord_guild_config::Model, DbErr> {
    let encrypted = cipher
        .encrypt(bot_token)
        .expect("fixture token encryption failed");

    entity::discord_guild_config::ActiveModel {
        guild_id: ActiveValue::Set(guild_id.to_string()),
        guild_name: ActiveValue::Set(format!("Guild {guild_id}")),
        bot_token: ActiveValue::Set(encrypted),
        is_enabled: ActiveValue::Set(true),
        created_at: ActiveValue::Set(now()),
        updated_at: ActiveValue::Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Inserts a role mapping.
pub async fn role_mapping(
    db: &DatabaseConnection,
    guild_id: &str,
    group_id: &str,
    discord_role_id: &str,
    is_active: bool,
) -> Result<entity::discord_role_mapping::Model, DbErr> {
    entity::discord_role_mapping::ActiveModel {
        guild_id: ActiveValue::Set(guild_id.to_string()),
        group_id: ActiveValue::Set(group_id.to_string()),
        discord_role_id: ActiveValue::Set(discord_role_id.to_string()),
        group_name: ActiveValue::Set(format!("group-{group_id}")),
        discord_role_name: ActiveValue::Set(format!("role-{discord_role_id}")),
        is_active: ActiveValue::Set(is_active),
        created_at: ActiveValue::Set(now()),
        updated_at: ActiveValue::Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Inserts an active group membership row.
pub async fn group_membership(
    db: &DatabaseConnection,
    user_id: i32,
    group_id: &str,
) -> Result<entity::user_group_membership::Model, DbErr> {
    entity::user_group_membership::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        group_id: ActiveValue::Set(group_id.to_string()),
        group_name: ActiveValue::Set(format!("group-{group_id}")),
        is_active: ActiveValue::Set(true),
        created_at: ActiveValue::Set(now()),
        updated_at: ActiveValue::Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Inserts a user profile with a main character.
pub async fn user_profile(
    db: &DatabaseConnection,
    user_id: i32,
    main_character_id: Option<i32>,
) -> Result<entity::user_profile::Model, DbErr> {
    entity::user_profile::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        main_character_id: ActiveValue::Set(main_character_id),
        created_at: ActiveValue::Set(now()),
        updated_at: ActiveValue::Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await
}
