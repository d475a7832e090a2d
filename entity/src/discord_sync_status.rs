use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SyncErrorList(pub Vec<String>);

/// Historical record of one synchronizer execution. `guild_id` is empty for
/// runs spanning every enabled guild.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "discord_sync_status")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub guild_id: String,
    pub status: String,
    pub users_processed: i32,
    pub users_succeeded: i32,
    pub users_failed: i32,
    pub roles_added: i32,
    pub roles_removed: i32,
    #[sea_orm(column_type = "Json")]
    pub errors: SyncErrorList,
    pub duration_ms: Option<i64>,
    pub last_sync_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
