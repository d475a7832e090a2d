use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// Bind from an internal group to a Discord role within a guild. At most one
/// active mapping may exist per `(guild_id, group_id)` pair.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "discord_role_mappings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub guild_id: String,
    pub group_id: String,
    pub discord_role_id: String,
    pub group_name: String,
    pub discord_role_name: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
