use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Clone location, enriched with a resolved name and type where possible.
/// Name and type id stay empty when resolution fails; that is never fatal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct CloneLocation {
    pub location_id: i64,
    pub location_type: String,
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub location_type_id: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct JumpClone {
    pub jump_clone_id: i32,
    pub name: Option<String>,
    pub location: CloneLocation,
    pub implants: Vec<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct JumpCloneList(pub Vec<JumpClone>);

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "character_clones")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub character_id: i32,
    #[sea_orm(column_type = "Json", nullable)]
    pub home_location: Option<CloneLocation>,
    #[sea_orm(column_type = "Json")]
    pub jump_clones: JumpCloneList,
    #[sea_orm(column_type = "Json")]
    pub active_implants: ActiveImplants,
    pub last_clone_jump_date: Option<NaiveDateTime>,
    pub last_station_change_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ActiveImplants(pub Vec<i32>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
