//! ESI response types.
//!
//! Every numeric identifier uses the tolerant deserializers from
//! [`crate::util::serde`] since ESI emits numbers as either integer or
//! floating-point tokens. Schema-first validation is deliberately avoided:
//! unknown fields are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util::serde::{
    flexible_i32, flexible_i64, flexible_opt_i32, flexible_opt_i64, flexible_vec_i32,
};

/// One record of the bulk affiliation response.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CharacterAffiliation {
    #[serde(deserialize_with = "flexible_i32")]
    pub character_id: i32,
    #[serde(deserialize_with = "flexible_i32")]
    pub corporation_id: i32,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub alliance_id: Option<i32>,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub faction_id: Option<i32>,
}

/// Public character sheet.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CharacterPublicInfo {
    pub name: String,
    #[serde(deserialize_with = "flexible_i32")]
    pub corporation_id: i32,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub alliance_id: Option<i32>,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub faction_id: Option<i32>,
    pub birthday: Option<DateTime<Utc>>,
    pub security_status: Option<f64>,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub race_id: Option<i32>,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub bloodline_id: Option<i32>,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub ancestry_id: Option<i32>,
    pub gender: Option<String>,
    pub description: Option<String>,
    pub title: Option<String>,
}

/// Neural attribute distribution.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CharacterAttributes {
    #[serde(deserialize_with = "flexible_i32")]
    pub charisma: i32,
    #[serde(deserialize_with = "flexible_i32")]
    pub intelligence: i32,
    #[serde(deserialize_with = "flexible_i32")]
    pub memory: i32,
    #[serde(deserialize_with = "flexible_i32")]
    pub perception: i32,
    #[serde(deserialize_with = "flexible_i32")]
    pub willpower: i32,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub bonus_remaps: Option<i32>,
    pub accrued_remap_cooldown_date: Option<DateTime<Utc>>,
    pub last_remap_date: Option<DateTime<Utc>>,
}

/// One trained skill.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Skill {
    #[serde(deserialize_with = "flexible_i32")]
    pub skill_id: i32,
    #[serde(deserialize_with = "flexible_i32")]
    pub active_skill_level: i32,
    #[serde(deserialize_with = "flexible_i32")]
    pub trained_skill_level: i32,
    #[serde(deserialize_with = "flexible_i64")]
    pub skillpoints_in_skill: i64,
}

/// Full skill list with total skillpoints.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CharacterSkills {
    #[serde(deserialize_with = "flexible_i64")]
    pub total_sp: i64,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub unallocated_sp: Option<i32>,
    pub skills: Vec<Skill>,
}

/// One slot of the training queue.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SkillQueueEntry {
    #[serde(deserialize_with = "flexible_i32")]
    pub skill_id: i32,
    #[serde(deserialize_with = "flexible_i32")]
    pub queue_position: i32,
    #[serde(deserialize_with = "flexible_i32")]
    pub finished_level: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub finish_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_opt_i64")]
    pub training_start_sp: Option<i64>,
    #[serde(default, deserialize_with = "flexible_opt_i64")]
    pub level_start_sp: Option<i64>,
    #[serde(default, deserialize_with = "flexible_opt_i64")]
    pub level_end_sp: Option<i64>,
}

/// One corporation employment record.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CorporationHistoryEntry {
    #[serde(deserialize_with = "flexible_i32")]
    pub record_id: i32,
    #[serde(deserialize_with = "flexible_i32")]
    pub corporation_id: i32,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Clone location reference as ESI reports it, before enrichment.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CloneLocationRef {
    #[serde(deserialize_with = "flexible_i64")]
    pub location_id: i64,
    pub location_type: String,
}

/// One jump clone.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct JumpCloneData {
    #[serde(deserialize_with = "flexible_i32")]
    pub jump_clone_id: i32,
    #[serde(deserialize_with = "flexible_i64")]
    pub location_id: i64,
    pub location_type: String,
    #[serde(default, deserialize_with = "flexible_vec_i32")]
    pub implants: Vec<i32>,
    pub name: Option<String>,
}

/// Clone state: home location plus jump clones.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CharacterClones {
    pub home_location: Option<CloneLocationRef>,
    #[serde(default)]
    pub jump_clones: Vec<JumpCloneData>,
    pub last_clone_jump_date: Option<DateTime<Utc>>,
    pub last_station_change_date: Option<DateTime<Utc>>,
}

/// Current location; exactly one of station/structure is present when docked.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CharacterLocation {
    #[serde(deserialize_with = "flexible_i32")]
    pub solar_system_id: i32,
    #[serde(default, deserialize_with = "flexible_opt_i64")]
    pub station_id: Option<i64>,
    #[serde(default, deserialize_with = "flexible_opt_i64")]
    pub structure_id: Option<i64>,
}

/// Online status.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CharacterOnline {
    pub online: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub last_logout: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub logins: Option<i32>,
}

/// Current ship.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CharacterShip {
    #[serde(deserialize_with = "flexible_i64")]
    pub ship_item_id: i64,
    pub ship_name: String,
    #[serde(deserialize_with = "flexible_i32")]
    pub ship_type_id: i32,
}

/// Jump fatigue timers.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CharacterFatigue {
    pub jump_fatigue_expire_date: Option<DateTime<Utc>>,
    pub last_jump_date: Option<DateTime<Utc>>,
    pub last_update_date: Option<DateTime<Utc>>,
}

/// Player-owned structure, fetched with a user's bearer token.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Structure {
    pub name: String,
    #[serde(deserialize_with = "flexible_i32")]
    pub owner_id: i32,
    #[serde(deserialize_with = "flexible_i32")]
    pub solar_system_id: i32,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub type_id: Option<i32>,
}

/// Public corporation sheet; the synchronizer only needs name and ticker.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Corporation {
    pub name: String,
    pub ticker: String,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub alliance_id: Option<i32>,
    #[serde(default, deserialize_with = "flexible_opt_i32")]
    pub member_count: Option<i32>,
}
