//! Repositories for per-character scoped collections.
//!
//! Each character-scoped kind (attributes, skills, skill queue, corporation
//! history, clones, implants) lives in its own collection keyed by
//! `character_id` and shares the same lifecycle: upsert on write-through from
//! the read pipeline, `updated_at` advanced on every write, `created_at` set
//! on first insert.

use chrono::Utc;
use migration::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use entity::character_clones::{ActiveImplants, CloneLocation, JumpCloneList};
use entity::character_corporation_history::CorporationHistoryEntries;
use entity::character_implants::ImplantList;
use entity::character_skill_queue::SkillQueueEntries;
use entity::character_skills::SkillList;

use crate::model::esi;

/// Repository for the `character_attributes` collection.
pub struct AttributesRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AttributesRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_character_id(
        &self,
        character_id: i32,
    ) -> Result<Option<entity::character_attributes::Model>, DbErr> {
        entity::prelude::CharacterAttributes::find()
            .filter(entity::character_attributes::Column::CharacterId.eq(character_id))
            .one(self.db)
            .await
    }

    pub async fn upsert(
        &self,
        character_id: i32,
        attributes: &esi::CharacterAttributes,
    ) -> Result<entity::character_attributes::Model, DbErr> {
        let now = Utc::now().naive_utc();

        entity::prelude::CharacterAttributes::insert(
            entity::character_attributes::ActiveModel {
                character_id: ActiveValue::Set(character_id),
                charisma: ActiveValue::Set(attributes.charisma),
                intelligence: ActiveValue::Set(attributes.intelligence),
                memory: ActiveValue::Set(attributes.memory),
                perception: ActiveValue::Set(attributes.perception),
                willpower: ActiveValue::Set(attributes.willpower),
                bonus_remaps: ActiveValue::Set(attributes.bonus_remaps),
                accrued_remap_cooldown_date: ActiveValue::Set(
                    attributes.accrued_remap_cooldown_date.map(|d| d.naive_utc()),
                ),
                last_remap_date: ActiveValue::Set(
                    attributes.last_remap_date.map(|d| d.naive_utc()),
                ),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            },
        )
        .on_conflict(
            OnConflict::column(entity::character_attributes::Column::CharacterId)
                .update_columns([
                    entity::character_attributes::Column::Charisma,
                    entity::character_attributes::Column::Intelligence,
                    entity::character_attributes::Column::Memory,
                    entity::character_attributes::Column::Perception,
                    entity::character_attributes::Column::Willpower,
                    entity::character_attributes::Column::BonusRemaps,
                    entity::character_attributes::Column::AccruedRemapCooldownDate,
                    entity::character_attributes::Column::LastRemapDate,
                    entity::character_attributes::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await
    }
}

/// Repository for the `character_skills` collection.
pub struct SkillsRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SkillsRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_character_id(
        &self,
        character_id: i32,
    ) -> Result<Option<entity::character_skills::Model>, DbErr> {
        entity::prelude::CharacterSkills::find()
            .filter(entity::character_skills::Column::CharacterId.eq(character_id))
            .one(self.db)
            .await
    }

    pub async fn upsert(
        &self,
        character_id: i32,
        total_sp: i64,
        unallocated_sp: Option<i32>,
        skills: SkillList,
    ) -> Result<entity::character_skills::Model, DbErr> {
        let now = Utc::now().naive_utc();

        entity::prelude::CharacterSkills::insert(entity::character_skills::ActiveModel {
            character_id: ActiveValue::Set(character_id),
            total_sp: ActiveValue::Set(total_sp),
            unallocated_sp: ActiveValue::Set(unallocated_sp),
            skills: ActiveValue::Set(skills),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(entity::character_skills::Column::CharacterId)
                .update_columns([
                    entity::character_skills::Column::TotalSp,
                    entity::character_skills::Column::UnallocatedSp,
                    entity::character_skills::Column::Skills,
                    entity::character_skills::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await
    }
}

/// Repository for the `character_skill_queues` collection.
pub struct SkillQueueRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SkillQueueRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_character_id(
        &self,
        character_id: i32,
    ) -> Result<Option<entity::character_skill_queue::Model>, DbErr> {
        entity::prelude::CharacterSkillQueue::find()
            .filter(entity::character_skill_queue::Column::CharacterId.eq(character_id))
            .one(self.db)
            .await
    }

    pub async fn upsert(
        &self,
        character_id: i32,
        entries: SkillQueueEntries,
    ) -> Result<entity::character_skill_queue::Model, DbErr> {
        let now = Utc::now().naive_utc();

        entity::prelude::CharacterSkillQueue::insert(
            entity::character_skill_queue::ActiveModel {
                character_id: ActiveValue::Set(character_id),
                entries: ActiveValue::Set(entries),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            },
        )
        .on_conflict(
            OnConflict::column(entity::character_skill_queue::Column::CharacterId)
                .update_columns([
                    entity::character_skill_queue::Column::Entries,
                    entity::character_skill_queue::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await
    }
}

/// Repository for the `character_corporation_history` collection.
pub struct CorporationHistoryRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CorporationHistoryRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_character_id(
        &self,
        character_id: i32,
    ) -> Result<Option<entity::character_corporation_history::Model>, DbErr> {
        entity::prelude::CharacterCorporationHistory::find()
            .filter(
                entity::character_corporation_history::Column::CharacterId.eq(character_id),
            )
            .one(self.db)
            .await
    }

    pub async fn upsert(
        &self,
        character_id: i32,
        records: CorporationHistoryEntries,
    ) -> Result<entity::character_corporation_history::Model, DbErr> {
        let now = Utc::now().naive_utc();

        entity::prelude::CharacterCorporationHistory::insert(
            entity::character_corporation_history::ActiveModel {
                character_id: ActiveValue::Set(character_id),
                records: ActiveValue::Set(records),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            },
        )
        .on_conflict(
            OnConflict::column(
                entity::character_corporation_history::Column::CharacterId,
            )
            .update_columns([
                entity::character_corporation_history::Column::Records,
                entity::character_corporation_history::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec_with_returning(self.db)
        .await
    }
}

/// Repository for the `character_clones` collection.
pub struct ClonesRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ClonesRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_character_id(
        &self,
        character_id: i32,
    ) -> Result<Option<entity::character_clones::Model>, DbErr> {
        entity::prelude::CharacterClones::find()
            .filter(entity::character_clones::Column::CharacterId.eq(character_id))
            .one(self.db)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn upsert(
        &self,
        character_id: i32,
        home_location: Option<CloneLocation>,
        jump_clones: JumpCloneList,
        active_implants: ActiveImplants,
        last_clone_jump_date: Option<chrono::NaiveDateTime>,
        last_station_change_date: Option<chrono::NaiveDateTime>,
    ) -> Result<entity::character_clones::Model, DbErr> {
        let now = Utc::now().naive_utc();

        entity::prelude::CharacterClones::insert(entity::character_clones::ActiveModel {
            character_id: ActiveValue::Set(character_id),
            home_location: ActiveValue::Set(home_location),
            jump_clones: ActiveValue::Set(jump_clones),
            active_implants: ActiveValue::Set(active_implants),
            last_clone_jump_date: ActiveValue::Set(last_clone_jump_date),
            last_station_change_date: ActiveValue::Set(last_station_change_date),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(entity::character_clones::Column::CharacterId)
                .update_columns([
                    entity::character_clones::Column::HomeLocation,
                    entity::character_clones::Column::JumpClones,
                    entity::character_clones::Column::ActiveImplants,
                    entity::character_clones::Column::LastCloneJumpDate,
                    entity::character_clones::Column::LastStationChangeDate,
                    entity::character_clones::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await
    }
}

/// Repository for the `character_implants` collection.
pub struct ImplantsRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ImplantsRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_character_id(
        &self,
        character_id: i32,
    ) -> Result<Option<entity::character_implants::Model>, DbErr> {
        entity::prelude::CharacterImplants::find()
            .filter(entity::character_implants::Column::CharacterId.eq(character_id))
            .one(self.db)
            .await
    }

    pub async fn upsert(
        &self,
        character_id: i32,
        implants: ImplantList,
    ) -> Result<entity::character_implants::Model, DbErr> {
        let now = Utc::now().naive_utc();

        entity::prelude::CharacterImplants::insert(entity::character_implants::ActiveModel {
            character_id: ActiveValue::Set(character_id),
            implants: ActiveValue::Set(implants),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(entity::character_implants::Column::CharacterId)
                .update_columns([
                    entity::character_implants::Column::Implants,
                    entity::character_implants::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await
    }
}
