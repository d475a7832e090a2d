//! Persisted character sheet kinds: attributes, skills, skill queue, and
//! corporation history.

use entity::character_corporation_history::{CorporationHistoryEntries, CorporationHistoryEntry};
use entity::character_skill_queue::{SkillQueueEntries, SkillQueueEntry};
use entity::character_skills::{SkillEntry, SkillList};

use crate::cache::CacheKind;
use crate::data::character_data::{
    AttributesRepository, CorporationHistoryRepository, SkillQueueRepository, SkillsRepository,
};
use crate::error::Error;
use crate::model::esi;
use crate::service::retry::RetryContext;
use crate::service::static_data::StaticDataService;

use super::{esi_not_found, CharacterDataService};

fn skill_entry(skill: esi::Skill) -> SkillEntry {
    SkillEntry {
        skill_id: skill.skill_id,
        active_skill_level: skill.active_skill_level,
        trained_skill_level: skill.trained_skill_level,
        skillpoints_in_skill: skill.skillpoints_in_skill,
    }
}

fn queue_entry(entry: esi::SkillQueueEntry) -> SkillQueueEntry {
    SkillQueueEntry {
        skill_id: entry.skill_id,
        queue_position: entry.queue_position,
        finished_level: entry.finished_level,
        start_date: entry.start_date.map(|d| d.naive_utc()),
        finish_date: entry.finish_date.map(|d| d.naive_utc()),
        training_start_sp: entry.training_start_sp,
        level_start_sp: entry.level_start_sp,
        level_end_sp: entry.level_end_sp,
    }
}

fn history_entry(entry: esi::CorporationHistoryEntry) -> CorporationHistoryEntry {
    CorporationHistoryEntry {
        record_id: entry.record_id,
        corporation_id: entry.corporation_id,
        start_date: entry.start_date.naive_utc(),
        is_deleted: entry.is_deleted,
    }
}

impl<S: StaticDataService> CharacterDataService<'_, S> {
    /// Neural attributes (30 minute cache).
    pub async fn attributes(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<entity::character_attributes::Model, Error> {
        if let Some(cached) = self
            .cache
            .get::<entity::character_attributes::Model>(CacheKind::Attributes, character_id)
            .await?
        {
            return Ok(cached);
        }

        let repo = AttributesRepository::new(self.db);
        if let Some(stored) = repo.find_by_character_id(character_id).await? {
            self.cache
                .put(CacheKind::Attributes, character_id, &stored)
                .await?;
            return Ok(stored);
        }

        let client = self.esi_client;
        let fetched = RetryContext::new()
            .execute_with_retry(
                &format!("attributes fetch for character {character_id}"),
                move || async move { Ok(client.character_attributes(character_id, token).await?) },
            )
            .await
            .map_err(|e| esi_not_found(e, format!("attributes for character {character_id}")))?;

        let stored = repo.upsert(character_id, &fetched).await?;
        self.cache
            .put(CacheKind::Attributes, character_id, &stored)
            .await?;

        Ok(stored)
    }

    /// Trained skills (30 minute cache).
    pub async fn skills(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<entity::character_skills::Model, Error> {
        if let Some(cached) = self
            .cache
            .get::<entity::character_skills::Model>(CacheKind::Skills, character_id)
            .await?
        {
            return Ok(cached);
        }

        let repo = SkillsRepository::new(self.db);
        if let Some(stored) = repo.find_by_character_id(character_id).await? {
            self.cache
                .put(CacheKind::Skills, character_id, &stored)
                .await?;
            return Ok(stored);
        }

        let client = self.esi_client;
        let fetched = RetryContext::new()
            .execute_with_retry(
                &format!("skills fetch for character {character_id}"),
                move || async move { Ok(client.character_skills(character_id, token).await?) },
            )
            .await
            .map_err(|e| esi_not_found(e, format!("skills for character {character_id}")))?;

        let skills = SkillList(fetched.skills.into_iter().map(skill_entry).collect());
        let stored = repo
            .upsert(character_id, fetched.total_sp, fetched.unallocated_sp, skills)
            .await?;
        self.cache
            .put(CacheKind::Skills, character_id, &stored)
            .await?;

        Ok(stored)
    }

    /// Training queue (5 minute cache), ordered by queue position.
    pub async fn skill_queue(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<entity::character_skill_queue::Model, Error> {
        if let Some(cached) = self
            .cache
            .get::<entity::character_skill_queue::Model>(CacheKind::SkillQueue, character_id)
            .await?
        {
            return Ok(cached);
        }

        let repo = SkillQueueRepository::new(self.db);
        if let Some(stored) = repo.find_by_character_id(character_id).await? {
            self.cache
                .put(CacheKind::SkillQueue, character_id, &stored)
                .await?;
            return Ok(stored);
        }

        let client = self.esi_client;
        let fetched = RetryContext::new()
            .execute_with_retry(
                &format!("skill queue fetch for character {character_id}"),
                move || async move { Ok(client.character_skill_queue(character_id, token).await?) },
            )
            .await
            .map_err(|e| esi_not_found(e, format!("skill queue for character {character_id}")))?;

        let mut entries: Vec<SkillQueueEntry> = fetched.into_iter().map(queue_entry).collect();
        entries.sort_by_key(|entry| entry.queue_position);

        let stored = repo
            .upsert(character_id, SkillQueueEntries(entries))
            .await?;
        self.cache
            .put(CacheKind::SkillQueue, character_id, &stored)
            .await?;

        Ok(stored)
    }

    /// Corporation employment history (24 hour cache), newest first.
    pub async fn corporation_history(
        &self,
        character_id: i32,
    ) -> Result<entity::character_corporation_history::Model, Error> {
        if let Some(cached) = self
            .cache
            .get::<entity::character_corporation_history::Model>(
                CacheKind::CorporationHistory,
                character_id,
            )
            .await?
        {
            return Ok(cached);
        }

        let repo = CorporationHistoryRepository::new(self.db);
        if let Some(stored) = repo.find_by_character_id(character_id).await? {
            self.cache
                .put(CacheKind::CorporationHistory, character_id, &stored)
                .await?;
            return Ok(stored);
        }

        let client = self.esi_client;
        let fetched = RetryContext::new()
            .execute_with_retry(
                &format!("corporation history fetch for character {character_id}"),
                move || async move {
                    Ok(client.character_corporation_history(character_id).await?)
                },
            )
            .await
            .map_err(|e| {
                esi_not_found(e, format!("corporation history for character {character_id}"))
            })?;

        let mut records: Vec<CorporationHistoryEntry> =
            fetched.into_iter().map(history_entry).collect();
        records.sort_by(|a, b| b.start_date.cmp(&a.start_date));

        let stored = repo
            .upsert(character_id, CorporationHistoryEntries(records))
            .await?;
        self.cache
            .put(CacheKind::CorporationHistory, character_id, &stored)
            .await?;

        Ok(stored)
    }
}
