//! Clone state and implants, with location enrichment.
//!
//! Reading clones implicitly also reads implants: after the clone response
//! is persisted, the implant fetch runs and, on success, both store and
//! cache are updated with the active-implant list. A failure of the implant
//! fetch leaves the clone result intact with an empty list. Location
//! resolution is likewise never fatal: an unresolvable location keeps its id
//! but carries an empty name and zero type id.

use tracing::warn;

use entity::character_clones::{ActiveImplants, CloneLocation, JumpClone, JumpCloneList};
use entity::character_implants::ImplantList;

use crate::cache::CacheKind;
use crate::data::character_data::{ClonesRepository, ImplantsRepository};
use crate::error::Error;
use crate::model::esi;
use crate::service::retry::RetryContext;
use crate::service::static_data::StaticDataService;
use crate::util::esi::STRUCTURE_ID_THRESHOLD;

use super::{esi_not_found, CharacterDataService};

impl<S: StaticDataService> CharacterDataService<'_, S> {
    /// Resolves a clone location to a name and type id.
    ///
    /// IDs below the structure threshold are NPC stations looked up in the
    /// static-data catalog; everything else is a player-owned structure
    /// fetched through ESI with the user's token. Failures degrade to an
    /// entry with empty name and zero type id.
    async fn resolve_location(
        &self,
        location_id: i64,
        location_type: &str,
        token: &str,
    ) -> CloneLocation {
        let mut location = CloneLocation {
            location_id,
            location_type: location_type.to_string(),
            location_name: String::new(),
            location_type_id: 0,
        };

        if location_id < STRUCTURE_ID_THRESHOLD {
            match self.static_data.station(location_id).await {
                Ok(Some(station)) => {
                    location.location_name = station.name;
                    location.location_type_id = station.type_id;
                }
                Ok(None) => {
                    warn!(
                        location_id = location_id,
                        "Station missing from static data; leaving clone location unresolved"
                    );
                }
                Err(error) => {
                    warn!(
                        location_id = location_id,
                        "Station lookup failed; leaving clone location unresolved: {error}"
                    );
                }
            }
        } else {
            let client = self.esi_client;
            let fetched = RetryContext::new()
                .execute_with_retry(
                    &format!("structure {location_id} lookup"),
                    move || async move { Ok(client.structure(location_id, token).await?) },
                )
                .await;

            match fetched {
                Ok(structure) => {
                    location.location_name = structure.name;
                    location.location_type_id = structure.type_id.unwrap_or(0);
                }
                Err(error) => {
                    warn!(
                        location_id = location_id,
                        "Structure lookup failed; leaving clone location unresolved: {error}"
                    );
                }
            }
        }

        location
    }

    /// Clone state (1 hour cache) including the active-implant list.
    pub async fn clones(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<entity::character_clones::Model, Error> {
        if let Some(cached) = self
            .cache
            .get::<entity::character_clones::Model>(CacheKind::Clones, character_id)
            .await?
        {
            return Ok(cached);
        }

        let repo = ClonesRepository::new(self.db);
        if let Some(stored) = repo.find_by_character_id(character_id).await? {
            self.cache
                .put(CacheKind::Clones, character_id, &stored)
                .await?;
            return Ok(stored);
        }

        let client = self.esi_client;
        let fetched = RetryContext::new()
            .execute_with_retry(
                &format!("clones fetch for character {character_id}"),
                move || async move { Ok(client.character_clones(character_id, token).await?) },
            )
            .await
            .map_err(|e| esi_not_found(e, format!("clones for character {character_id}")))?;

        let home_location = match &fetched.home_location {
            Some(home) => Some(
                self.resolve_location(home.location_id, &home.location_type, token)
                    .await,
            ),
            None => None,
        };

        let mut jump_clones = Vec::with_capacity(fetched.jump_clones.len());
        for clone in fetched.jump_clones {
            let location = self
                .resolve_location(clone.location_id, &clone.location_type, token)
                .await;
            jump_clones.push(JumpClone {
                jump_clone_id: clone.jump_clone_id,
                name: clone.name,
                location,
                implants: clone.implants,
            });
        }

        // The primary result is persisted before the implant fetch so a
        // failing secondary call cannot lose the clone state.
        let mut stored = repo
            .upsert(
                character_id,
                home_location.clone(),
                JumpCloneList(jump_clones.clone()),
                ActiveImplants(Vec::new()),
                fetched.last_clone_jump_date.map(|d| d.naive_utc()),
                fetched.last_station_change_date.map(|d| d.naive_utc()),
            )
            .await?;

        let implants_fetch = RetryContext::new()
            .execute_with_retry(
                &format!("implants fetch for character {character_id}"),
                move || async move { Ok(client.character_implants(character_id, token).await?) },
            )
            .await;

        match implants_fetch {
            Ok(implants) => {
                ImplantsRepository::new(self.db)
                    .upsert(character_id, ImplantList(implants.clone()))
                    .await?;
                stored = repo
                    .upsert(
                        character_id,
                        home_location,
                        JumpCloneList(jump_clones),
                        ActiveImplants(implants),
                        fetched.last_clone_jump_date.map(|d| d.naive_utc()),
                        fetched.last_station_change_date.map(|d| d.naive_utc()),
                    )
                    .await?;
            }
            Err(error) => {
                warn!(
                    character_id = character_id,
                    "Implant fetch after clones failed; returning clones with empty implant list: {error}"
                );
            }
        }

        self.cache
            .put(CacheKind::Clones, character_id, &stored)
            .await?;

        Ok(stored)
    }

    /// Active implants (1 hour cache).
    pub async fn implants(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<entity::character_implants::Model, Error> {
        if let Some(cached) = self
            .cache
            .get::<entity::character_implants::Model>(CacheKind::Implants, character_id)
            .await?
        {
            return Ok(cached);
        }

        let repo = ImplantsRepository::new(self.db);
        if let Some(stored) = repo.find_by_character_id(character_id).await? {
            self.cache
                .put(CacheKind::Implants, character_id, &stored)
                .await?;
            return Ok(stored);
        }

        let client = self.esi_client;
        let fetched = RetryContext::new()
            .execute_with_retry(
                &format!("implants fetch for character {character_id}"),
                move || async move { Ok(client.character_implants(character_id, token).await?) },
            )
            .await
            .map_err(|e| esi_not_found(e, format!("implants for character {character_id}")))?;

        let stored = repo.upsert(character_id, ImplantList(fetched)).await?;
        self.cache
            .put(CacheKind::Implants, character_id, &stored)
            .await?;

        Ok(stored)
    }
}
