//! Cache-tiered character data service.
//!
//! For every readable character-scoped entity kind the service exposes one
//! `get`-shaped operation with the same pipeline: cache, then persistent
//! store, then upstream with write-through to both lower tiers. Upstream
//! failures propagate as typed errors and leave cache and store unchanged;
//! negative results are never cached, so a later read re-attempts the full
//! pipeline.
//!
//! Persisted kinds live in `sheets` (attributes, skills, skill queue,
//! corporation history) and `clones` (clone state and implants, with
//! location enrichment); cache-only kinds with short TTLs live in
//! `ephemeral`.

mod clones;
mod ephemeral;
mod sheets;

#[cfg(test)]
mod tests;

use sea_orm::DatabaseConnection;

use crate::cache::{CacheKind, CacheService};
use crate::client::esi::EsiClient;
use crate::data::character::{CharacterRepository, CharacterSearchResult};
use crate::error::{domain::DomainError, Error};
use crate::service::retry::RetryContext;
use crate::service::static_data::StaticDataService;

/// Rejects reads of another character's private data.
///
/// Clones, implants, location, and the other authenticated kinds may only be
/// read for the authenticated caller's own character; the HTTP layer passes
/// both ids through this check before touching the pipeline.
pub fn authorize_private_read(
    requested_character_id: i32,
    caller_character_id: i32,
) -> Result<(), Error> {
    if requested_character_id != caller_character_id {
        return Err(DomainError::Forbidden(format!(
            "character {requested_character_id} does not belong to the authenticated user"
        ))
        .into());
    }

    Ok(())
}

/// Maps an upstream 404 to the domain not-found sentinel; every other error
/// passes through unchanged.
fn esi_not_found(error: Error, what: String) -> Error {
    match error {
        Error::EsiError(esi_error) if esi_error.is_not_found() => {
            DomainError::NotFound(what).into()
        }
        other => other,
    }
}

/// Service for character-scoped reads through the cache, store, and ESI.
pub struct CharacterDataService<'a, S: StaticDataService> {
    db: &'a DatabaseConnection,
    esi_client: &'a EsiClient,
    cache: &'a CacheService,
    static_data: &'a S,
}

impl<'a, S: StaticDataService> CharacterDataService<'a, S> {
    /// Creates a new instance of [`CharacterDataService`].
    pub fn new(
        db: &'a DatabaseConnection,
        esi_client: &'a EsiClient,
        cache: &'a CacheService,
        static_data: &'a S,
    ) -> Self {
        Self {
            db,
            esi_client,
            cache,
            static_data,
        }
    }

    /// Fetches a character profile, creating the document on first miss.
    ///
    /// The profile is cached indefinitely; the affiliation reconciler keeps
    /// it fresh by advancing the stored document, which on-demand reads then
    /// re-serve.
    pub async fn profile(&self, character_id: i32) -> Result<entity::character::Model, Error> {
        if let Some(cached) = self
            .cache
            .get::<entity::character::Model>(CacheKind::Profile, character_id)
            .await?
        {
            return Ok(cached);
        }

        let repo = CharacterRepository::new(self.db);
        if let Some(stored) = repo.find_by_character_id(character_id).await? {
            // An affiliation-inserted row has no profile fields yet; treat it
            // like a store miss so the first read fills them in.
            if !stored.name.is_empty() {
                self.cache
                    .put(CacheKind::Profile, character_id, &stored)
                    .await?;
                return Ok(stored);
            }
        }

        let client = self.esi_client;
        let fetched = RetryContext::new()
            .execute_with_retry(
                &format!("profile fetch for character {character_id}"),
                move || async move { Ok(client.character(character_id).await?) },
            )
            .await
            .map_err(|e| esi_not_found(e, format!("character {character_id}")))?;

        let stored = repo.upsert_profile(character_id, fetched).await?;
        self.cache
            .put(CacheKind::Profile, character_id, &stored)
            .await?;

        Ok(stored)
    }

    /// Searches characters by name; see
    /// [`crate::data::character::SearchStrategy`] for strategy selection.
    pub async fn search(&self, name: &str) -> Result<CharacterSearchResult, Error> {
        CharacterRepository::new(self.db).search_by_name(name).await
    }
}
