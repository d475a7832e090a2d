//! Cache-only character views: location, online status, current ship,
//! wallet balance, and jump fatigue. None of these persist; each lives in
//! the cache under a short TTL matched to how fast the underlying state
//! moves.

use crate::cache::CacheKind;
use crate::error::Error;
use crate::model::esi::{CharacterFatigue, CharacterLocation, CharacterOnline, CharacterShip};
use crate::service::retry::RetryContext;
use crate::service::static_data::StaticDataService;

use super::{esi_not_found, CharacterDataService};

impl<S: StaticDataService> CharacterDataService<'_, S> {
    /// Current location (5 second cache).
    pub async fn location(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<CharacterLocation, Error> {
        if let Some(cached) = self
            .cache
            .get::<CharacterLocation>(CacheKind::Location, character_id)
            .await?
        {
            return Ok(cached);
        }

        let client = self.esi_client;
        let fetched = RetryContext::new()
            .execute_with_retry(
                &format!("location fetch for character {character_id}"),
                move || async move { Ok(client.character_location(character_id, token).await?) },
            )
            .await
            .map_err(|e| esi_not_found(e, format!("location for character {character_id}")))?;

        self.cache
            .put(CacheKind::Location, character_id, &fetched)
            .await?;

        Ok(fetched)
    }

    /// Online status (30 second cache).
    pub async fn online(&self, character_id: i32, token: &str) -> Result<CharacterOnline, Error> {
        if let Some(cached) = self
            .cache
            .get::<CharacterOnline>(CacheKind::Online, character_id)
            .await?
        {
            return Ok(cached);
        }

        let client = self.esi_client;
        let fetched = RetryContext::new()
            .execute_with_retry(
                &format!("online status fetch for character {character_id}"),
                move || async move { Ok(client.character_online(character_id, token).await?) },
            )
            .await
            .map_err(|e| esi_not_found(e, format!("online status for character {character_id}")))?;

        self.cache
            .put(CacheKind::Online, character_id, &fetched)
            .await?;

        Ok(fetched)
    }

    /// Current ship (2 minute cache).
    pub async fn ship(&self, character_id: i32, token: &str) -> Result<CharacterShip, Error> {
        if let Some(cached) = self
            .cache
            .get::<CharacterShip>(CacheKind::Ship, character_id)
            .await?
        {
            return Ok(cached);
        }

        let client = self.esi_client;
        let fetched = RetryContext::new()
            .execute_with_retry(
                &format!("ship fetch for character {character_id}"),
                move || async move { Ok(client.character_ship(character_id, token).await?) },
            )
            .await
            .map_err(|e| esi_not_found(e, format!("ship for character {character_id}")))?;

        self.cache
            .put(CacheKind::Ship, character_id, &fetched)
            .await?;

        Ok(fetched)
    }

    /// Wallet balance in ISK (1 minute cache).
    pub async fn wallet(&self, character_id: i32, token: &str) -> Result<f64, Error> {
        if let Some(cached) = self.cache.get::<f64>(CacheKind::Wallet, character_id).await? {
            return Ok(cached);
        }

        let client = self.esi_client;
        let fetched = RetryContext::new()
            .execute_with_retry(
                &format!("wallet fetch for character {character_id}"),
                move || async move { Ok(client.character_wallet(character_id, token).await?) },
            )
            .await
            .map_err(|e| esi_not_found(e, format!("wallet for character {character_id}")))?;

        self.cache
            .put(CacheKind::Wallet, character_id, &fetched)
            .await?;

        Ok(fetched)
    }

    /// Jump fatigue timers (5 minute cache).
    pub async fn fatigue(&self, character_id: i32, token: &str) -> Result<CharacterFatigue, Error> {
        if let Some(cached) = self
            .cache
            .get::<CharacterFatigue>(CacheKind::Fatigue, character_id)
            .await?
        {
            return Ok(cached);
        }

        let client = self.esi_client;
        let fetched = RetryContext::new()
            .execute_with_retry(
                &format!("fatigue fetch for character {character_id}"),
                move || async move { Ok(client.character_fatigue(character_id, token).await?) },
            )
            .await
            .map_err(|e| esi_not_found(e, format!("fatigue for character {character_id}")))?;

        self.cache
            .put(CacheKind::Fatigue, character_id, &fetched)
            .await?;

        Ok(fetched)
    }
}
