//! Corporation lookup service.
//!
//! Cache-tiered without a persistent tier: the store has no corporations
//! collection, so reads go cache → upstream. The synchronizer uses this for
//! nickname ticker resolution.

use crate::cache::{CacheKind, CacheService};
use crate::client::esi::EsiClient;
use crate::error::{domain::DomainError, Error};
use crate::model::esi::Corporation;
use crate::service::retry::RetryContext;

/// Service for corporation sheet reads.
pub struct CorporationService<'a> {
    esi_client: &'a EsiClient,
    cache: &'a CacheService,
}

impl<'a> CorporationService<'a> {
    /// Creates a new instance of [`CorporationService`].
    pub fn new(esi_client: &'a EsiClient, cache: &'a CacheService) -> Self {
        Self { esi_client, cache }
    }

    /// Fetches a corporation sheet through the cache.
    ///
    /// # Returns
    /// - `Ok(Corporation)` - Cached or freshly fetched sheet
    /// - `Err(Error::DomainError(DomainError::NotFound))` - Corporation unknown upstream
    /// - `Err(Error::EsiError)` - Other upstream failure; the cache is unchanged
    pub async fn get(&self, corporation_id: i32) -> Result<Corporation, Error> {
        if let Some(cached) = self
            .cache
            .get::<Corporation>(CacheKind::Corporation, corporation_id)
            .await?
        {
            return Ok(cached);
        }

        let client = self.esi_client;
        let corporation = RetryContext::new()
            .execute_with_retry(
                &format!("corporation {corporation_id} fetch"),
                move || async move { Ok(client.corporation(corporation_id).await?) },
            )
            .await
            .map_err(|error| match error {
                Error::EsiError(esi_error) if esi_error.is_not_found() => {
                    DomainError::NotFound(format!("corporation {corporation_id}")).into()
                }
                other => other,
            })?;

        self.cache
            .put(CacheKind::Corporation, corporation_id, &corporation)
            .await?;

        Ok(corporation)
    }
}

#[cfg(test)]
mod tests {
    use heimdall_test_utils::prelude::*;

    use super::CorporationService;
    use crate::cache::CacheService;

    /// Expect a cold read to hit upstream once and warm the cache
    #[tokio::test]
    async fn caches_corporation_sheets() -> Result<(), TestError> {
        let mut test = TestBuilder::new().build().await?;
        let endpoint =
            esi::with_corporation_endpoint(&mut test.server, 98_000_001, "Autumn Order", "AUTMN", 1)
                .await;
        let cache = CacheService::in_memory();

        let service = CorporationService::new(&test.esi_client, &cache);
        let first = service.get(98_000_001).await?;
        let second = service.get(98_000_001).await?;

        endpoint.assert_async().await;
        assert_eq!(first.ticker, "AUTMN");
        assert_eq!(second.ticker, "AUTMN");

        Ok(())
    }

    /// Expect an unknown corporation to surface as not-found without
    /// poisoning the cache
    #[tokio::test]
    async fn maps_missing_corporation_to_not_found() -> Result<(), TestError> {
        let mut test = TestBuilder::new().build().await?;
        esi::with_not_found(&mut test.server, "/corporations/98000009/").await;
        let cache = CacheService::in_memory();

        let service = CorporationService::new(&test.esi_client, &cache);
        let error = service.get(98_000_009).await.unwrap_err();

        assert!(matches!(
            error,
            crate::error::Error::DomainError(crate::error::domain::DomainError::NotFound(_))
        ));

        Ok(())
    }
}
