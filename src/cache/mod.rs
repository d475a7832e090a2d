//! Entity cache tier.
//!
//! First tier of the read pipeline. Values are JSON-encoded DTOs stored under
//! deterministic `c:<kind>:<character_id>` keys with a per-kind TTL policy.
//! A value that fails to parse is treated as a miss so the pipeline falls
//! through to the store and upstream; negative results are never cached.
//!
//! Two backends share the same semantics: a Valkey pool for deployments and
//! an in-process memory store (concurrent readers, last-writer-wins) used by
//! tests and cache-server-less single-node setups.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use fred::prelude::*;
use serde::{de::DeserializeOwned, Serialize};
use tokio::time::Instant;
use tracing::warn;

use crate::error::Error;

/// Entity kinds with their cache key fragment and TTL policy.
///
/// Persisted kinds also exist as store collections; ephemeral kinds live only
/// here under short TTLs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// Character profile; cached indefinitely and refreshed by the
    /// affiliation job.
    Profile,
    Attributes,
    Skills,
    SkillQueue,
    CorporationHistory,
    Clones,
    Implants,
    Location,
    Online,
    Ship,
    Wallet,
    Fatigue,
    /// Corporation sheet (name, ticker); cache + upstream only.
    Corporation,
}

impl CacheKind {
    fn fragment(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Attributes => "attributes",
            Self::Skills => "skills",
            Self::SkillQueue => "skillqueue",
            Self::CorporationHistory => "corphistory",
            Self::Clones => "clones",
            Self::Implants => "implants",
            Self::Location => "location",
            Self::Online => "online",
            Self::Ship => "ship",
            Self::Wallet => "wallet",
            Self::Fatigue => "fatigue",
            Self::Corporation => "corporation",
        }
    }

    /// Cache TTL for this kind; `None` means no expiry.
    pub fn ttl(self) -> Option<Duration> {
        match self {
            Self::Profile => None,
            Self::Attributes => Some(Duration::from_secs(30 * 60)),
            Self::Skills => Some(Duration::from_secs(30 * 60)),
            Self::SkillQueue => Some(Duration::from_secs(5 * 60)),
            Self::CorporationHistory => Some(Duration::from_secs(24 * 60 * 60)),
            Self::Clones => Some(Duration::from_secs(60 * 60)),
            Self::Implants => Some(Duration::from_secs(60 * 60)),
            Self::Location => Some(Duration::from_secs(5)),
            Self::Online => Some(Duration::from_secs(30)),
            Self::Ship => Some(Duration::from_secs(2 * 60)),
            Self::Wallet => Some(Duration::from_secs(60)),
            Self::Fatigue => Some(Duration::from_secs(5 * 60)),
            Self::Corporation => Some(Duration::from_secs(60 * 60)),
        }
    }

    /// Whether this kind has a persistent store tier behind the cache.
    pub fn persisted(self) -> bool {
        !matches!(
            self,
            Self::Location
                | Self::Online
                | Self::Ship
                | Self::Wallet
                | Self::Fatigue
                | Self::Corporation
        )
    }

    /// Deterministic cache key for one (kind, id) pair.
    ///
    /// Corporation keys take the corporation id; every other kind takes the
    /// character id.
    pub fn key(self, id: i32) -> String {
        format!("c:{}:{}", self.fragment(), id)
    }
}

#[derive(Clone)]
struct MemoryEntry {
    expires_at: Option<Instant>,
    body: String,
}

#[derive(Clone, Default)]
struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().expect("cache lock poisoned");
        let entry = entries.get(key)?;

        if let Some(expires_at) = entry.expires_at {
            if Instant::now() >= expires_at {
                return None;
            }
        }

        Some(entry.body.clone())
    }

    fn set(&self, key: String, body: String, ttl: Option<Duration>) {
        let entry = MemoryEntry {
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
            body,
        };

        self.entries
            .write()
            .expect("cache lock poisoned")
            .insert(key, entry);
    }

    fn delete(&self, key: &str) {
        self.entries
            .write()
            .expect("cache lock poisoned")
            .remove(key);
    }
}

#[derive(Clone)]
enum Backend {
    Valkey(Pool),
    Memory(MemoryStore),
}

/// JSON document cache.
#[derive(Clone)]
pub struct CacheService {
    backend: Backend,
}

impl CacheService {
    /// Cache over a connected Valkey pool (production path).
    pub fn valkey(pool: Pool) -> Self {
        Self {
            backend: Backend::Valkey(pool),
        }
    }

    /// In-process cache with the same TTL and last-writer-wins semantics.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryStore::default()),
        }
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, Error> {
        match &self.backend {
            Backend::Valkey(pool) => Ok(pool.get(key).await?),
            Backend::Memory(store) => Ok(store.get(key)),
        }
    }

    async fn set_raw(&self, key: String, body: String, ttl: Option<Duration>) -> Result<(), Error> {
        match &self.backend {
            Backend::Valkey(pool) => {
                let expiration = ttl.map(|ttl| Expiration::EX(ttl.as_secs().max(1) as i64));
                pool.set::<(), _, _>(key, body, expiration, None, false)
                    .await?;
                Ok(())
            }
            Backend::Memory(store) => {
                store.set(key, body, ttl);
                Ok(())
            }
        }
    }

    /// Reads and decodes a cached value.
    ///
    /// Returns `Ok(None)` on a miss. A present-but-unparseable value is
    /// logged and treated as a miss so the caller refreshes it through the
    /// rest of the pipeline.
    pub async fn get<T: DeserializeOwned>(
        &self,
        kind: CacheKind,
        id: i32,
    ) -> Result<Option<T>, Error> {
        let key = kind.key(id);

        let Some(raw) = self.get_raw(&key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                warn!(key = %key, "Discarding unparseable cache entry: {error}");
                Ok(None)
            }
        }
    }

    /// Writes a value under the kind's TTL policy (last writer wins).
    pub async fn put<T: Serialize>(&self, kind: CacheKind, id: i32, value: &T) -> Result<(), Error> {
        let body = serde_json::to_string(value)
            .map_err(|e| Error::ParseError(format!("failed to encode cache value: {e}")))?;

        self.set_raw(kind.key(id), body, kind.ttl()).await
    }

    /// Drops a cached value.
    pub async fn delete(&self, kind: CacheKind, id: i32) -> Result<(), Error> {
        match &self.backend {
            Backend::Valkey(pool) => {
                let _: i64 = pool.del(kind.key(id)).await?;
                Ok(())
            }
            Backend::Memory(store) => {
                store.delete(&kind.key(id));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expect cache keys to follow the c:<kind>:<id> scheme
    #[test]
    fn builds_deterministic_keys() {
        assert_eq!(CacheKind::Profile.key(90_000_001), "c:profile:90000001");
        assert_eq!(CacheKind::SkillQueue.key(90_000_001), "c:skillqueue:90000001");
        assert_eq!(CacheKind::Corporation.key(98_000_001), "c:corporation:98000001");
    }

    /// Expect ephemeral kinds to have no persistent tier
    #[test]
    fn marks_ephemeral_kinds_unpersisted() {
        for kind in [
            CacheKind::Location,
            CacheKind::Online,
            CacheKind::Ship,
            CacheKind::Wallet,
            CacheKind::Fatigue,
        ] {
            assert!(!kind.persisted(), "{kind:?} must not be persisted");
            assert!(kind.ttl().is_some(), "{kind:?} must expire");
        }
    }

    /// Expect the profile kind to persist and never expire from cache
    #[test]
    fn profile_is_persisted_and_unexpiring() {
        assert!(CacheKind::Profile.persisted());
        assert!(CacheKind::Profile.ttl().is_none());
    }

    /// Expect the memory backend to round-trip JSON documents
    #[tokio::test]
    async fn memory_backend_round_trips() {
        let cache = CacheService::in_memory();

        cache
            .put(
                CacheKind::Ship,
                90_000_001,
                &serde_json::json!({"ship_name": "Rifter"}),
            )
            .await
            .unwrap();
        let value: Option<serde_json::Value> =
            cache.get(CacheKind::Ship, 90_000_001).await.unwrap();

        assert_eq!(value.unwrap()["ship_name"], "Rifter");
    }

    /// Expect expired memory entries to read as misses
    #[tokio::test(start_paused = true)]
    async fn memory_backend_expires_entries() {
        let cache = CacheService::in_memory();

        cache
            .put(CacheKind::Location, 90_000_001, &serde_json::json!(30000142))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;

        let value: Option<serde_json::Value> =
            cache.get(CacheKind::Location, 90_000_001).await.unwrap();
        assert!(value.is_none());
    }

    /// Expect deletes to remove memory entries
    #[tokio::test]
    async fn memory_backend_deletes_entries() {
        let cache = CacheService::in_memory();

        cache
            .put(CacheKind::Wallet, 90_000_001, &serde_json::json!(12.5))
            .await
            .unwrap();
        cache.delete(CacheKind::Wallet, 90_000_001).await.unwrap();

        let value: Option<serde_json::Value> =
            cache.get(CacheKind::Wallet, 90_000_001).await.unwrap();
        assert!(value.is_none());
    }

    /// Expect corrupt entries to be discarded as misses
    #[tokio::test]
    async fn treats_corrupt_entries_as_miss() {
        let cache = CacheService::in_memory();
        match &cache.backend {
            Backend::Memory(store) => {
                store.set(CacheKind::Skills.key(90_000_001), "{not json".to_string(), None)
            }
            Backend::Valkey(_) => unreachable!(),
        }

        let value: Option<serde_json::Value> =
            cache.get(CacheKind::Skills, 90_000_001).await.unwrap();
        assert!(value.is_none());
    }
}

#[cfg(all(test, feature = "redis-test"))]
mod valkey_tests {
    use super::*;

    async fn cache() -> CacheService {
        let config = Config::from_url("redis://127.0.0.1:6379").unwrap();
        let pool = Pool::new(config, None, None, None, 2).unwrap();
        pool.connect();
        pool.wait_for_connect().await.unwrap();

        CacheService::valkey(pool)
    }

    /// Expect put/get to round-trip a JSON document through Valkey
    #[tokio::test]
    async fn round_trips_documents() {
        let cache = cache().await;
        let id = 90_900_001;
        cache.delete(CacheKind::Ship, id).await.unwrap();

        cache
            .put(CacheKind::Ship, id, &serde_json::json!({"ship_name": "Rifter"}))
            .await
            .unwrap();
        let value: Option<serde_json::Value> = cache.get(CacheKind::Ship, id).await.unwrap();

        assert_eq!(value.unwrap()["ship_name"], "Rifter");
    }

    /// Expect a deleted key to read as a miss
    #[tokio::test]
    async fn reads_deleted_keys_as_miss() {
        let cache = cache().await;
        let id = 90_900_002;

        cache
            .put(CacheKind::Wallet, id, &serde_json::json!(12.5))
            .await
            .unwrap();
        cache.delete(CacheKind::Wallet, id).await.unwrap();

        let value: Option<serde_json::Value> = cache.get(CacheKind::Wallet, id).await.unwrap();
        assert!(value.is_none());
    }
}
