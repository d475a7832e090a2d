//! Discord role synchronizer and its satellites.
//!
//! `sync` converges one `(user, guild)` pair onto the role set implied by the
//! user's group memberships; `guild` drives whole-guild and whole-fleet
//! convergence with SyncRun bookkeeping; `nickname` rewrites guild nicknames
//! with the corporation ticker after role changes; `mapping` owns the
//! role-mapping lifecycle and its asynchronous sweep-and-resync side effects;
//! `oauth` runs the authorization-code flow, auto-join, and the token
//! refresh loop.

pub mod guild;
pub mod mapping;
pub mod nickname;
pub mod oauth;
pub mod sync;

#[cfg(test)]
mod tests;

use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::cache::CacheService;
use crate::client::discord::DiscordClient;
use crate::client::esi::EsiClient;
use crate::service::groups::GroupsService;
use crate::util::crypto::TokenCipher;

/// Delay between users within a guild sync and between sweep operations,
/// smoothing rate-limit pressure.
pub(crate) const INTER_USER_PACING: Duration = Duration::from_millis(100);

/// Converges Discord role state against internal group memberships.
///
/// Stateless across invocations apart from the SyncRun records it writes;
/// every dependency is borrowed so one service instance can be assembled
/// per request or per scheduler tick.
pub struct RoleSyncService<'a, G: GroupsService> {
    db: &'a DatabaseConnection,
    discord: &'a DiscordClient,
    esi_client: &'a EsiClient,
    cache: &'a CacheService,
    cipher: &'a TokenCipher,
    groups: &'a G,
}

impl<'a, G: GroupsService> RoleSyncService<'a, G> {
    /// Creates a new instance of [`RoleSyncService`].
    pub fn new(
        db: &'a DatabaseConnection,
        discord: &'a DiscordClient,
        esi_client: &'a EsiClient,
        cache: &'a CacheService,
        cipher: &'a TokenCipher,
        groups: &'a G,
    ) -> Self {
        Self {
            db,
            discord,
            esi_client,
            cache,
            cipher,
            groups,
        }
    }
}
