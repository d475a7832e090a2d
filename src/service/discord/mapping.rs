//! Role-mapping lifecycle with asynchronous convergence side effects.
//!
//! Mapping writes return to the caller immediately; the convergence work they
//! imply (sweeping a retired role off every holder, then re-syncing the
//! guild) runs in a detached task afterwards and is eventually consistent
//! with subsequent reads.

use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::cache::CacheService;
use crate::client::discord::DiscordClient;
use crate::client::esi::EsiClient;
use crate::data::discord::role_mapping::{RoleMappingFields, RoleMappingRepository};
use crate::data::discord::GuildConfigRepository;
use crate::error::{domain::DomainError, Error};
use crate::service::groups::GroupsService;
use crate::util::cancel::CancellationFlag;
use crate::util::crypto::TokenCipher;

use super::RoleSyncService;

/// Runs the post-write convergence for one guild: an optional role sweep
/// followed by a full guild sync.
///
/// Split out from the spawning service so tests and admin tooling can drive
/// the side effects synchronously.
pub async fn run_mapping_side_effects<G: GroupsService>(
    db: &DatabaseConnection,
    discord: &DiscordClient,
    esi_client: &EsiClient,
    cache: &CacheService,
    cipher: &TokenCipher,
    groups: &G,
    guild_id: &str,
    sweep_role_id: Option<&str>,
) -> Result<(), Error> {
    let Some(guild) = GuildConfigRepository::new(db).find_by_guild_id(guild_id).await? else {
        warn!(
            guild_id = %guild_id,
            "Guild configuration vanished before mapping side effects ran"
        );
        return Ok(());
    };

    let sync = RoleSyncService::new(db, discord, esi_client, cache, cipher, groups);

    if let Some(role_id) = sweep_role_id {
        let bot_token = cipher.decrypt(&guild.bot_token)?;
        sync.sweep_role_from_members(&guild.guild_id, &bot_token, role_id)
            .await?;
    }

    sync.sync_guild(&guild, false, &CancellationFlag::new())
        .await?;

    Ok(())
}

/// Role-mapping CRUD with background convergence.
///
/// Owns cheap-clone handles to every dependency so side effects can outlive
/// the originating request.
pub struct RoleMappingService<G> {
    db: DatabaseConnection,
    discord: DiscordClient,
    esi_client: EsiClient,
    cache: CacheService,
    cipher: TokenCipher,
    groups: G,
}

impl<G> RoleMappingService<G>
where
    G: GroupsService + Clone + Send + Sync + 'static,
{
    /// Creates a new instance of [`RoleMappingService`].
    pub fn new(
        db: DatabaseConnection,
        discord: DiscordClient,
        esi_client: EsiClient,
        cache: CacheService,
        cipher: TokenCipher,
        groups: G,
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

    fn spawn_side_effects(
        &self,
        guild_id: String,
        sweep_role_id: Option<String>,
    ) -> JoinHandle<()> {
        let db = self.db.clone();
        let discord = self.discord.clone();
        let esi_client = self.esi_client.clone();
        let cache = self.cache.clone();
        let cipher = self.cipher.clone();
        let groups = self.groups.clone();

        tokio::spawn(async move {
            if let Err(e) = run_mapping_side_effects(
                &db,
                &discord,
                &esi_client,
                &cache,
                &cipher,
                &groups,
                &guild_id,
                sweep_role_id.as_deref(),
            )
            .await
            {
                error!(
                    guild_id = %guild_id,
                    "Mapping side effects failed: {e:?}"
                );
            }
        })
    }

    /// Creates a mapping and schedules a guild-wide sync to assign the new
    /// role to every qualifying member.
    pub async fn create_mapping(
        &self,
        fields: RoleMappingFields,
    ) -> Result<entity::discord_role_mapping::Model, Error> {
        let repo = RoleMappingRepository::new(&self.db);

        GuildConfigRepository::new(&self.db)
            .find_by_guild_id(&fields.guild_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("guild {}", fields.guild_id)))?;

        // Only active mappings are held unique per (guild, group); retired
        // rows never block a new mapping.
        if fields.is_active
            && repo
                .find_active_by_guild_and_group(&fields.guild_id, &fields.group_id)
                .await?
                .is_some()
        {
            return Err(DomainError::Conflict(format!(
                "group {} already maps to a role in guild {}",
                fields.group_id, fields.guild_id
            ))
            .into());
        }

        let created = repo.create(fields).await?;
        self.spawn_side_effects(created.guild_id.clone(), None);

        Ok(created)
    }

    /// Updates a mapping, sweeping the retired role first when the mapping
    /// was disabled or re-pointed at a different role.
    pub async fn update_mapping(
        &self,
        id: i32,
        fields: RoleMappingFields,
    ) -> Result<entity::discord_role_mapping::Model, Error> {
        let repo = RoleMappingRepository::new(&self.db);

        let existing = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("role mapping {id}")))?;

        if fields.is_active {
            if let Some(conflicting) = repo
                .find_active_by_guild_and_group(&fields.guild_id, &fields.group_id)
                .await?
            {
                if conflicting.id != id {
                    return Err(DomainError::Conflict(format!(
                        "group {} already maps to a role in guild {}",
                        fields.group_id, fields.guild_id
                    ))
                    .into());
                }
            }
        }

        let updated = repo.update(id, fields).await?;

        let sweep_role_id = if existing.is_active && !updated.is_active {
            Some(existing.discord_role_id.clone())
        } else if updated.is_active && existing.discord_role_id != updated.discord_role_id {
            Some(existing.discord_role_id.clone())
        } else {
            None
        };

        self.spawn_side_effects(updated.guild_id.clone(), sweep_role_id);

        Ok(updated)
    }

    /// Deletes a mapping; the deleted role is stripped from every holder
    /// before the follow-up guild sync.
    pub async fn delete_mapping(&self, id: i32) -> Result<(), Error> {
        let repo = RoleMappingRepository::new(&self.db);

        let existing = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("role mapping {id}")))?;

        repo.delete(id).await?;
        self.spawn_side_effects(
            existing.guild_id.clone(),
            Some(existing.discord_role_id.clone()),
        );

        Ok(())
    }
}
