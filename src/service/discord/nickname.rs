//! Nickname reconciliation.
//!
//! After a user's roles in a guild change, the guild nickname is rewritten
//! to carry the corporation ticker of the user's main character:
//! `[TICKER] BaseName`. An existing ticker prefix is stripped before the
//! current one is applied, and the write is skipped entirely when the result
//! matches the current nickname. Failures anywhere on this path are logged
//! and never abort the enclosing sync step.

use tracing::{debug, warn};

use crate::data::character::CharacterRepository;
use crate::error::Error;
use crate::service::corporation::CorporationService;
use crate::service::groups::GroupsService;
use crate::service::retry::RetryContext;

use super::RoleSyncService;

/// Discord's guild nickname length cap.
const NICKNAME_MAX_LEN: usize = 32;

fn strip_ticker_prefix(name: &str) -> &str {
    if name.starts_with('[') {
        if let Some(end) = name.find("] ") {
            return &name[end + 2..];
        }
    }

    name
}

/// Builds the ticker-prefixed nickname from whatever the member currently
/// displays, truncated to Discord's length cap.
pub fn ticker_prefixed_nickname(ticker: &str, current_display: &str) -> String {
    let base = strip_ticker_prefix(current_display);
    let full = format!("[{ticker}] {base}");

    if full.chars().count() <= NICKNAME_MAX_LEN {
        full
    } else {
        full.chars().take(NICKNAME_MAX_LEN).collect()
    }
}

impl<G: GroupsService> RoleSyncService<'_, G> {
    /// Rewrites the member's nickname with the main character's corporation
    /// ticker.
    ///
    /// Returns whether an upstream nickname write was issued. Every failure
    /// (no main character, unknown corporation, upstream rejection) degrades
    /// to `false` with a log line.
    pub(crate) async fn reconcile_nickname(
        &self,
        user: &entity::discord_user::Model,
        guild_id: &str,
        bot_token: &str,
        current_nick: Option<&str>,
    ) -> bool {
        match self
            .try_reconcile_nickname(user, guild_id, bot_token, current_nick)
            .await
        {
            Ok(updated) => updated,
            Err(error) => {
                warn!(
                    user_id = user.user_id,
                    guild_id = %guild_id,
                    "Nickname reconciliation failed; continuing sync: {error}"
                );
                false
            }
        }
    }

    async fn try_reconcile_nickname(
        &self,
        user: &entity::discord_user::Model,
        guild_id: &str,
        bot_token: &str,
        current_nick: Option<&str>,
    ) -> Result<bool, Error> {
        let Some(main_character_id) = self.groups.main_character_id(user.user_id).await? else {
            debug!(
                user_id = user.user_id,
                "User has no main character; skipping nickname reconciliation"
            );
            return Ok(false);
        };

        let character = match CharacterRepository::new(self.db)
            .find_by_character_id(main_character_id)
            .await?
        {
            Some(character) if !character.name.is_empty() => character,
            _ => {
                // First sighting of this character; pull the profile so the
                // corporation is known.
                let client = self.esi_client;
                let fetched = RetryContext::new()
                    .execute_with_retry(
                        &format!("profile fetch for character {main_character_id}"),
                        move || async move { Ok(client.character(main_character_id).await?) },
                    )
                    .await?;
                CharacterRepository::new(self.db)
                    .upsert_profile(main_character_id, fetched)
                    .await?
            }
        };

        let corporation = CorporationService::new(self.esi_client, self.cache)
            .get(character.corporation_id)
            .await?;

        let current_display = current_nick
            .or(user.global_name.as_deref())
            .unwrap_or(&user.username);
        let desired = ticker_prefixed_nickname(&corporation.ticker, current_display);

        if current_nick == Some(desired.as_str()) {
            return Ok(false);
        }

        self.discord
            .update_member_nickname(bot_token, guild_id, &user.discord_id, &desired)
            .await?;

        Ok(true)
    }
}
