//! Discord OAuth orchestrator.
//!
//! Runs the authorization-code flow: one-time state allocation, code
//! exchange, identity fetch, account upsert with encrypted tokens, and the
//! auto-join pass over every guild whose mapped groups the user belongs to.
//! Also hosts the token refresh loop and unlink with best-effort revocation.

use chrono::{Duration as ChronoDuration, Utc};
use oauth2::basic::{BasicErrorResponseType, BasicTokenType};
use oauth2::{
    AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, CsrfToken, EmptyExtraTokenFields,
    EndpointNotSet, EndpointSet, RedirectUrl, RefreshToken, RevocationErrorResponseType,
    RevocationUrl, Scope, StandardErrorResponse, StandardRevocableToken,
    StandardTokenIntrospectionResponse, StandardTokenResponse, TokenResponse, TokenUrl,
};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::discord::DiscordClient;
use crate::data::discord::user::UpsertDiscordUser;
use crate::data::discord::{
    DiscordUserRepository, GuildConfigRepository, OAuthStateRepository, RoleMappingRepository,
};
use crate::error::{auth::AuthError, Error};
use crate::service::groups::GroupsService;
use crate::util::crypto::TokenCipher;

/// OAuth2 client configured for Discord's authorization-code flow.
pub type OAuth2Client = Client<
    StandardErrorResponse<BasicErrorResponseType>,
    StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardTokenIntrospectionResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardRevocableToken,
    StandardErrorResponse<RevocationErrorResponseType>,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
    EndpointSet,
>;

/// Production OAuth endpoint base.
pub const DISCORD_OAUTH_BASE_URL: &str = "https://discord.com/api";

/// Scopes requested on every authorization: identity, guild list, and the
/// `guilds.join` side of the auto-join PUT.
const OAUTH_SCOPES: [&str; 3] = ["identify", "guilds", "guilds.join"];

/// One-time states expire after fifteen minutes.
const STATE_TTL_MINUTES: i64 = 15;

/// Fallback token lifetime when the response omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Outcome of one token refresh batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenRefreshStats {
    pub refreshed: usize,
    pub failed: usize,
}

/// Builds the OAuth2 client for Discord.
///
/// `oauth_base_url` is [`DISCORD_OAUTH_BASE_URL`] in production and the mock
/// server in tests; authorize, token, and revocation endpoints all derive
/// from it.
pub fn build_oauth_client(
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
    oauth_base_url: &str,
) -> Result<OAuth2Client, Error> {
    let base = oauth_base_url.trim_end_matches('/');

    let client = oauth2::basic::BasicClient::new(ClientId::new(client_id.to_string()))
        .set_client_secret(ClientSecret::new(client_secret.to_string()))
        .set_auth_uri(AuthUrl::new(format!("{base}/oauth2/authorize")).map_err(AuthError::from)?)
        .set_token_uri(TokenUrl::new(format!("{base}/oauth2/token")).map_err(AuthError::from)?)
        .set_revocation_url(
            RevocationUrl::new(format!("{base}/oauth2/token/revoke")).map_err(AuthError::from)?,
        )
        .set_redirect_uri(RedirectUrl::new(redirect_uri.to_string()).map_err(AuthError::from)?);

    Ok(client)
}

fn random_state() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);

    URL_SAFE_NO_PAD.encode(bytes)
}

/// Service driving the Discord OAuth flow and token maintenance.
pub struct DiscordOAuthService<'a, G: GroupsService> {
    db: &'a DatabaseConnection,
    http_client: &'a reqwest::Client,
    oauth_client: &'a OAuth2Client,
    discord: &'a DiscordClient,
    cipher: &'a TokenCipher,
    groups: &'a G,
}

impl<'a, G: GroupsService> DiscordOAuthService<'a, G> {
    /// Creates a new instance of [`DiscordOAuthService`].
    pub fn new(
        db: &'a DatabaseConnection,
        http_client: &'a reqwest::Client,
        oauth_client: &'a OAuth2Client,
        discord: &'a DiscordClient,
        cipher: &'a TokenCipher,
        groups: &'a G,
    ) -> Self {
        Self {
            db,
            http_client,
            oauth_client,
            discord,
            cipher,
            groups,
        }
    }

    /// Allocates a one-time state and returns the authorize URL.
    ///
    /// The state is 256 bits of randomness persisted with a fifteen-minute
    /// expiry; `user_id` records which internal user the eventual callback
    /// should bind to.
    pub async fn authorize_url(&self, user_id: Option<i32>) -> Result<(Url, String), Error> {
        let state = random_state();
        let expires_at = Utc::now().naive_utc() + ChronoDuration::minutes(STATE_TTL_MINUTES);

        OAuthStateRepository::new(self.db)
            .create(&state, user_id, expires_at)
            .await?;

        let state_for_url = state.clone();
        let (url, _) = self
            .oauth_client
            .authorize_url(move || CsrfToken::new(state_for_url))
            .add_scopes(OAUTH_SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .url();

        Ok((url, state))
    }

    /// Handles the OAuth callback: consume state, exchange the code, fetch
    /// the identity, upsert the account, and auto-join qualifying guilds.
    ///
    /// Auto-join failures are logged per guild and never fail the callback.
    pub async fn handle_callback(
        &self,
        code: &str,
        state: &str,
    ) -> Result<entity::discord_user::Model, Error> {
        let state_row = OAuthStateRepository::new(self.db)
            .consume(state)
            .await?
            .ok_or(AuthError::InvalidOauthState)?;

        let token = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(self.http_client)
            .await
            .map_err(AuthError::from)?;

        let access_token = token.access_token().secret().clone();
        let refresh_token = token
            .refresh_token()
            .map(|t| t.secret().clone())
            .ok_or_else(|| Error::ParseError("token response carried no refresh token".into()))?;
        let expires_in = token
            .expires_in()
            .map(|d| d.as_secs() as i64)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let scopes = token
            .scopes()
            .map(|scopes| {
                scopes
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_else(|| OAUTH_SCOPES.join(" "));

        let identity = self.discord.get_current_user(&access_token).await?;

        let user_repo = DiscordUserRepository::new(self.db);
        let user_id = match state_row.user_id {
            Some(user_id) => user_id,
            None => user_repo
                .find_by_discord_id(&identity.id)
                .await?
                .map(|existing| existing.user_id)
                .ok_or(AuthError::NoLinkTarget)?,
        };

        let linked = user_repo
            .upsert(UpsertDiscordUser {
                user_id,
                discord_id: identity.id.clone(),
                username: identity.username.clone(),
                global_name: identity.global_name.clone(),
                avatar: identity.avatar.clone(),
                access_token: self.cipher.encrypt(&access_token)?,
                refresh_token: self.cipher.encrypt(&refresh_token)?,
                token_expiry: Utc::now().naive_utc() + ChronoDuration::seconds(expires_in),
                scopes,
            })
            .await?;

        info!(
            user_id = user_id,
            discord_id = %identity.id,
            "Discord account linked"
        );

        self.auto_join_guilds(&linked, &access_token).await;

        Ok(linked)
    }

    /// Joins the freshly linked user to every guild where an active mapping
    /// matches one of their groups, with the mapped roles pre-attached.
    async fn auto_join_guilds(&self, user: &entity::discord_user::Model, access_token: &str) {
        let groups = match self.groups.active_group_ids(user.user_id).await {
            Ok(groups) => groups,
            Err(error) => {
                warn!(
                    user_id = user.user_id,
                    "Group lookup failed; skipping auto-join: {error}"
                );
                return;
            }
        };

        let mappings = match RoleMappingRepository::new(self.db).all_active().await {
            Ok(mappings) => mappings,
            Err(error) => {
                warn!("Mapping enumeration failed; skipping auto-join: {error}");
                return;
            }
        };

        let mut by_guild: std::collections::BTreeMap<String, Vec<String>> = Default::default();
        for mapping in mappings {
            if groups.contains(&mapping.group_id) {
                by_guild
                    .entry(mapping.guild_id)
                    .or_default()
                    .push(mapping.discord_role_id);
            }
        }

        let guild_repo = GuildConfigRepository::new(self.db);
        for (guild_id, mut role_ids) in by_guild {
            role_ids.sort();

            let guild = match guild_repo.find_by_guild_id(&guild_id).await {
                Ok(Some(guild)) if guild.is_enabled => guild,
                Ok(_) => {
                    debug!(guild_id = %guild_id, "Guild disabled or gone; skipping auto-join");
                    continue;
                }
                Err(error) => {
                    warn!(guild_id = %guild_id, "Guild lookup failed during auto-join: {error}");
                    continue;
                }
            };

            let bot_token = match self.cipher.decrypt(&guild.bot_token) {
                Ok(token) => token,
                Err(error) => {
                    warn!(guild_id = %guild_id, "Bot token unavailable for auto-join: {error}");
                    continue;
                }
            };

            match self
                .discord
                .add_guild_member(&bot_token, &guild_id, &user.discord_id, access_token, &role_ids)
                .await
            {
                Ok(outcome) => {
                    info!(
                        guild_id = %guild_id,
                        discord_id = %user.discord_id,
                        ?outcome,
                        "Auto-join dispatched"
                    );
                }
                Err(error) => {
                    warn!(
                        guild_id = %guild_id,
                        discord_id = %user.discord_id,
                        "Auto-join failed; continuing callback: {error}"
                    );
                }
            }
        }
    }

    /// Refreshes tokens for active accounts expiring within the next hour.
    ///
    /// A failed refresh is recorded and retried on a later tick; the stored
    /// tokens stay unchanged so the account keeps working until its real
    /// expiry.
    pub async fn refresh_expiring_tokens(&self, batch_size: u64) -> Result<TokenRefreshStats, Error> {
        let cutoff = Utc::now().naive_utc() + ChronoDuration::hours(1);
        let repo = DiscordUserRepository::new(self.db);
        let expiring = repo.expiring_before(cutoff, batch_size).await?;

        let mut stats = TokenRefreshStats::default();

        for user in expiring {
            let refresh_token = match self.cipher.decrypt(&user.refresh_token) {
                Ok(token) => token,
                Err(error) => {
                    warn!(
                        discord_id = %user.discord_id,
                        "Stored refresh token unreadable: {error}"
                    );
                    stats.failed += 1;
                    continue;
                }
            };

            let refreshed = self
                .oauth_client
                .exchange_refresh_token(&RefreshToken::new(refresh_token))
                .request_async(self.http_client)
                .await;

            match refreshed {
                Ok(token) => {
                    let access = token.access_token().secret().clone();
                    let refresh = token
                        .refresh_token()
                        .map(|t| t.secret().clone())
                        .unwrap_or_else(|| {
                            // Discord rotates refresh tokens; tolerate a
                            // response that keeps the old one.
                            String::new()
                        });
                    let expires_in = token
                        .expires_in()
                        .map(|d| d.as_secs() as i64)
                        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

                    let refresh_encrypted = if refresh.is_empty() {
                        user.refresh_token.clone()
                    } else {
                        self.cipher.encrypt(&refresh)?
                    };

                    repo.update_tokens(
                        user.id,
                        self.cipher.encrypt(&access)?,
                        refresh_encrypted,
                        Utc::now().naive_utc() + ChronoDuration::seconds(expires_in),
                    )
                    .await?;

                    stats.refreshed += 1;
                }
                Err(error) => {
                    warn!(
                        discord_id = %user.discord_id,
                        "Token refresh failed; will retry next tick: {error}"
                    );
                    stats.failed += 1;
                }
            }
        }

        if stats.refreshed > 0 || stats.failed > 0 {
            info!(
                refreshed = stats.refreshed,
                failed = stats.failed,
                "Token refresh batch finished"
            );
        }

        Ok(stats)
    }

    /// Unlinks a user's Discord account: best-effort upstream revocation,
    /// then soft-delete.
    pub async fn unlink(&self, user_id: i32) -> Result<(), Error> {
        let repo = DiscordUserRepository::new(self.db);
        let user = repo
            .find_active_by_user_id(user_id)
            .await?
            .ok_or(AuthError::DiscordAccountNotLinked(user_id))?;

        match self.cipher.decrypt(&user.refresh_token) {
            Ok(refresh_token) => {
                let revocation = self
                    .oauth_client
                    .revoke_token(StandardRevocableToken::RefreshToken(RefreshToken::new(
                        refresh_token,
                    )));

                match revocation {
                    Ok(request) => {
                        if let Err(error) = request.request_async(self.http_client).await {
                            warn!(
                                discord_id = %user.discord_id,
                                "Upstream token revocation failed; unlinking anyway: {error}"
                            );
                        }
                    }
                    Err(error) => {
                        warn!("Revocation request could not be built: {error}");
                    }
                }
            }
            Err(error) => {
                warn!(
                    discord_id = %user.discord_id,
                    "Stored refresh token unreadable; skipping revocation: {error}"
                );
            }
        }

        repo.deactivate(&user.discord_id).await?;

        info!(user_id = user_id, discord_id = %user.discord_id, "Discord account unlinked");

        Ok(())
    }
}
