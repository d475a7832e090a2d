//! Discord REST v10 client with rate-limit discipline.
//!
//! Every request flows through a per-endpoint-family pacing bucket
//! ([`RateLimiter`]) and feeds rate-limit headers back into it. HTTP 429 is
//! honored by sleeping exactly `Retry-After` and retrying; 5xx responses are
//! retried with exponential backoff. Remaining statuses classify into typed
//! [`DiscordError`] variants: 401 authentication, 403 permission, 404
//! not-found. Mutating requests carry an audit reason header identifying the
//! core as the initiator.
//!
//! Bot tokens are per-guild configuration, so every method takes its token
//! explicitly rather than binding one at construction.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::warn;

use crate::error::discord::DiscordError;
use crate::model::discord::{AddMemberOutcome, BotUser, Guild, Member, Role, User};

use super::rate_limit::{EndpointFamily, RateLimiter};

/// Production Discord API base URL.
pub const DISCORD_API_BASE_URL: &str = "https://discord.com/api/v10";

/// Audit-log reason attached to every mutating request.
const AUDIT_REASON: &str = "Heimdall role reconciliation";

const REQUEST_TIMEOUT_SECS: u64 = 30;
const ERROR_BODY_LIMIT: usize = 512;
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_SECS: u64 = 1;

enum Auth<'a> {
    Bot(&'a str),
    Bearer(&'a str),
}

/// Discord REST client.
///
/// Cheap to clone; clones share one connection pool and one set of pacing
/// buckets, keeping rate-limit bookkeeping per client instance.
#[derive(Clone, Debug)]
pub struct DiscordClient {
    http: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl DiscordClient {
    /// Creates a client against the production Discord API.
    pub fn new(user_agent: &str) -> Result<Self, DiscordError> {
        Self::with_base_url(user_agent, DISCORD_API_BASE_URL)
    }

    /// Creates a client against a custom base URL (mock servers in tests).
    pub fn with_base_url(user_agent: &str, base_url: &str) -> Result<Self, DiscordError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::new()),
        })
    }

    fn parse_header_f64(response: &reqwest::Response, name: &str) -> Option<f64> {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }

    fn parse_header_u64(response: &reqwest::Response, name: &str) -> Option<u64> {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }

    /// Dispatches one request with pacing, header feedback, and retries.
    ///
    /// Returns the successful response; every non-success status has been
    /// classified or retried away by the time this returns.
    async fn request(
        &self,
        family: EndpointFamily,
        method: reqwest::Method,
        path: &str,
        auth: Auth<'_>,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, DiscordError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            self.rate_limiter.acquire(family).await;

            let mut request = self.http.request(method.clone(), &url);
            request = match &auth {
                Auth::Bot(token) => request.header("Authorization", format!("Bot {token}")),
                Auth::Bearer(token) => request.header("Authorization", format!("Bearer {token}")),
            };
            if family.is_mutating() {
                request = request.header("X-Audit-Log-Reason", AUDIT_REASON);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();

            let remaining = Self::parse_header_u64(&response, "X-RateLimit-Remaining");
            let reset_after = Self::parse_header_f64(&response, "X-RateLimit-Reset-After");
            let retry_after = Self::parse_header_f64(&response, "Retry-After");
            self.rate_limiter
                .record_headers(family, remaining, reset_after, retry_after);

            if status.is_success() {
                return Ok(response);
            }

            match status.as_u16() {
                401 => {
                    return Err(DiscordError::Auth {
                        path: path.to_string(),
                    })
                }
                403 => {
                    let mut body = response.text().await.unwrap_or_default();
                    body.truncate(ERROR_BODY_LIMIT);
                    return Err(DiscordError::Permission {
                        path: path.to_string(),
                        body,
                    });
                }
                404 => {
                    return Err(DiscordError::NotFound {
                        path: path.to_string(),
                    })
                }
                429 => {
                    let delay = retry_after.unwrap_or(1.0).max(0.0);
                    if attempt >= MAX_ATTEMPTS {
                        return Err(DiscordError::RateLimited {
                            path: path.to_string(),
                            retry_after: delay,
                        });
                    }

                    warn!(
                        path = path,
                        retry_after = delay,
                        "Rate limited by Discord; honoring Retry-After"
                    );
                    tokio::time::sleep(Duration::from_secs_f64(delay)).await;
                }
                500..=599 => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(DiscordError::Server {
                            status: status.as_u16(),
                            path: path.to_string(),
                        });
                    }

                    let backoff = BACKOFF_BASE_SECS * 2_u64.pow(attempt - 1);
                    warn!(
                        path = path,
                        status = status.as_u16(),
                        backoff_secs = backoff,
                        "Discord server error; retrying with backoff"
                    );
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                }
                other => {
                    let mut body = response.text().await.unwrap_or_default();
                    body.truncate(ERROR_BODY_LIMIT);
                    return Err(DiscordError::Unexpected {
                        status: other,
                        path: path.to_string(),
                        body,
                    });
                }
            }
        }
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> Result<T, DiscordError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| DiscordError::Decode {
            path: path.to_string(),
            source,
        })
    }

    /// Fetches guild metadata.
    pub async fn get_guild(&self, bot_token: &str, guild_id: &str) -> Result<Guild, DiscordError> {
        let path = format!("/guilds/{guild_id}");
        let response = self
            .request(
                EndpointFamily::GuildInfo,
                reqwest::Method::GET,
                &path,
                Auth::Bot(bot_token),
                None,
            )
            .await?;

        Self::decode(response, &path).await
    }

    /// Lists every role defined in the guild.
    pub async fn get_guild_roles(
        &self,
        bot_token: &str,
        guild_id: &str,
    ) -> Result<Vec<Role>, DiscordError> {
        let path = format!("/guilds/{guild_id}/roles");
        let response = self
            .request(
                EndpointFamily::RolesGet,
                reqwest::Method::GET,
                &path,
                Auth::Bot(bot_token),
                None,
            )
            .await?;

        Self::decode(response, &path).await
    }

    /// Fetches one guild member.
    ///
    /// A 404 means the user is not a member and maps to `Ok(None)` so the
    /// synchronizer can branch into its auto-join path.
    pub async fn get_guild_member(
        &self,
        bot_token: &str,
        guild_id: &str,
        user_id: &str,
    ) -> Result<Option<Member>, DiscordError> {
        let path = format!("/guilds/{guild_id}/members/{user_id}");
        let result = self
            .request(
                EndpointFamily::MemberGet,
                reqwest::Method::GET,
                &path,
                Auth::Bot(bot_token),
                None,
            )
            .await;

        match result {
            Ok(response) => Ok(Some(Self::decode(response, &path).await?)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Grants one role to a member.
    pub async fn add_member_role(
        &self,
        bot_token: &str,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DiscordError> {
        let path = format!("/guilds/{guild_id}/members/{user_id}/roles/{role_id}");
        self.request(
            EndpointFamily::RoleModify,
            reqwest::Method::PUT,
            &path,
            Auth::Bot(bot_token),
            None,
        )
        .await?;

        Ok(())
    }

    /// Removes one role from a member.
    pub async fn remove_member_role(
        &self,
        bot_token: &str,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DiscordError> {
        let path = format!("/guilds/{guild_id}/members/{user_id}/roles/{role_id}");
        self.request(
            EndpointFamily::RoleModify,
            reqwest::Method::DELETE,
            &path,
            Auth::Bot(bot_token),
            None,
        )
        .await?;

        Ok(())
    }

    /// Adds a user to the guild with an initial role set (auto-join).
    ///
    /// Uses the user's OAuth access token (which must carry the
    /// `guilds.join` scope) alongside the bot token. Discord answers 201 when
    /// the user was added and 204 when they were already a member, in which
    /// case the requested roles were applied to the existing membership.
    pub async fn add_guild_member(
        &self,
        bot_token: &str,
        guild_id: &str,
        user_id: &str,
        user_access_token: &str,
        role_ids: &[String],
    ) -> Result<AddMemberOutcome, DiscordError> {
        let path = format!("/guilds/{guild_id}/members/{user_id}");
        let body = json!({
            "access_token": user_access_token,
            "roles": role_ids,
        });

        let response = self
            .request(
                EndpointFamily::GuildMemberAdd,
                reqwest::Method::PUT,
                &path,
                Auth::Bot(bot_token),
                Some(body),
            )
            .await?;

        if response.status().as_u16() == 201 {
            Ok(AddMemberOutcome::Joined)
        } else {
            Ok(AddMemberOutcome::AlreadyMember)
        }
    }

    /// Replaces a member's role set in one request.
    pub async fn modify_member_roles(
        &self,
        bot_token: &str,
        guild_id: &str,
        user_id: &str,
        role_ids: &[String],
    ) -> Result<(), DiscordError> {
        let path = format!("/guilds/{guild_id}/members/{user_id}");
        self.request(
            EndpointFamily::MemberModify,
            reqwest::Method::PATCH,
            &path,
            Auth::Bot(bot_token),
            Some(json!({ "roles": role_ids })),
        )
        .await?;

        Ok(())
    }

    /// Rewrites a member's guild nickname.
    pub async fn update_member_nickname(
        &self,
        bot_token: &str,
        guild_id: &str,
        user_id: &str,
        nickname: &str,
    ) -> Result<(), DiscordError> {
        let path = format!("/guilds/{guild_id}/members/{user_id}");
        self.request(
            EndpointFamily::MemberModify,
            reqwest::Method::PATCH,
            &path,
            Auth::Bot(bot_token),
            Some(json!({ "nick": nickname })),
        )
        .await?;

        Ok(())
    }

    /// Fetches the bot's own user record.
    pub async fn get_bot_user(&self, bot_token: &str) -> Result<BotUser, DiscordError> {
        let path = "/users/@me";
        let response = self
            .request(
                EndpointFamily::BotUser,
                reqwest::Method::GET,
                path,
                Auth::Bot(bot_token),
                None,
            )
            .await?;

        Self::decode(response, path).await
    }

    /// Validates a guild's bot token by fetching the bot user.
    ///
    /// A 401 here aborts the enclosing guild sync: every later request with
    /// the same token would fail identically.
    pub async fn validate_bot_token(&self, bot_token: &str) -> Result<BotUser, DiscordError> {
        self.get_bot_user(bot_token).await
    }

    /// Fetches the identity behind a user OAuth access token.
    pub async fn get_current_user(&self, user_access_token: &str) -> Result<User, DiscordError> {
        let path = "/users/@me";
        let response = self
            .request(
                EndpointFamily::BotUser,
                reqwest::Method::GET,
                path,
                Auth::Bearer(user_access_token),
                None,
            )
            .await?;

        Self::decode(response, path).await
    }
}

#[cfg(test)]
mod tests;
