//! Canned mockito endpoints for Discord REST v10.

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;

/// Mounts the bot identity endpoint, validating the bot token header.
pub async fn with_bot_user_endpoint(server: &mut ServerGuard, bot_token: &str) -> Mock {
    server
        .mock("GET", "/users/@me")
        .match_header("authorization", format!("Bot {bot_token}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "424242", "username": "heimdall-bot", "bot": true}"#)
        .create_async()
        .await
}

/// Mounts a 401 bot identity endpoint for invalid-token scenarios.
pub async fn with_invalid_bot_token(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/users/@me")
        .with_status(401)
        .with_body(r#"{"message": "401: Unauthorized", "code": 0}"#)
        .create_async()
        .await
}

/// Mounts a guild member read returning the given roles and nickname.
pub async fn with_member_endpoint(
    server: &mut ServerGuard,
    guild_id: &str,
    discord_id: &str,
    roles: &[&str],
    nick: Option<&str>,
) -> Mock {
    server
        .mock(
            "GET",
            format!("/guilds/{guild_id}/members/{discord_id}").as_str(),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "user": {
                    "id": discord_id,
                    "username": format!("user{discord_id}"),
                    "global_name": null,
                    "avatar": null
                },
                "nick": nick,
                "roles": roles
            })
            .to_string(),
        )
        .create_async()
        .await
}

/// Mounts a 404 guild member read ("not a member").
pub async fn with_member_not_found(
    server: &mut ServerGuard,
    guild_id: &str,
    discord_id: &str,
) -> Mock {
    server
        .mock(
            "GET",
            format!("/guilds/{guild_id}/members/{discord_id}").as_str(),
        )
        .with_status(404)
        .with_body(r#"{"message": "Unknown Member", "code": 10007}"#)
        .create_async()
        .await
}

/// Mounts a role grant endpoint.
pub async fn with_role_add(
    server: &mut ServerGuard,
    guild_id: &str,
    discord_id: &str,
    role_id: &str,
    hits: usize,
) -> Mock {
    server
        .mock(
            "PUT",
            format!("/guilds/{guild_id}/members/{discord_id}/roles/{role_id}").as_str(),
        )
        .with_status(204)
        .expect(hits)
        .create_async()
        .await
}

/// Mounts a role removal endpoint.
pub async fn with_role_remove(
    server: &mut ServerGuard,
    guild_id: &str,
    discord_id: &str,
    role_id: &str,
    hits: usize,
) -> Mock {
    server
        .mock(
            "DELETE",
            format!("/guilds/{guild_id}/members/{discord_id}/roles/{role_id}").as_str(),
        )
        .with_status(204)
        .expect(hits)
        .create_async()
        .await
}

/// Mounts the auto-join PUT answering 201 (joined) or 204 (already member).
pub async fn with_guild_member_add(
    server: &mut ServerGuard,
    guild_id: &str,
    discord_id: &str,
    status: usize,
    hits: usize,
) -> Mock {
    server
        .mock(
            "PUT",
            format!("/guilds/{guild_id}/members/{discord_id}").as_str(),
        )
        .with_status(status)
        .expect(hits)
        .create_async()
        .await
}

/// Mounts the member PATCH endpoint (nickname / bulk roles).
pub async fn with_member_patch(
    server: &mut ServerGuard,
    guild_id: &str,
    discord_id: &str,
    expected_body: serde_json::Value,
    hits: usize,
) -> Mock {
    server
        .mock(
            "PATCH",
            format!("/guilds/{guild_id}/members/{discord_id}").as_str(),
        )
        .match_body(Matcher::Json(expected_body))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"user": null, "nick": null, "roles": []}"#)
        .expect(hits)
        .create_async()
        .await
}

/// Mounts the OAuth token endpoint returning a standard bundle.
pub async fn with_token_endpoint(server: &mut ServerGuard, access_token: &str) -> Mock {
    server
        .mock("POST", "/oauth2/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": access_token,
                "token_type": "Bearer",
                "expires_in": 604800,
                "refresh_token": format!("refresh-{access_token}"),
                "scope": "identify guilds guilds.join"
            })
            .to_string(),
        )
        .create_async()
        .await
}

/// Mounts the bearer-token identity endpoint.
pub async fn with_identity_endpoint(
    server: &mut ServerGuard,
    access_token: &str,
    discord_id: &str,
    username: &str,
) -> Mock {
    server
        .mock("GET", "/users/@me")
        .match_header("authorization", format!("Bearer {access_token}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": discord_id,
                "username": username,
                "global_name": username,
                "avatar": null
            })
            .to_string(),
        )
        .create_async()
        .await
}
