use mockito::Matcher;
use serde_json::json;

use crate::error::discord::DiscordError;
use crate::model::discord::AddMemberOutcome;

use super::DiscordClient;

const TEST_USER_AGENT: &str = "heimdall-tests/0.0.0 (tests@example.com)";

async fn client_for(server: &mockito::ServerGuard) -> DiscordClient {
    DiscordClient::with_base_url(TEST_USER_AGENT, &server.url()).unwrap()
}

/// Expect member reads to return None on 404 rather than an error
#[tokio::test]
async fn maps_missing_member_to_none() {
    let mut server = mockito::Server::new_async().await;
    let endpoint = server
        .mock("GET", "/guilds/1001/members/2002")
        .match_header("authorization", "Bot guild-bot-token")
        .with_status(404)
        .with_body(r#"{"message": "Unknown Member", "code": 10007}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    let member = client
        .get_guild_member("guild-bot-token", "1001", "2002")
        .await
        .unwrap();

    endpoint.assert_async().await;
    assert!(member.is_none());
}

/// Expect member reads to decode roles and nickname
#[tokio::test]
async fn decodes_guild_member() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/guilds/1001/members/2002")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "user": {"id": "2002", "username": "joe", "global_name": "Joe", "avatar": null},
                "nick": "[ABCD] Joe",
                "roles": ["3001", "3002"]
            }"#,
        )
        .create_async()
        .await;

    let client = client_for(&server).await;
    let member = client
        .get_guild_member("guild-bot-token", "1001", "2002")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(member.nick.as_deref(), Some("[ABCD] Joe"));
    assert_eq!(member.roles, vec!["3001".to_string(), "3002".to_string()]);
}

/// Expect role mutations to carry the audit reason header
#[tokio::test]
async fn sends_audit_reason_on_mutations() {
    let mut server = mockito::Server::new_async().await;
    let endpoint = server
        .mock("PUT", "/guilds/1001/members/2002/roles/3001")
        .match_header("authorization", "Bot guild-bot-token")
        .match_header("x-audit-log-reason", Matcher::Any)
        .with_status(204)
        .create_async()
        .await;

    let client = client_for(&server).await;
    client
        .add_member_role("guild-bot-token", "1001", "2002", "3001")
        .await
        .unwrap();

    endpoint.assert_async().await;
}

/// Expect auto-join to report Joined on 201
#[tokio::test]
async fn reports_joined_on_201() {
    let mut server = mockito::Server::new_async().await;
    let endpoint = server
        .mock("PUT", "/guilds/1001/members/2002")
        .match_body(Matcher::Json(json!({
            "access_token": "user-access-token",
            "roles": ["3001"]
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"user": {"id": "2002", "username": "joe", "global_name": null, "avatar": null}, "roles": ["3001"]}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    let outcome = client
        .add_guild_member(
            "guild-bot-token",
            "1001",
            "2002",
            "user-access-token",
            &["3001".to_string()],
        )
        .await
        .unwrap();

    endpoint.assert_async().await;
    assert_eq!(outcome, AddMemberOutcome::Joined);
}

/// Expect auto-join to report AlreadyMember on 204
#[tokio::test]
async fn reports_already_member_on_204() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PUT", "/guilds/1001/members/2002")
        .with_status(204)
        .create_async()
        .await;

    let client = client_for(&server).await;
    let outcome = client
        .add_guild_member(
            "guild-bot-token",
            "1001",
            "2002",
            "user-access-token",
            &[],
        )
        .await
        .unwrap();

    assert_eq!(outcome, AddMemberOutcome::AlreadyMember);
}

/// Expect 401 to classify as an authentication error without retries
#[tokio::test]
async fn classifies_401_as_auth() {
    let mut server = mockito::Server::new_async().await;
    let endpoint = server
        .mock("GET", "/users/@me")
        .with_status(401)
        .with_body(r#"{"message": "401: Unauthorized", "code": 0}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server).await;
    let error = client.validate_bot_token("bad-token").await.unwrap_err();

    endpoint.assert_async().await;
    assert!(error.is_auth());
}

/// Expect 403 to classify as a permission error
#[tokio::test]
async fn classifies_403_as_permission() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PUT", "/guilds/1001/members/2002/roles/3001")
        .with_status(403)
        .with_body(r#"{"message": "Missing Permissions", "code": 50013}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    let error = client
        .add_member_role("guild-bot-token", "1001", "2002", "3001")
        .await
        .unwrap_err();

    assert!(matches!(error, DiscordError::Permission { .. }));
}

/// Expect persistent 429s to exhaust the retry budget and surface as
/// rate-limited
#[tokio::test]
async fn surfaces_exhausted_rate_limit() {
    let mut server = mockito::Server::new_async().await;
    let endpoint = server
        .mock("GET", "/guilds/1001/members/2002")
        .with_status(429)
        .with_header("Retry-After", "0")
        .with_body(r#"{"message": "You are being rate limited.", "retry_after": 0.0}"#)
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server).await;
    let error = client
        .get_guild_member("guild-bot-token", "1001", "2002")
        .await
        .unwrap_err();

    endpoint.assert_async().await;
    assert!(matches!(error, DiscordError::RateLimited { .. }));
}

/// Expect nickname updates to PATCH the member with the new nick
#[tokio::test]
async fn patches_member_nickname() {
    let mut server = mockito::Server::new_async().await;
    let endpoint = server
        .mock("PATCH", "/guilds/1001/members/2002")
        .match_body(Matcher::Json(json!({"nick": "[ABCD] Joe"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"user": null, "nick": "[ABCD] Joe", "roles": []}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    client
        .update_member_nickname("guild-bot-token", "1001", "2002", "[ABCD] Joe")
        .await
        .unwrap();

    endpoint.assert_async().await;
}
