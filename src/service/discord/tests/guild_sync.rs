use heimdall_test_utils::prelude::*;
use serde_json::json;

use crate::data::discord::sync_status::{STATUS_COMPLETED, STATUS_FAILED};
use crate::data::discord::SyncStatusRepository;
use crate::util::cancel::CancellationFlag;

use super::SyncHarness;

/// Mounts the endpoints a healthy guild sync needs before touching members:
/// bot identity, the guild role table, and the bot's own membership with a
/// Manage Roles role.
async fn with_healthy_bot(server: &mut mockito::ServerGuard, guild_id: &str) {
    discord::with_bot_user_endpoint(server, TEST_BOT_TOKEN).await;

    server
        .mock("GET", format!("/guilds/{guild_id}/roles").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                {"id": "5000", "name": "bot-role", "permissions": "268435456"},
                {"id": "3001", "name": "member-role", "permissions": "0"}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    discord::with_member_endpoint(server, guild_id, "424242", &["5000"], None).await;
}

/// Expect a guild sync to validate the bot, converge each active account,
/// and finalize a completed SyncRun with counters
#[tokio::test]
async fn syncs_guild_and_records_run() -> Result<(), TestError> {
    let mut harness = SyncHarness::new().await?;
    let db = harness.test.db.clone();

    let guild = fixtures::guild_config(&db, &harness.test.cipher, "1001", TEST_BOT_TOKEN).await?;
    fixtures::discord_user(&db, &harness.test.cipher, 7, "2002").await?;
    fixtures::group_membership(&db, 7, "groupA").await?;
    fixtures::role_mapping(&db, "1001", "groupA", "3001", true).await?;

    with_healthy_bot(&mut harness.test.server, "1001").await;
    discord::with_member_endpoint(&mut harness.test.server, "1001", "2002", &[], None).await;
    let add = discord::with_role_add(&mut harness.test.server, "1001", "2002", "3001", 1).await;

    let report = harness
        .sync()
        .sync_guild(&guild, false, &CancellationFlag::new())
        .await?;

    add.assert_async().await;
    assert_eq!(report.users_processed, 1);
    assert_eq!(report.users_succeeded, 1);
    assert_eq!(report.roles_added, 1);

    let run = SyncStatusRepository::new(&db)
        .latest_for_guild("1001")
        .await?
        .unwrap();
    assert_eq!(run.status, STATUS_COMPLETED);
    assert_eq!(run.users_processed, 1);
    assert_eq!(run.roles_added, 1);
    assert!(run.duration_ms.is_some());

    Ok(())
}

/// Expect an invalid bot token to abort the run and finalize it failed with
/// the reason recorded
#[tokio::test]
async fn invalid_bot_token_fails_the_run() -> Result<(), TestError> {
    let mut harness = SyncHarness::new().await?;
    let db = harness.test.db.clone();

    let guild = fixtures::guild_config(&db, &harness.test.cipher, "1001", "revoked-token").await?;
    fixtures::discord_user(&db, &harness.test.cipher, 7, "2002").await?;
    fixtures::role_mapping(&db, "1001", "groupA", "3001", true).await?;

    discord::with_invalid_bot_token(&mut harness.test.server).await;

    let report = harness
        .sync()
        .sync_guild(&guild, false, &CancellationFlag::new())
        .await?;

    // No user was touched.
    assert_eq!(report.users_processed, 0);
    assert!(report.errors.iter().any(|e| e.contains("bot token")));

    let run = SyncStatusRepository::new(&db)
        .latest_for_guild("1001")
        .await?
        .unwrap();
    assert_eq!(run.status, STATUS_FAILED);
    assert!(!run.errors.0.is_empty());

    Ok(())
}

/// Expect a bot without Manage Roles to abort before touching members
#[tokio::test]
async fn missing_manage_roles_fails_the_run() -> Result<(), TestError> {
    let mut harness = SyncHarness::new().await?;
    let db = harness.test.db.clone();

    let guild = fixtures::guild_config(&db, &harness.test.cipher, "1001", TEST_BOT_TOKEN).await?;
    fixtures::discord_user(&db, &harness.test.cipher, 7, "2002").await?;
    fixtures::role_mapping(&db, "1001", "groupA", "3001", true).await?;

    discord::with_bot_user_endpoint(&mut harness.test.server, TEST_BOT_TOKEN).await;
    harness
        .test
        .server
        .mock("GET", "/guilds/1001/roles")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{"id": "5000", "name": "bot-role", "permissions": "0"}]).to_string())
        .create_async()
        .await;
    discord::with_member_endpoint(&mut harness.test.server, "1001", "424242", &["5000"], None)
        .await;

    let report = harness
        .sync()
        .sync_guild(&guild, false, &CancellationFlag::new())
        .await?;

    assert_eq!(report.users_processed, 0);
    assert!(report
        .errors
        .iter()
        .any(|e| e.contains("Manage Roles")));

    let run = SyncStatusRepository::new(&db)
        .latest_for_guild("1001")
        .await?
        .unwrap();
    assert_eq!(run.status, STATUS_FAILED);

    Ok(())
}

/// Expect one user's failure to be isolated: the run completes and counters
/// carry the failure
#[tokio::test]
async fn user_failures_do_not_abort_the_run() -> Result<(), TestError> {
    let mut harness = SyncHarness::new().await?;
    let db = harness.test.db.clone();

    let guild = fixtures::guild_config(&db, &harness.test.cipher, "1001", TEST_BOT_TOKEN).await?;
    fixtures::discord_user(&db, &harness.test.cipher, 7, "2002").await?;
    fixtures::discord_user(&db, &harness.test.cipher, 8, "2003").await?;
    fixtures::group_membership(&db, 7, "groupA").await?;
    fixtures::group_membership(&db, 8, "groupA").await?;
    fixtures::role_mapping(&db, "1001", "groupA", "3001", true).await?;

    with_healthy_bot(&mut harness.test.server, "1001").await;
    // First user's member read blows up with a 403; second user converges.
    harness
        .test
        .server
        .mock("GET", "/guilds/1001/members/2002")
        .with_status(403)
        .with_body(r#"{"message": "Missing Access", "code": 50001}"#)
        .create_async()
        .await;
    discord::with_member_endpoint(&mut harness.test.server, "1001", "2003", &["3001"], None).await;

    let report = harness
        .sync()
        .sync_guild(&guild, false, &CancellationFlag::new())
        .await?;

    assert_eq!(report.users_processed, 2);
    assert_eq!(report.users_failed, 1);
    assert_eq!(report.users_succeeded, 1);

    let run = SyncStatusRepository::new(&db)
        .latest_for_guild("1001")
        .await?
        .unwrap();
    assert_eq!(run.status, STATUS_COMPLETED);

    Ok(())
}

/// Expect cancellation mid-sync to leave the run failed with a cancelled
/// error entry
#[tokio::test]
async fn cancellation_fails_the_run() -> Result<(), TestError> {
    let mut harness = SyncHarness::new().await?;
    let db = harness.test.db.clone();

    let guild = fixtures::guild_config(&db, &harness.test.cipher, "1001", TEST_BOT_TOKEN).await?;
    fixtures::discord_user(&db, &harness.test.cipher, 7, "2002").await?;
    fixtures::role_mapping(&db, "1001", "groupA", "3001", true).await?;

    with_healthy_bot(&mut harness.test.server, "1001").await;

    let cancel = CancellationFlag::new();
    cancel.cancel();

    let report = harness.sync().sync_guild(&guild, false, &cancel).await?;

    assert!(report.cancelled);
    assert!(report.errors.iter().any(|e| e == "cancelled"));

    let run = SyncStatusRepository::new(&db)
        .latest_for_guild("1001")
        .await?
        .unwrap();
    assert_eq!(run.status, STATUS_FAILED);

    Ok(())
}

/// Expect sync-all to visit every enabled guild serially
#[tokio::test]
async fn sync_all_visits_enabled_guilds() -> Result<(), TestError> {
    let mut harness = SyncHarness::new().await?;
    let db = harness.test.db.clone();

    fixtures::guild_config(&db, &harness.test.cipher, "1001", TEST_BOT_TOKEN).await?;
    fixtures::guild_config(&db, &harness.test.cipher, "2001", TEST_BOT_TOKEN).await?;

    // Neither guild has mappings, so each sync validates the bot and
    // completes without touching members.
    discord::with_bot_user_endpoint(&mut harness.test.server, TEST_BOT_TOKEN).await;
    for guild_id in ["1001", "2001"] {
        harness
            .test
            .server
            .mock("GET", format!("/guilds/{guild_id}/roles").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([{"id": "5000", "name": "bot-role", "permissions": "268435456"}]).to_string(),
            )
            .create_async()
            .await;
        discord::with_member_endpoint(&mut harness.test.server, guild_id, "424242", &["5000"], None)
            .await;
    }

    let reports = harness
        .sync()
        .sync_all_guilds(false, &CancellationFlag::new())
        .await?;

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].guild_id, "1001");
    assert_eq!(reports[1].guild_id, "2001");

    Ok(())
}
