use heimdall_test_utils::prelude::*;
use serde_json::json;

use crate::data::discord::RoleMappingRepository;

use super::SyncHarness;

/// S3: expect convergence to add the newly required role, remove the stale
/// managed role, leave unmanaged roles untouched, and rewrite the nickname
#[tokio::test]
async fn adds_and_removes_managed_roles_only() -> Result<(), TestError> {
    let mut harness = SyncHarness::new().await?;
    let db = harness.test.db.clone();

    let user = fixtures::discord_user(&db, &harness.test.cipher, 7, "2002").await?;
    fixtures::group_membership(&db, 7, "groupB").await?;
    fixtures::role_mapping(&db, "1001", "groupA", "3001", true).await?;
    fixtures::role_mapping(&db, "1001", "groupB", "3003", true).await?;

    // Nickname path: main character in a corporation with ticker ABCD.
    fixtures::user_profile(&db, 7, Some(90_000_001)).await?;
    fixtures::character(&db, 90_000_001, "Joe", 98_000_001, None).await?;
    esi::with_corporation_endpoint(&mut harness.test.server, 98_000_001, "Abyssal Corp", "ABCD", 1)
        .await;

    // Member currently holds the stale managed role, another managed-looking
    // role that is required, and one unmanaged role.
    discord::with_member_endpoint(
        &mut harness.test.server,
        "1001",
        "2002",
        &["3001", "9999"],
        Some("Joe"),
    )
    .await;
    let add = discord::with_role_add(&mut harness.test.server, "1001", "2002", "3003", 1).await;
    let remove =
        discord::with_role_remove(&mut harness.test.server, "1001", "2002", "3001", 1).await;
    let nickname = discord::with_member_patch(
        &mut harness.test.server,
        "1001",
        "2002",
        json!({"nick": "[ABCD] Joe"}),
        1,
    )
    .await;

    let mappings = RoleMappingRepository::new(&db)
        .all_active_for_guild("1001")
        .await?;
    let report = harness
        .sync()
        .sync_user_in_guild(&user, "1001", TEST_BOT_TOKEN, &mappings, false)
        .await?;

    add.assert_async().await;
    remove.assert_async().await;
    nickname.assert_async().await;

    assert!(report.success);
    assert_eq!(report.roles_added, vec!["3003".to_string()]);
    assert_eq!(report.roles_removed, vec!["3001".to_string()]);
    assert!(report.nickname_updated);

    Ok(())
}

/// P3: expect a second convergence run on unchanged state to issue zero
/// upstream mutations
#[tokio::test]
async fn converged_state_is_a_no_op() -> Result<(), TestError> {
    let mut harness = SyncHarness::new().await?;
    let db = harness.test.db.clone();

    let user = fixtures::discord_user(&db, &harness.test.cipher, 7, "2002").await?;
    fixtures::group_membership(&db, 7, "groupA").await?;
    fixtures::role_mapping(&db, "1001", "groupA", "3001", true).await?;

    // Member already holds exactly the required managed role.
    discord::with_member_endpoint(
        &mut harness.test.server,
        "1001",
        "2002",
        &["3001", "9999"],
        Some("[ABCD] Joe"),
    )
    .await;
    // No role or nickname endpoints mounted: any mutation would 501 and fail
    // the report.

    let mappings = RoleMappingRepository::new(&db)
        .all_active_for_guild("1001")
        .await?;
    let sync = harness.sync();
    let first = sync
        .sync_user_in_guild(&user, "1001", TEST_BOT_TOKEN, &mappings, false)
        .await?;
    let second = sync
        .sync_user_in_guild(&user, "1001", TEST_BOT_TOKEN, &mappings, false)
        .await?;

    for report in [first, second] {
        assert!(report.success);
        assert!(report.roles_added.is_empty());
        assert!(report.roles_removed.is_empty());
        assert!(!report.nickname_updated);
    }

    Ok(())
}

/// Expect a missing member with required roles to be auto-joined with the
/// user's own access token
#[tokio::test]
async fn auto_joins_missing_members() -> Result<(), TestError> {
    let mut harness = SyncHarness::new().await?;
    let db = harness.test.db.clone();

    let user = fixtures::discord_user(&db, &harness.test.cipher, 7, "2002").await?;
    fixtures::group_membership(&db, 7, "groupA").await?;
    fixtures::role_mapping(&db, "1001", "groupA", "3001", true).await?;

    discord::with_member_not_found(&mut harness.test.server, "1001", "2002").await;
    let join = harness
        .test
        .server
        .mock("PUT", "/guilds/1001/members/2002")
        .match_body(mockito::Matcher::Json(json!({
            "access_token": "access-2002",
            "roles": ["3001"]
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"roles": ["3001"]}"#)
        .create_async()
        .await;

    let mappings = RoleMappingRepository::new(&db)
        .all_active_for_guild("1001")
        .await?;
    let report = harness
        .sync()
        .sync_user_in_guild(&user, "1001", TEST_BOT_TOKEN, &mappings, false)
        .await?;

    join.assert_async().await;
    assert!(report.success);
    assert!(report.joined);
    assert_eq!(report.roles_added, vec!["3001".to_string()]);

    Ok(())
}

/// Expect a missing member with no required roles to be a success no-op
#[tokio::test]
async fn missing_member_without_required_roles_is_no_op() -> Result<(), TestError> {
    let mut harness = SyncHarness::new().await?;
    let db = harness.test.db.clone();

    let user = fixtures::discord_user(&db, &harness.test.cipher, 7, "2002").await?;
    fixtures::role_mapping(&db, "1001", "groupA", "3001", true).await?;

    discord::with_member_not_found(&mut harness.test.server, "1001", "2002").await;

    let mappings = RoleMappingRepository::new(&db)
        .all_active_for_guild("1001")
        .await?;
    let report = harness
        .sync()
        .sync_user_in_guild(&user, "1001", TEST_BOT_TOKEN, &mappings, false)
        .await?;

    assert!(report.success);
    assert!(!report.joined);
    assert!(report.roles_added.is_empty());

    Ok(())
}

/// Expect dry runs to report the mutation sets without touching upstream
#[tokio::test]
async fn dry_run_reports_without_mutating() -> Result<(), TestError> {
    let mut harness = SyncHarness::new().await?;
    let db = harness.test.db.clone();

    let user = fixtures::discord_user(&db, &harness.test.cipher, 7, "2002").await?;
    fixtures::group_membership(&db, 7, "groupB").await?;
    fixtures::role_mapping(&db, "1001", "groupA", "3001", true).await?;
    fixtures::role_mapping(&db, "1001", "groupB", "3003", true).await?;

    discord::with_member_endpoint(
        &mut harness.test.server,
        "1001",
        "2002",
        &["3001"],
        Some("Joe"),
    )
    .await;

    let mappings = RoleMappingRepository::new(&db)
        .all_active_for_guild("1001")
        .await?;
    let report = harness
        .sync()
        .sync_user_in_guild(&user, "1001", TEST_BOT_TOKEN, &mappings, true)
        .await?;

    assert!(report.success);
    assert!(report.dry_run);
    assert_eq!(report.roles_added, vec!["3003".to_string()]);
    assert_eq!(report.roles_removed, vec!["3001".to_string()]);
    assert!(!report.nickname_updated);

    Ok(())
}

/// Expect the first failing mutation to short-circuit the user while keeping
/// partial progress
#[tokio::test]
async fn first_failure_short_circuits_with_partial_progress() -> Result<(), TestError> {
    let mut harness = SyncHarness::new().await?;
    let db = harness.test.db.clone();

    let user = fixtures::discord_user(&db, &harness.test.cipher, 7, "2002").await?;
    fixtures::group_membership(&db, 7, "groupA").await?;
    fixtures::group_membership(&db, 7, "groupB").await?;
    fixtures::role_mapping(&db, "1001", "groupA", "3001", true).await?;
    fixtures::role_mapping(&db, "1001", "groupB", "3002", true).await?;

    discord::with_member_endpoint(&mut harness.test.server, "1001", "2002", &[], None).await;
    // First add succeeds, second is rejected by Discord.
    discord::with_role_add(&mut harness.test.server, "1001", "2002", "3001", 1).await;
    harness
        .test
        .server
        .mock("PUT", "/guilds/1001/members/2002/roles/3002")
        .with_status(403)
        .with_body(r#"{"message": "Missing Permissions", "code": 50013}"#)
        .create_async()
        .await;

    let mappings = RoleMappingRepository::new(&db)
        .all_active_for_guild("1001")
        .await?;
    let report = harness
        .sync()
        .sync_user_in_guild(&user, "1001", TEST_BOT_TOKEN, &mappings, false)
        .await?;

    assert!(!report.success);
    assert_eq!(report.roles_added, vec!["3001".to_string()]);
    assert!(report.error.unwrap().contains("3002"));

    Ok(())
}
