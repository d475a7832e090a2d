use heimdall_test_utils::prelude::*;

use crate::data::discord::sync_status::{
    SyncStatusRepository, STATUS_COMPLETED, STATUS_RUNNING,
};
use crate::model::sync::GuildSyncReport;

/// Expect a run to open as running and finalize with its counters
#[tokio::test]
async fn tracks_run_lifecycle() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::DiscordSyncStatus)
        .build()
        .await?;

    let repo = SyncStatusRepository::new(&test.db);
    let run = repo.create_running("1001").await?;
    assert_eq!(run.status, STATUS_RUNNING);

    let report = GuildSyncReport {
        guild_id: "1001".to_string(),
        users_processed: 5,
        users_succeeded: 4,
        users_failed: 1,
        roles_added: 3,
        roles_removed: 2,
        errors: vec!["user 9: permission denied".to_string()],
        duration_ms: 1234,
        ..Default::default()
    };
    let finalized = repo.finalize(run.id, STATUS_COMPLETED, &report).await?;

    assert_eq!(finalized.status, STATUS_COMPLETED);
    assert_eq!(finalized.users_processed, 5);
    assert_eq!(finalized.users_failed, 1);
    assert_eq!(finalized.roles_added, 3);
    assert_eq!(finalized.duration_ms, Some(1234));
    assert_eq!(finalized.errors.0.len(), 1);

    Ok(())
}

/// Expect recent runs to come back newest first
#[tokio::test]
async fn lists_recent_runs_newest_first() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::DiscordSyncStatus)
        .build()
        .await?;

    let repo = SyncStatusRepository::new(&test.db);
    let first = repo.create_running("1001").await?;
    let second = repo.create_running("1001").await?;
    repo.create_running("2002").await?;

    let recent = repo.recent_for_guild("1001", 10).await?;

    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, second.id);
    assert_eq!(recent[1].id, first.id);

    Ok(())
}

/// Expect history trimming to keep only the newest runs of the guild
#[tokio::test]
async fn trims_history_to_retention_limit() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::DiscordSyncStatus)
        .build()
        .await?;

    let repo = SyncStatusRepository::new(&test.db);
    for _ in 0..5 {
        repo.create_running("1001").await?;
    }
    let other_guild = repo.create_running("2002").await?;

    let removed = repo.trim_history("1001", 2).await?;

    assert_eq!(removed, 3);
    assert_eq!(repo.recent_for_guild("1001", 10).await?.len(), 2);
    // Other guilds are untouched.
    assert_eq!(
        repo.latest_for_guild("2002").await?.unwrap().id,
        other_guild.id
    );

    Ok(())
}
