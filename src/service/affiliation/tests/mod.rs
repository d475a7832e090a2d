use heimdall_test_utils::prelude::*;
use sea_orm::{ActiveValue, EntityTrait};
use serde_json::json;

use crate::data::character::CharacterRepository;
use crate::service::affiliation::AffiliationService;
use crate::util::cancel::CancellationFlag;

/// Expect a reconciler tick to write the changed affiliation and account it
/// as updated
#[tokio::test]
async fn detects_affiliation_changes() -> Result<(), TestError> {
    let mut test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;
    fixtures::character(&test.db, 90_000_001, "Alice", 98_000_001, None).await?;

    let endpoint = esi::with_affiliation_endpoint(
        &mut test.server,
        json!([{
            "character_id": 90000001,
            "corporation_id": 98000002,
            "alliance_id": 99000001
        }]),
        1,
    )
    .await;

    let service = AffiliationService::new(test.db.clone(), test.esi_client.clone(), 1);
    let stats = service.run(&CancellationFlag::new()).await?;

    endpoint.assert_async().await;
    assert_eq!(stats.updated, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.batches, 1);

    let alice = CharacterRepository::new(&test.db)
        .find_by_character_id(90_000_001)
        .await?
        .unwrap();
    assert_eq!(alice.corporation_id, 98_000_002);
    assert_eq!(alice.alliance_id, Some(99_000_001));

    Ok(())
}

/// Expect characters omitted from the upstream response to count as skipped,
/// not failed
#[tokio::test]
async fn counts_upstream_omissions_as_skipped() -> Result<(), TestError> {
    let mut test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;
    fixtures::character(&test.db, 90_000_001, "Alice", 98_000_001, None).await?;
    fixtures::character(&test.db, 90_000_002, "Bob", 98_000_001, None).await?;
    fixtures::character(&test.db, 90_000_003, "Carol", 98_000_001, None).await?;

    esi::with_affiliation_endpoint(
        &mut test.server,
        json!([
            {"character_id": 90000001, "corporation_id": 98000001},
            {"character_id": 90000003, "corporation_id": 98000004}
        ]),
        1,
    )
    .await;

    let service = AffiliationService::new(test.db.clone(), test.esi_client.clone(), 2);
    let stats = service.run(&CancellationFlag::new()).await?;

    assert_eq!(stats.updated, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.updated + stats.failed + stats.skipped, 3);

    Ok(())
}

/// Expect a batch-level upstream failure to fail every character of the
/// batch without writes
#[tokio::test]
async fn batch_failure_fails_all_members() -> Result<(), TestError> {
    let mut test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;
    let before = fixtures::character(&test.db, 90_000_001, "Alice", 98_000_001, None).await?;
    fixtures::character(&test.db, 90_000_002, "Bob", 98_000_001, None).await?;

    esi::with_affiliation_error(&mut test.server, 502).await;

    let service = AffiliationService::new(test.db.clone(), test.esi_client.clone(), 1);
    let stats = service.run(&CancellationFlag::new()).await?;

    assert_eq!(stats.failed, 2);
    assert_eq!(stats.updated, 0);
    assert_eq!(stats.batches, 1);

    let alice = CharacterRepository::new(&test.db)
        .find_by_character_id(90_000_001)
        .await?
        .unwrap();
    assert_eq!(alice.corporation_id, before.corporation_id);
    assert_eq!(alice.updated_at, before.updated_at);

    Ok(())
}

/// Expect exactly ceil(N / 1000) upstream batch calls for N characters
#[tokio::test]
async fn issues_one_batch_call_per_thousand_characters() -> Result<(), TestError> {
    let mut test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;

    // 1200 characters across two batches. Insert in chunks to keep the
    // statement parameter count reasonable.
    let now = chrono::Utc::now().naive_utc();
    let models: Vec<entity::character::ActiveModel> = (0..1200)
        .map(|offset| entity::character::ActiveModel {
            character_id: ActiveValue::Set(90_000_001 + offset),
            name: ActiveValue::Set(format!("Pilot {offset}")),
            corporation_id: ActiveValue::Set(98_000_001),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        })
        .collect();
    for chunk in models.chunks(200) {
        entity::prelude::Character::insert_many(chunk.to_vec())
            .exec(&test.db)
            .await?;
    }

    // First batch carries ids 90000001..=90001000, the second the remaining
    // 200. Each answers with records for exactly the requested ids.
    let first_ids: Vec<i32> = (0..1000).map(|offset| 90_000_001 + offset).collect();
    let second_ids: Vec<i32> = (1000..1200).map(|offset| 90_000_001 + offset).collect();
    let records =
        |ids: &[i32]| -> serde_json::Value {
            ids.iter()
                .map(|id| json!({"character_id": id, "corporation_id": 98000001}))
                .collect()
        };

    let first_endpoint = test
        .server
        .mock("POST", "/characters/affiliation/")
        .match_body(mockito::Matcher::Json(json!(first_ids)))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(records(&first_ids).to_string())
        .expect(1)
        .create_async()
        .await;
    let second_endpoint = test
        .server
        .mock("POST", "/characters/affiliation/")
        .match_body(mockito::Matcher::Json(json!(second_ids)))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(records(&second_ids).to_string())
        .expect(1)
        .create_async()
        .await;

    let service = AffiliationService::new(test.db.clone(), test.esi_client.clone(), 3);
    let stats = service.run(&CancellationFlag::new()).await?;

    first_endpoint.assert_async().await;
    second_endpoint.assert_async().await;
    assert_eq!(stats.batches, 2);
    assert_eq!(stats.updated, 1200);
    assert_eq!(stats.updated + stats.failed + stats.skipped, 1200);

    Ok(())
}

/// Expect a pre-cancelled run to dispatch nothing and report cancellation
#[tokio::test]
async fn cancelled_run_abandons_batches() -> Result<(), TestError> {
    let mut test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;
    fixtures::character(&test.db, 90_000_001, "Alice", 98_000_001, None).await?;

    let endpoint = esi::with_affiliation_endpoint(&mut test.server, json!([]), 0).await;

    let cancel = CancellationFlag::new();
    cancel.cancel();

    let service = AffiliationService::new(test.db.clone(), test.esi_client.clone(), 1);
    let stats = service.run(&cancel).await?;

    endpoint.assert_async().await;
    assert!(stats.cancelled);
    assert_eq!(stats.batches, 0);
    assert_eq!(stats.updated, 0);

    Ok(())
}

/// Expect characters present upstream but absent from the store to be
/// inserted
#[tokio::test]
async fn inserts_characters_known_only_upstream() -> Result<(), TestError> {
    let mut test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;
    fixtures::character(&test.db, 90_000_001, "Alice", 98_000_001, None).await?;

    // Upstream returns an extra record the store has never seen; the upsert
    // inserts it.
    esi::with_affiliation_endpoint(
        &mut test.server,
        json!([
            {"character_id": 90000001, "corporation_id": 98000001},
            {"character_id": 90000002, "corporation_id": 98000005}
        ]),
        1,
    )
    .await;

    let service = AffiliationService::new(test.db.clone(), test.esi_client.clone(), 1);
    service.run(&CancellationFlag::new()).await?;

    let inserted = CharacterRepository::new(&test.db)
        .find_by_character_id(90_000_002)
        .await?;
    assert!(inserted.is_some());

    Ok(())
}
