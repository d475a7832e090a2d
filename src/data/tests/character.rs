use heimdall_test_utils::prelude::*;
use sea_orm::EntityTrait;

use crate::data::character::CharacterRepository;
use crate::model::esi::{CharacterAffiliation, CharacterPublicInfo};

fn profile(name: &str, corporation_id: i32) -> CharacterPublicInfo {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "corporation_id": corporation_id,
        "security_status": 0.5
    }))
    .unwrap()
}

/// Expect a first profile upsert to insert with both timestamps set
#[tokio::test]
async fn upsert_profile_inserts_new_character() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;

    let repo = CharacterRepository::new(&test.db);
    let created = repo.upsert_profile(90_000_001, profile("Alice", 98_000_001)).await?;

    assert_eq!(created.character_id, 90_000_001);
    assert_eq!(created.name, "Alice");
    assert_eq!(created.corporation_id, 98_000_001);
    assert_eq!(created.created_at, created.updated_at);

    Ok(())
}

/// Expect a repeated upsert for the same character to update in place,
/// leaving exactly one row
#[tokio::test]
async fn upsert_profile_updates_existing_character() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;

    let repo = CharacterRepository::new(&test.db);
    repo.upsert_profile(90_000_001, profile("Alice", 98_000_001)).await?;
    let updated = repo.upsert_profile(90_000_001, profile("Alice", 98_000_002)).await?;

    assert_eq!(updated.corporation_id, 98_000_002);
    assert_eq!(repo.count().await?, 1);

    Ok(())
}

/// Expect affiliation upserts to update known characters and insert unknown
/// ones
#[tokio::test]
async fn upsert_affiliations_updates_and_inserts() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;
    fixtures::character(&test.db, 90_000_001, "Alice", 98_000_001, None).await?;

    let repo = CharacterRepository::new(&test.db);
    repo.upsert_affiliations(&[
        CharacterAffiliation {
            character_id: 90_000_001,
            corporation_id: 98_000_002,
            alliance_id: Some(99_000_001),
            faction_id: None,
        },
        CharacterAffiliation {
            character_id: 90_000_002,
            corporation_id: 98_000_003,
            alliance_id: None,
            faction_id: None,
        },
    ])
    .await?;

    let alice = repo.find_by_character_id(90_000_001).await?.unwrap();
    assert_eq!(alice.corporation_id, 98_000_002);
    assert_eq!(alice.alliance_id, Some(99_000_001));
    // The affiliation write must not clobber profile fields.
    assert_eq!(alice.name, "Alice");

    let inserted = repo.find_by_character_id(90_000_002).await?.unwrap();
    assert_eq!(inserted.corporation_id, 98_000_003);
    assert_eq!(inserted.name, "");

    Ok(())
}

/// Expect affiliation upserts to advance updated_at on changed characters
#[tokio::test]
async fn upsert_affiliations_advances_updated_at() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;
    let before = fixtures::character(&test.db, 90_000_001, "Alice", 98_000_001, None).await?;

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let repo = CharacterRepository::new(&test.db);
    repo.upsert_affiliations(&[CharacterAffiliation {
        character_id: 90_000_001,
        corporation_id: 98_000_002,
        alliance_id: None,
        faction_id: None,
    }])
    .await?;

    let after = repo.find_by_character_id(90_000_001).await?.unwrap();
    assert!(after.updated_at > before.updated_at);

    Ok(())
}

/// Expect id enumeration to return every stored character id
#[tokio::test]
async fn all_character_ids_enumerates_store() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;
    fixtures::character(&test.db, 90_000_002, "Bob", 98_000_001, None).await?;
    fixtures::character(&test.db, 90_000_001, "Alice", 98_000_001, None).await?;

    let repo = CharacterRepository::new(&test.db);
    let ids = repo.all_character_ids().await?;

    assert_eq!(ids, vec![90_000_001, 90_000_002]);

    Ok(())
}

/// Expect single-token search to prefix-match case-insensitively in
/// alphabetical order
#[tokio::test]
async fn search_prefix_matches_case_insensitively() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;
    fixtures::character(&test.db, 90_000_001, "alice Auduin", 98_000_001, None).await?;
    fixtures::character(&test.db, 90_000_002, "Alicent", 98_000_001, None).await?;
    fixtures::character(&test.db, 90_000_003, "Bob", 98_000_001, None).await?;

    let repo = CharacterRepository::new(&test.db);
    let result = repo.search_by_name("ALIC").await?;

    assert_eq!(result.count, 2);
    let names: Vec<&str> = result.characters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Alicent", "alice Auduin"]);

    Ok(())
}

/// Expect short search input to be rejected before touching the store
#[tokio::test]
async fn search_rejects_short_input() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;

    let repo = CharacterRepository::new(&test.db);
    let result = repo.search_by_name("ab").await;

    assert!(matches!(
        result,
        Err(crate::error::Error::DomainError(
            crate::error::domain::DomainError::Validation(_)
        ))
    ));

    Ok(())
}

/// Expect exactly one row after concurrent-looking duplicate inserts
#[tokio::test]
async fn duplicate_upserts_leave_single_row() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::Character)
        .build()
        .await?;

    let repo = CharacterRepository::new(&test.db);
    let first = repo.upsert_profile(90_000_001, profile("Alice", 98_000_001));
    let second = repo.upsert_profile(90_000_001, profile("Alice", 98_000_001));
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(
        entity::prelude::Character::find().all(&test.db).await?.len(),
        1
    );

    Ok(())
}
