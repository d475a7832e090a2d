use heimdall_test_utils::prelude::*;
use serde_json::json;

use crate::cache::CacheService;
use crate::service::character::CharacterDataService;

fn clone_body() -> serde_json::Value {
    json!({
        "home_location": {"location_id": 60003760, "location_type": "station"},
        "jump_clones": [{
            "jump_clone_id": 12345,
            "location_id": 1021975535893i64,
            "location_type": "structure",
            "implants": [22118, 22119]
        }],
        "last_clone_jump_date": "2026-07-01T10:00:00Z"
    })
}

/// Expect the clone read to enrich locations and attach the implant list
/// fetched by the secondary call
#[tokio::test]
async fn enriches_clones_and_fetches_implants() -> Result<(), TestError> {
    let mut test = TestBuilder::new()
        .with_table(entity::prelude::CharacterClones)
        .with_table(entity::prelude::CharacterImplants)
        .build()
        .await?;
    let clones_endpoint = esi::with_authed_endpoint(
        &mut test.server,
        "/characters/90000001/clones/",
        "user-token",
        clone_body(),
        1,
    )
    .await;
    let implants_endpoint = esi::with_authed_endpoint(
        &mut test.server,
        "/characters/90000001/implants/",
        "user-token",
        json!([20121, 20157.0]),
        1,
    )
    .await;
    let structure_endpoint = esi::with_authed_endpoint(
        &mut test.server,
        "/universe/structures/1021975535893/",
        "user-token",
        json!({
            "name": "Autumn Citadel",
            "owner_id": 98000001,
            "solar_system_id": 30000142,
            "type_id": 35832
        }),
        1,
    )
    .await;
    let static_data = StubStaticData::new().with_station(60_003_760, "Jita IV - Moon 4", 52_678);
    let cache = CacheService::in_memory();

    let service = CharacterDataService::new(&test.db, &test.esi_client, &cache, &static_data);
    let clones = service.clones(90_000_001, "user-token").await?;

    clones_endpoint.assert_async().await;
    implants_endpoint.assert_async().await;
    structure_endpoint.assert_async().await;

    let home = clones.home_location.unwrap();
    assert_eq!(home.location_name, "Jita IV - Moon 4");
    assert_eq!(home.location_type_id, 52_678);

    let jump_clone = &clones.jump_clones.0[0];
    assert_eq!(jump_clone.location.location_name, "Autumn Citadel");
    assert_eq!(jump_clone.location.location_type_id, 35_832);
    assert_eq!(jump_clone.implants, vec![22_118, 22_119]);

    assert_eq!(clones.active_implants.0, vec![20_121, 20_157]);

    // The secondary fetch also wrote through to the implants collection.
    let implants = crate::data::character_data::ImplantsRepository::new(&test.db)
        .find_by_character_id(90_000_001)
        .await?
        .unwrap();
    assert_eq!(implants.implants.0, vec![20_121, 20_157]);

    Ok(())
}

/// Expect a failing implant fetch to leave the clone result intact with an
/// empty implant list
#[tokio::test]
async fn implant_failure_keeps_clone_result() -> Result<(), TestError> {
    let mut test = TestBuilder::new()
        .with_table(entity::prelude::CharacterClones)
        .with_table(entity::prelude::CharacterImplants)
        .build()
        .await?;
    esi::with_authed_endpoint(
        &mut test.server,
        "/characters/90000001/clones/",
        "user-token",
        json!({"home_location": null, "jump_clones": []}),
        1,
    )
    .await;
    test.server
        .mock("GET", "/characters/90000001/implants/")
        .with_status(403)
        .with_body(r#"{"error": "token scope missing"}"#)
        .create_async()
        .await;
    let cache = CacheService::in_memory();

    let service =
        CharacterDataService::new(&test.db, &test.esi_client, &cache, &StubStaticData::new());
    let clones = service.clones(90_000_001, "user-token").await?;

    assert!(clones.home_location.is_none());
    assert!(clones.active_implants.0.is_empty());

    Ok(())
}

/// Expect location resolution failure to degrade to an empty name, never an
/// error
#[tokio::test]
async fn location_failure_is_not_fatal() -> Result<(), TestError> {
    let mut test = TestBuilder::new()
        .with_table(entity::prelude::CharacterClones)
        .with_table(entity::prelude::CharacterImplants)
        .build()
        .await?;
    esi::with_authed_endpoint(
        &mut test.server,
        "/characters/90000001/clones/",
        "user-token",
        clone_body(),
        1,
    )
    .await;
    esi::with_authed_endpoint(
        &mut test.server,
        "/characters/90000001/implants/",
        "user-token",
        json!([]),
        1,
    )
    .await;
    test.server
        .mock("GET", "/universe/structures/1021975535893/")
        .with_status(403)
        .with_body(r#"{"error": "no docking access"}"#)
        .create_async()
        .await;
    // Station absent from the (empty) static catalog as well.
    let cache = CacheService::in_memory();

    let service =
        CharacterDataService::new(&test.db, &test.esi_client, &cache, &StubStaticData::new());
    let clones = service.clones(90_000_001, "user-token").await?;

    let home = clones.home_location.unwrap();
    assert_eq!(home.location_id, 60_003_760);
    assert_eq!(home.location_name, "");
    assert_eq!(home.location_type_id, 0);

    let jump_clone = &clones.jump_clones.0[0];
    assert_eq!(jump_clone.location.location_name, "");
    assert_eq!(jump_clone.location.location_type_id, 0);

    Ok(())
}
