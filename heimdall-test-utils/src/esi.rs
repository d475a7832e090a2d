//! Canned mockito endpoints for ESI.

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;

/// Mounts the bulk affiliation endpoint returning the given records.
pub async fn with_affiliation_endpoint(
    server: &mut ServerGuard,
    records: serde_json::Value,
    hits: usize,
) -> Mock {
    server
        .mock("POST", "/characters/affiliation/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(records.to_string())
        .expect(hits)
        .create_async()
        .await
}

/// Mounts a failing affiliation endpoint.
pub async fn with_affiliation_error(server: &mut ServerGuard, status: usize) -> Mock {
    server
        .mock("POST", "/characters/affiliation/")
        .with_status(status)
        .with_body(r#"{"error": "upstream failure"}"#)
        .create_async()
        .await
}

/// Mounts a public character sheet endpoint.
pub async fn with_character_endpoint(
    server: &mut ServerGuard,
    character_id: i32,
    name: &str,
    corporation_id: i32,
    hits: usize,
) -> Mock {
    server
        .mock("GET", format!("/characters/{character_id}/").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "name": name,
                "corporation_id": corporation_id,
                "birthday": "2015-03-24T11:37:00Z",
                "security_status": 0.5,
                "race_id": 1,
                "bloodline_id": 3,
                "gender": "female"
            })
            .to_string(),
        )
        .expect(hits)
        .create_async()
        .await
}

/// Mounts a corporation sheet endpoint with the given ticker.
pub async fn with_corporation_endpoint(
    server: &mut ServerGuard,
    corporation_id: i32,
    name: &str,
    ticker: &str,
    hits: usize,
) -> Mock {
    server
        .mock("GET", format!("/corporations/{corporation_id}/").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "name": name,
                "ticker": ticker,
                "member_count": 42
            })
            .to_string(),
        )
        .expect(hits)
        .create_async()
        .await
}

/// Mounts an authenticated character-scoped endpoint (clones, skills, …).
pub async fn with_authed_endpoint(
    server: &mut ServerGuard,
    path: &str,
    token: &str,
    body: serde_json::Value,
    hits: usize,
) -> Mock {
    server
        .mock("GET", path)
        .match_header("authorization", format!("Bearer {token}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(hits)
        .create_async()
        .await
}

/// Mounts a 404 for a character-scoped path.
pub async fn with_not_found(server: &mut ServerGuard, path: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(404)
        .with_body(r#"{"error": "not found"}"#)
        .create_async()
        .await
}

/// Matcher for any request body; re-exported for convenience.
pub fn any_body() -> Matcher {
    Matcher::Any
}
