//! EVE Online ESI client.
//!
//! Thin typed wrapper over ESI's REST endpoints. Authenticated endpoints take
//! the caller's bearer token; public endpoints take none. Responses decode
//! through the tolerant DTOs in [`crate::model::esi`]. The client itself does
//! not retry; callers run through the retry executor, which classifies
//! [`EsiError`] by status.

use serde::de::DeserializeOwned;

use crate::error::esi::EsiError;
use crate::model::esi::{
    CharacterAffiliation, CharacterAttributes, CharacterClones, CharacterFatigue,
    CharacterLocation, CharacterOnline, CharacterPublicInfo, CharacterShip, CharacterSkills,
    Corporation, CorporationHistoryEntry, SkillQueueEntry, Structure,
};

/// Production ESI base URL.
pub const ESI_BASE_URL: &str = "https://esi.evetech.net/latest";

const REQUEST_TIMEOUT_SECS: u64 = 30;
const ERROR_BODY_LIMIT: usize = 512;

/// ESI API client.
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection
/// pool across clones.
#[derive(Clone, Debug)]
pub struct EsiClient {
    http: reqwest::Client,
    base_url: String,
}

impl EsiClient {
    /// Creates a client against the production ESI base URL.
    ///
    /// # Arguments
    /// - `user_agent` - User agent carrying contact information, required by ESI's guidelines
    pub fn new(user_agent: &str) -> Result<Self, EsiError> {
        Self::with_base_url(user_agent, ESI_BASE_URL)
    }

    /// Creates a client against a custom base URL (mock servers in tests).
    pub fn with_base_url(user_agent: &str, base_url: &str) -> Result<Self, EsiError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> Result<T, EsiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let mut body = body;
            body.truncate(ERROR_BODY_LIMIT);
            return Err(EsiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| EsiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, EsiError> {
        let mut request = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        Self::decode(response, path).await
    }

    /// Resolves (corporation, alliance, faction) for up to 1000 characters in
    /// one request.
    ///
    /// A character unknown to ESI is silently omitted from the response
    /// array; the reconciler accounts for omissions as skipped.
    pub async fn character_affiliations(
        &self,
        character_ids: &[i32],
    ) -> Result<Vec<CharacterAffiliation>, EsiError> {
        let path = "/characters/affiliation/";
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(&character_ids)
            .send()
            .await?;

        Self::decode(response, path).await
    }

    /// Public character sheet.
    pub async fn character(&self, character_id: i32) -> Result<CharacterPublicInfo, EsiError> {
        self.get_json(&format!("/characters/{character_id}/"), None)
            .await
    }

    /// Neural attributes. Requires `esi-skills.read_skills.v1`.
    pub async fn character_attributes(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<CharacterAttributes, EsiError> {
        self.get_json(&format!("/characters/{character_id}/attributes/"), Some(token))
            .await
    }

    /// Trained skills. Requires `esi-skills.read_skills.v1`.
    pub async fn character_skills(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<CharacterSkills, EsiError> {
        self.get_json(&format!("/characters/{character_id}/skills/"), Some(token))
            .await
    }

    /// Training queue. Requires `esi-skills.read_skillqueue.v1`.
    pub async fn character_skill_queue(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<Vec<SkillQueueEntry>, EsiError> {
        self.get_json(&format!("/characters/{character_id}/skillqueue/"), Some(token))
            .await
    }

    /// Corporation employment history (public).
    pub async fn character_corporation_history(
        &self,
        character_id: i32,
    ) -> Result<Vec<CorporationHistoryEntry>, EsiError> {
        self.get_json(&format!("/characters/{character_id}/corporationhistory/"), None)
            .await
    }

    /// Clone state. Requires `esi-clones.read_clones.v1`.
    pub async fn character_clones(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<CharacterClones, EsiError> {
        self.get_json(&format!("/characters/{character_id}/clones/"), Some(token))
            .await
    }

    /// Active implants. Requires `esi-clones.read_implants.v1`.
    pub async fn character_implants(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<Vec<i32>, EsiError> {
        // Implant type ids may arrive as floats like every other ESI number;
        // decode through a raw value list and coerce.
        let path = format!("/characters/{character_id}/implants/");
        let values: Vec<serde_json::Value> = self.get_json(&path, Some(token)).await?;

        values
            .iter()
            .map(|value| {
                value
                    .as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i32)
                    .ok_or_else(|| EsiError::Decode {
                        path: path.clone(),
                        source: serde::de::Error::custom("implant id is not a finite number"),
                    })
            })
            .collect()
    }

    /// Current location. Requires `esi-location.read_location.v1`.
    pub async fn character_location(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<CharacterLocation, EsiError> {
        self.get_json(&format!("/characters/{character_id}/location/"), Some(token))
            .await
    }

    /// Online status. Requires `esi-location.read_online.v1`.
    pub async fn character_online(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<CharacterOnline, EsiError> {
        self.get_json(&format!("/characters/{character_id}/online/"), Some(token))
            .await
    }

    /// Current ship. Requires `esi-location.read_ship_type.v1`.
    pub async fn character_ship(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<CharacterShip, EsiError> {
        self.get_json(&format!("/characters/{character_id}/ship/"), Some(token))
            .await
    }

    /// Wallet balance in ISK. Requires `esi-wallet.read_character_wallet.v1`.
    pub async fn character_wallet(&self, character_id: i32, token: &str) -> Result<f64, EsiError> {
        self.get_json(&format!("/characters/{character_id}/wallet/"), Some(token))
            .await
    }

    /// Jump fatigue timers. Requires `esi-characters.read_fatigue.v1`.
    pub async fn character_fatigue(
        &self,
        character_id: i32,
        token: &str,
    ) -> Result<CharacterFatigue, EsiError> {
        self.get_json(&format!("/characters/{character_id}/fatigue/"), Some(token))
            .await
    }

    /// Player-owned structure lookup; requires a token with docking access.
    pub async fn structure(&self, structure_id: i64, token: &str) -> Result<Structure, EsiError> {
        self.get_json(&format!("/universe/structures/{structure_id}/"), Some(token))
            .await
    }

    /// Public corporation sheet.
    pub async fn corporation(&self, corporation_id: i32) -> Result<Corporation, EsiError> {
        self.get_json(&format!("/corporations/{corporation_id}/"), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_USER_AGENT: &str = "heimdall-tests/0.0.0 (tests@example.com)";

    /// Expect the affiliation endpoint to POST the id array and decode
    /// mixed-number records
    #[tokio::test]
    async fn posts_affiliation_batches() {
        let mut server = mockito::Server::new_async().await;
        let endpoint = server
            .mock("POST", "/characters/affiliation/")
            .match_body(mockito::Matcher::Json(serde_json::json!([
                90000001, 90000002
            ])))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"character_id": 90000001, "corporation_id": 98000001.0},
                    {"character_id": 90000002, "corporation_id": 98000002, "alliance_id": 99000001}
                ]"#,
            )
            .create_async()
            .await;

        let client = EsiClient::with_base_url(TEST_USER_AGENT, &server.url()).unwrap();
        let affiliations = client
            .character_affiliations(&[90_000_001, 90_000_002])
            .await
            .unwrap();

        endpoint.assert_async().await;
        assert_eq!(affiliations.len(), 2);
        assert_eq!(affiliations[0].corporation_id, 98_000_001);
        assert_eq!(affiliations[1].alliance_id, Some(99_000_001));
    }

    /// Expect authenticated reads to send the bearer token
    #[tokio::test]
    async fn sends_bearer_token_on_authenticated_reads() {
        let mut server = mockito::Server::new_async().await;
        let endpoint = server
            .mock("GET", "/characters/90000001/clones/")
            .match_header("authorization", "Bearer user-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"home_location": null, "jump_clones": []}"#)
            .create_async()
            .await;

        let client = EsiClient::with_base_url(TEST_USER_AGENT, &server.url()).unwrap();
        let clones = client
            .character_clones(90_000_001, "user-token")
            .await
            .unwrap();

        endpoint.assert_async().await;
        assert!(clones.jump_clones.is_empty());
    }

    /// Expect a 404 to surface as a status error with is_not_found set
    #[tokio::test]
    async fn surfaces_not_found_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/characters/90000009/")
            .with_status(404)
            .with_body(r#"{"error": "Character not found"}"#)
            .create_async()
            .await;

        let client = EsiClient::with_base_url(TEST_USER_AGENT, &server.url()).unwrap();
        let error = client.character(90_000_009).await.unwrap_err();

        assert!(error.is_not_found());
    }

    /// Expect the wallet endpoint to decode a bare JSON number
    #[tokio::test]
    async fn decodes_wallet_balance() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/characters/90000001/wallet/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("29500000.01")
            .create_async()
            .await;

        let client = EsiClient::with_base_url(TEST_USER_AGENT, &server.url()).unwrap();
        let balance = client
            .character_wallet(90_000_001, "user-token")
            .await
            .unwrap();

        assert!((balance - 29_500_000.01).abs() < f64::EPSILON);
    }
}
