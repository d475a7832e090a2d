//! Test environment builder.
//!
//! Builds an in-memory SQLite database with tables created from the entity
//! definitions, plus a mockito server that both upstream clients point at.

use mockito::{Server, ServerGuard};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait, Schema};

use heimdall::client::{discord::DiscordClient, esi::EsiClient};
use heimdall::util::crypto::TokenCipher;

use crate::constant::{TEST_CIPHER_SECRET, TEST_USER_AGENT};
use crate::error::TestError;

/// Assembled test environment.
pub struct TestSetup {
    pub db: DatabaseConnection,
    pub server: ServerGuard,
    pub esi_client: EsiClient,
    pub discord_client: DiscordClient,
    pub cipher: TokenCipher,
}

impl TestSetup {
    /// Base URL of the mock upstream server.
    pub fn upstream_url(&self) -> String {
        self.server.url()
    }
}

/// Builder collecting the tables a test needs before connecting.
#[derive(Default)]
pub struct TestBuilder {
    tables: Vec<sea_orm::sea_query::TableCreateStatement>,
}

impl TestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table to create from its entity definition.
    pub fn with_table<E: EntityTrait>(mut self, entity: E) -> Self {
        let schema = Schema::new(DbBackend::Sqlite);
        self.tables.push(schema.create_table_from_entity(entity));
        self
    }

    /// Registers every table in the workspace schema.
    pub fn with_all_tables(self) -> Self {
        self.with_table(entity::prelude::Character)
            .with_table(entity::prelude::CharacterAttributes)
            .with_table(entity::prelude::CharacterSkills)
            .with_table(entity::prelude::CharacterSkillQueue)
            .with_table(entity::prelude::CharacterCorporationHistory)
            .with_table(entity::prelude::CharacterClones)
            .with_table(entity::prelude::CharacterImplants)
            .with_table(entity::prelude::DiscordUser)
            .with_table(entity::prelude::DiscordGuildConfig)
            .with_table(entity::prelude::DiscordRoleMapping)
            .with_table(entity::prelude::DiscordSyncStatus)
            .with_table(entity::prelude::DiscordOauthState)
            .with_table(entity::prelude::UserGroupMembership)
            .with_table(entity::prelude::UserProfile)
    }

    /// Connects the database, creates the registered tables, and starts the
    /// mock upstream server with both clients wired to it.
    pub async fn build(self) -> Result<TestSetup, TestError> {
        let db = Database::connect("sqlite::memory:").await?;

        let backend = db.get_database_backend();
        for table in &self.tables {
            db.execute_raw(backend.build(table)).await?;
        }

        let server = Server::new_async().await;
        let esi_client = EsiClient::with_base_url(TEST_USER_AGENT, &server.url())?;
        let discord_client = DiscordClient::with_base_url(TEST_USER_AGENT, &server.url())?;
        let cipher = TokenCipher::from_secret(TEST_CIPHER_SECRET)?;

        Ok(TestSetup {
            db,
            server,
            esi_client,
            discord_client,
            cipher,
        })
    }
}
