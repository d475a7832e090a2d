//! Shared test constants.

pub const TEST_USER_AGENT: &str = "heimdall-tests/0.0.0 (tests@example.com)";
pub const TEST_DISCORD_CLIENT_ID: &str = "test-discord-client-id";
pub const TEST_DISCORD_CLIENT_SECRET: &str = "test-discord-client-secret";
pub const TEST_DISCORD_REDIRECT_URI: &str = "http://localhost:8080/auth/discord/callback";
pub const TEST_CIPHER_SECRET: &str = "test-token-cipher-secret";
pub const TEST_BOT_TOKEN: &str = "test-bot-token";
