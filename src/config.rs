//! Server configuration management.
//!
//! This module provides the `Config` struct for loading and validating
//! configuration from environment variables. Configuration covers database and
//! Valkey connection strings, Discord OAuth credentials, the token encryption
//! secret, and affiliation worker pool sizing. All required environment
//! variables must be present or startup fails with a descriptive error.

use crate::error::{config::ConfigError, Error};

/// Default number of parallel workers for the affiliation reconciler.
///
/// One worker is a safe default for small deployments; production deployments
/// have historically run three.
pub const DEFAULT_AFFILIATION_WORKERS: usize = 1;

/// Server configuration loaded from environment variables.
///
/// # Environment Variables
/// - `CONTACT_EMAIL` - Contact email for user agent identification (required by ESI)
/// - `DATABASE_URL` - PostgreSQL database connection string
/// - `VALKEY_URL` - Redis/Valkey connection string for the entity cache
/// - `DISCORD_CLIENT_ID` - Discord OAuth application client ID
/// - `DISCORD_CLIENT_SECRET` - Discord OAuth application client secret
/// - `DISCORD_REDIRECT_URI` - OAuth callback URL registered with Discord
/// - `TOKEN_CIPHER_SECRET` - Secret the at-rest token encryption key is derived from
/// - `AFFILIATION_WORKERS` - Optional affiliation worker pool size (default 1)
pub struct Config {
    /// Contact email address for user agent identification.
    ///
    /// Used in the user agent string sent with ESI requests. Required by ESI
    /// to contact developers in case of API abuse or issues.
    pub contact_email: String,

    /// PostgreSQL database connection string.
    pub database_url: String,

    /// Redis/Valkey connection string for the entity cache.
    pub valkey_url: String,

    /// Discord OAuth application client ID.
    pub discord_client_id: String,

    /// Discord OAuth application client secret.
    ///
    /// Should be kept secure and never committed to version control.
    pub discord_client_secret: String,

    /// OAuth callback URL registered with the Discord application.
    pub discord_redirect_uri: String,

    /// Secret used to derive the AEAD key encrypting stored tokens.
    pub token_cipher_secret: String,

    /// User agent string for upstream requests.
    ///
    /// Automatically generated from package metadata and contact email,
    /// following ESI's recommended `AppName/Version (Contact; +Repository)`
    /// format.
    pub user_agent: String,

    /// Number of parallel workers in the affiliation reconciler pool.
    pub affiliation_workers: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Reads and validates all required environment variables, constructing a
    /// `Config` instance. The user agent string is generated from package
    /// metadata and the contact email.
    ///
    /// # Returns
    /// - `Ok(Config)` - Configuration successfully loaded and validated
    /// - `Err(Error::ConfigError(ConfigError::MissingEnvVar))` - Required environment variable not set
    /// - `Err(Error::ConfigError(ConfigError::InvalidEnvValue))` - Environment variable has invalid format
    pub fn from_env() -> Result<Self, Error> {
        let contact_email = std::env::var("CONTACT_EMAIL")
            .map_err(|_| ConfigError::MissingEnvVar("CONTACT_EMAIL".to_string()))?;
        let user_agent = format!(
            "{}/{} ({}; +{})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            contact_email,
            env!("CARGO_PKG_REPOSITORY")
        );

        let affiliation_workers = match std::env::var("AFFILIATION_WORKERS") {
            Ok(value) => value.parse().map_err(|e| ConfigError::InvalidEnvValue {
                var: "AFFILIATION_WORKERS".to_string(),
                reason: format!("must be a valid number: {}", e),
            })?,
            Err(_) => DEFAULT_AFFILIATION_WORKERS,
        };

        Ok(Self {
            contact_email,
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?,
            valkey_url: std::env::var("VALKEY_URL")
                .map_err(|_| ConfigError::MissingEnvVar("VALKEY_URL".to_string()))?,
            discord_client_id: std::env::var("DISCORD_CLIENT_ID")
                .map_err(|_| ConfigError::MissingEnvVar("DISCORD_CLIENT_ID".to_string()))?,
            discord_client_secret: std::env::var("DISCORD_CLIENT_SECRET")
                .map_err(|_| ConfigError::MissingEnvVar("DISCORD_CLIENT_SECRET".to_string()))?,
            discord_redirect_uri: std::env::var("DISCORD_REDIRECT_URI")
                .map_err(|_| ConfigError::MissingEnvVar("DISCORD_REDIRECT_URI".to_string()))?,
            token_cipher_secret: std::env::var("TOKEN_CIPHER_SECRET")
                .map_err(|_| ConfigError::MissingEnvVar("TOKEN_CIPHER_SECRET".to_string()))?,
            user_agent,
            affiliation_workers,
        })
    }
}
