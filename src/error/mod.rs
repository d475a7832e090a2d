//! Error types for the Heimdall core.
//!
//! This module provides an error handling system with specialized error types
//! for each domain the core touches (configuration, OAuth and token handling,
//! ESI, Discord, domain validation) plus infrastructure errors from the
//! database, cache, and scheduler. All errors use `thiserror` for ergonomic
//! definitions; the `retry` submodule classifies errors into retry strategies
//! for the retry executor.

pub mod auth;
pub mod config;
pub mod discord;
pub mod domain;
pub mod esi;
pub mod retry;

use thiserror::Error;

use crate::error::{
    auth::AuthError, config::ConfigError, discord::DiscordError, domain::DomainError,
    esi::EsiError,
};

/// Main error type for the Heimdall core.
///
/// Aggregates all domain-specific error types and external library errors into
/// a single unified error type. `thiserror`'s `#[from]` attribute enables
/// automatic conversion from underlying error types via the `?` operator.
///
/// # Error Categories
/// - Configuration errors (missing/invalid environment variables)
/// - Authentication errors (OAuth state, token exchange, token encryption)
/// - Domain errors (validation, conflicts, forbidden access, not-found)
/// - Upstream protocol errors (ESI, Discord)
/// - Infrastructure errors (database, cache, scheduler)
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or invalid environment variables).
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// Authentication error (OAuth state, token exchange, token encryption).
    #[error(transparent)]
    AuthError(#[from] AuthError),
    /// Domain error (validation, conflict, forbidden, not-found).
    #[error(transparent)]
    DomainError(#[from] DomainError),
    /// ESI upstream error (HTTP status, transport, decode).
    #[error(transparent)]
    EsiError(#[from] EsiError),
    /// Discord upstream error, classified by HTTP status.
    #[error(transparent)]
    DiscordError(#[from] DiscordError),
    /// Parse error (failed to parse a value from string or other format).
    #[error("Failed to parse value: {0:?}")]
    ParseError(String),
    /// Internal error indicating a bug in Heimdall's code.
    ///
    /// This error should never occur in normal operation and indicates a
    /// programming error that needs to be reported as a GitHub issue.
    #[error("Internal error with Heimdall's code, please open a GitHub issue as this indicates a bug: {0:?}")]
    InternalError(String),
    /// Database error (query failures, connection issues, constraint violations).
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),
    /// Cache error (Valkey connection, command execution).
    #[error(transparent)]
    CacheError(#[from] fred::prelude::Error),
    /// Cron scheduler error (job registration, scheduler startup).
    #[error(transparent)]
    SchedulerError(#[from] tokio_cron_scheduler::JobSchedulerError),
}
