//! Error retry strategy determination.
//!
//! This module defines retry strategies for different error types, allowing
//! the retry executor to distinguish between transient errors (retried with
//! exponential backoff) and permanent errors (failed immediately). This is
//! crucial for background jobs and service operations that interact with ESI,
//! Discord, the database, and the cache.

use sea_orm::DbErr;

use super::{discord::DiscordError, esi::EsiError, Error};

/// Strategy for handling errors in a retry context.
///
/// Determines whether an operation should be retried with exponential backoff
/// or should fail permanently.
pub enum ErrorRetryStrategy {
    /// Retry the operation with exponential backoff.
    ///
    /// Used for transient errors that may resolve themselves, such as:
    /// - Upstream server errors (500-level responses)
    /// - Rate limits that outlived the in-client retry budget
    /// - Network/connection issues
    /// - Database connection acquisition failures
    /// - Cache connection errors
    Retry,

    /// Fail permanently without retry.
    ///
    /// Used for errors that won't resolve with retry, such as:
    /// - Client errors (400-level responses indicating bad requests)
    /// - Configuration errors
    /// - Parse errors
    /// - Data constraint violations
    /// - Programming bugs (internal errors)
    Fail,
}

impl Error {
    /// Determines the appropriate retry strategy for this error.
    ///
    /// Analyzes the error type to decide whether the operation should be
    /// retried with exponential backoff or should fail immediately.
    ///
    /// # Returns
    /// - `ErrorRetryStrategy::Retry` - Operation should be retried with exponential backoff
    /// - `ErrorRetryStrategy::Fail` - Operation should fail permanently without retry
    pub fn to_retry_strategy(&self) -> ErrorRetryStrategy {
        match self {
            Self::EsiError(esi_error) => match esi_error {
                // 429 and 5xx are transient: the error-limit window resets
                // or ESI recovers. Other 4xx means we are making an invalid
                // request and retrying won't help.
                EsiError::Status { status, .. } => match status {
                    429 => ErrorRetryStrategy::Retry,
                    500..=599 => ErrorRetryStrategy::Retry,
                    _ => ErrorRetryStrategy::Fail,
                },
                EsiError::Request(_) => ErrorRetryStrategy::Retry,
                EsiError::Decode { .. } => ErrorRetryStrategy::Fail,
            },

            Self::DiscordError(discord_error) => match discord_error {
                // The client already retried 429s and 5xxs internally; at this
                // level one more backoff round is still worthwhile since the
                // condition is transient by definition.
                DiscordError::RateLimited { .. } => ErrorRetryStrategy::Retry,
                DiscordError::Server { .. } => ErrorRetryStrategy::Retry,
                DiscordError::Request(_) => ErrorRetryStrategy::Retry,

                // Auth, permission, not-found, and decode failures are stable
                // conditions a retry cannot fix.
                _ => ErrorRetryStrategy::Fail,
            },

            Self::DbErr(db_err) => match db_err {
                // Connection acquisition and connection errors are transient;
                // the pool or server may recover.
                DbErr::ConnectionAcquire(_) => ErrorRetryStrategy::Retry,
                DbErr::Conn(_) => ErrorRetryStrategy::Retry,

                // All other database errors (query errors, constraint
                // violations, type conversion) indicate bugs or data issues
                // that won't resolve with retry.
                _ => ErrorRetryStrategy::Fail,
            },

            // Cache errors are typically transient connection/command failures.
            Self::CacheError(_) => ErrorRetryStrategy::Retry,

            // Configuration errors - permanent (missing/invalid env vars).
            Self::ConfigError(_) => ErrorRetryStrategy::Fail,

            // Auth errors - permanent (invalid state, bad grant, bad payload).
            Self::AuthError(_) => ErrorRetryStrategy::Fail,

            // Domain errors - permanent (validation, conflict, forbidden).
            Self::DomainError(_) => ErrorRetryStrategy::Fail,

            // Parse errors - permanent (malformed data that won't change).
            Self::ParseError(_) => ErrorRetryStrategy::Fail,

            // Internal errors - permanent (bugs in Heimdall's code).
            Self::InternalError(_) => ErrorRetryStrategy::Fail,

            // Job scheduler errors - permanent (invalid cron, config issues).
            Self::SchedulerError(_) => ErrorRetryStrategy::Fail,
        }
    }
}
