//! Configuration error types.

use thiserror::Error;

/// Configuration loading and validation errors.
///
/// Raised during startup when required environment variables are missing or
/// malformed. These errors are never retried; the process exits with the
/// offending variable named.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Required environment variable {0} is not set")]
    MissingEnvVar(String),

    /// An environment variable is set but its value is invalid.
    #[error("Environment variable {var} has an invalid value: {reason}")]
    InvalidEnvValue {
        /// Name of the offending environment variable.
        var: String,
        /// Why the value was rejected.
        reason: String,
    },
}
