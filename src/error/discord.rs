//! Discord upstream error types.
//!
//! The Discord client classifies every non-success HTTP outcome into one of
//! these variants: 401 → authentication, 403 → permission, 404 → not-found,
//! 429 → rate-limited, 5xx → transient server error. Rate limits and server
//! errors are retried inside the client and only surface here once the retry
//! budget is exhausted.

use thiserror::Error;

/// Error raised by the Discord client.
#[derive(Error, Debug)]
pub enum DiscordError {
    /// The bot token or user access token was rejected (HTTP 401).
    ///
    /// A 401 on a bot-token request aborts the enclosing guild sync since
    /// every subsequent request would fail identically; a 401 on a user token
    /// only skips that user's auto-join.
    #[error("Discord rejected the supplied token (401) for {path}")]
    Auth {
        /// Request path, without the base URL.
        path: String,
    },

    /// The bot lacks a required capability in the guild (HTTP 403).
    #[error("Bot lacks a required permission (403) for {path}: {body}")]
    Permission {
        /// Request path, without the base URL.
        path: String,
        /// Response body, truncated for logging.
        body: String,
    },

    /// Guild, member, or role does not exist (HTTP 404).
    #[error("Discord resource not found (404) at {path}")]
    NotFound {
        /// Request path, without the base URL.
        path: String,
    },

    /// Rate limited (HTTP 429) and the in-client retry budget ran out.
    #[error("Rate limited on {path}; retry after {retry_after}s")]
    RateLimited {
        /// Request path, without the base URL.
        path: String,
        /// Delay demanded by the `Retry-After` header, in seconds.
        retry_after: f64,
    },

    /// Transient Discord server error (HTTP 5xx) after exhausting retries.
    #[error("Discord server error ({status}) on {path}")]
    Server {
        /// HTTP status code of the response.
        status: u16,
        /// Request path, without the base URL.
        path: String,
    },

    /// A status outside the classified set.
    #[error("Unexpected Discord status {status} on {path}: {body}")]
    Unexpected {
        /// HTTP status code of the response.
        status: u16,
        /// Request path, without the base URL.
        path: String,
        /// Response body, truncated for logging.
        body: String,
    },

    /// Transport-level failure (connection, timeout, TLS).
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// The response body could not be decoded into the expected shape.
    #[error("Failed to decode Discord response from {path}: {source}")]
    Decode {
        /// Request path, without the base URL.
        path: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl DiscordError {
    /// Whether the error is a 401 token rejection.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Whether the error is a 404 for the requested resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
