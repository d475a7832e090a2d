//! ESI upstream error types.

use thiserror::Error;

/// Error raised by the ESI client.
///
/// HTTP error responses keep their status code so the retry classifier can
/// distinguish transient server errors (5xx, retried with backoff) from
/// client errors (4xx, failed permanently).
#[derive(Error, Debug)]
pub enum EsiError {
    /// ESI responded with a non-success HTTP status.
    #[error("ESI request to {path} failed with status {status}: {body}")]
    Status {
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
    #[error("Failed to decode ESI response from {path}: {source}")]
    Decode {
        /// Request path, without the base URL.
        path: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl EsiError {
    /// HTTP status of the error response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            Self::Decode { .. } => None,
        }
    }

    /// Whether this error is an upstream 404 for the requested entity.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
