//! Domain error types with a stable taxonomy.
//!
//! Domain errors carry a stable tag so an HTTP layer can translate them into
//! status codes (400/403/404/409) without matching on message text.

use thiserror::Error;

/// Domain-level error raised by validation and business rules.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Input failed validation (bad id format, search string too short, …).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation conflicts with existing state, e.g. a second active
    /// role mapping for the same `(guild_id, group_id)` pair.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The authenticated caller may not access the requested resource, e.g.
    /// another user's clones or implants.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),
}

impl DomainError {
    /// Stable taxonomy tag for this error.
    ///
    /// The HTTP layer maps tags to status codes: `validation` → 400,
    /// `forbidden` → 403, `not_found` → 404, `conflict` → 409.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
        }
    }
}
