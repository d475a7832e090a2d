//! ESI constants and identifier validation.

/// Maximum number of character IDs accepted by ESI's bulk affiliation
/// endpoint per request.
pub const ESI_AFFILIATION_REQUEST_LIMIT: usize = 1000;

/// Location IDs below this value are NPC stations resolvable through static
/// data; IDs at or above it are player-owned structures that require an
/// authenticated ESI lookup.
pub const STRUCTURE_ID_THRESHOLD: i64 = 100_000_000;

/// Lowest character ID in ESI's allocated range.
const CHARACTER_ID_MIN: i32 = 90_000_000;

/// Checks whether an ID falls inside ESI's allocated character ID range.
///
/// An invalid ID in a bulk affiliation request fails the entire batch, so the
/// reconciler filters IDs through this before dispatch.
pub fn is_valid_character_id(id: i32) -> bool {
    id >= CHARACTER_ID_MIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ids_in_allocated_range() {
        assert!(is_valid_character_id(90_000_001));
        assert!(is_valid_character_id(2_119_123_456));
    }

    #[test]
    fn rejects_ids_below_range() {
        assert!(!is_valid_character_id(0));
        assert!(!is_valid_character_id(-5));
        assert!(!is_valid_character_id(1_000_000));
    }
}
