//! UUID v7 utilities for time-ordered identifiers.
//!
//! All horizon rows use UUIDv7 primary keys: the embedded millisecond
//! timestamp makes `ORDER BY id` chronological and keeps b-tree inserts
//! append-mostly.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Extract the embedded millisecond timestamp from a UUIDv7.
///
/// Returns `None` for non-v7 UUIDs.
pub fn extract_millis(id: &Uuid) -> Option<u64> {
    if id.get_version_num() != 7 {
        return None;
    }
    let bytes = id.as_bytes();
    let mut millis: u64 = 0;
    for b in &bytes[..6] {
        millis = (millis << 8) | *b as u64;
    }
    Some(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_v7_is_version_7() {
        assert_eq!(new_v7().get_version_num(), 7);
    }

    #[test]
    fn test_v7_ids_are_time_ordered() {
        let a = new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_v7();
        assert!(a < b);
    }

    #[test]
    fn test_extract_millis_rejects_v4() {
        assert_eq!(extract_millis(&Uuid::new_v4()), None);
    }

    #[test]
    fn test_extract_millis_round_trip() {
        let before = chrono::Utc::now().timestamp_millis() as u64;
        let id = new_v7();
        let after = chrono::Utc::now().timestamp_millis() as u64;
        let millis = extract_millis(&id).unwrap();
        assert!(millis >= before && millis <= after);
    }
}
