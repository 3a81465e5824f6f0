use sha2::{Digest, Sha256};

/// Derive the storage partition key for a raw connection id.
///
/// SHA-256, hex-encoded: deterministic, fixed-length, and one-way, so the
/// raw id never has to be written to the database as a lookup key.
pub fn connection_key(raw_id: &str) -> String {
    hex::encode(Sha256::digest(raw_id.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_fixed_length() {
        let a = connection_key("conn-abc");
        let b = connection_key("conn-abc");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn distinct_inputs_distinct_keys() {
        assert_ne!(connection_key("conn-abc"), connection_key("conn-abd"));
        assert_ne!(connection_key(""), connection_key("conn-abc"));
    }

    #[test]
    fn digest_is_not_the_raw_id() {
        let raw = "conn-abc";
        assert_ne!(connection_key(raw), raw);
    }
}
