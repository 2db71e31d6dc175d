//! Unguessable identifier generation: 128 bits of randomness as lowercase hex,
//! optionally joined to a short string prefix with `-`.

use rand::RngCore;

/// Generates a fresh 128-bit random identifier, lowercase hex, optionally
/// prefixed (e.g. `random_id(Some("msg"))` -> `"msg-3af9...".to_string()`).
pub fn random_id(prefix: Option<&str>) -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    let hex = hex::encode(bytes);
    match prefix {
        Some(p) => format!("{p}-{hex}"),
        None => hex,
    }
}

/// Generates fresh random bytes of the given length, for nonces and the like.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_unguessable_and_well_formed() {
        let a = random_id(None);
        let b = random_id(None);
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn prefix_is_joined_with_dash() {
        let id = random_id(Some("msg"));
        assert!(id.starts_with("msg-"));
        assert_eq!(id.len(), "msg-".len() + 32);
    }
}
