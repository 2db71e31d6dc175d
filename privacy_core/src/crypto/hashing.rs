//! SHA-256 hashing over bytes or UTF-8 strings.

use sha2::{Digest, Sha256};

use super::encoding::to_base64;

/// Raw 32-byte SHA-256 digest of arbitrary bytes.
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 digest of a UTF-8 string.
pub fn sha256_str(data: &str) -> [u8; 32] {
    sha256_bytes(data.as_bytes())
}

/// Lowercase hex encoding of the SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_bytes(data))
}

/// Base64 encoding of the SHA-256 digest.
pub fn sha256_base64(data: &[u8]) -> String {
    to_base64(&sha256_bytes(data))
}
