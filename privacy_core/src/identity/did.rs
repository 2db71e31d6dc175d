//! DID string construction, parsing, and validation.
//!
//! Grammar: `did:moltbook:[a-f0-9]{32}`, where the identifier is the first 32
//! lowercase hex characters of SHA-256(agreement public key).

use crate::crypto::hashing::sha256_hex;
use crate::error::PrivacyError;

pub const DID_METHOD: &str = "moltbook";

/// Derives a DID deterministically from an agent's agreement public key
/// (base64 text, hashed as-is — the DID does not depend on key decoding).
pub fn derive_did(agreement_public_key: &str) -> String {
    let digest = sha256_hex(agreement_public_key.as_bytes());
    format!("did:{DID_METHOD}:{}", &digest[..32])
}

/// Splits a DID into (method, identifier). Requires exactly three
/// colon-separated parts with literal prefix `did`.
pub fn parse_did(did: &str) -> Result<(String, String), PrivacyError> {
    let parts: Vec<&str> = did.split(':').collect();
    if parts.len() != 3 || parts[0] != "did" {
        return Err(PrivacyError::Validation(format!("malformed DID: {did}")));
    }
    Ok((parts[1].to_string(), parts[2].to_string()))
}

/// Validates that `did` parses, uses the `moltbook` method, and has a
/// 32-character lowercase-hex identifier.
pub fn validate_did(did: &str) -> Result<(), PrivacyError> {
    let (method, identifier) = parse_did(did)?;
    if method != DID_METHOD {
        return Err(PrivacyError::Validation(format!(
            "unsupported DID method: {method}"
        )));
    }
    if !is_hex32(&identifier) {
        return Err(PrivacyError::Validation(format!(
            "malformed DID identifier: {identifier}"
        )));
    }
    Ok(())
}

fn is_hex32(identifier: &str) -> bool {
    identifier.len() == 32
        && identifier
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
