//! Byte <-> base64 round trips. Tolerates empty input in both directions.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::PrivacyError;

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn from_base64(text: &str) -> Result<Vec<u8>, PrivacyError> {
    STANDARD.decode(text.as_bytes()).map_err(|_| PrivacyError::Crypto)
}
