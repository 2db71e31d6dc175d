//! Ed25519 signing, used to authenticate registration and profile-altering
//! requests. A dedicated signing keypair, separate from the X25519
//! agreement keypair used for ECDH.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use super::encoding::{from_base64, to_base64};
use crate::error::PrivacyError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningKeyPair {
    pub public_key: String,
    pub private_key: String,
}

/// Generates a fresh Ed25519 signing keypair.
pub fn generate_keypair() -> SigningKeyPair {
    let signing_key = SigningKey::generate(&mut OsRng);
    SigningKeyPair {
        public_key: to_base64(signing_key.verifying_key().as_bytes()),
        private_key: to_base64(&signing_key.to_bytes()),
    }
}

/// Signs `message` with the signing keypair's private key (base64-encoded
/// 32-byte seed). Returns the base64-encoded 64-byte signature.
pub fn sign(private_key: &str, message: &[u8]) -> Result<String, PrivacyError> {
    let sk = decode_signing_key(private_key)?;
    let signature = sk.sign(message);
    Ok(to_base64(&signature.to_bytes()))
}

/// Verifies `signature` over `message` against `public_key`. Any failure
/// (malformed key, malformed signature, mismatch) is the single opaque
/// [`PrivacyError::Crypto`] signal.
pub fn verify(public_key: &str, message: &[u8], signature: &str) -> Result<(), PrivacyError> {
    let vk = decode_verifying_key(public_key)?;
    let sig_bytes = from_base64(signature)?;
    let sig_arr: [u8; 64] = sig_bytes.try_into().map_err(|_| PrivacyError::Crypto)?;
    let sig = ed25519_dalek::Signature::from_bytes(&sig_arr);
    vk.verify(message, &sig).map_err(|_| PrivacyError::Crypto)
}

fn decode_signing_key(private_key: &str) -> Result<SigningKey, PrivacyError> {
    let bytes = from_base64(private_key)?;
    let arr: [u8; 32] = bytes.try_into().map_err(|_| PrivacyError::Crypto)?;
    Ok(SigningKey::from_bytes(&arr))
}

fn decode_verifying_key(public_key: &str) -> Result<VerifyingKey, PrivacyError> {
    let bytes = from_base64(public_key)?;
    let arr: [u8; 32] = bytes.try_into().map_err(|_| PrivacyError::Crypto)?;
    VerifyingKey::from_bytes(&arr).map_err(|_| PrivacyError::Crypto)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let kp = generate_keypair();
        let sig = sign(&kp.private_key, b"hello").unwrap();
        assert!(verify(&kp.public_key, b"hello", &sig).is_ok());
    }

    #[test]
    fn wrong_message_fails() {
        let kp = generate_keypair();
        let sig = sign(&kp.private_key, b"hello").unwrap();
        assert!(verify(&kp.public_key, b"goodbye", &sig).is_err());
    }

    #[test]
    fn wrong_key_fails() {
        let kp1 = generate_keypair();
        let kp2 = generate_keypair();
        let sig = sign(&kp1.private_key, b"hello").unwrap();
        assert!(verify(&kp2.public_key, b"hello", &sig).is_err());
    }
}
