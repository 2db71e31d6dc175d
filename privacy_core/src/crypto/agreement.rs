//! X25519 key-agreement keypairs and ECDH shared-secret derivation.
//!
//! The raw 32-byte ECDH output is used directly as an AEAD key, with no HKDF
//! expansion step, keeping derivation observable and simple to test against.

use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey, StaticSecret};

use super::encoding::{from_base64, to_base64};
use crate::error::PrivacyError;

/// A freshly generated agreement keypair, each half base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementKeyPair {
    pub public_key: String,
    pub private_key: String,
}

/// Generates a fresh X25519 keypair. Private keys never enter any
/// persistent store controlled by the server.
pub fn generate_keypair() -> AgreementKeyPair {
    let secret = StaticSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&secret);
    AgreementKeyPair {
        public_key: to_base64(public.as_bytes()),
        private_key: to_base64(&secret.to_bytes()),
    }
}

/// Derives a 256-bit shared secret via X25519 ECDH between `my_private_key`
/// and `their_public_key` (both base64-encoded 32-byte values).
pub fn derive_shared_secret(
    my_private_key: &str,
    their_public_key: &str,
) -> Result<[u8; 32], PrivacyError> {
    let sk = decode_secret(my_private_key)?;
    let pk = decode_public(their_public_key)?;
    Ok(sk.diffie_hellman(&pk).to_bytes())
}

fn decode_secret(private_key: &str) -> Result<StaticSecret, PrivacyError> {
    let bytes = from_base64(private_key)?;
    let arr: [u8; 32] = bytes.try_into().map_err(|_| PrivacyError::Crypto)?;
    Ok(StaticSecret::from(arr))
}

fn decode_public(public_key: &str) -> Result<PublicKey, PrivacyError> {
    let bytes = from_base64(public_key)?;
    let arr: [u8; 32] = bytes.try_into().map_err(|_| PrivacyError::Crypto)?;
    Ok(PublicKey::from(arr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecdh_is_symmetric() {
        let alice = generate_keypair();
        let bob = generate_keypair();

        let alice_secret =
            derive_shared_secret(&alice.private_key, &bob.public_key).unwrap();
        let bob_secret = derive_shared_secret(&bob.private_key, &alice.public_key).unwrap();

        assert_eq!(alice_secret, bob_secret);
    }

    #[test]
    fn distinct_pairs_yield_distinct_secrets() {
        let alice = generate_keypair();
        let bob = generate_keypair();
        let carol = generate_keypair();

        let ab = derive_shared_secret(&alice.private_key, &bob.public_key).unwrap();
        let ac = derive_shared_secret(&alice.private_key, &carol.public_key).unwrap();
        assert_ne!(ab, ac);
    }

    #[test]
    fn malformed_key_is_opaque_crypto_failure() {
        let alice = generate_keypair();
        let err = derive_shared_secret(&alice.private_key, "not-base64!!").unwrap_err();
        assert_eq!(err, PrivacyError::Crypto);
    }
}
