//! AES-256-GCM authenticated encryption, channel-key generation, and
//! channel-key wrapping under a pairwise ECDH secret.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use serde::{Deserialize, Serialize};

use super::encoding::{from_base64, to_base64};
use super::ident::random_bytes;
use crate::error::PrivacyError;

pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

/// Fresh 256-bit symmetric channel key.
pub fn generate_channel_key() -> [u8; KEY_LEN] {
    let bytes = random_bytes(KEY_LEN);
    bytes.try_into().expect("random_bytes(32) is 32 bytes")
}

/// Encrypts `plaintext` under `key` with a fresh random 96-bit nonce.
/// The integrity tag is embedded in the returned ciphertext.
pub fn encrypt(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_LEN]), PrivacyError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce_bytes: [u8; NONCE_LEN] = random_bytes(NONCE_LEN)
        .try_into()
        .expect("random_bytes(12) is 12 bytes");
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| PrivacyError::Crypto)?;
    Ok((ciphertext, nonce_bytes))
}

/// Decrypts `ciphertext` under `key` and `nonce`. Any failure (wrong key,
/// tampered ciphertext, wrong nonce) surfaces as the single opaque
/// [`PrivacyError::Crypto`] signal.
pub fn decrypt(
    key: &[u8; KEY_LEN],
    ciphertext: &[u8],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>, PrivacyError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| PrivacyError::Crypto)
}

/// A channel key encrypted under a recipient-specific shared secret. Opaque
/// to the server: it is stored and forwarded verbatim, never inspected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WrappedKey {
    pub ciphertext_b64: String,
    pub nonce_b64: String,
}

/// Wraps `channel_key` under `shared_secret` (the output of
/// [`super::agreement::derive_shared_secret`]) for exactly one recipient.
pub fn wrap_channel_key(
    shared_secret: &[u8; KEY_LEN],
    channel_key: &[u8; KEY_LEN],
) -> Result<WrappedKey, PrivacyError> {
    let (ciphertext, nonce) = encrypt(shared_secret, channel_key)?;
    Ok(WrappedKey {
        ciphertext_b64: to_base64(&ciphertext),
        nonce_b64: to_base64(&nonce),
    })
}

/// Inverse of [`wrap_channel_key`]: only the holder of the matching
/// `shared_secret` can recover the channel key.
pub fn unwrap_channel_key(
    shared_secret: &[u8; KEY_LEN],
    wrapped: &WrappedKey,
) -> Result<[u8; KEY_LEN], PrivacyError> {
    let ciphertext = from_base64(&wrapped.ciphertext_b64)?;
    let nonce_bytes = from_base64(&wrapped.nonce_b64)?;
    let nonce: [u8; NONCE_LEN] = nonce_bytes.try_into().map_err(|_| PrivacyError::Crypto)?;
    let plaintext = decrypt(shared_secret, &ciphertext, &nonce)?;
    plaintext.try_into().map_err(|_| PrivacyError::Crypto)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = generate_channel_key();
        let plaintext = b"hello, channel";
        let (ciphertext, nonce) = encrypt(&key, plaintext).unwrap();
        let decrypted = decrypt(&key, &ciphertext, &nonce).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let key1 = generate_channel_key();
        let key2 = generate_channel_key();
        let (ciphertext, nonce) = encrypt(&key1, b"secret").unwrap();
        assert!(decrypt(&key2, &ciphertext, &nonce).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = generate_channel_key();
        let (mut ciphertext, nonce) = encrypt(&key, b"secret").unwrap();
        ciphertext[0] ^= 0xFF;
        assert!(decrypt(&key, &ciphertext, &nonce).is_err());
    }

    #[test]
    fn nonces_are_random_per_message() {
        let key = generate_channel_key();
        let (_, n1) = encrypt(&key, b"a").unwrap();
        let (_, n2) = encrypt(&key, b"a").unwrap();
        assert_ne!(n1, n2);
    }

    #[test]
    fn wrap_unwrap_roundtrip() {
        let shared_secret = generate_channel_key();
        let channel_key = generate_channel_key();
        let wrapped = wrap_channel_key(&shared_secret, &channel_key).unwrap();
        let unwrapped = unwrap_channel_key(&shared_secret, &wrapped).unwrap();
        assert_eq!(unwrapped, channel_key);
    }

    #[test]
    fn unwrap_with_wrong_secret_fails() {
        let shared_secret = generate_channel_key();
        let other_secret = generate_channel_key();
        let channel_key = generate_channel_key();
        let wrapped = wrap_channel_key(&shared_secret, &channel_key).unwrap();
        assert!(unwrap_channel_key(&other_secret, &wrapped).is_err());
    }
}
