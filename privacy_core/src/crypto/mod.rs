//! Cryptographic primitives for the Agent Privacy Layer.
//!
//! Consumed by every other component; has no dependencies on them. Every
//! fallible operation surfaces a single opaque [`crate::error::PrivacyError::Crypto`]
//! signal — no side-channel information about which step failed leaks out.

pub mod agreement;
pub mod encoding;
pub mod hashing;
pub mod ident;
pub mod signing;
pub mod symmetric;

pub use agreement::{derive_shared_secret, generate_keypair as generate_agreement_keypair, AgreementKeyPair};
pub use encoding::{from_base64, to_base64};
pub use hashing::{sha256_base64, sha256_bytes, sha256_hex, sha256_str};
pub use ident::random_id;
pub use signing::{generate_keypair as generate_signing_keypair, sign, verify, SigningKeyPair};
pub use symmetric::{
    decrypt, encrypt, generate_channel_key, unwrap_channel_key, wrap_channel_key, WrappedKey,
};
