//! Client-side orchestrator for the Agent Privacy Layer.
//!
//! Holds this agent's private keys, performs every channel-key wrap/unwrap
//! locally via ECDH + AEAD, and otherwise talks to a `privacy_server`
//! deployment purely in ciphertext. No function in this crate sends a
//! private key or a plaintext channel key over the wire.

pub mod cache;
pub mod client;
pub mod error;
pub mod keystore;

pub use client::{Client, DecryptedMessage, ReadMessagesOptions, SearchQuery};
pub use error::ClientError;
pub use keystore::{Credentials, FileKeyStore, KeyStore};
