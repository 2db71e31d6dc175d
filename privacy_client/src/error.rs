//! Error type for the client orchestrator: wraps transport failures, local
//! credential-store failures, and whatever [`privacy_core::PrivacyError`]
//! the server reported back.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("credential store error: {0}")]
    KeyStore(String),

    #[error("server rejected the request ({status}): {message}")]
    Server { status: u16, message: String },

    #[error(transparent)]
    Crypto(#[from] privacy_core::PrivacyError),

    #[error("no credentials loaded; call register() or load an existing identity first")]
    NotRegistered,

    #[error("unknown recipient DID: {0}")]
    UnknownRecipient(String),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::KeyStore(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::KeyStore(err.to_string())
    }
}
