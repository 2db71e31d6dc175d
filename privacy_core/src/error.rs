//! Error taxonomy for the Agent Privacy Layer core.
//!
//! Kinds, not types: every fallible core operation returns one of these
//! variants. `privacy_server` maps each to an HTTP status code via
//! [`PrivacyError::status_code`]; none of these carry machine-parsed detail
//! beyond the message itself.

use thiserror::Error;

/// A type alias for a boxed error that is thread-safe and sendable across threads.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrivacyError {
    /// Malformed DID, missing required field, unknown policy tag, limit beyond cap.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid auth header, no such registered agent.
    #[error("{0}")]
    Authentication(String),

    /// Caller is not the participant/creator/invitee an operation requires.
    #[error("{0}")]
    Authorization(String),

    /// Unknown agent, channel, invitation, or message id.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate registration on the same public key.
    #[error("{0}")]
    Conflict(String),

    /// Invitation in a terminal state, creator removal, max participants reached.
    #[error("{0}")]
    State(String),

    /// Required credential missing or below minimum count.
    #[error("{0}")]
    CredentialGate(String),

    /// Opaque cryptographic failure; never distinguishes cause to the caller.
    #[error("cryptographic failure")]
    Crypto,

    /// Backing storage failure. Message is for logs; callers see a generic 5xx.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl PrivacyError {
    /// HTTP-style status code per the endpoint table.
    pub fn status_code(&self) -> u16 {
        match self {
            PrivacyError::Validation(_) => 400,
            PrivacyError::Authentication(_) => 401,
            PrivacyError::Authorization(_) => 403,
            PrivacyError::NotFound(_) => 404,
            PrivacyError::Conflict(_) => 409,
            PrivacyError::State(_) => 400,
            PrivacyError::CredentialGate(_) => 403,
            PrivacyError::Crypto => 500,
            PrivacyError::Storage(_) => 500,
        }
    }

    /// Advisory hint text, never machine-parsed.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            PrivacyError::Authentication(_) => {
                Some("include a valid X-Agent-DID header for a registered agent")
            }
            PrivacyError::CredentialGate(_) => {
                Some("obtain the required verified credential and retry")
            }
            _ => None,
        }
    }
}
