//! DID issuance, parsing, resolution, and agent record management.

pub mod agent;
pub mod did;

pub use agent::{
    build_signed_registration, Agent, Profile, ProfileUpdate, RegistrationRequest,
    VerifiedCredential, INITIAL_REPUTATION,
};
pub use did::{derive_did, parse_did, validate_did, DID_METHOD};
