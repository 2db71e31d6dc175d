//! Agent records: construction from a signed registration, profile updates,
//! reputation adjustment, and verified-credential bookkeeping.

use serde::{Deserialize, Serialize};

use super::did::derive_did;
use crate::crypto::signing;
use crate::error::PrivacyError;

pub const INITIAL_REPUTATION: u8 = 50;

/// The freely-editable part of an agent's record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    pub metadata: Option<serde_json::Value>,
}

/// A partial profile update. Only `Some` fields are applied; reputation is
/// never part of this shape and can never change via this path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub capabilities: Option<Vec<String>>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedCredential {
    pub contract: String,
    pub asset_id: String,
    pub schema: Option<String>,
    pub verified: bool,
    pub verified_at: Option<i64>,
}

/// What a caller submits to register a new agent. Reputation is
/// deliberately absent: it is always initialized server-side. Carries two
/// public keys: the dedicated signing key authenticates this very request,
/// while the agreement key is what DID derivation and channel-key wrapping
/// use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub agreement_public_key: String,
    pub signing_public_key: String,
    pub profile: Profile,
    pub signature: String,
}

/// The exact shape signed over during registration. Field order is fixed so
/// both the client orchestrator and the server compute the same bytes.
#[derive(Debug, Clone, Serialize)]
struct RegistrationPayload<'a> {
    agreement_public_key: &'a str,
    signing_public_key: &'a str,
    profile: &'a Profile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub did: String,
    pub agreement_public_key: String,
    pub signing_public_key: String,
    pub created_at: i64,
    pub profile: Profile,
    pub reputation: u8,
    #[serde(default)]
    pub verified_credentials: Vec<VerifiedCredential>,
}

impl Agent {
    /// Validates and verifies a registration request, deriving the agent's
    /// DID and initializing reputation to [`INITIAL_REPUTATION`].
    pub fn register(req: RegistrationRequest, now_ms: i64) -> Result<Agent, PrivacyError> {
        if req.agreement_public_key.is_empty() {
            return Err(PrivacyError::Validation("missing agreementPublicKey".into()));
        }
        if req.signing_public_key.is_empty() {
            return Err(PrivacyError::Validation("missing signingPublicKey".into()));
        }
        if req.signature.is_empty() {
            return Err(PrivacyError::Validation("missing signature".into()));
        }

        let payload = RegistrationPayload {
            agreement_public_key: &req.agreement_public_key,
            signing_public_key: &req.signing_public_key,
            profile: &req.profile,
        };
        let canonical =
            serde_json::to_vec(&payload).map_err(|_| PrivacyError::Validation("bad profile".into()))?;
        signing::verify(&req.signing_public_key, &canonical, &req.signature)?;

        let did = derive_did(&req.agreement_public_key);
        Ok(Agent {
            did,
            agreement_public_key: req.agreement_public_key,
            signing_public_key: req.signing_public_key,
            created_at: now_ms,
            profile: req.profile,
            reputation: INITIAL_REPUTATION,
            verified_credentials: Vec::new(),
        })
    }

    /// Applies a partial profile update. Reputation is always preserved,
    /// regardless of what the caller supplies.
    pub fn update_profile(&mut self, update: ProfileUpdate) {
        if let Some(display_name) = update.display_name {
            self.profile.display_name = Some(display_name);
        }
        if let Some(capabilities) = update.capabilities {
            self.profile.capabilities = capabilities;
        }
        if let Some(metadata) = update.metadata {
            self.profile.metadata = Some(metadata);
        }
    }

    /// Applies a signed delta to reputation, clamped to [0, 100].
    pub fn adjust_reputation(&mut self, delta: i32) {
        let current = self.reputation as i32;
        let updated = (current + delta).clamp(0, 100);
        self.reputation = updated as u8;
    }

    /// Adds a credential, idempotent by (contract, asset_id). New entries
    /// start unverified.
    pub fn add_credential(&mut self, contract: String, asset_id: String, schema: Option<String>) {
        if self
            .verified_credentials
            .iter()
            .any(|c| c.contract == contract && c.asset_id == asset_id)
        {
            return;
        }
        self.verified_credentials.push(VerifiedCredential {
            contract,
            asset_id,
            schema,
            verified: false,
            verified_at: None,
        });
    }

    /// Marks a matching credential verified. Monotonic: verifying an
    /// already-verified credential is a no-op past the first call.
    pub fn mark_credential_verified(&mut self, contract: &str, asset_id: &str, now_ms: i64) {
        if let Some(cred) = self
            .verified_credentials
            .iter_mut()
            .find(|c| c.contract == contract && c.asset_id == asset_id)
        {
            if !cred.verified {
                cred.verified = true;
                cred.verified_at = Some(now_ms);
            }
        }
    }

    /// True if any credential matches `contract` (and `schema`, if given)
    /// and is verified, optionally requiring at least `min_count` matches.
    pub fn has_verified_credential(
        &self,
        contract: &str,
        schema: Option<&str>,
        min_count: Option<usize>,
    ) -> bool {
        let count = self
            .verified_credentials
            .iter()
            .filter(|c| {
                c.verified
                    && c.contract == contract
                    && schema.map(|s| c.schema.as_deref() == Some(s)).unwrap_or(true)
            })
            .count();
        count >= min_count.unwrap_or(1)
    }

    /// W3C DID-core-shaped document with a key-agreement verification
    /// method referencing the agent's agreement public key.
    pub fn did_document(&self) -> serde_json::Value {
        let vm_id = format!("{}#key-agreement", self.did);
        serde_json::json!({
            "@context": ["https://www.w3.org/ns/did/v1"],
            "id": self.did,
            "verificationMethod": [{
                "id": vm_id,
                "type": "X25519KeyAgreementKey2020",
                "controller": self.did,
                "publicKeyBase64": self.agreement_public_key,
            }],
            "keyAgreement": [vm_id],
        })
    }
}

/// Builds a signed [`RegistrationRequest`], for use by client orchestrators
/// and tests. Not used by the server, which only ever verifies.
pub fn build_signed_registration(
    agreement_public_key: String,
    signing_public_key: String,
    signing_private_key: &str,
    profile: Profile,
) -> Result<RegistrationRequest, PrivacyError> {
    let payload = RegistrationPayload {
        agreement_public_key: &agreement_public_key,
        signing_public_key: &signing_public_key,
        profile: &profile,
    };
    let canonical = serde_json::to_vec(&payload).expect("Profile always serializes");
    let signature = signing::sign(signing_private_key, &canonical)?;
    Ok(RegistrationRequest {
        agreement_public_key,
        signing_public_key,
        profile,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{generate_agreement_keypair, generate_signing_keypair};

    fn signed_registration(profile: Profile) -> RegistrationRequest {
        let agreement = generate_agreement_keypair();
        let signing = generate_signing_keypair();
        build_signed_registration(
            agreement.public_key,
            signing.public_key,
            &signing.private_key,
            profile,
        )
        .unwrap()
    }

    #[test]
    fn register_derives_did_and_default_reputation() {
        let req = signed_registration(Profile::default());
        let agent = Agent::register(req, 1000).unwrap();
        assert!(agent.did.starts_with("did:moltbook:"));
        assert_eq!(agent.reputation, INITIAL_REPUTATION);
    }

    #[test]
    fn register_rejects_bad_signature() {
        let mut req = signed_registration(Profile::default());
        req.signature = "forged".into();
        assert!(Agent::register(req, 1000).is_err());
    }

    #[test]
    fn profile_update_never_changes_reputation() {
        let req = signed_registration(Profile::default());
        let mut agent = Agent::register(req, 1000).unwrap();
        agent.adjust_reputation(30);
        let before = agent.reputation;

        agent.update_profile(ProfileUpdate {
            display_name: Some("new name".into()),
            capabilities: Some(vec!["chat".into()]),
            metadata: None,
        });

        assert_eq!(agent.reputation, before);
        assert_eq!(agent.profile.display_name.as_deref(), Some("new name"));
    }

    #[test]
    fn reputation_clamps_to_bounds() {
        let req = signed_registration(Profile::default());
        let mut agent = Agent::register(req, 1000).unwrap();
        agent.adjust_reputation(-1000);
        assert_eq!(agent.reputation, 0);
        agent.adjust_reputation(1000);
        assert_eq!(agent.reputation, 100);
    }

    #[test]
    fn add_credential_is_idempotent() {
        let req = signed_registration(Profile::default());
        let mut agent = Agent::register(req, 1000).unwrap();
        agent.add_credential("atomicassets".into(), "asset-1".into(), None);
        agent.add_credential("atomicassets".into(), "asset-1".into(), None);
        assert_eq!(agent.verified_credentials.len(), 1);
    }

    #[test]
    fn credential_gate_respects_verification_and_schema() {
        let req = signed_registration(Profile::default());
        let mut agent = Agent::register(req, 1000).unwrap();
        agent.add_credential(
            "atomicassets".into(),
            "asset-1".into(),
            Some("moltbook.agent".into()),
        );
        assert!(!agent.has_verified_credential("atomicassets", Some("moltbook.agent"), None));

        agent.mark_credential_verified("atomicassets", "asset-1", 2000);
        assert!(agent.has_verified_credential("atomicassets", Some("moltbook.agent"), None));
        assert!(!agent.has_verified_credential("atomicassets", Some("other.schema"), None));
    }

    #[test]
    fn did_document_references_agreement_key() {
        let req = signed_registration(Profile::default());
        let agent = Agent::register(req, 1000).unwrap();
        let doc = agent.did_document();
        assert_eq!(doc["id"], agent.did);
        assert_eq!(
            doc["verificationMethod"][0]["publicKeyBase64"],
            agent.agreement_public_key
        );
    }
}
