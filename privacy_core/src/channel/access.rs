//! Access-control decisions: given a channel and a candidate agent, decide
//! whether they may read or join.

use crate::identity::agent::Agent;

use super::model::{AccessControlPolicy, Channel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl AccessDecision {
    fn allow() -> Self {
        AccessDecision { allowed: true, reason: None }
    }

    fn deny(reason: impl Into<String>) -> Self {
        AccessDecision { allowed: false, reason: Some(reason.into()) }
    }
}

/// Decides access per the channel-membership / policy matrix. `candidate`
/// is the agent record for the DID being checked, when one could be
/// resolved; `None` is treated the same as "no verified credentials".
pub fn decide_access(channel: &Channel, candidate_did: &str, candidate: Option<&Agent>) -> AccessDecision {
    if channel.participants.contains(candidate_did) {
        return AccessDecision::allow();
    }

    match &channel.access_control {
        None => AccessDecision::deny("Not a participant"),
        Some(AccessControlPolicy::Open) => AccessDecision::allow(),
        Some(AccessControlPolicy::InviteOnly { allow_list }) => {
            if allow_list.contains(candidate_did) {
                AccessDecision::allow()
            } else {
                AccessDecision::deny("Invite required")
            }
        }
        Some(AccessControlPolicy::CredentialGated { contract, schema, min_count }) => {
            let required = min_count.unwrap_or(1);
            let matching_count = candidate
                .map(|a| {
                    a.verified_credentials
                        .iter()
                        .filter(|c| {
                            c.verified
                                && &c.contract == contract
                                && schema.as_deref().map(|s| c.schema.as_deref() == Some(s)).unwrap_or(true)
                        })
                        .count()
                })
                .unwrap_or(0);

            if matching_count >= required {
                return AccessDecision::allow();
            }

            let has_any_matching = candidate
                .map(|a| {
                    a.verified_credentials
                        .iter()
                        .any(|c| {
                            &c.contract == contract
                                && schema.as_deref().map(|s| c.schema.as_deref() == Some(s)).unwrap_or(true)
                        })
                })
                .unwrap_or(false);

            if !has_any_matching {
                AccessDecision::deny("Required NFT not found")
            } else {
                AccessDecision::deny(format!(
                    "at least {required} verified credential(s) required"
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::model::ChannelMetadata;
    use crate::identity::agent::{build_signed_registration, Profile};
    use crate::crypto::{generate_agreement_keypair, generate_signing_keypair};
    use std::collections::BTreeSet;

    fn channel_with_policy(policy: Option<AccessControlPolicy>) -> Channel {
        Channel {
            id: "chan-1".into(),
            participants: BTreeSet::from(["did:moltbook:creator0000000000000000000000000000".into()]),
            creator: "did:moltbook:creator0000000000000000000000000000".into(),
            created_at: 0,
            encryption: Default::default(),
            access_control: policy,
            metadata: Some(ChannelMetadata::default()),
        }
    }

    fn agent_with_credential(contract: &str, schema: Option<&str>, verified: bool) -> Agent {
        let agreement = generate_agreement_keypair();
        let signing = generate_signing_keypair();
        let req = build_signed_registration(
            agreement.public_key,
            signing.public_key,
            &signing.private_key,
            Profile::default(),
        )
        .unwrap();
        let mut agent = Agent::register(req, 0).unwrap();
        agent.add_credential(contract.to_string(), "asset-1".to_string(), schema.map(String::from));
        if verified {
            agent.mark_credential_verified(contract, "asset-1", 1);
        }
        agent
    }

    #[test]
    fn participant_is_always_allowed() {
        let channel = channel_with_policy(Some(AccessControlPolicy::InviteOnly {
            allow_list: BTreeSet::new(),
        }));
        let decision = decide_access(
            &channel,
            "did:moltbook:creator0000000000000000000000000000",
            None,
        );
        assert!(decision.allowed);
    }

    #[test]
    fn invite_only_denies_outsider_with_required_message() {
        let channel = channel_with_policy(Some(AccessControlPolicy::InviteOnly {
            allow_list: BTreeSet::new(),
        }));
        let decision = decide_access(&channel, "did:moltbook:outsider000000000000000000000000", None);
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("Invite required"));
    }

    #[test]
    fn credential_gated_admits_verified_matching_credential() {
        let channel = channel_with_policy(Some(AccessControlPolicy::CredentialGated {
            contract: "atomicassets".into(),
            schema: Some("moltbook.agent".into()),
            min_count: None,
        }));
        let agent = agent_with_credential("atomicassets", Some("moltbook.agent"), true);
        let decision = decide_access(&channel, &agent.did, Some(&agent));
        assert!(decision.allowed);
    }

    #[test]
    fn credential_gated_denies_missing_credential() {
        let channel = channel_with_policy(Some(AccessControlPolicy::CredentialGated {
            contract: "atomicassets".into(),
            schema: Some("moltbook.agent".into()),
            min_count: None,
        }));
        let decision = decide_access(&channel, "did:moltbook:nocred00000000000000000000000000", None);
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("Required NFT not found"));
    }

    #[test]
    fn credential_gated_denies_unverified_credential() {
        let channel = channel_with_policy(Some(AccessControlPolicy::CredentialGated {
            contract: "atomicassets".into(),
            schema: Some("moltbook.agent".into()),
            min_count: None,
        }));
        let agent = agent_with_credential("atomicassets", Some("moltbook.agent"), false);
        let decision = decide_access(&channel, &agent.did, Some(&agent));
        assert!(!decision.allowed);
    }

    #[test]
    fn credential_gated_enforces_minimum_count() {
        let channel = channel_with_policy(Some(AccessControlPolicy::CredentialGated {
            contract: "atomicassets".into(),
            schema: None,
            min_count: Some(2),
        }));
        let agent = agent_with_credential("atomicassets", None, true);
        let decision = decide_access(&channel, &agent.did, Some(&agent));
        assert!(!decision.allowed);
        assert_ne!(decision.reason.as_deref(), Some("Required NFT not found"));
    }

    #[test]
    fn no_policy_denies_with_not_a_participant() {
        let channel = channel_with_policy(None);
        let decision = decide_access(&channel, "did:moltbook:outsider000000000000000000000000", None);
        assert_eq!(decision.reason.as_deref(), Some("Not a participant"));
    }
}
