//! Agent record storage and the public search endpoint's filter logic.

use privacy_core::identity::Agent;
use privacy_core::PrivacyError;

use crate::keys;
use crate::store::BlobStore;

#[derive(Clone)]
pub struct AgentStore {
    blobs: BlobStore,
}

/// Search filters for `GET /agents/search`.
#[derive(Debug, Clone, Default)]
pub struct AgentSearchQuery {
    pub capabilities: Vec<String>,
    pub min_reputation: Option<u8>,
    pub nft_contract: Option<String>,
    pub nft_schema: Option<String>,
}

impl AgentStore {
    pub fn new(blobs: BlobStore) -> Self {
        Self { blobs }
    }

    pub async fn get(&self, did: &str) -> Result<Option<Agent>, PrivacyError> {
        self.blobs.get_json(&keys::agent_key(did)).await
    }

    /// Saves a brand-new agent, rejecting a DID that already has a record.
    pub async fn save_new(&self, agent: &Agent) -> Result<(), PrivacyError> {
        if self.get(&agent.did).await?.is_some() {
            return Err(PrivacyError::Conflict("agent already registered".into()));
        }
        self.blobs.put_json(&keys::agent_key(&agent.did), agent).await
    }

    /// Overwrites an existing agent record (profile update, credential add).
    pub async fn save(&self, agent: &Agent) -> Result<(), PrivacyError> {
        self.blobs.put_json(&keys::agent_key(&agent.did), agent).await
    }

    /// Prefix-lists the agents namespace, skips index files by name shape,
    /// and filters by capabilities / reputation floor / verified credential.
    pub async fn search(&self, query: &AgentSearchQuery) -> Result<Vec<Agent>, PrivacyError> {
        let record_keys = self.blobs.list_keys(keys::AGENTS_PREFIX).await?;
        let mut matches = Vec::new();

        for key in record_keys {
            if !keys::is_agent_record_key(&key) {
                continue;
            }
            let Some(agent): Option<Agent> = self.blobs.get_json(&key).await? else {
                continue;
            };

            if !query
                .capabilities
                .iter()
                .all(|c| agent.profile.capabilities.contains(c))
            {
                continue;
            }
            if let Some(min) = query.min_reputation {
                if agent.reputation < min {
                    continue;
                }
            }
            if let Some(contract) = &query.nft_contract {
                if !agent.has_verified_credential(contract, query.nft_schema.as_deref(), None) {
                    continue;
                }
            }

            matches.push(agent);
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use privacy_core::identity::{build_signed_registration, Profile};
    use std::sync::Arc;

    fn agent_store() -> AgentStore {
        AgentStore::new(BlobStore::new(Arc::new(InMemory::new())))
    }

    fn sample_agent(capabilities: Vec<String>) -> Agent {
        let agreement = privacy_core::crypto::generate_agreement_keypair();
        let signing = privacy_core::crypto::generate_signing_keypair();
        let profile = Profile {
            capabilities,
            ..Default::default()
        };
        let req = build_signed_registration(
            agreement.public_key,
            signing.public_key,
            &signing.private_key,
            profile,
        )
        .unwrap();
        Agent::register(req, 0).unwrap()
    }

    #[tokio::test]
    async fn save_new_rejects_duplicate_did() {
        let store = agent_store();
        let agent = sample_agent(vec![]);
        store.save_new(&agent).await.unwrap();
        let err = store.save_new(&agent).await.unwrap_err();
        assert!(matches!(err, PrivacyError::Conflict(_)));
    }

    #[tokio::test]
    async fn search_filters_by_capability_and_reputation() {
        let store = agent_store();
        let mut chatty = sample_agent(vec!["chat".into()]);
        chatty.adjust_reputation(40);
        let quiet = sample_agent(vec![]);
        store.save_new(&chatty).await.unwrap();
        store.save_new(&quiet).await.unwrap();

        let results = store
            .search(&AgentSearchQuery {
                capabilities: vec!["chat".into()],
                min_reputation: Some(80),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].did, chatty.did);
    }

    #[tokio::test]
    async fn search_index_files_are_not_mistaken_for_agents() {
        let store = agent_store();
        let agent = sample_agent(vec![]);
        store.save_new(&agent).await.unwrap();
        store
            .blobs
            .put_json(&keys::agent_channels_index_key(&agent.did), &Vec::<String>::new())
            .await
            .unwrap();

        let results = store.search(&AgentSearchQuery::default()).await.unwrap();
        assert_eq!(results.len(), 1);
    }
}
