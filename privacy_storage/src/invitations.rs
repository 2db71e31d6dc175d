//! Invitation record storage, the per-invitee invitation-id index, and
//! lazy pending-to-expired promotion on read.

use privacy_core::channel::{refresh_expiry, Invitation};
use privacy_core::PrivacyError;

use crate::keys;
use crate::locks::DidLocks;
use crate::store::BlobStore;

#[derive(Clone)]
pub struct InvitationStore {
    blobs: BlobStore,
    locks: DidLocks,
}

impl InvitationStore {
    pub fn new(blobs: BlobStore, locks: DidLocks) -> Self {
        Self { blobs, locks }
    }

    pub async fn get(&self, invitation_id: &str) -> Result<Option<Invitation>, PrivacyError> {
        self.blobs.get_json(&keys::invitation_key(invitation_id)).await
    }

    pub async fn save(&self, invitation: &Invitation) -> Result<(), PrivacyError> {
        self.blobs
            .put_json(&keys::invitation_key(&invitation.id), invitation)
            .await?;
        self.append_index(&invitation.invitee, &invitation.id).await
    }

    /// Re-persists an invitation after a status transition, without
    /// touching the invitee index (the id is already indexed).
    pub async fn save_status(&self, invitation: &Invitation) -> Result<(), PrivacyError> {
        self.blobs
            .put_json(&keys::invitation_key(&invitation.id), invitation)
            .await
    }

    async fn append_index(&self, did: &str, invitation_id: &str) -> Result<(), PrivacyError> {
        let _guard = self.locks.lock(did).await;
        let key = keys::agent_invitations_index_key(did);
        let mut ids: Vec<String> = self.blobs.get_json(&key).await?.unwrap_or_default();
        if !ids.iter().any(|id| id == invitation_id) {
            ids.push(invitation_id.to_string());
            self.blobs.put_json(&key, &ids).await?;
        }
        Ok(())
    }

    /// Walks the invitee's invitation index, lazily flipping expired pending
    /// invitations to `expired` and writing the transition back.
    pub async fn list_for_agent(&self, did: &str, now_ms: i64) -> Result<Vec<Invitation>, PrivacyError> {
        let key = keys::agent_invitations_index_key(did);
        let ids: Vec<String> = self.blobs.get_json(&key).await?.unwrap_or_default();

        let mut invitations = Vec::new();
        for id in ids {
            if let Some(mut invitation) = self.get(&id).await? {
                let before = invitation.status;
                refresh_expiry(&mut invitation, now_ms);
                if invitation.status != before {
                    self.save_status(&invitation).await?;
                }
                invitations.push(invitation);
            }
        }
        Ok(invitations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use privacy_core::channel::InvitationStatus;
    use privacy_core::crypto::WrappedKey;
    use std::sync::Arc;

    fn invitation_store() -> InvitationStore {
        InvitationStore::new(BlobStore::new(Arc::new(InMemory::new())), DidLocks::new())
    }

    fn sample_invitation(expires_at: i64) -> Invitation {
        Invitation {
            id: "inv-1".into(),
            channel_id: "chan-1".into(),
            inviter: "did:moltbook:creator".into(),
            invitee: "did:moltbook:invitee".into(),
            created_at: 0,
            expires_at,
            wrapped_key: WrappedKey {
                ciphertext_b64: "Y3Q=".into(),
                nonce_b64: "bm9uY2U=".into(),
            },
            status: InvitationStatus::Pending,
        }
    }

    #[tokio::test]
    async fn list_for_agent_flips_expired_pending_and_persists_it() {
        let store = invitation_store();
        let invitation = sample_invitation(1_000);
        store.save(&invitation).await.unwrap();

        let listed = store.list_for_agent("did:moltbook:invitee", 5_000).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, InvitationStatus::Expired);

        let reloaded = store.get("inv-1").await.unwrap().unwrap();
        assert_eq!(reloaded.status, InvitationStatus::Expired);
    }

    #[tokio::test]
    async fn still_pending_invitation_is_left_untouched() {
        let store = invitation_store();
        let invitation = sample_invitation(10_000);
        store.save(&invitation).await.unwrap();

        let listed = store.list_for_agent("did:moltbook:invitee", 5_000).await.unwrap();
        assert_eq!(listed[0].status, InvitationStatus::Pending);
    }
}
