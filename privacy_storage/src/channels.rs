//! Channel record storage, including the per-participant channel-id index.

use privacy_core::channel::Channel;
use privacy_core::PrivacyError;

use crate::keys;
use crate::locks::DidLocks;
use crate::store::BlobStore;

#[derive(Clone)]
pub struct ChannelStore {
    blobs: BlobStore,
    locks: DidLocks,
}

impl ChannelStore {
    pub fn new(blobs: BlobStore, locks: DidLocks) -> Self {
        Self { blobs, locks }
    }

    pub async fn get(&self, channel_id: &str) -> Result<Option<Channel>, PrivacyError> {
        self.blobs.get_json(&keys::channel_key(channel_id)).await
    }

    /// Saves the channel record, then idempotently appends its id to every
    /// participant's channel-id index.
    pub async fn save(&self, channel: &Channel) -> Result<(), PrivacyError> {
        self.blobs
            .put_json(&keys::channel_key(&channel.id), channel)
            .await?;
        for did in &channel.participants {
            self.append_index(did, &channel.id).await?;
        }
        Ok(())
    }

    async fn append_index(&self, did: &str, channel_id: &str) -> Result<(), PrivacyError> {
        let _guard = self.locks.lock(did).await;
        let key = keys::agent_channels_index_key(did);
        let mut ids: Vec<String> = self.blobs.get_json(&key).await?.unwrap_or_default();
        if !ids.iter().any(|id| id == channel_id) {
            ids.push(channel_id.to_string());
            self.blobs.put_json(&key, &ids).await?;
        }
        Ok(())
    }

    async fn remove_index(&self, did: &str, channel_id: &str) -> Result<(), PrivacyError> {
        let _guard = self.locks.lock(did).await;
        let key = keys::agent_channels_index_key(did);
        let mut ids: Vec<String> = self.blobs.get_json(&key).await?.unwrap_or_default();
        let before = ids.len();
        ids.retain(|id| id != channel_id);
        if ids.len() != before {
            self.blobs.put_json(&key, &ids).await?;
        }
        Ok(())
    }

    /// Removes a single participant's channel-id index entry, for the
    /// leave-channel path where the channel itself survives.
    pub async fn unindex_participant(&self, did: &str, channel_id: &str) -> Result<(), PrivacyError> {
        self.remove_index(did, channel_id).await
    }

    pub async fn list_for_agent(&self, did: &str) -> Result<Vec<Channel>, PrivacyError> {
        let key = keys::agent_channels_index_key(did);
        let ids: Vec<String> = self.blobs.get_json(&key).await?.unwrap_or_default();
        let mut channels = Vec::new();
        for id in ids {
            if let Some(channel) = self.get(&id).await? {
                channels.push(channel);
            }
        }
        Ok(channels)
    }

    /// Removes the channel from every participant's index, then deletes its
    /// message prefix and the channel record itself.
    pub async fn delete(&self, channel_id: &str) -> Result<(), PrivacyError> {
        if let Some(channel) = self.get(channel_id).await? {
            for did in &channel.participants {
                self.remove_index(did, channel_id).await?;
            }
        }

        let prefix = keys::channel_messages_prefix(channel_id);
        for key in self.blobs.list_keys(&prefix).await? {
            self.blobs.delete(&key).await?;
        }

        self.blobs.delete(&keys::channel_key(channel_id)).await
    }
}
