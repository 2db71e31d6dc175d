//! Encrypted-message storage with channel-scoped pagination and TTL-aware
//! filtering. Enumeration is naive get-per-object, acceptable for the small
//! per-channel corpus this adapter targets.

use privacy_core::channel::{is_expired, Channel, EncryptedMessage};
use privacy_core::PrivacyError;

use crate::keys;
use crate::store::BlobStore;

#[derive(Clone)]
pub struct MessageStore {
    blobs: BlobStore,
}

impl MessageStore {
    pub fn new(blobs: BlobStore) -> Self {
        Self { blobs }
    }

    pub async fn save(&self, message: &EncryptedMessage) -> Result<(), PrivacyError> {
        self.blobs
            .put_json(&keys::channel_message_key(&message.channel_id, &message.id), message)
            .await
    }

    /// Lists a channel's messages newest-first, applying `before`/`after`
    /// timestamp bounds and an inclusive `limit` cap. Messages the channel's
    /// TTL has expired are dropped before pagination is applied.
    pub async fn list(
        &self,
        channel: &Channel,
        limit: usize,
        before: Option<i64>,
        after: Option<i64>,
        now_ms: i64,
    ) -> Result<Vec<EncryptedMessage>, PrivacyError> {
        let prefix = keys::channel_messages_prefix(&channel.id);
        let mut messages = Vec::new();

        for key in self.blobs.list_keys(&prefix).await? {
            let Some(message): Option<EncryptedMessage> = self.blobs.get_json(&key).await? else {
                continue;
            };
            if is_expired(channel, &message, now_ms) {
                continue;
            }
            if before.is_some_and(|b| message.timestamp >= b) {
                continue;
            }
            if after.is_some_and(|a| message.timestamp <= a) {
                continue;
            }
            messages.push(message);
        }

        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        messages.truncate(limit);
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use privacy_core::channel::{ChannelMetadata, EncryptionConfig};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn message_store() -> MessageStore {
        MessageStore::new(BlobStore::new(Arc::new(InMemory::new())))
    }

    fn sample_channel(ttl_secs: Option<u64>) -> Channel {
        Channel {
            id: "chan-1".into(),
            participants: BTreeSet::from(["did:moltbook:a".to_string()]),
            creator: "did:moltbook:a".into(),
            created_at: 0,
            encryption: EncryptionConfig::default(),
            access_control: None,
            metadata: Some(ChannelMetadata {
                message_ttl_secs: ttl_secs,
                ..Default::default()
            }),
        }
    }

    fn message(id: &str, timestamp: i64) -> EncryptedMessage {
        EncryptedMessage {
            id: id.into(),
            channel_id: "chan-1".into(),
            sender: "did:moltbook:a".into(),
            timestamp,
            nonce_b64: "bm9uY2U=".into(),
            ciphertext_b64: "Y3Q=".into(),
            ephemeral_public_key: None,
        }
    }

    #[tokio::test]
    async fn list_orders_newest_first_and_respects_limit() {
        let store = message_store();
        let channel = sample_channel(None);
        store.save(&message("m1", 100)).await.unwrap();
        store.save(&message("m2", 300)).await.unwrap();
        store.save(&message("m3", 200)).await.unwrap();

        let listed = store.list(&channel, 2, None, None, 1_000).await.unwrap();
        assert_eq!(listed.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["m2", "m3"]);
    }

    #[tokio::test]
    async fn list_applies_before_and_after_bounds() {
        let store = message_store();
        let channel = sample_channel(None);
        store.save(&message("m1", 100)).await.unwrap();
        store.save(&message("m2", 200)).await.unwrap();
        store.save(&message("m3", 300)).await.unwrap();

        let listed = store.list(&channel, 10, Some(300), Some(100), 1_000).await.unwrap();
        assert_eq!(listed.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["m2"]);
    }

    #[tokio::test]
    async fn list_drops_ttl_expired_messages() {
        let store = message_store();
        let channel = sample_channel(Some(60));
        store.save(&message("stale", 0)).await.unwrap();
        store.save(&message("fresh", 100_000)).await.unwrap();

        let listed = store.list(&channel, 10, None, None, 100_000).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "fresh");
    }
}
