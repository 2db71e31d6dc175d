//! Per-channel decrypted-key cache. Unwrapping a channel key costs an ECDH
//! derivation plus an AEAD decrypt; this avoids repeating that on every
//! send/read against the same channel within a session.

use std::time::Duration;

use moka::future::Cache;

const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_CAPACITY: u64 = 1024;

#[derive(Clone)]
pub struct ChannelKeyCache {
    inner: Cache<String, [u8; 32]>,
}

impl ChannelKeyCache {
    pub fn new() -> Self {
        ChannelKeyCache {
            inner: Cache::builder()
                .max_capacity(DEFAULT_CAPACITY)
                .time_to_idle(DEFAULT_TTL)
                .build(),
        }
    }

    pub async fn get(&self, channel_id: &str) -> Option<[u8; 32]> {
        self.inner.get(channel_id).await
    }

    pub async fn insert(&self, channel_id: String, key: [u8; 32]) {
        self.inner.insert(channel_id, key).await;
    }

    /// Drops every cached key. Called on logout so a key never outlives the
    /// session that unwrapped it.
    pub async fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }
}

impl Default for ChannelKeyCache {
    fn default() -> Self {
        Self::new()
    }
}
