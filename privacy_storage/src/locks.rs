//! Per-DID in-process locking, serializing the read-modify-write index
//! blobs (`channels.json`, `invitations.json`) against concurrent mutation
//! from other requests targeting the same agent within this process.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct DidLocks {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl DidLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, did: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.locks.lock();
            map.entry(did.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }
}
