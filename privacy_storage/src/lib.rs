//! Blob-store adapter mapping [`privacy_core`] records onto a flat
//! namespace, backed by any [`object_store::ObjectStore`] implementation.

pub mod agents;
pub mod channels;
pub mod invitations;
pub mod keys;
pub mod locks;
pub mod messages;
pub mod store;

pub use agents::{AgentSearchQuery, AgentStore};
pub use channels::ChannelStore;
pub use invitations::InvitationStore;
pub use locks::DidLocks;
pub use messages::MessageStore;
pub use store::BlobStore;

use std::sync::Arc;

use object_store::ObjectStore;

/// Bundles the four record stores plus the shared per-DID lock map, built
/// from a single backing [`ObjectStore`].
#[derive(Clone)]
pub struct PrivacyStorage {
    pub agents: AgentStore,
    pub channels: ChannelStore,
    pub invitations: InvitationStore,
    pub messages: MessageStore,
}

impl PrivacyStorage {
    pub fn new(backend: Arc<dyn ObjectStore>) -> Self {
        let blobs = BlobStore::new(backend);
        let locks = DidLocks::new();
        Self {
            agents: AgentStore::new(blobs.clone()),
            channels: ChannelStore::new(blobs.clone(), locks.clone()),
            invitations: InvitationStore::new(blobs.clone(), locks),
            messages: MessageStore::new(blobs),
        }
    }

    /// An in-memory backend, for tests and local development.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(object_store::memory::InMemory::new()))
    }
}
