use std::sync::Arc;

use object_store::ObjectStore;
use privacy_storage::PrivacyStorage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<PrivacyStorage>,
}

impl AppState {
    pub fn new(backend: Arc<dyn ObjectStore>) -> Self {
        Self { storage: Arc::new(PrivacyStorage::new(backend)) }
    }

    pub fn in_memory() -> Self {
        Self { storage: Arc::new(PrivacyStorage::in_memory()) }
    }
}
