//! Thin JSON-object wrapper over [`object_store::ObjectStore`], working in
//! plain string keys rather than a namespace/path pair, since the privacy
//! layer's blob shapes are already fully-qualified.

use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{path::Path as ObjectPath, ObjectStore};
use privacy_core::PrivacyError;
use serde::{de::DeserializeOwned, Serialize};

#[derive(Clone)]
pub struct BlobStore {
    inner: Arc<dyn ObjectStore>,
}

impl BlobStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PrivacyError> {
        let path = ObjectPath::from(key);
        match self.inner.get(&path).await {
            Ok(result) => {
                let bytes = result
                    .bytes()
                    .await
                    .map_err(|e| PrivacyError::Storage(e.to_string()))?;
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| PrivacyError::Storage(e.to_string()))?;
                Ok(Some(value))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(PrivacyError::Storage(e.to_string())),
        }
    }

    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), PrivacyError> {
        let path = ObjectPath::from(key);
        let bytes = serde_json::to_vec(value).map_err(|e| PrivacyError::Storage(e.to_string()))?;
        self.inner
            .put(&path, Bytes::from(bytes).into())
            .await
            .map_err(|e| PrivacyError::Storage(e.to_string()))?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), PrivacyError> {
        let path = ObjectPath::from(key);
        match self.inner.delete(&path).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(PrivacyError::Storage(e.to_string())),
        }
    }

    /// Lists every key under `prefix`. The corpus backed by this adapter is
    /// small enough that naive get-per-object enumeration is acceptable.
    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, PrivacyError> {
        let prefix_path = ObjectPath::from(prefix);
        let mut stream = self.inner.list(Some(&prefix_path));
        let mut keys = Vec::new();
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| PrivacyError::Storage(e.to_string()))?
        {
            keys.push(meta.location.to_string());
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Fixture {
        value: u32,
    }

    fn store() -> BlobStore {
        BlobStore::new(Arc::new(InMemory::new()))
    }

    #[tokio::test]
    async fn get_missing_key_returns_none() {
        let store = store();
        let result: Option<Fixture> = store.get_json("missing.json").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = store();
        store.put_json("fixture.json", &Fixture { value: 7 }).await.unwrap();
        let result: Option<Fixture> = store.get_json("fixture.json").await.unwrap();
        assert_eq!(result, Some(Fixture { value: 7 }));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = store();
        store.put_json("fixture.json", &Fixture { value: 1 }).await.unwrap();
        store.delete("fixture.json").await.unwrap();
        store.delete("fixture.json").await.unwrap();
        let result: Option<Fixture> = store.get_json("fixture.json").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn list_keys_returns_everything_under_prefix() {
        let store = store();
        store.put_json("ns/a.json", &Fixture { value: 1 }).await.unwrap();
        store.put_json("ns/b.json", &Fixture { value: 2 }).await.unwrap();
        store.put_json("other/c.json", &Fixture { value: 3 }).await.unwrap();

        let mut keys = store.list_keys("ns/").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["ns/a.json".to_string(), "ns/b.json".to_string()]);
    }
}
