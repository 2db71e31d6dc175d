//! Local credential persistence. The server never sees a private key; this
//! is where the client keeps the ones it holds between runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use privacy_core::crypto::{AgreementKeyPair, SigningKeyPair};

use crate::error::ClientError;

/// Everything needed to resume as a previously registered agent: both
/// keypairs and the DID they derive, persisted together so a partial write
/// can never leave them out of sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub did: String,
    pub agreement: AgreementKeyPair,
    pub signing: SigningKeyPair,
}

pub trait KeyStore: Send + Sync {
    fn load(&self) -> Result<Option<Credentials>, ClientError>;
    fn save(&self, credentials: &Credentials) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// Default [`KeyStore`]: a single JSON file on disk.
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileKeyStore { path: path.into() }
    }
}

impl KeyStore for FileKeyStore {
    fn load(&self) -> Result<Option<Credentials>, ClientError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(credentials)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use privacy_core::crypto::{generate_agreement_keypair, generate_signing_keypair};

    fn fixture() -> Credentials {
        Credentials {
            did: "did:moltbook:deadbeefdeadbeefdeadbeefdeadbeef".into(),
            agreement: generate_agreement_keypair(),
            signing: generate_signing_keypair(),
        }
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = std::env::temp_dir().join(format!("privacy-client-test-{}", std::process::id()));
        let store = FileKeyStore::new(dir.join("missing.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = std::env::temp_dir().join(format!("privacy-client-test-{}-2", std::process::id()));
        let store = FileKeyStore::new(dir.join("creds.json"));
        let creds = fixture();
        store.save(&creds).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.did, creds.did);
        assert_eq!(loaded.agreement.public_key, creds.agreement.public_key);
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
