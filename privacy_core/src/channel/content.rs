//! Message content shape, serialized inside the ciphertext only.
//!
//! The server never constructs or inspects this type — it is a shared
//! vocabulary for client orchestrators so two independently-written clients
//! can still talk to each other's encrypted payloads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    File { name: String, mime_type: String, data_b64: String },
    Action { name: String, payload: serde_json::Value },
    System { text: String },
}

impl MessageContent {
    pub fn to_plaintext(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("MessageContent always serializes")
    }

    pub fn from_plaintext(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
