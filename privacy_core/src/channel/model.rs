//! Channel, invitation, and encrypted-message record types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::crypto::symmetric::WrappedKey;

/// Access-control policy, a tagged variant rather than an open string tag.
/// Deserializing an unknown `type` value fails rather than silently falling
/// back to a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessControlPolicy {
    Open,
    InviteOnly {
        #[serde(default, rename = "allowList")]
        allow_list: BTreeSet<String>,
    },
    CredentialGated {
        contract: String,
        schema: Option<String>,
        #[serde(rename = "minCount")]
        min_count: Option<usize>,
    },
}

/// Channel encryption configuration. A tagged variant over algorithm
/// families; an unknown `algorithm` tag refuses to deserialize rather than
/// falling back to a default cipher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum EncryptionConfig {
    Aes256Gcm {
        #[serde(rename = "rotationIntervalSecs")]
        rotation_interval_secs: Option<u64>,
    },
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        EncryptionConfig::Aes256Gcm {
            rotation_interval_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_participants: Option<usize>,
    pub message_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub participants: BTreeSet<String>,
    pub creator: String,
    pub created_at: i64,
    pub encryption: EncryptionConfig,
    /// `None` models a channel record that somehow carries no access
    /// policy at all; `create_channel` always sets one.
    pub access_control: Option<AccessControlPolicy>,
    pub metadata: Option<ChannelMetadata>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

/// Hard default invitation lifetime: 7 days, in milliseconds.
pub const INVITATION_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: String,
    pub channel_id: String,
    pub inviter: String,
    pub invitee: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub wrapped_key: WrappedKey,
    pub status: InvitationStatus,
}

/// What a send request supplies. The server never inspects `nonce` or
/// `ciphertext` beyond checking they are present. Field names on the wire
/// are `{channelId, nonce, ciphertext, ephemeralPubKey}` even though the
/// values are base64 text internally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendRequest {
    pub channel_id: String,
    #[serde(rename = "nonce")]
    pub nonce_b64: String,
    #[serde(rename = "ciphertext")]
    pub ciphertext_b64: String,
    #[serde(rename = "ephemeralPubKey")]
    pub ephemeral_public_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedMessage {
    pub id: String,
    pub channel_id: String,
    pub sender: String,
    pub timestamp: i64,
    #[serde(rename = "nonce")]
    pub nonce_b64: String,
    #[serde(rename = "ciphertext")]
    pub ciphertext_b64: String,
    #[serde(rename = "ephemeralPubKey")]
    pub ephemeral_public_key: Option<String>,
}
