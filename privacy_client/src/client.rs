//! Orchestrator: holds this agent's private keys, performs every ECDH
//! wrap/unwrap locally, and talks to a `privacy_server` deployment over
//! HTTP. No private key, channel key, or plaintext ever leaves this module
//! except as the ciphertext bodies the server is meant to relay.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use privacy_core::channel::{
    AccessControlPolicy, Channel, ChannelMetadata, EncryptedMessage, Invitation, MessageContent,
    MessageSendRequest,
};
use privacy_core::crypto::symmetric::NONCE_LEN;
use privacy_core::crypto::{
    decrypt, derive_shared_secret, encrypt, from_base64, generate_agreement_keypair,
    generate_channel_key, generate_signing_keypair, to_base64, unwrap_channel_key, wrap_channel_key,
    WrappedKey,
};
use privacy_core::identity::{build_signed_registration, Agent, Profile, ProfileUpdate};
use privacy_core::PrivacyError;

use crate::cache::ChannelKeyCache;
use crate::error::ClientError;
use crate::keystore::{Credentials, KeyStore};

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const DID_HEADER: &str = "X-Agent-DID";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
    #[allow(dead_code)]
    hint: Option<String>,
}

#[derive(Debug, Serialize)]
struct InviteeWire {
    did: String,
    #[serde(rename = "wrappedKey")]
    wrapped_key: WrappedKey,
}

#[derive(Debug, Serialize)]
struct CreateChannelBody {
    invitees: Vec<InviteeWire>,
    #[serde(rename = "accessControl")]
    access_control: Option<AccessControlPolicy>,
    metadata: Option<ChannelMetadata>,
}

#[derive(Debug, Deserialize)]
struct CreateChannelReply {
    channel: Channel,
    invitations: Vec<Invitation>,
}

#[derive(Debug, Deserialize)]
struct RegisterReply {
    agent: Agent,
}

#[derive(Debug, Deserialize)]
struct ChannelWithStats {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct AcceptReply {
    invitation: Invitation,
    #[serde(rename = "wrappedKey")]
    wrapped_key: WrappedKey,
}

#[derive(Debug, Serialize)]
struct AddCredentialBody {
    contract: String,
    #[serde(rename = "assetId")]
    asset_id: String,
    schema: Option<String>,
}

/// A decrypted message alongside the envelope it was relayed in.
#[derive(Debug, Clone)]
pub struct DecryptedMessage {
    pub envelope: EncryptedMessage,
    pub content: MessageContent,
}

/// Pagination/filter knobs for [`Client::read_messages`], mirroring the
/// server's query parameters.
#[derive(Debug, Clone, Default)]
pub struct ReadMessagesOptions {
    pub limit: Option<usize>,
    pub before: Option<i64>,
    pub after: Option<i64>,
}

/// Filter knobs for [`Client::search`], mirroring the server's query
/// parameters for `GET /agents/search`.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub capabilities: Vec<String>,
    pub min_reputation: Option<u8>,
    pub nft_contract: Option<String>,
    pub nft_schema: Option<String>,
}

pub struct Client {
    http: reqwest::Client,
    base_url: String,
    key_store: Arc<dyn KeyStore>,
    credentials: RwLock<Option<Credentials>>,
    cache: ChannelKeyCache,
}

impl Client {
    /// Builds a client against `base_url`, loading any credentials the
    /// given [`KeyStore`] already holds. Does not contact the server.
    pub fn new(base_url: impl Into<String>, key_store: Arc<dyn KeyStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .user_agent(APP_USER_AGENT)
            .build()?;
        let credentials = key_store.load()?;
        Ok(Client {
            http,
            base_url: base_url.into(),
            key_store,
            credentials: RwLock::new(credentials),
            cache: ChannelKeyCache::new(),
        })
    }

    /// This client's DID, once registered or restored from the key store.
    pub async fn did(&self) -> Option<String> {
        self.credentials.read().await.as_ref().map(|c| c.did.clone())
    }

    /// Generates a fresh identity, signs a registration request, and
    /// registers it with the server. Persists the new credentials via the
    /// configured [`KeyStore`] before returning.
    pub async fn register(&self, profile: Profile) -> Result<Agent, ClientError> {
        let agreement = generate_agreement_keypair();
        let signing = generate_signing_keypair();
        let request = build_signed_registration(
            agreement.public_key.clone(),
            signing.public_key.clone(),
            &signing.private_key,
            profile,
        )?;

        let reply: RegisterReply = self
            .send(self.http.post(self.url("/agents/register")).json(&request))
            .await?;

        let credentials = Credentials {
            did: reply.agent.did.clone(),
            agreement,
            signing,
        };
        self.key_store.save(&credentials)?;
        *self.credentials.write().await = Some(credentials);
        Ok(reply.agent)
    }

    /// Forgets the locally held identity and decrypted channel keys. The
    /// server-side agent record is untouched.
    pub async fn logout(&self) -> Result<(), ClientError> {
        *self.credentials.write().await = None;
        self.key_store.clear()?;
        self.cache.clear().await;
        Ok(())
    }

    pub async fn get_agent(&self, did: &str) -> Result<Agent, ClientError> {
        self.send(self.http.get(self.url(&format!("/agents/{did}")))).await
    }

    /// Searches the agent directory by capability, minimum reputation, and/or
    /// verified-credential contract/schema.
    pub async fn search(&self, query: SearchQuery) -> Result<Vec<Agent>, ClientError> {
        let mut params = Vec::new();
        if !query.capabilities.is_empty() {
            params.push(("capabilities".to_string(), query.capabilities.join(",")));
        }
        if let Some(min_reputation) = query.min_reputation {
            params.push(("minReputation".to_string(), min_reputation.to_string()));
        }
        if let Some(nft_contract) = query.nft_contract {
            params.push(("nftContract".to_string(), nft_contract));
        }
        if let Some(nft_schema) = query.nft_schema {
            params.push(("nftSchema".to_string(), nft_schema));
        }

        let request = self.http.get(self.url("/agents/search")).query(&params);
        self.send(request).await
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Agent, ClientError> {
        let creds = self.require_credentials().await?;
        self.send(
            self.authed(self.http.patch(self.url(&format!("/agents/{}", creds.did))), &creds.did)
                .json(&update),
        )
        .await
    }

    pub async fn add_credential(
        &self,
        contract: String,
        asset_id: String,
        schema: Option<String>,
    ) -> Result<Agent, ClientError> {
        let creds = self.require_credentials().await?;
        let body = AddCredentialBody { contract, asset_id, schema };
        self.send(
            self.authed(self.http.post(self.url(&format!("/agents/{}/nft", creds.did))), &creds.did)
                .json(&body),
        )
        .await
    }

    /// Creates a channel, wrapping a freshly generated channel key under an
    /// ECDH secret derived against each invitee's published agreement
    /// public key. Only the wrapped blobs ever reach the server.
    pub async fn create_channel(
        &self,
        invitee_dids: &[String],
        access_control: Option<AccessControlPolicy>,
        metadata: Option<ChannelMetadata>,
    ) -> Result<(Channel, Vec<Invitation>), ClientError> {
        let creds = self.require_credentials().await?;
        let channel_key = generate_channel_key();

        let mut invitees = Vec::with_capacity(invitee_dids.len());
        for did in invitee_dids {
            let invitee = self.get_agent(did).await?;
            let shared = derive_shared_secret(&creds.agreement.private_key, &invitee.agreement_public_key)?;
            let wrapped = wrap_channel_key(&shared, &channel_key)?;
            invitees.push(InviteeWire { did: did.clone(), wrapped_key: wrapped });
        }

        let body = CreateChannelBody { invitees, access_control, metadata };
        let reply: CreateChannelReply = self
            .send(self.authed(self.http.post(self.url("/channels")), &creds.did).json(&body))
            .await?;

        self.cache.insert(reply.channel.id.clone(), channel_key).await;
        Ok((reply.channel, reply.invitations))
    }

    pub async fn list_channels(&self) -> Result<Vec<Channel>, ClientError> {
        let creds = self.require_credentials().await?;
        let replies: Vec<ChannelWithStats> =
            self.send(self.authed(self.http.get(self.url("/channels")), &creds.did)).await?;
        Ok(replies.into_iter().map(|r| r.channel).collect())
    }

    pub async fn get_channel(&self, channel_id: &str) -> Result<Channel, ClientError> {
        let creds = self.require_credentials().await?;
        let reply: ChannelWithStats = self
            .send(self.authed(self.http.get(self.url(&format!("/channels/{channel_id}"))), &creds.did))
            .await?;
        Ok(reply.channel)
    }

    pub async fn join_channel(&self, channel_id: &str) -> Result<Channel, ClientError> {
        let creds = self.require_credentials().await?;
        self.send(self.authed(self.http.post(self.url(&format!("/channels/{channel_id}/join"))), &creds.did))
            .await
    }

    pub async fn leave_channel(&self, channel_id: &str) -> Result<(), ClientError> {
        let creds = self.require_credentials().await?;
        self.send(self.authed(self.http.post(self.url(&format!("/channels/{channel_id}/leave"))), &creds.did))
            .await
    }

    pub async fn list_invitations(&self) -> Result<Vec<Invitation>, ClientError> {
        let creds = self.require_credentials().await?;
        self.send(self.authed(self.http.get(self.url("/invitations")), &creds.did)).await
    }

    /// Accepts an invitation, then unwraps the returned channel key under an
    /// ECDH secret derived against the inviter's agreement public key, and
    /// caches it for subsequent `send_message`/`read_messages` calls.
    pub async fn accept_invitation(&self, invitation_id: &str) -> Result<Invitation, ClientError> {
        let creds = self.require_credentials().await?;
        let reply: AcceptReply = self
            .send(self.authed(
                self.http.post(self.url(&format!("/invitations/{invitation_id}/accept"))),
                &creds.did,
            ))
            .await?;

        let inviter = self.get_agent(&reply.invitation.inviter).await?;
        let shared = derive_shared_secret(&creds.agreement.private_key, &inviter.agreement_public_key)?;
        let channel_key = unwrap_channel_key(&shared, &reply.wrapped_key)?;
        self.cache.insert(reply.invitation.channel_id.clone(), channel_key).await;
        Ok(reply.invitation)
    }

    pub async fn reject_invitation(&self, invitation_id: &str) -> Result<(), ClientError> {
        let creds = self.require_credentials().await?;
        self.send(self.authed(
            self.http.post(self.url(&format!("/invitations/{invitation_id}/reject"))),
            &creds.did,
        ))
        .await
    }

    /// Encrypts `content` under the cached channel key and sends it. Fails
    /// with [`ClientError::UnknownRecipient`] if this client never learned
    /// the channel's key (it neither created the channel nor accepted an
    /// invitation into it this session).
    pub async fn send_message(
        &self,
        channel_id: &str,
        content: &MessageContent,
    ) -> Result<EncryptedMessage, ClientError> {
        let creds = self.require_credentials().await?;
        let key = self.channel_key(channel_id).await?;

        let plaintext = content.to_plaintext();
        let (ciphertext, nonce) = encrypt(&key, &plaintext)?;
        let request = MessageSendRequest {
            channel_id: channel_id.to_string(),
            nonce_b64: to_base64(&nonce),
            ciphertext_b64: to_base64(&ciphertext),
            ephemeral_public_key: None,
        };

        self.send(
            self.authed(self.http.post(self.url(&format!("/channels/{channel_id}/messages"))), &creds.did)
                .json(&request),
        )
        .await
    }

    /// Fetches and decrypts messages from a channel this client holds the
    /// key for.
    pub async fn read_messages(
        &self,
        channel_id: &str,
        options: ReadMessagesOptions,
    ) -> Result<Vec<DecryptedMessage>, ClientError> {
        let creds = self.require_credentials().await?;
        let key = self.channel_key(channel_id).await?;

        let mut query = Vec::new();
        if let Some(limit) = options.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(before) = options.before {
            query.push(("before".to_string(), before.to_string()));
        }
        if let Some(after) = options.after {
            query.push(("after".to_string(), after.to_string()));
        }

        let request = self
            .authed(self.http.get(self.url(&format!("/channels/{channel_id}/messages"))), &creds.did)
            .query(&query);
        let messages: Vec<EncryptedMessage> = self.send(request).await?;

        let mut decrypted = Vec::with_capacity(messages.len());
        for envelope in messages {
            let ciphertext = from_base64(&envelope.ciphertext_b64)?;
            let nonce_bytes = from_base64(&envelope.nonce_b64)?;
            let nonce: [u8; NONCE_LEN] = nonce_bytes.try_into().map_err(|_| PrivacyError::Crypto)?;
            let plaintext = decrypt(&key, &ciphertext, &nonce)?;
            let content = MessageContent::from_plaintext(&plaintext).map_err(|_| PrivacyError::Crypto)?;
            decrypted.push(DecryptedMessage { envelope, content });
        }
        Ok(decrypted)
    }

    async fn channel_key(&self, channel_id: &str) -> Result<[u8; 32], ClientError> {
        self.cache
            .get(channel_id)
            .await
            .ok_or_else(|| ClientError::UnknownRecipient(channel_id.to_string()))
    }

    async fn require_credentials(&self) -> Result<Credentials, ClientError> {
        self.credentials.read().await.clone().ok_or(ClientError::NotRegistered)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authed(&self, builder: reqwest::RequestBuilder, did: &str) -> reqwest::RequestBuilder {
        builder.header(DID_HEADER, did)
    }

    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let envelope: Envelope<T> = response.json().await?;
        if envelope.success {
            envelope
                .data
                .ok_or_else(|| ClientError::Server { status, message: "missing data".into() })
        } else {
            Err(ClientError::Server {
                status,
                message: envelope.error.unwrap_or_else(|| "request failed".into()),
            })
        }
    }
}
