//! Message send validation, envelope construction, and TTL bookkeeping.

use crate::crypto::ident::random_id;
use crate::error::PrivacyError;

use super::model::{Channel, EncryptedMessage, MessageSendRequest};

/// Checks a send request against channel membership and required fields, in
/// order: sender membership, required fields, then channel id match. Does
/// not touch ciphertext contents — the server is blind to plaintext.
pub fn validate_send(
    channel: &Channel,
    sender: &str,
    req: &MessageSendRequest,
) -> Result<(), PrivacyError> {
    if !channel.participants.contains(sender) {
        return Err(PrivacyError::Authorization("Not a channel participant".into()));
    }
    if req.nonce_b64.is_empty() || req.ciphertext_b64.is_empty() {
        return Err(PrivacyError::Validation("Missing required fields".into()));
    }
    if req.channel_id != channel.id {
        return Err(PrivacyError::Validation("Channel ID mismatch".into()));
    }
    Ok(())
}

/// Builds the stored envelope for an already-validated send request.
pub fn build_envelope(
    channel: &Channel,
    sender: &str,
    req: MessageSendRequest,
    now_ms: i64,
) -> EncryptedMessage {
    EncryptedMessage {
        id: random_id(Some("msg")),
        channel_id: channel.id.clone(),
        sender: sender.to_string(),
        timestamp: now_ms,
        nonce_b64: req.nonce_b64,
        ciphertext_b64: req.ciphertext_b64,
        ephemeral_public_key: req.ephemeral_public_key,
    }
}

/// A message is expired once `message_ttl_secs` has elapsed since it was
/// sent. A channel with no configured TTL never expires messages.
pub fn is_expired(channel: &Channel, message: &EncryptedMessage, now_ms: i64) -> bool {
    let ttl_secs = match channel.metadata.as_ref().and_then(|m| m.message_ttl_secs) {
        Some(ttl) => ttl,
        None => return false,
    };
    let age_ms = now_ms - message.timestamp;
    age_ms > (ttl_secs as i64) * 1000
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStats {
    pub participant_count: usize,
    pub message_count: usize,
    pub last_activity: Option<i64>,
    pub credential_gated: bool,
}

/// Computes channel statistics over the set of non-expired messages as of
/// `now_ms`. `messages` is expected to already be filtered to this channel.
pub fn compute_stats(channel: &Channel, messages: &[EncryptedMessage], now_ms: i64) -> ChannelStats {
    let live: Vec<&EncryptedMessage> = messages
        .iter()
        .filter(|m| !is_expired(channel, m, now_ms))
        .collect();

    let last_activity = live.iter().map(|m| m.timestamp).max();
    let credential_gated = matches!(
        channel.access_control,
        Some(super::model::AccessControlPolicy::CredentialGated { .. })
    );

    ChannelStats {
        participant_count: channel.participants.len(),
        message_count: live.len(),
        last_activity,
        credential_gated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::model::ChannelMetadata;
    use std::collections::BTreeSet;

    fn channel_with_ttl(ttl_secs: Option<u64>) -> Channel {
        Channel {
            id: "chan-1".into(),
            participants: BTreeSet::from(["did:moltbook:creator0000000000000000000000000000".into()]),
            creator: "did:moltbook:creator0000000000000000000000000000".into(),
            created_at: 0,
            encryption: Default::default(),
            access_control: None,
            metadata: Some(ChannelMetadata {
                message_ttl_secs: ttl_secs,
                ..Default::default()
            }),
        }
    }

    fn send_req() -> MessageSendRequest {
        MessageSendRequest {
            channel_id: "chan-1".into(),
            nonce_b64: "bm9uY2U=".into(),
            ciphertext_b64: "Y3Q=".into(),
            ephemeral_public_key: None,
        }
    }

    #[test]
    fn validate_send_rejects_channel_id_mismatch() {
        let channel = channel_with_ttl(None);
        let mut req = send_req();
        req.channel_id = "other-chan".into();
        let err = validate_send(&channel, &channel.creator.clone(), &req).unwrap_err();
        assert_eq!(err, PrivacyError::Validation("Channel ID mismatch".into()));
    }

    #[test]
    fn validate_send_rejects_non_participant() {
        let channel = channel_with_ttl(None);
        let err = validate_send(
            &channel,
            "did:moltbook:outsider000000000000000000000000",
            &send_req(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PrivacyError::Authorization("Not a channel participant".into())
        );
    }

    #[test]
    fn validate_send_rejects_missing_fields() {
        let channel = channel_with_ttl(None);
        let mut req = send_req();
        req.nonce_b64 = String::new();
        let err = validate_send(&channel, &channel.creator.clone(), &req).unwrap_err();
        assert_eq!(err, PrivacyError::Validation("Missing required fields".into()));
    }

    #[test]
    fn validate_send_precedence_participant_before_fields_before_channel_id() {
        let channel = channel_with_ttl(None);
        let mut req = send_req();
        req.channel_id = "other-chan".into();
        req.nonce_b64 = String::new();

        let err = validate_send(
            &channel,
            "did:moltbook:outsider000000000000000000000000",
            &req,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PrivacyError::Authorization("Not a channel participant".into())
        );

        let err = validate_send(&channel, &channel.creator.clone(), &req).unwrap_err();
        assert_eq!(err, PrivacyError::Validation("Missing required fields".into()));
    }

    #[test]
    fn build_envelope_copies_request_fields() {
        let channel = channel_with_ttl(None);
        let envelope = build_envelope(&channel, &channel.creator.clone(), send_req(), 5_000);
        assert_eq!(envelope.channel_id, "chan-1");
        assert_eq!(envelope.timestamp, 5_000);
        assert_eq!(envelope.nonce_b64, "bm9uY2U=");
    }

    #[test]
    fn ttl_expiry_and_stats_match_scenario() {
        let channel = channel_with_ttl(Some(60));
        let now = 1_000_000_i64;

        let stale = EncryptedMessage {
            id: "msg-1".into(),
            channel_id: "chan-1".into(),
            sender: channel.creator.clone(),
            timestamp: now - 120_000,
            nonce_b64: "a".into(),
            ciphertext_b64: "b".into(),
            ephemeral_public_key: None,
        };
        let fresh = EncryptedMessage {
            id: "msg-2".into(),
            channel_id: "chan-1".into(),
            sender: channel.creator.clone(),
            timestamp: now,
            nonce_b64: "a".into(),
            ciphertext_b64: "b".into(),
            ephemeral_public_key: None,
        };

        assert!(is_expired(&channel, &stale, now));
        assert!(!is_expired(&channel, &fresh, now));

        let stats = compute_stats(&channel, &[stale, fresh], now);
        assert_eq!(stats.message_count, 1);
        assert_eq!(stats.last_activity, Some(now));
        assert_eq!(stats.participant_count, 1);
        assert!(!stats.credential_gated);
    }
}
