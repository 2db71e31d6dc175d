//! Blob key shapes for the flat namespace. Exact string shapes are part of
//! the external contract — backup/restore tooling depends on them.

use url::form_urlencoded;

pub const AGENTS_PREFIX: &str = "privacy/agents/";

fn encode_did(did: &str) -> String {
    form_urlencoded::byte_serialize(did.as_bytes()).collect()
}

pub fn agent_key(did: &str) -> String {
    format!("{AGENTS_PREFIX}{}.json", encode_did(did))
}

pub fn agent_channels_index_key(did: &str) -> String {
    format!("{AGENTS_PREFIX}{}/channels.json", encode_did(did))
}

pub fn agent_invitations_index_key(did: &str) -> String {
    format!("{AGENTS_PREFIX}{}/invitations.json", encode_did(did))
}

pub fn channel_key(channel_id: &str) -> String {
    format!("privacy/channels/{channel_id}/metadata.json")
}

pub fn channel_messages_prefix(channel_id: &str) -> String {
    format!("privacy/channels/{channel_id}/messages/")
}

pub fn channel_message_key(channel_id: &str, message_id: &str) -> String {
    format!("{}{}.json", channel_messages_prefix(channel_id), message_id)
}

pub fn invitation_key(invitation_id: &str) -> String {
    format!("privacy/invitations/{invitation_id}.json")
}

/// True for an agent record key, false for an index file (`.../channels.json`
/// or `.../invitations.json`) living one path segment deeper.
pub fn is_agent_record_key(key: &str) -> bool {
    match key.strip_prefix(AGENTS_PREFIX) {
        Some(rest) => !rest.contains('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_record_key_has_no_nested_segment() {
        let did = "did:moltbook:abc";
        assert!(is_agent_record_key(&agent_key(did)));
        assert!(!is_agent_record_key(&agent_channels_index_key(did)));
        assert!(!is_agent_record_key(&agent_invitations_index_key(did)));
    }

    #[test]
    fn message_key_nests_under_channel_messages_prefix() {
        let key = channel_message_key("chan-1", "msg-1");
        assert!(key.starts_with(&channel_messages_prefix("chan-1")));
        assert_eq!(key, "privacy/channels/chan-1/messages/msg-1.json");
    }
}
