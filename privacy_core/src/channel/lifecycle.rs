//! Channel creation, participant edits, and the invitation state machine.

use std::collections::BTreeSet;

use crate::crypto::ident::random_id;
use crate::crypto::symmetric::WrappedKey;
use crate::error::PrivacyError;

use super::model::{
    AccessControlPolicy, Channel, ChannelMetadata, EncryptionConfig, Invitation, InvitationStatus,
    INVITATION_TTL_MS,
};

/// One invitee's already-wrapped channel key, computed by the caller
/// (a client orchestrator) before this function ever runs. This module
/// never sees a channel key or a private key.
#[derive(Debug, Clone)]
pub struct Invitee {
    pub did: String,
    pub wrapped_key: WrappedKey,
}

/// Builds a channel record and one pending invitation per non-creator
/// participant. The caller MUST have already resolved every invitee DID to
/// an existing agent (this module has no storage access to do so itself);
/// `privacy_server`'s handler performs that lookup before calling in, so an
/// invitation naming an unregistered DID is never persisted.
pub fn create_channel(
    channel_id: String,
    creator: &str,
    invitees: Vec<Invitee>,
    access_control: Option<AccessControlPolicy>,
    metadata: Option<ChannelMetadata>,
    now_ms: i64,
) -> Result<(Channel, Vec<Invitation>), PrivacyError> {
    if invitees.is_empty() {
        return Err(PrivacyError::Validation("invitee list must not be empty".into()));
    }

    let mut participants: BTreeSet<String> = BTreeSet::new();
    participants.insert(creator.to_string());
    for invitee in &invitees {
        participants.insert(invitee.did.clone());
    }

    if let Some(meta) = &metadata {
        if let Some(max) = meta.max_participants {
            if participants.len() > max {
                return Err(PrivacyError::State("max participants reached".into()));
            }
        }
    }

    let access = access_control.unwrap_or(AccessControlPolicy::InviteOnly {
        allow_list: BTreeSet::new(),
    });

    let channel = Channel {
        id: channel_id.clone(),
        participants,
        creator: creator.to_string(),
        created_at: now_ms,
        encryption: EncryptionConfig::default(),
        access_control: Some(access),
        metadata,
    };

    let invitations = invitees
        .into_iter()
        .filter(|invitee| invitee.did != creator)
        .map(|invitee| Invitation {
            id: random_id(Some("inv")),
            channel_id: channel_id.clone(),
            inviter: creator.to_string(),
            invitee: invitee.did,
            created_at: now_ms,
            expires_at: now_ms + INVITATION_TTL_MS,
            wrapped_key: invitee.wrapped_key,
            status: InvitationStatus::Pending,
        })
        .collect();

    Ok((channel, invitations))
}

/// Lazily promotes an expired pending invitation. Idempotent and safe to
/// call on every read.
pub fn refresh_expiry(invitation: &mut Invitation, now_ms: i64) {
    if invitation.status == InvitationStatus::Pending && now_ms > invitation.expires_at {
        invitation.status = InvitationStatus::Expired;
    }
}

/// pending -> accepted (or -> expired, if the expiry already passed).
/// Any non-pending invitation errors as an illegal state transition.
pub fn accept_invitation(
    invitation: &mut Invitation,
    caller: &str,
    now_ms: i64,
) -> Result<(), PrivacyError> {
    if invitation.invitee != caller {
        return Err(PrivacyError::Authorization(
            "invitation not addressed to caller".into(),
        ));
    }
    match invitation.status {
        InvitationStatus::Pending => {
            if now_ms > invitation.expires_at {
                invitation.status = InvitationStatus::Expired;
            } else {
                invitation.status = InvitationStatus::Accepted;
            }
            Ok(())
        }
        _ => Err(PrivacyError::State("illegal state".into())),
    }
}

/// pending -> rejected. Any non-pending invitation errors.
pub fn reject_invitation(invitation: &mut Invitation, caller: &str) -> Result<(), PrivacyError> {
    if invitation.invitee != caller {
        return Err(PrivacyError::Authorization(
            "invitation not addressed to caller".into(),
        ));
    }
    match invitation.status {
        InvitationStatus::Pending => {
            invitation.status = InvitationStatus::Rejected;
            Ok(())
        }
        _ => Err(PrivacyError::State("illegal state".into())),
    }
}

/// Adds a participant, idempotent on an already-present DID.
pub fn add_participant(channel: &mut Channel, did: &str) -> Result<(), PrivacyError> {
    if channel.participants.contains(did) {
        return Ok(());
    }
    if let Some(meta) = &channel.metadata {
        if let Some(max) = meta.max_participants {
            if channel.participants.len() + 1 > max {
                return Err(PrivacyError::State("max participants reached".into()));
            }
        }
    }
    channel.participants.insert(did.to_string());
    Ok(())
}

/// Removes `target`, authorized when `remover` is `target` (self-leave) or
/// the channel's creator. The creator may never be removed this way.
pub fn remove_participant(
    channel: &mut Channel,
    target: &str,
    remover: &str,
) -> Result<(), PrivacyError> {
    if target == channel.creator {
        return Err(PrivacyError::State("Cannot remove channel creator".into()));
    }
    if remover != target && remover != channel.creator {
        return Err(PrivacyError::Authorization("Not authorized".into()));
    }
    channel.participants.remove(target);
    Ok(())
}

/// Replaces the access-control policy atomically. Only the creator may do
/// this.
pub fn update_access_control(
    channel: &mut Channel,
    caller: &str,
    new_policy: AccessControlPolicy,
) -> Result<(), PrivacyError> {
    if caller != channel.creator {
        return Err(PrivacyError::Authorization(
            "only the creator may change access control".into(),
        ));
    }
    channel.access_control = Some(new_policy);
    Ok(())
}
