//! Channel lifecycle, access control, and encrypted-message handling.

pub mod access;
pub mod content;
pub mod lifecycle;
pub mod message;
pub mod model;

pub use access::{decide_access, AccessDecision};
pub use content::MessageContent;
pub use lifecycle::{
    accept_invitation, add_participant, create_channel, refresh_expiry, reject_invitation,
    remove_participant, update_access_control, Invitee,
};
pub use message::{build_envelope, compute_stats, is_expired, validate_send, ChannelStats};
pub use model::{
    AccessControlPolicy, Channel, ChannelMetadata, EncryptedMessage, EncryptionConfig, Invitation,
    InvitationStatus, MessageSendRequest, INVITATION_TTL_MS,
};
