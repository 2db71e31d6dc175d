pub mod agents;
pub mod channels;
pub mod invitations;
pub mod messages;
