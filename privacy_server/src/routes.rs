use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{agents, channels, invitations, messages};
use crate::state::AppState;

/// Assembles the full HTTP endpoint table onto a single axum `Router`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/agents/register", post(agents::register))
        .route("/agents/search", get(agents::search))
        .route("/agents/{did}", get(agents::get_agent).patch(agents::update_profile))
        .route("/agents/{did}/nft", post(agents::add_credential))
        .route("/channels", post(channels::create_channel).get(channels::list_channels))
        .route("/channels/{id}", get(channels::get_channel))
        .route("/channels/{id}/join", post(channels::join_channel))
        .route("/channels/{id}/leave", post(channels::leave_channel))
        .route("/invitations", get(invitations::list_invitations))
        .route("/invitations/{id}/accept", post(invitations::accept))
        .route("/invitations/{id}/reject", post(invitations::reject))
        .route("/channels/{id}/messages", post(messages::send_message).get(messages::list_messages))
        .with_state(state)
}
