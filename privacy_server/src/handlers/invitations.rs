use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use structured_logger::unix_ms;

use privacy_core::channel::{accept_invitation, reject_invitation, Invitation, InvitationStatus};
use privacy_core::crypto::WrappedKey;
use privacy_core::PrivacyError;

use crate::auth::AuthenticatedAgent;
use crate::response::{ApiOk, ApiResult};
use crate::state::AppState;

/// GET /invitations — the caller's still-pending invitations.
pub async fn list_invitations(
    AuthenticatedAgent(caller): AuthenticatedAgent,
    State(state): State<AppState>,
) -> ApiResult<Vec<Invitation>> {
    let now = unix_ms() as i64;
    let all = state.storage.invitations.list_for_agent(&caller.did, now).await?;
    let pending = all
        .into_iter()
        .filter(|inv| inv.status == InvitationStatus::Pending)
        .collect();
    Ok(ApiOk(StatusCode::OK, pending))
}

#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub invitation: Invitation,
    #[serde(rename = "wrappedKey")]
    pub wrapped_key: WrappedKey,
}

/// POST /invitations/:id/accept
pub async fn accept(
    AuthenticatedAgent(caller): AuthenticatedAgent,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<AcceptResponse> {
    let mut invitation = state
        .storage
        .invitations
        .get(&id)
        .await?
        .ok_or_else(|| PrivacyError::NotFound("invitation not found".into()))?;

    accept_invitation(&mut invitation, &caller.did, unix_ms() as i64)?;
    state.storage.invitations.save_status(&invitation).await?;

    if invitation.status == InvitationStatus::Accepted {
        if let Some(mut chan) = state.storage.channels.get(&invitation.channel_id).await? {
            privacy_core::channel::add_participant(&mut chan, &caller.did)?;
            state.storage.channels.save(&chan).await?;
        }
    }

    let wrapped_key = invitation.wrapped_key.clone();
    Ok(ApiOk(StatusCode::OK, AcceptResponse { invitation, wrapped_key }))
}

/// POST /invitations/:id/reject
pub async fn reject(
    AuthenticatedAgent(caller): AuthenticatedAgent,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let mut invitation = state
        .storage
        .invitations
        .get(&id)
        .await?
        .ok_or_else(|| PrivacyError::NotFound("invitation not found".into()))?;
    reject_invitation(&mut invitation, &caller.did)?;
    state.storage.invitations.save_status(&invitation).await?;
    Ok(ApiOk(StatusCode::OK, ()))
}
