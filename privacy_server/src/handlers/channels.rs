use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use structured_logger::unix_ms;

use privacy_core::channel::{
    self, AccessControlPolicy, Channel, ChannelMetadata, ChannelStats, Invitation, Invitee,
};
use privacy_core::crypto::WrappedKey;
use privacy_core::PrivacyError;

use crate::auth::AuthenticatedAgent;
use crate::response::{ApiOk, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InviteeRequest {
    pub did: String,
    #[serde(rename = "wrappedKey")]
    pub wrapped_key: WrappedKey,
}

#[derive(Debug, Deserialize)]
pub struct CreateChannelRequest {
    pub invitees: Vec<InviteeRequest>,
    #[serde(rename = "accessControl")]
    pub access_control: Option<AccessControlPolicy>,
    pub metadata: Option<ChannelMetadata>,
}

#[derive(Debug, Serialize)]
pub struct CreateChannelResponse {
    pub channel: Channel,
    pub invitations: Vec<Invitation>,
}

/// POST /channels
pub async fn create_channel(
    AuthenticatedAgent(caller): AuthenticatedAgent,
    State(state): State<AppState>,
    Json(req): Json<CreateChannelRequest>,
) -> ApiResult<CreateChannelResponse> {
    let mut invitees = Vec::with_capacity(req.invitees.len());
    for invitee in req.invitees {
        state
            .storage
            .agents
            .get(&invitee.did)
            .await?
            .ok_or_else(|| PrivacyError::NotFound(format!("invitee not found: {}", invitee.did)))?;
        invitees.push(Invitee { did: invitee.did, wrapped_key: invitee.wrapped_key });
    }
    let channel_id = privacy_core::crypto::random_id(Some("chan"));

    let (channel_record, invitations) = channel::create_channel(
        channel_id,
        &caller.did,
        invitees,
        req.access_control,
        req.metadata,
        unix_ms() as i64,
    )?;

    state.storage.channels.save(&channel_record).await?;
    for invitation in &invitations {
        state.storage.invitations.save(invitation).await?;
    }

    Ok(ApiOk(
        StatusCode::CREATED,
        CreateChannelResponse { channel: channel_record, invitations },
    ))
}

#[derive(Debug, Serialize)]
pub struct ChannelWithStats {
    pub channel: Channel,
    pub stats: ChannelStats,
}

async fn load_with_stats(state: &AppState, channel: Channel) -> Result<ChannelWithStats, PrivacyError> {
    let now = unix_ms() as i64;
    let messages = state
        .storage
        .messages
        .list(&channel, usize::MAX, None, None, now)
        .await?;
    let stats = channel::compute_stats(&channel, &messages, now);
    Ok(ChannelWithStats { channel, stats })
}

/// GET /channels
pub async fn list_channels(
    AuthenticatedAgent(caller): AuthenticatedAgent,
    State(state): State<AppState>,
) -> ApiResult<Vec<ChannelWithStats>> {
    let channels = state.storage.channels.list_for_agent(&caller.did).await?;
    let mut results = Vec::with_capacity(channels.len());
    for channel in channels {
        results.push(load_with_stats(&state, channel).await?);
    }
    Ok(ApiOk(StatusCode::OK, results))
}

async fn authorize_read(state: &AppState, channel: &Channel, caller_did: &str) -> Result<(), PrivacyError> {
    let candidate = state.storage.agents.get(caller_did).await?;
    let decision = channel::decide_access(channel, caller_did, candidate.as_ref());
    if !decision.allowed {
        return Err(PrivacyError::Authorization(
            decision.reason.unwrap_or_else(|| "access denied".into()),
        ));
    }
    Ok(())
}

/// GET /channels/:id
pub async fn get_channel(
    AuthenticatedAgent(caller): AuthenticatedAgent,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ChannelWithStats> {
    let channel = state
        .storage
        .channels
        .get(&id)
        .await?
        .ok_or_else(|| PrivacyError::NotFound("channel not found".into()))?;
    authorize_read(&state, &channel, &caller.did).await?;
    Ok(ApiOk(StatusCode::OK, load_with_stats(&state, channel).await?))
}

/// POST /channels/:id/join
pub async fn join_channel(
    AuthenticatedAgent(caller): AuthenticatedAgent,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Channel> {
    let mut chan = state
        .storage
        .channels
        .get(&id)
        .await?
        .ok_or_else(|| PrivacyError::NotFound("channel not found".into()))?;
    authorize_read(&state, &chan, &caller.did).await?;
    channel::add_participant(&mut chan, &caller.did)?;
    state.storage.channels.save(&chan).await?;
    Ok(ApiOk(StatusCode::OK, chan))
}

/// POST /channels/:id/leave
pub async fn leave_channel(
    AuthenticatedAgent(caller): AuthenticatedAgent,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let mut chan = state
        .storage
        .channels
        .get(&id)
        .await?
        .ok_or_else(|| PrivacyError::NotFound("channel not found".into()))?;
    channel::remove_participant(&mut chan, &caller.did, &caller.did)?;
    state.storage.channels.save(&chan).await?;
    state.storage.channels.unindex_participant(&caller.did, &id).await?;
    Ok(ApiOk(StatusCode::OK, ()))
}
