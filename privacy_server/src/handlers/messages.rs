use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use structured_logger::unix_ms;

use privacy_core::channel::{build_envelope, validate_send, EncryptedMessage, MessageSendRequest};
use privacy_core::PrivacyError;

use crate::auth::AuthenticatedAgent;
use crate::response::{ApiOk, ApiResult};
use crate::state::AppState;

const MAX_LIMIT: usize = 100;
const DEFAULT_LIMIT: usize = 50;

/// POST /channels/:id/messages
pub async fn send_message(
    AuthenticatedAgent(caller): AuthenticatedAgent,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MessageSendRequest>,
) -> ApiResult<EncryptedMessage> {
    let channel = state
        .storage
        .channels
        .get(&id)
        .await?
        .ok_or_else(|| PrivacyError::NotFound("channel not found".into()))?;

    validate_send(&channel, &caller.did, &req)?;
    let message = build_envelope(&channel, &caller.did, req, unix_ms() as i64);
    state.storage.messages.save(&message).await?;
    Ok(ApiOk(StatusCode::CREATED, message))
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<usize>,
    pub before: Option<i64>,
    pub after: Option<i64>,
}

/// GET /channels/:id/messages
pub async fn list_messages(
    AuthenticatedAgent(caller): AuthenticatedAgent,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<Vec<EncryptedMessage>> {
    let channel = state
        .storage
        .channels
        .get(&id)
        .await?
        .ok_or_else(|| PrivacyError::NotFound("channel not found".into()))?;

    let candidate = state.storage.agents.get(&caller.did).await?;
    let decision = privacy_core::channel::decide_access(&channel, &caller.did, candidate.as_ref());
    if !decision.allowed {
        return Err(PrivacyError::Authorization(decision.reason.unwrap_or_else(|| "access denied".into())).into());
    }

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let now = unix_ms() as i64;
    let messages = state
        .storage
        .messages
        .list(&channel, limit, query.before, query.after, now)
        .await?;
    Ok(ApiOk(StatusCode::OK, messages))
}
