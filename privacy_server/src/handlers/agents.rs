use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use structured_logger::unix_ms;

use privacy_core::identity::{Agent, ProfileUpdate, RegistrationRequest};
use privacy_core::PrivacyError;

use crate::auth::AuthenticatedAgent;
use crate::response::{ApiOk, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub did: String,
    pub agent: Agent,
}

/// POST /agents/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegistrationRequest>,
) -> ApiResult<RegisterResponse> {
    let agent = Agent::register(req, unix_ms() as i64)?;
    state.storage.agents.save_new(&agent).await?;
    log::info!("registered agent {}", agent.did);
    Ok(ApiOk(
        StatusCode::CREATED,
        RegisterResponse { did: agent.did.clone(), agent },
    ))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub capabilities: Option<String>,
    #[serde(rename = "minReputation")]
    pub min_reputation: Option<u8>,
    #[serde(rename = "nftContract")]
    pub nft_contract: Option<String>,
    #[serde(rename = "nftSchema")]
    pub nft_schema: Option<String>,
}

/// GET /agents/search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<Agent>> {
    let capabilities = params
        .capabilities
        .map(|csv| csv.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let results = state
        .storage
        .agents
        .search(&privacy_storage::AgentSearchQuery {
            capabilities,
            min_reputation: params.min_reputation,
            nft_contract: params.nft_contract,
            nft_schema: params.nft_schema,
        })
        .await?;
    Ok(ApiOk(StatusCode::OK, results))
}

/// GET /agents/:did
pub async fn get_agent(State(state): State<AppState>, Path(did): Path<String>) -> ApiResult<Agent> {
    privacy_core::identity::validate_did(&did)
        .map_err(|_| PrivacyError::Validation("invalid DID format".into()))?;
    let agent = state
        .storage
        .agents
        .get(&did)
        .await?
        .ok_or_else(|| PrivacyError::NotFound("agent not found".into()))?;
    Ok(ApiOk(StatusCode::OK, agent))
}

/// PATCH /agents/:did
pub async fn update_profile(
    AuthenticatedAgent(caller): AuthenticatedAgent,
    State(state): State<AppState>,
    Path(did): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Agent> {
    if caller.did != did {
        return Err(PrivacyError::Authorization("can only edit your own profile".into()).into());
    }
    let mut agent = caller;
    agent.update_profile(update);
    state.storage.agents.save(&agent).await?;
    Ok(ApiOk(StatusCode::OK, agent))
}

#[derive(Debug, Deserialize)]
pub struct AddCredentialRequest {
    pub contract: String,
    #[serde(rename = "assetId")]
    pub asset_id: String,
    pub schema: Option<String>,
}

/// POST /agents/:did/nft
pub async fn add_credential(
    AuthenticatedAgent(caller): AuthenticatedAgent,
    State(state): State<AppState>,
    Path(did): Path<String>,
    Json(req): Json<AddCredentialRequest>,
) -> ApiResult<Agent> {
    if caller.did != did {
        return Err(PrivacyError::Authorization("can only edit your own credentials".into()).into());
    }
    let mut agent = caller;
    agent.add_credential(req.contract, req.asset_id, req.schema);
    state.storage.agents.save(&agent).await?;
    Ok(ApiOk(StatusCode::OK, agent))
}
