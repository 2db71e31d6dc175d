//! The `X-Agent-DID` authentication extractor. Runs ahead of every handler
//! body, resolving and validating the caller before dispatch rather than
//! inside each handler.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use privacy_core::identity::{validate_did, Agent};
use privacy_core::PrivacyError;

use crate::response::ApiError;
use crate::state::AppState;

pub const DID_HEADER: &str = "X-Agent-DID";

pub struct AuthenticatedAgent(pub Agent);

impl FromRequestParts<AppState> for AuthenticatedAgent {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let did = parts
            .headers
            .get(DID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| PrivacyError::Authentication(format!("missing {DID_HEADER} header")))?;

        validate_did(did).map_err(|_| PrivacyError::Authentication("invalid DID format".into()))?;

        let agent = state
            .storage
            .agents
            .get(did)
            .await?
            .ok_or_else(|| PrivacyError::Authentication("no such registered agent".into()))?;

        Ok(AuthenticatedAgent(agent))
    }
}
