//! The `{success, data?, error?, hint?}` envelope every endpoint returns,
//! and the `PrivacyError` -> HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use privacy_core::PrivacyError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope { success: true, data: Some(data), error: None, hint: None }
    }
}

/// Wraps a successful payload with the HTTP status code it should be sent
/// under (201 for creation endpoints, 200 otherwise).
pub struct ApiOk<T: Serialize>(pub StatusCode, pub T);

impl<T: Serialize> IntoResponse for ApiOk<T> {
    fn into_response(self) -> Response {
        (self.0, Json(Envelope::ok(self.1))).into_response()
    }
}

/// Wraps a [`PrivacyError`] for the handler's `Result` error arm, converting
/// it into the envelope's `{success: false, error, hint}` shape plus the
/// status code from [`PrivacyError::status_code`]'s taxonomy.
pub struct ApiError(pub PrivacyError);

impl From<PrivacyError> for ApiError {
    fn from(err: PrivacyError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            log::error!("request failed: {}", self.0);
        }
        let envelope: Envelope<()> = Envelope {
            success: false,
            data: None,
            error: Some(self.0.to_string()),
            hint: self.0.hint(),
        };
        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiOk<T>, ApiError>;
