//! Mapping pipeline errors onto HTTP responses.
//!
//! Client faults (`Validation`, `Transport`) are 400; everything else is
//! 500. The body is always `{"error": <kind>, "message": <text>}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use audittrail_contracts::AuditTrailError;

/// An `AuditTrailError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub AuditTrailError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<AuditTrailError> for ApiError {
    fn from(err: AuditTrailError) -> Self {
        Self(err)
    }
}

/// A body that parsed as JSON but has the wrong shape is a validation
/// error; anything that is not JSON at all is a transport error.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let reason = rejection.body_text();
        let err = match rejection {
            JsonRejection::JsonDataError(_) => AuditTrailError::Validation { reason },
            _ => AuditTrailError::Transport { reason },
        };
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, "request rejected");
        }
        let body = json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
