// =============================================================================
// Response Envelope
// =============================================================================
//
// Every endpoint answers with the same wrapper:
//
//   success: { "success": true,  "status": 200, "timestamp": ..., "data": ... }
//   failure: { "success": false, "status": ..., "timestamp": ...,
//              "error": { "code": ..., "message": ... } }
//
// Engine errors are translated by kind; computation details never leave the
// server unsanitized.
// =============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::error;

use crate::error::AnalysisError;

/// Successful envelope around a serializable payload.
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T: Serialize> {
    pub success: bool,
    pub status: u16,
    pub timestamp: String,
    pub data: T,
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            status: StatusCode::OK.as_u16(),
            timestamp: Utc::now().to_rfc3339(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Error envelope with a stable machine-readable code.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub status: u16,
    pub timestamp: String,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            success: false,
            status: status.as_u16(),
            timestamp: Utc::now().to_rfc3339(),
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Translate an engine error into its transport shape. Server faults are
    /// logged here with their full message before sanitization.
    pub fn from_analysis(err: &AnalysisError) -> Self {
        if !err.is_client_fault() {
            error!(code = err.error_code(), error = %err, "engine error");
        }
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.error_code(), &err.sanitized_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let env = ApiSuccess::new(serde_json::json!({ "score": 85 }));
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["status"], 200);
        assert_eq!(json["data"]["score"], 85);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn error_envelope_from_client_fault() {
        let err = AnalysisError::InsufficientData { rows: 1 };
        let env = ApiError::from_analysis(&err);
        assert!(!env.success);
        assert_eq!(env.status, 400);
        assert_eq!(env.error.code, "INSUFFICIENT_DATA");
        assert!(env.error.message.contains("2 usable rows"));
    }

    #[test]
    fn error_envelope_sanitizes_computation_details() {
        let err = AnalysisError::ComputationError("secret internals".into());
        let env = ApiError::from_analysis(&err);
        assert_eq!(env.status, 500);
        assert_eq!(env.error.code, "COMPUTATION_ERROR");
        assert!(!env.error.message.contains("secret"));
    }

    #[test]
    fn data_unavailable_maps_to_bad_gateway() {
        let err = AnalysisError::DataUnavailable("upstream down".into());
        let env = ApiError::from_analysis(&err);
        assert_eq!(env.status, 502);
    }
}
