//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use core_kernel::PortError;
use domain_claims::ClaimError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage is temporarily unavailable; the request may be retried
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The submission deadline elapsed and nothing was recorded
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Whether re-sending the same request may succeed
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, retryable, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", false, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", false, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", false, "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", false, msg.clone()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", false, msg.clone()),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", true, msg.clone()),
            ApiError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "timeout", true, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", false, msg.clone()),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            retryable,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match &err {
            ClaimError::Timeout { .. } => ApiError::Timeout(err.to_string()),
            ClaimError::InvalidSubmission(msg) => ApiError::Validation(msg.clone()),
            ClaimError::Storage { .. } if err.is_retryable() => ApiError::Unavailable(err.to_string()),
            ClaimError::Storage { .. } | ClaimError::Invariant(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(err.to_string())
        } else if err.is_transient() {
            ApiError::Unavailable(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_claims::AdjudicationStage;

    #[test]
    fn test_claim_error_mapping() {
        let timeout: ApiError = ClaimError::Timeout { deadline_ms: 10 }.into();
        assert!(matches!(timeout, ApiError::Timeout(_)));

        let transient: ApiError =
            ClaimError::storage(AdjudicationStage::Persisted, PortError::connection("reset")).into();
        assert!(matches!(transient, ApiError::Unavailable(_)));

        let permanent: ApiError =
            ClaimError::storage(AdjudicationStage::LedgerUpdated, PortError::conflict("check")).into();
        assert!(matches!(permanent, ApiError::Internal(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Timeout("x".into()).into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::Unavailable("x".into()).into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
