// Common DTOs for the public API

use axum::http::StatusCode;
use axum::Json;
use gatherly_core::{Error, Toast};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn into_response(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

/// Response wrapper for list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Response carrying the toasts raised while handling the request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToastedResponse<T> {
    pub data: T,
    pub toasts: Vec<Toast>,
}

/// HTTP status for a core error
pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Validation(_) | Error::Incomplete(_) => StatusCode::BAD_REQUEST,
        Error::SubmissionInFlight | Error::AlreadySubmitted => StatusCode::CONFLICT,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Collaborator(_) => StatusCode::BAD_GATEWAY,
        Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log and map a service failure to 500
pub fn internal_error(context: &str, e: anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    tracing::error!("{}: {}", context, e);
    ErrorResponse::new("Internal server error").into_response(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatherly_core::ValidationError;

    #[test]
    fn test_status_for_core_errors() {
        assert_eq!(
            status_for(&Error::Validation(ValidationError::Empty)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&Error::AlreadySubmitted), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&Error::collaborator("timeout")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_for(&Error::not_found("x")), StatusCode::NOT_FOUND);
    }
}
