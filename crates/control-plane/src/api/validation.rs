// Input size limits for public endpoints
//
// Hard limits, not configurable. The message is intentionally vague.

use super::common::ErrorResponse;
use axum::http::StatusCode;
use axum::Json;

/// One intake answer. Addresses and themes fit easily.
pub const MAX_ANSWER_BYTES: usize = 2 * 1024;

pub const MAX_EVENT_TITLE_BYTES: usize = 512;

pub const MAX_EVENT_DESCRIPTION_BYTES: usize = 10 * 1024;

pub const MAX_SEARCH_BYTES: usize = 256;

pub const VALIDATION_ERROR_MESSAGE: &str = "Input exceeds allowed limits";

pub struct LimitExceeded;

impl From<LimitExceeded> for (StatusCode, Json<ErrorResponse>) {
    fn from(_: LimitExceeded) -> Self {
        ErrorResponse::new(VALIDATION_ERROR_MESSAGE).into_response(StatusCode::BAD_REQUEST)
    }
}

pub fn check_len(value: &str, max_bytes: usize) -> Result<(), LimitExceeded> {
    if value.len() > max_bytes {
        return Err(LimitExceeded);
    }
    Ok(())
}

pub fn check_opt_len(value: Option<&str>, max_bytes: usize) -> Result<(), LimitExceeded> {
    value.map_or(Ok(()), |v| check_len(v, max_bytes))
}
