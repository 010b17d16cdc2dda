// Guided intake HTTP routes
//
// Every action responds with the updated session view and the toasts raised
// while handling it. A rejected action still returns the view, with the
// error status and message.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use gatherly_core::Toast;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{status_for, ErrorResponse};
use super::validation::{check_len, MAX_ANSWER_BYTES};
use crate::services::{ActionOutcome, IntakeAction, IntakeError, IntakeService, IntakeView};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerRequest {
    /// Index of the step being answered; must be the active step
    pub step_index: usize,
    pub value: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleRequest {
    pub option: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IntakeReply {
    pub session: IntakeView,
    pub toasts: Vec<Toast>,
    /// Set for toggles: whether the option is now selected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================
// App State and Routes
// ============================================

#[derive(Clone)]
pub struct AppState {
    pub intake_service: Arc<IntakeService>,
}

impl AppState {
    pub fn new(intake_service: Arc<IntakeService>) -> Self {
        Self { intake_service }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/intake", post(start_intake))
        .route("/v1/intake/:id", get(get_intake))
        .route("/v1/intake/:id/answer", post(answer))
        .route("/v1/intake/:id/toggle", post(toggle))
        .route("/v1/intake/:id/confirm", post(confirm))
        .route("/v1/intake/:id/skip", post(skip))
        .route("/v1/intake/:id/submit", post(submit))
        .with_state(state)
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn intake_error(e: IntakeError) -> ApiError {
    let status = match &e {
        IntakeError::NotFound(_) => StatusCode::NOT_FOUND,
        IntakeError::Busy => StatusCode::CONFLICT,
        IntakeError::Interrupted => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ErrorResponse::new(e.to_string()).into_response(status)
}

fn reply(outcome: ActionOutcome) -> (StatusCode, Json<IntakeReply>) {
    let status = outcome
        .error
        .as_ref()
        .map(status_for)
        .unwrap_or(StatusCode::OK);
    (
        status,
        Json(IntakeReply {
            session: outcome.session,
            toasts: outcome.toasts,
            selected: outcome.selected,
            error: outcome.error.map(|e| e.to_string()),
        }),
    )
}

async fn run(
    state: &AppState,
    id: Uuid,
    action: IntakeAction,
) -> Result<(StatusCode, Json<IntakeReply>), ApiError> {
    let outcome = state
        .intake_service
        .act(id, action)
        .await
        .map_err(intake_error)?;
    Ok(reply(outcome))
}

// ============================================
// HTTP Handlers
// ============================================

/// POST /v1/intake - Start a new intake session
#[utoipa::path(
    post,
    path = "/v1/intake",
    responses((status = 201, description = "Session started", body = IntakeView)),
    tag = "intake"
)]
pub async fn start_intake(State(state): State<AppState>) -> (StatusCode, Json<IntakeView>) {
    (StatusCode::CREATED, Json(state.intake_service.create()))
}

/// GET /v1/intake/{id} - Current session view
#[utoipa::path(
    get,
    path = "/v1/intake/{id}",
    params(("id" = Uuid, Path, description = "Intake session ID")),
    responses(
        (status = 200, description = "Session", body = IntakeView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    tag = "intake"
)]
pub async fn get_intake(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IntakeView>, ApiError> {
    state
        .intake_service
        .get(id)
        .await
        .map(Json)
        .map_err(intake_error)
}

/// POST /v1/intake/{id}/answer - Answer the active step
#[utoipa::path(
    post,
    path = "/v1/intake/{id}/answer",
    params(("id" = Uuid, Path, description = "Intake session ID")),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer accepted", body = IntakeReply),
        (status = 400, description = "Answer rejected", body = IntakeReply),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Session busy", body = ErrorResponse),
        (status = 502, description = "Completion write failed", body = IntakeReply)
    ),
    tag = "intake"
)]
pub async fn answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<(StatusCode, Json<IntakeReply>), ApiError> {
    check_len(&req.value, MAX_ANSWER_BYTES)?;
    run(
        &state,
        id,
        IntakeAction::Answer {
            step_index: req.step_index,
            value: req.value,
        },
    )
    .await
}

/// POST /v1/intake/{id}/toggle - Toggle one option of a multi-choice step
#[utoipa::path(
    post,
    path = "/v1/intake/{id}/toggle",
    params(("id" = Uuid, Path, description = "Intake session ID")),
    request_body = ToggleRequest,
    responses(
        (status = 200, description = "Option toggled", body = IntakeReply),
        (status = 400, description = "Not an option or not a multi-choice step", body = IntakeReply),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    tag = "intake"
)]
pub async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleRequest>,
) -> Result<(StatusCode, Json<IntakeReply>), ApiError> {
    check_len(&req.option, MAX_ANSWER_BYTES)?;
    run(&state, id, IntakeAction::Toggle { option: req.option }).await
}

/// POST /v1/intake/{id}/confirm - Confirm the multi-choice selection
#[utoipa::path(
    post,
    path = "/v1/intake/{id}/confirm",
    params(("id" = Uuid, Path, description = "Intake session ID")),
    responses(
        (status = 200, description = "Selection stored", body = IntakeReply),
        (status = 400, description = "Empty selection", body = IntakeReply),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    tag = "intake"
)]
pub async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<IntakeReply>), ApiError> {
    run(&state, id, IntakeAction::Confirm).await
}

/// POST /v1/intake/{id}/skip - Skip an optional step
#[utoipa::path(
    post,
    path = "/v1/intake/{id}/skip",
    params(("id" = Uuid, Path, description = "Intake session ID")),
    responses(
        (status = 200, description = "Step skipped", body = IntakeReply),
        (status = 400, description = "Step is required", body = IntakeReply),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 502, description = "Completion write failed", body = IntakeReply)
    ),
    tag = "intake"
)]
pub async fn skip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<IntakeReply>), ApiError> {
    run(&state, id, IntakeAction::Skip).await
}

/// POST /v1/intake/{id}/submit - Retry the completion write
#[utoipa::path(
    post,
    path = "/v1/intake/{id}/submit",
    params(("id" = Uuid, Path, description = "Intake session ID")),
    responses(
        (status = 200, description = "Requirement stored", body = IntakeReply),
        (status = 400, description = "Form incomplete", body = IntakeReply),
        (status = 404, description = "Session not found or already submitted", body = ErrorResponse),
        (status = 409, description = "Submission in flight", body = IntakeReply),
        (status = 502, description = "Write failed", body = IntakeReply)
    ),
    tag = "intake"
)]
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<IntakeReply>), ApiError> {
    run(&state, id, IntakeAction::Submit).await
}
