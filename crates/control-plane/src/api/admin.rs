// Admin HTTP routes: provider approval, requirement follow-up and event management
//
// Every handler takes AdminUser; non-admins get 403, missing tokens 401.
// With AUTH_MODE=none the anonymous user is an admin.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use gatherly_core::{
    EventRequirement, LiveEvent, LiveEventUpdate, NewLiveEvent, ProviderStatus,
    RequirementStatus, ServiceProvider, ToastBuffer,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{internal_error, ErrorResponse, ListResponse, ToastedResponse};
use super::validation::{
    check_len, check_opt_len, MAX_EVENT_DESCRIPTION_BYTES, MAX_EVENT_TITLE_BYTES,
};
use crate::auth::{AdminUser, AuthState, FromRef};
use crate::services::{EventService, ProviderService, RequirementService};

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================
// App State and Routes
// ============================================

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub event_service: Arc<EventService>,
    pub provider_service: Arc<ProviderService>,
    pub requirement_service: Arc<RequirementService>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(input: &AppState) -> Self {
        input.auth.clone()
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/admin/providers", get(list_providers))
        .route("/v1/admin/providers/:id/approve", post(approve_provider))
        .route("/v1/admin/providers/:id/reject", post(reject_provider))
        .route("/v1/admin/requirements", get(list_requirements))
        .route("/v1/admin/requirements/:id", patch(update_requirement))
        .route("/v1/admin/events", post(create_event))
        .route(
            "/v1/admin/events/:id",
            patch(update_event).delete(delete_event),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProviderStatusParams {
    /// Only providers in this status; all when omitted
    pub status: Option<ProviderStatus>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RequirementStatusParams {
    pub status: Option<RequirementStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRequirementRequest {
    pub status: RequirementStatus,
}

// ============================================
// Providers
// ============================================

/// GET /v1/admin/providers - Providers by status, newest first
#[utoipa::path(
    get,
    path = "/v1/admin/providers",
    params(ProviderStatusParams),
    responses(
        (status = 200, description = "Providers", body = ListResponse<ServiceProvider>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin"
)]
pub async fn list_providers(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(params): Query<ProviderStatusParams>,
) -> Result<Json<ListResponse<ServiceProvider>>, ApiError> {
    let providers = state
        .provider_service
        .list_by_status(params.status)
        .await
        .map_err(|e| internal_error("Failed to list providers", e))?;
    Ok(Json(providers.into()))
}

async fn set_provider_status(
    state: &AppState,
    id: Uuid,
    status: ProviderStatus,
) -> Result<Json<ToastedResponse<ServiceProvider>>, ApiError> {
    let toasts = ToastBuffer::new();
    let updated = state
        .provider_service
        .set_status(id, status, &toasts)
        .await
        .map_err(|e| internal_error("Failed to update provider", e))?;

    match updated {
        Some(provider) => Ok(Json(ToastedResponse {
            data: provider,
            toasts: toasts.drain(),
        })),
        None => Err(ErrorResponse::new("Provider not found").into_response(StatusCode::NOT_FOUND)),
    }
}

/// POST /v1/admin/providers/{id}/approve
#[utoipa::path(
    post,
    path = "/v1/admin/providers/{id}/approve",
    params(("id" = Uuid, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Provider approved", body = ToastedResponse<ServiceProvider>),
        (status = 404, description = "Provider not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn approve_provider(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ToastedResponse<ServiceProvider>>, ApiError> {
    tracing::debug!(admin = %admin.email, provider_id = %id, "approve provider");
    set_provider_status(&state, id, ProviderStatus::Approved).await
}

/// POST /v1/admin/providers/{id}/reject
#[utoipa::path(
    post,
    path = "/v1/admin/providers/{id}/reject",
    params(("id" = Uuid, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Provider rejected", body = ToastedResponse<ServiceProvider>),
        (status = 404, description = "Provider not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn reject_provider(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ToastedResponse<ServiceProvider>>, ApiError> {
    tracing::debug!(admin = %admin.email, provider_id = %id, "reject provider");
    set_provider_status(&state, id, ProviderStatus::Rejected).await
}

// ============================================
// Requirements
// ============================================

/// GET /v1/admin/requirements - Submitted requirements, newest first
#[utoipa::path(
    get,
    path = "/v1/admin/requirements",
    params(RequirementStatusParams),
    responses((status = 200, description = "Requirements", body = ListResponse<EventRequirement>)),
    tag = "admin"
)]
pub async fn list_requirements(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(params): Query<RequirementStatusParams>,
) -> Result<Json<ListResponse<EventRequirement>>, ApiError> {
    let requirements = state
        .requirement_service
        .list(params.status)
        .await
        .map_err(|e| internal_error("Failed to list requirements", e))?;
    Ok(Json(requirements.into()))
}

/// PATCH /v1/admin/requirements/{id} - Move a requirement along
#[utoipa::path(
    patch,
    path = "/v1/admin/requirements/{id}",
    params(("id" = Uuid, Path, description = "Requirement ID")),
    request_body = UpdateRequirementRequest,
    responses(
        (status = 200, description = "Requirement updated", body = EventRequirement),
        (status = 404, description = "Requirement not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn update_requirement(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequirementRequest>,
) -> Result<Json<EventRequirement>, ApiError> {
    state
        .requirement_service
        .update_status(id, req.status)
        .await
        .map_err(|e| internal_error("Failed to update requirement", e))?
        .map(Json)
        .ok_or_else(|| {
            ErrorResponse::new("Requirement not found").into_response(StatusCode::NOT_FOUND)
        })
}

// ============================================
// Events
// ============================================

/// POST /v1/admin/events - Publish an event to the live feed
#[utoipa::path(
    post,
    path = "/v1/admin/events",
    request_body = NewLiveEvent,
    responses(
        (status = 201, description = "Event created", body = LiveEvent),
        (status = 400, description = "Invalid event", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn create_event(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<NewLiveEvent>,
) -> Result<(StatusCode, Json<LiveEvent>), ApiError> {
    check_len(&req.title, MAX_EVENT_TITLE_BYTES)?;
    check_opt_len(req.description.as_deref(), MAX_EVENT_DESCRIPTION_BYTES)?;
    if req.title.trim().is_empty() {
        return Err(ErrorResponse::new("Title is required").into_response(StatusCode::BAD_REQUEST));
    }

    let event = state
        .event_service
        .create(req)
        .await
        .map_err(|e| internal_error("Failed to create event", e))?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PATCH /v1/admin/events/{id}
#[utoipa::path(
    patch,
    path = "/v1/admin/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = LiveEventUpdate,
    responses(
        (status = 200, description = "Event updated", body = LiveEvent),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn update_event(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LiveEventUpdate>,
) -> Result<Json<LiveEvent>, ApiError> {
    check_opt_len(req.title.as_deref(), MAX_EVENT_TITLE_BYTES)?;
    check_opt_len(req.description.as_deref(), MAX_EVENT_DESCRIPTION_BYTES)?;

    state
        .event_service
        .update(id, req)
        .await
        .map_err(|e| internal_error("Failed to update event", e))?
        .map(Json)
        .ok_or_else(|| ErrorResponse::new("Event not found").into_response(StatusCode::NOT_FOUND))
}

/// DELETE /v1/admin/events/{id}
#[utoipa::path(
    delete,
    path = "/v1/admin/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn delete_event(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .event_service
        .delete(id)
        .await
        .map_err(|e| internal_error("Failed to delete event", e))?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ErrorResponse::new("Event not found").into_response(StatusCode::NOT_FOUND))
    }
}
