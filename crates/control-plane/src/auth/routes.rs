// Authentication HTTP routes
// Decision: Use /v1/auth/* prefix (consistent with other API routes)
// Decision: Return the AuthOutcome body on both success and failure, and set
// the access-token cookie on success

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use gatherly_core::traits::AuthProvider;
use gatherly_core::{AuthOutcome, Credentials, Role, SignUpRequest};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    config::AuthMode,
    middleware::{AuthState, AuthUser, FromRef, ACCESS_TOKEN_COOKIE},
};

#[derive(Clone)]
pub struct AuthRoutesState {
    pub auth: AuthState,
    pub provider: Arc<dyn AuthProvider>,
}

impl FromRef<AuthRoutesState> for AuthState {
    fn from_ref(input: &AuthRoutesState) -> Self {
        input.auth.clone()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthConfigResponse {
    pub mode: String,
    pub signup_enabled: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

pub fn routes(state: AuthRoutesState) -> Router {
    Router::new()
        .route("/v1/auth/config", get(get_auth_config))
        .route("/v1/auth/sign-in", post(sign_in))
        .route("/v1/auth/sign-up", post(sign_up))
        .route("/v1/auth/sign-out", post(sign_out))
        .route("/v1/auth/me", get(current_user))
        .with_state(state)
}

fn access_cookie(state: &AuthRoutesState, token: String) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            state.auth.jwt_service.access_token_lifetime_secs(),
        ))
        .build()
}

fn with_session_cookie(state: &AuthRoutesState, jar: CookieJar, outcome: &AuthOutcome) -> CookieJar {
    match &outcome.session {
        Some(session) => jar.add(access_cookie(state, session.access_token.clone())),
        None => jar,
    }
}

/// GET /v1/auth/config
#[utoipa::path(
    get,
    path = "/v1/auth/config",
    responses((status = 200, description = "Auth configuration", body = AuthConfigResponse)),
    tag = "auth"
)]
pub async fn get_auth_config(State(state): State<AuthRoutesState>) -> Json<AuthConfigResponse> {
    Json(AuthConfigResponse {
        mode: match state.auth.config.mode {
            AuthMode::None => "none".to_string(),
            AuthMode::Full => "full".to_string(),
        },
        signup_enabled: state.auth.config.signup_enabled(),
    })
}

/// POST /v1/auth/sign-in
#[utoipa::path(
    post,
    path = "/v1/auth/sign-in",
    request_body = Credentials,
    responses(
        (status = 200, description = "Signed in", body = AuthOutcome),
        (status = 401, description = "Invalid credentials", body = AuthOutcome)
    ),
    tag = "auth"
)]
pub async fn sign_in(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> (StatusCode, CookieJar, Json<AuthOutcome>) {
    let outcome = state.provider.sign_in(credentials).await;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    let jar = with_session_cookie(&state, jar, &outcome);
    (status, jar, Json(outcome))
}

/// POST /v1/auth/sign-up
#[utoipa::path(
    post,
    path = "/v1/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = AuthOutcome),
        (status = 400, description = "Sign-up rejected", body = AuthOutcome)
    ),
    tag = "auth"
)]
pub async fn sign_up(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    Json(request): Json<SignUpRequest>,
) -> (StatusCode, CookieJar, Json<AuthOutcome>) {
    let outcome = state.provider.sign_up(request).await;
    let status = if outcome.success {
        StatusCode::CREATED
    } else {
        StatusCode::BAD_REQUEST
    };
    let jar = with_session_cookie(&state, jar, &outcome);
    (status, jar, Json(outcome))
}

/// POST /v1/auth/sign-out
#[utoipa::path(
    post,
    path = "/v1/auth/sign-out",
    responses(
        (status = 200, description = "Signed out", body = AuthOutcome),
        (status = 400, description = "No valid session", body = AuthOutcome)
    ),
    tag = "auth"
)]
pub async fn sign_out(
    State(state): State<AuthRoutesState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (StatusCode, CookieJar, Json<AuthOutcome>) {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .or_else(|| jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()));

    let outcome = match token {
        Some(token) => state.provider.sign_out(&token).await,
        // Nothing to revoke without a session
        None if state.auth.config.mode == AuthMode::None => AuthOutcome::ok("Signed out", None),
        None => AuthOutcome::fail("No active session"),
    };

    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    let jar = jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"));
    (status, jar, Json(outcome))
}

/// GET /v1/auth/me
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth"
)]
pub async fn current_user(user: AuthUser) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        id: user.id,
        email: user.email,
        role: user.role,
    })
}
