// Authentication extractors
// Decision: Support both cookie-based (UI) and header-based (API) auth
// Decision: In "none" mode, every request is an anonymous admin

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use gatherly_core::Role;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    config::{AuthConfig, AuthMode},
    jwt::JwtService,
};
use crate::storage::StorageBackend;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Debug, Clone, Serialize)]
pub struct AuthError {
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl AuthError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::UNAUTHORIZED,
        }
    }

    pub fn forbidden(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Auth mode "none"
    None,
    Jwt,
}

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub auth_method: AuthMethod,
    /// Raw token the caller presented, if any
    pub token: Option<String>,
}

impl AuthUser {
    /// Full access in no-auth mode
    pub fn anonymous() -> Self {
        Self {
            id: Uuid::nil(),
            email: "anonymous@local".to_string(),
            role: Role::Admin,
            auth_method: AuthMethod::None,
            token: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub jwt_service: Arc<JwtService>,
    pub db: Arc<StorageBackend>,
}

impl AuthState {
    pub fn new(config: AuthConfig, db: Arc<StorageBackend>) -> Self {
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        Self {
            config,
            jwt_service,
            db,
        }
    }
}

/// Helper trait for extracting AuthState from application state
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AuthState> for AuthState {
    fn from_ref(input: &AuthState) -> Self {
        input.clone()
    }
}

/// Token from `Authorization: Bearer` or the access-token cookie
pub fn bearer_token(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
        if let Some(token) = value.to_str().ok().and_then(|s| s.strip_prefix("Bearer ")) {
            return Some(token.trim().to_string());
        }
    }
    CookieJar::from_headers(&parts.headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Required auth extractor; 401 when missing or invalid
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        extract_auth_user(parts, &auth_state).await
    }
}

async fn extract_auth_user(parts: &Parts, auth_state: &AuthState) -> Result<AuthUser, AuthError> {
    if auth_state.config.mode == AuthMode::None {
        return Ok(AuthUser::anonymous());
    }

    let token =
        bearer_token(parts).ok_or_else(|| AuthError::unauthorized("Authentication required"))?;
    validate_jwt_token(token, auth_state).await
}

async fn validate_jwt_token(token: String, auth_state: &AuthState) -> Result<AuthUser, AuthError> {
    let claims = auth_state
        .jwt_service
        .validate_access_token(&token)
        .map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            AuthError::unauthorized("Invalid or expired token")
        })?;

    let revoked = auth_state
        .db
        .is_token_revoked(&claims.jti)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check token revocation: {}", e);
            AuthError::unauthorized("Failed to validate token")
        })?;
    if revoked {
        return Err(AuthError::unauthorized("Token has been revoked"));
    }

    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AuthError::unauthorized("Invalid user ID in token"))?;

    Ok(AuthUser {
        id,
        email: claims.email,
        role: claims.role,
        auth_method: AuthMethod::Jwt,
        token: Some(token),
    })
}

/// Require admin role; 403 for authenticated non-admins
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::forbidden("Admin access required"));
        }

        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header_value: Option<(&str, &str)>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some((name, value)) = header_value {
            builder = builder.header(name, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn full_state() -> AuthState {
        AuthState::new(
            AuthConfig::with_mode(AuthMode::Full),
            Arc::new(StorageBackend::in_memory()),
        )
    }

    #[test]
    fn test_anonymous_is_admin() {
        let user = AuthUser::anonymous();
        assert_eq!(user.id, Uuid::nil());
        assert!(user.is_admin());
        assert_eq!(user.auth_method, AuthMethod::None);
    }

    #[test]
    fn test_bearer_token_sources() {
        assert_eq!(
            bearer_token(&parts(Some(("authorization", "Bearer abc")))).as_deref(),
            Some("abc")
        );
        assert_eq!(
            bearer_token(&parts(Some(("cookie", "access_token=xyz")))).as_deref(),
            Some("xyz")
        );
        assert!(bearer_token(&parts(None)).is_none());
    }

    #[tokio::test]
    async fn test_none_mode_needs_no_token() {
        let state = AuthState::new(AuthConfig::default(), Arc::new(StorageBackend::in_memory()));
        let user = extract_auth_user(&parts(None), &state).await.unwrap();
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn test_full_mode_requires_valid_unrevoked_token() {
        let state = full_state();
        let err = extract_auth_user(&parts(None), &state).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let issued = state
            .jwt_service
            .issue_access_token(Uuid::now_v7(), "meera@example.com", Role::Customer)
            .unwrap();
        let header = format!("Bearer {}", issued.token);
        let user = extract_auth_user(&parts(Some(("authorization", &header))), &state)
            .await
            .unwrap();
        assert_eq!(user.role, Role::Customer);
        assert!(!user.is_admin());

        state.db.revoke_token(&issued.jti, issued.expires_at).await.unwrap();
        assert!(extract_auth_user(&parts(Some(("authorization", &header))), &state)
            .await
            .is_err());
    }
}
