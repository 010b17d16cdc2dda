// Password AuthProvider
//
// Users live in the storage backend, profiles go through the ProfileStore so
// profile writes are published like any other collection. Storage failures
// are logged and folded into a generic failed outcome.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use gatherly_core::traits::{AuthProvider, ProfileStore};
use gatherly_core::{AuthOutcome, AuthSession, Credentials, Profile, Role, SignUpRequest};
use std::sync::Arc;
use uuid::Uuid;

use super::config::{AdminConfig, AuthConfig};
use super::jwt::JwtService;
use crate::storage::password::{check_password_policy, hash_password, verify_password};
use crate::storage::{CreateUserRow, StorageBackend};

const INVALID_CREDENTIALS: &str = "Invalid login credentials";
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Clone)]
pub struct PasswordAuthProvider {
    db: Arc<StorageBackend>,
    profiles: Arc<dyn ProfileStore>,
    jwt: Arc<JwtService>,
    signup_enabled: bool,
}

impl PasswordAuthProvider {
    pub fn new(
        config: &AuthConfig,
        db: Arc<StorageBackend>,
        profiles: Arc<dyn ProfileStore>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            db,
            profiles,
            jwt,
            signup_enabled: config.signup_enabled(),
        }
    }

    /// Create the configured admin account if it does not exist yet
    pub async fn bootstrap_admin(&self, admin: &AdminConfig) -> Result<()> {
        if self.db.get_user_by_email(&admin.email).await?.is_some() {
            tracing::debug!(email = %admin.email, "admin account already present");
            return Ok(());
        }

        self.create_account(&admin.email, &admin.password, Some("Administrator"), Role::Admin)
            .await?;
        tracing::info!(email = %admin.email, "created admin account");
        Ok(())
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
        role: Role,
    ) -> Result<Profile> {
        let user = self
            .db
            .create_user(CreateUserRow {
                email: email.to_string(),
                password_hash: hash_password(password)?,
            })
            .await?;

        let profile = self
            .profiles
            .upsert_profile(Profile {
                id: user.id,
                email: user.email,
                full_name: full_name.map(str::to_string),
                role,
                created_at: Utc::now(),
            })
            .await?;
        Ok(profile)
    }

    fn session_for(&self, user_id: Uuid, email: &str, role: Role) -> Result<AuthSession> {
        let issued = self.jwt.issue_access_token(user_id, email, role)?;
        Ok(AuthSession {
            user_id,
            email: email.to_string(),
            role,
            access_token: issued.token,
            expires_at: issued.expires_at,
        })
    }

    async fn try_sign_in(&self, credentials: &Credentials) -> Result<AuthOutcome> {
        let Some(user) = self.db.get_user_by_email(credentials.email.trim()).await? else {
            return Ok(AuthOutcome::fail(INVALID_CREDENTIALS));
        };
        if !verify_password(&credentials.password, &user.password_hash)? {
            return Ok(AuthOutcome::fail(INVALID_CREDENTIALS));
        }

        let role = self
            .profiles
            .get_profile(user.id)
            .await?
            .map(|p| p.role)
            .unwrap_or_default();
        let session = self.session_for(user.id, &user.email, role)?;
        Ok(AuthOutcome::ok("Signed in successfully", Some(session)))
    }

    async fn try_sign_up(&self, request: &SignUpRequest) -> Result<AuthOutcome> {
        let email = request.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Ok(AuthOutcome::fail("A valid email address is required"));
        }
        if let Some(message) = check_password_policy(&request.password) {
            return Ok(AuthOutcome::fail(message));
        }
        if self.db.get_user_by_email(email).await?.is_some() {
            return Ok(AuthOutcome::fail("User already registered"));
        }

        let role = request.requested_role();
        let profile = self
            .create_account(email, &request.password, request.full_name(), role)
            .await?;
        let session = self.session_for(profile.id, &profile.email, role)?;
        Ok(AuthOutcome::ok("Account created", Some(session)))
    }
}

#[async_trait]
impl AuthProvider for PasswordAuthProvider {
    async fn sign_in(&self, credentials: Credentials) -> AuthOutcome {
        match self.try_sign_in(&credentials).await {
            Ok(outcome) => {
                tracing::info!(email = %credentials.email, success = outcome.success, "sign-in");
                outcome
            }
            Err(e) => {
                tracing::error!(error = %e, "sign-in failed");
                AuthOutcome::fail(GENERIC_FAILURE)
            }
        }
    }

    async fn sign_up(&self, request: SignUpRequest) -> AuthOutcome {
        if !self.signup_enabled {
            return AuthOutcome::fail("Sign-up is disabled");
        }
        match self.try_sign_up(&request).await {
            Ok(outcome) => {
                tracing::info!(email = %request.email, success = outcome.success, "sign-up");
                outcome
            }
            Err(e) => {
                tracing::error!(error = %e, "sign-up failed");
                AuthOutcome::fail(GENERIC_FAILURE)
            }
        }
    }

    async fn sign_out(&self, access_token: &str) -> AuthOutcome {
        let claims = match self.jwt.validate_access_token(access_token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "sign-out with invalid token");
                return AuthOutcome::fail("Invalid or expired session");
            }
        };

        match self.db.revoke_token(&claims.jti, claims.expires_at()).await {
            Ok(()) => AuthOutcome::ok("Signed out", None),
            Err(e) => {
                tracing::error!(error = %e, "failed to revoke token");
                AuthOutcome::fail(GENERIC_FAILURE)
            }
        }
    }
}
