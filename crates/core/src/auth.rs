// Auth collaborator request and outcome types
//
// Auth calls never fail with an error; every failure is folded into an
// AuthOutcome with `success = false` and a user-facing message.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::profile::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Sign-up request. `metadata` carries profile fields such as `full_name` and `role`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl SignUpRequest {
    pub fn full_name(&self) -> Option<&str> {
        self.metadata
            .get("full_name")
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Requested role. Admin cannot be self-assigned and falls back to customer.
    pub fn requested_role(&self) -> Role {
        match self.metadata.get("role").map(|r| Role::from(r.as_str())) {
            Some(Role::Provider) => Role::Provider,
            _ => Role::Customer,
        }
    }
}

/// Authenticated session handed back on sign-in / sign-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AuthSession {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<AuthSession>,
}

impl AuthOutcome {
    pub fn ok(message: impl Into<String>, session: Option<AuthSession>) -> Self {
        Self {
            success: true,
            message: message.into(),
            session,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            session: None,
        }
    }
}
