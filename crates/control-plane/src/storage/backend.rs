// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// A StorageBackend is either PostgreSQL (production) or in-memory (dev mode).

use anyhow::Result;
use chrono::{DateTime, Utc};
use gatherly_core::{
    EventRequirement, IntakeForm, LiveEvent, LiveEventUpdate, NewLiveEvent, NewServiceProvider,
    Profile, ProviderQuery, ProviderStatus, RequirementStatus, ServiceProvider,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// Returns None for the in-memory backend
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(db) => Some(db.pool()),
            Self::InMemory(_) => None,
        }
    }

    /// Run migrations; a no-op in dev mode
    pub async fn migrate(&self) -> Result<()> {
        match self {
            Self::Postgres(db) => db.migrate().await,
            Self::InMemory(_) => Ok(()),
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_email(email).await,
            Self::InMemory(db) => db.get_user_by_email(email).await,
        }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    // ============================================
    // Revoked tokens
    // ============================================

    pub async fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<()> {
        match self {
            Self::Postgres(db) => db.revoke_token(jti, expires_at).await,
            Self::InMemory(db) => db.revoke_token(jti, expires_at).await,
        }
    }

    pub async fn is_token_revoked(&self, jti: &str) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.is_token_revoked(jti).await,
            Self::InMemory(db) => db.is_token_revoked(jti).await,
        }
    }

    // ============================================
    // Profiles
    // ============================================

    pub async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        match self {
            Self::Postgres(db) => db.get_profile(id).await,
            Self::InMemory(db) => db.get_profile(id).await,
        }
    }

    pub async fn upsert_profile(&self, profile: Profile) -> Result<Profile> {
        match self {
            Self::Postgres(db) => db.upsert_profile(profile).await,
            Self::InMemory(db) => db.upsert_profile(profile).await,
        }
    }

    // ============================================
    // Events
    // ============================================

    pub async fn list_upcoming(&self, from: DateTime<Utc>) -> Result<Vec<LiveEvent>> {
        match self {
            Self::Postgres(db) => db.list_upcoming(from).await,
            Self::InMemory(db) => db.list_upcoming(from).await,
        }
    }

    pub async fn create_event(&self, input: NewLiveEvent) -> Result<LiveEvent> {
        match self {
            Self::Postgres(db) => db.create_event(input).await,
            Self::InMemory(db) => db.create_event(input).await,
        }
    }

    pub async fn update_event(&self, id: Uuid, update: LiveEventUpdate) -> Result<Option<LiveEvent>> {
        match self {
            Self::Postgres(db) => db.update_event(id, update).await,
            Self::InMemory(db) => db.update_event(id, update).await,
        }
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_event(id).await,
            Self::InMemory(db) => db.delete_event(id).await,
        }
    }

    // ============================================
    // Service providers
    // ============================================

    pub async fn list_providers(&self, query: &ProviderQuery) -> Result<Vec<ServiceProvider>> {
        match self {
            Self::Postgres(db) => db.list_providers(query).await,
            Self::InMemory(db) => db.list_providers(query).await,
        }
    }

    pub async fn get_provider(&self, id: Uuid) -> Result<Option<ServiceProvider>> {
        match self {
            Self::Postgres(db) => db.get_provider(id).await,
            Self::InMemory(db) => db.get_provider(id).await,
        }
    }

    pub async fn create_provider(&self, input: NewServiceProvider) -> Result<ServiceProvider> {
        match self {
            Self::Postgres(db) => db.create_provider(input).await,
            Self::InMemory(db) => db.create_provider(input).await,
        }
    }

    pub async fn set_provider_status(
        &self,
        id: Uuid,
        status: ProviderStatus,
    ) -> Result<Option<ServiceProvider>> {
        match self {
            Self::Postgres(db) => db.set_provider_status(id, status).await,
            Self::InMemory(db) => db.set_provider_status(id, status).await,
        }
    }

    // ============================================
    // Event requirements
    // ============================================

    pub async fn create_requirement(&self, form: &IntakeForm) -> Result<EventRequirement> {
        match self {
            Self::Postgres(db) => db.create_requirement(form).await,
            Self::InMemory(db) => db.create_requirement(form).await,
        }
    }

    pub async fn list_requirements(&self) -> Result<Vec<EventRequirement>> {
        match self {
            Self::Postgres(db) => db.list_requirements().await,
            Self::InMemory(db) => db.list_requirements().await,
        }
    }

    pub async fn update_requirement_status(
        &self,
        id: Uuid,
        status: RequirementStatus,
    ) -> Result<Option<EventRequirement>> {
        match self {
            Self::Postgres(db) => db.update_requirement_status(id, status).await,
            Self::InMemory(db) => db.update_requirement_status(id, status).await,
        }
    }
}
