// In-memory storage implementation for dev mode
// Decision: Use parking_lot for the auth tables
// Decision: Marketplace collections reuse the core in-memory store
//
// Provides the same API as the PostgreSQL repositories so the control-plane
// can run without a database. All data is lost on restart.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use gatherly_core::memory::InMemoryStore;
use gatherly_core::traits::{EventStore, ProfileStore, ProviderStore, RequirementStore};
use gatherly_core::{
    EventRequirement, IntakeForm, LiveEvent, LiveEventUpdate, NewLiveEvent, NewServiceProvider,
    Profile, ProviderQuery, ProviderStatus, RequirementStatus, ServiceProvider,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::models::*;

#[derive(Default)]
pub struct InMemoryDatabase {
    users: RwLock<HashMap<Uuid, UserRow>>,
    revoked_tokens: RwLock<HashMap<String, DateTime<Utc>>>,
    collections: InMemoryStore,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Underlying collection store, for seeding
    pub fn collections(&self) -> &InMemoryStore {
        &self.collections
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let mut users = self.users.write();
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(anyhow!("duplicate key value violates unique constraint \"users_email_key\""));
        }

        let row = UserRow {
            id: Uuid::now_v7(),
            email: input.email,
            password_hash: input.password_hash,
            created_at: Utc::now(),
        };
        users.insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(self.users.read().get(&id).cloned())
    }

    // ============================================
    // Revoked tokens
    // ============================================

    pub async fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let now = Utc::now();
        let mut revoked = self.revoked_tokens.write();
        revoked.retain(|_, exp| *exp >= now);
        revoked.insert(jti.to_string(), expires_at);
        Ok(())
    }

    pub async fn is_token_revoked(&self, jti: &str) -> Result<bool> {
        Ok(self.revoked_tokens.read().contains_key(jti))
    }

    // ============================================
    // Profiles
    // ============================================

    pub async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        Ok(self.collections.get_profile(id).await?)
    }

    pub async fn upsert_profile(&self, profile: Profile) -> Result<Profile> {
        Ok(self.collections.upsert_profile(profile).await?)
    }

    // ============================================
    // Events
    // ============================================

    pub async fn list_upcoming(&self, from: DateTime<Utc>) -> Result<Vec<LiveEvent>> {
        Ok(self.collections.list_upcoming(from).await?)
    }

    pub async fn create_event(&self, input: NewLiveEvent) -> Result<LiveEvent> {
        Ok(self.collections.create_event(input).await?)
    }

    pub async fn update_event(&self, id: Uuid, update: LiveEventUpdate) -> Result<Option<LiveEvent>> {
        Ok(self.collections.update_event(id, update).await?)
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<bool> {
        Ok(self.collections.delete_event(id).await?)
    }

    // ============================================
    // Service providers
    // ============================================

    pub async fn list_providers(&self, query: &ProviderQuery) -> Result<Vec<ServiceProvider>> {
        Ok(self.collections.list_providers(query).await?)
    }

    pub async fn get_provider(&self, id: Uuid) -> Result<Option<ServiceProvider>> {
        Ok(self.collections.get_provider(id).await?)
    }

    pub async fn create_provider(&self, input: NewServiceProvider) -> Result<ServiceProvider> {
        Ok(self.collections.create_provider(input).await?)
    }

    pub async fn set_provider_status(
        &self,
        id: Uuid,
        status: ProviderStatus,
    ) -> Result<Option<ServiceProvider>> {
        Ok(self.collections.set_provider_status(id, status).await?)
    }

    // ============================================
    // Event requirements
    // ============================================

    pub async fn create_requirement(&self, form: &IntakeForm) -> Result<EventRequirement> {
        // Same completeness check the database columns enforce
        CreateRequirementRow::try_from(form)?;
        Ok(self.collections.create_requirement(form.clone()).await?)
    }

    pub async fn list_requirements(&self) -> Result<Vec<EventRequirement>> {
        Ok(self.collections.list_requirements().await?)
    }

    pub async fn update_requirement_status(
        &self,
        id: Uuid,
        status: RequirementStatus,
    ) -> Result<Option<EventRequirement>> {
        Ok(self.collections.update_requirement_status(id, status).await?)
    }
}
