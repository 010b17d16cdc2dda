// Core store traits over the storage backend
//
// Every successful write is published to the change hub, so the live feed
// and SSE subscribers see database changes regardless of backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatherly_core::traits::{EventStore, ProfileStore, ProviderStore, RequirementStore};
use gatherly_core::{
    ChangeHub, ChangeKind, Collection, Error, EventRequirement, IntakeForm, LiveEvent,
    LiveEventUpdate, NewLiveEvent, NewServiceProvider, Profile, ProviderQuery, ProviderStatus,
    RequirementStatus, Result, ServiceProvider,
};
use std::sync::Arc;
use uuid::Uuid;

use super::StorageBackend;

fn store_error(e: anyhow::Error) -> Error {
    tracing::error!(error = %e, "storage call failed");
    Error::collaborator(e.to_string())
}

// ============================================================================
// BackendStore - implements the core store traits
// ============================================================================

#[derive(Clone)]
pub struct BackendStore {
    db: Arc<StorageBackend>,
    hub: Arc<ChangeHub>,
}

impl BackendStore {
    pub fn new(db: Arc<StorageBackend>, hub: Arc<ChangeHub>) -> Self {
        Self { db, hub }
    }

    pub fn backend(&self) -> &Arc<StorageBackend> {
        &self.db
    }

    pub fn hub(&self) -> &Arc<ChangeHub> {
        &self.hub
    }
}

#[async_trait]
impl RequirementStore for BackendStore {
    async fn create_requirement(&self, form: IntakeForm) -> Result<EventRequirement> {
        let requirement = self
            .db
            .create_requirement(&form)
            .await
            .map_err(store_error)?;
        self.hub.publish_record(
            Collection::EventRequirements,
            ChangeKind::Insert,
            requirement.id,
            &requirement,
        );
        Ok(requirement)
    }

    async fn list_requirements(&self) -> Result<Vec<EventRequirement>> {
        self.db.list_requirements().await.map_err(store_error)
    }

    async fn update_requirement_status(
        &self,
        id: Uuid,
        status: RequirementStatus,
    ) -> Result<Option<EventRequirement>> {
        let updated = self
            .db
            .update_requirement_status(id, status)
            .await
            .map_err(store_error)?;
        if let Some(requirement) = &updated {
            self.hub.publish_record(
                Collection::EventRequirements,
                ChangeKind::Update,
                id,
                requirement,
            );
        }
        Ok(updated)
    }
}

#[async_trait]
impl EventStore for BackendStore {
    async fn list_upcoming(&self, from: DateTime<Utc>) -> Result<Vec<LiveEvent>> {
        self.db.list_upcoming(from).await.map_err(store_error)
    }

    async fn create_event(&self, input: NewLiveEvent) -> Result<LiveEvent> {
        let event = self.db.create_event(input).await.map_err(store_error)?;
        self.hub
            .publish_record(Collection::Events, ChangeKind::Insert, event.id, &event);
        Ok(event)
    }

    async fn update_event(&self, id: Uuid, update: LiveEventUpdate) -> Result<Option<LiveEvent>> {
        let updated = self
            .db
            .update_event(id, update)
            .await
            .map_err(store_error)?;
        if let Some(event) = &updated {
            self.hub
                .publish_record(Collection::Events, ChangeKind::Update, id, event);
        }
        Ok(updated)
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool> {
        let deleted = self.db.delete_event(id).await.map_err(store_error)?;
        if deleted {
            self.hub
                .publish(Collection::Events, ChangeKind::Delete, id, None);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl ProviderStore for BackendStore {
    async fn list_providers(&self, query: &ProviderQuery) -> Result<Vec<ServiceProvider>> {
        self.db.list_providers(query).await.map_err(store_error)
    }

    async fn get_provider(&self, id: Uuid) -> Result<Option<ServiceProvider>> {
        self.db.get_provider(id).await.map_err(store_error)
    }

    async fn create_provider(&self, input: NewServiceProvider) -> Result<ServiceProvider> {
        let provider = self.db.create_provider(input).await.map_err(store_error)?;
        self.hub.publish_record(
            Collection::ServiceProviders,
            ChangeKind::Insert,
            provider.id,
            &provider,
        );
        Ok(provider)
    }

    async fn set_provider_status(
        &self,
        id: Uuid,
        status: ProviderStatus,
    ) -> Result<Option<ServiceProvider>> {
        let updated = self
            .db
            .set_provider_status(id, status)
            .await
            .map_err(store_error)?;
        if let Some(provider) = &updated {
            self.hub.publish_record(
                Collection::ServiceProviders,
                ChangeKind::Update,
                id,
                provider,
            );
        }
        Ok(updated)
    }
}

#[async_trait]
impl ProfileStore for BackendStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        self.db.get_profile(id).await.map_err(store_error)
    }

    async fn upsert_profile(&self, profile: Profile) -> Result<Profile> {
        let existed = self
            .db
            .get_profile(profile.id)
            .await
            .map_err(store_error)?
            .is_some();
        let profile = self.db.upsert_profile(profile).await.map_err(store_error)?;
        let kind = if existed {
            ChangeKind::Update
        } else {
            ChangeKind::Insert
        };
        self.hub
            .publish_record(Collection::Profiles, kind, profile.id, &profile);
        Ok(profile)
    }
}
