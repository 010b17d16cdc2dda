// In-memory collaborator implementations
//
// These keep all data in memory, which suits:
// - Running the control plane without a database
// - Unit and integration tests
//
// When constructed with a ChangeHub every write also publishes a change
// notification, the way the database triggers do in production.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::change::{ChangeHub, ChangeKind, Collection};
use crate::error::{Error, Result};
use crate::event::{LiveEvent, LiveEventUpdate, NewLiveEvent};
use crate::intake::IntakeForm;
use crate::profile::Profile;
use crate::provider::{NewServiceProvider, ProviderQuery, ProviderStatus, ServiceProvider};
use crate::requirement::{EventRequirement, RequirementStatus};
use crate::traits::{EventStore, ProfileStore, ProviderStore, RequirementStore};

// ============================================================================
// InMemoryStore - every storage collection in one place
// ============================================================================

#[derive(Debug, Default)]
struct Tables {
    requirements: HashMap<Uuid, EventRequirement>,
    events: HashMap<Uuid, LiveEvent>,
    providers: HashMap<Uuid, ServiceProvider>,
    profiles: HashMap<Uuid, Profile>,
}

/// In-memory store for all collections
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    hub: Option<Arc<ChangeHub>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that publishes every write to `hub`
    pub fn with_change_hub(hub: Arc<ChangeHub>) -> Self {
        Self {
            tables: Arc::default(),
            hub: Some(hub),
        }
    }

    pub async fn requirement_count(&self) -> usize {
        self.tables.read().await.requirements.len()
    }

    /// Pre-populate events without publishing
    pub async fn seed_events(&self, events: Vec<LiveEvent>) {
        let mut tables = self.tables.write().await;
        for event in events {
            tables.events.insert(event.id, event);
        }
    }

    /// Pre-populate providers without publishing
    pub async fn seed_providers(&self, providers: Vec<ServiceProvider>) {
        let mut tables = self.tables.write().await;
        for provider in providers {
            tables.providers.insert(provider.id, provider);
        }
    }

    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }

    fn publish<T: Serialize>(&self, collection: Collection, kind: ChangeKind, id: Uuid, record: Option<&T>) {
        let Some(hub) = &self.hub else {
            return;
        };
        match record {
            Some(record) => {
                hub.publish_record(collection, kind, id, record);
            }
            None => {
                hub.publish(collection, kind, id, None);
            }
        }
    }
}

#[async_trait]
impl RequirementStore for InMemoryStore {
    async fn create_requirement(&self, form: IntakeForm) -> Result<EventRequirement> {
        let requirement = EventRequirement::from_form(form);
        self.tables
            .write()
            .await
            .requirements
            .insert(requirement.id, requirement.clone());
        self.publish(
            Collection::EventRequirements,
            ChangeKind::Insert,
            requirement.id,
            Some(&requirement),
        );
        Ok(requirement)
    }

    async fn list_requirements(&self) -> Result<Vec<EventRequirement>> {
        let mut requirements: Vec<_> = self
            .tables
            .read()
            .await
            .requirements
            .values()
            .cloned()
            .collect();
        requirements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requirements)
    }

    async fn update_requirement_status(
        &self,
        id: Uuid,
        status: RequirementStatus,
    ) -> Result<Option<EventRequirement>> {
        let updated = {
            let mut tables = self.tables.write().await;
            tables.requirements.get_mut(&id).map(|requirement| {
                requirement.status = status;
                requirement.clone()
            })
        };
        if let Some(requirement) = &updated {
            self.publish(Collection::EventRequirements, ChangeKind::Update, id, Some(requirement));
        }
        Ok(updated)
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn list_upcoming(&self, from: DateTime<Utc>) -> Result<Vec<LiveEvent>> {
        let mut events: Vec<_> = self
            .tables
            .read()
            .await
            .events
            .values()
            .filter(|event| event.start_time >= from)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.start_time);
        Ok(events)
    }

    async fn create_event(&self, input: NewLiveEvent) -> Result<LiveEvent> {
        let event = input.into_event(Uuid::now_v7());
        self.tables
            .write()
            .await
            .events
            .insert(event.id, event.clone());
        self.publish(Collection::Events, ChangeKind::Insert, event.id, Some(&event));
        Ok(event)
    }

    async fn update_event(&self, id: Uuid, update: LiveEventUpdate) -> Result<Option<LiveEvent>> {
        let updated = {
            let mut tables = self.tables.write().await;
            tables.events.get_mut(&id).map(|event| {
                update.apply(event);
                event.clone()
            })
        };
        if let Some(event) = &updated {
            self.publish(Collection::Events, ChangeKind::Update, id, Some(event));
        }
        Ok(updated)
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool> {
        let removed = self.tables.write().await.events.remove(&id).is_some();
        if removed {
            self.publish::<LiveEvent>(Collection::Events, ChangeKind::Delete, id, None);
        }
        Ok(removed)
    }
}

#[async_trait]
impl ProviderStore for InMemoryStore {
    async fn list_providers(&self, query: &ProviderQuery) -> Result<Vec<ServiceProvider>> {
        let mut providers: Vec<_> = self
            .tables
            .read()
            .await
            .providers
            .values()
            .filter(|provider| query.matches(provider))
            .cloned()
            .collect();
        query.sort(&mut providers);
        Ok(providers)
    }

    async fn get_provider(&self, id: Uuid) -> Result<Option<ServiceProvider>> {
        Ok(self.tables.read().await.providers.get(&id).cloned())
    }

    async fn create_provider(&self, input: NewServiceProvider) -> Result<ServiceProvider> {
        let provider = ServiceProvider {
            id: Uuid::now_v7(),
            owner_id: input.owner_id,
            business_name: input.business_name,
            category: input.category,
            description: input.description,
            location: input.location,
            price_from: input.price_from,
            rating: None,
            status: ProviderStatus::Pending,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .providers
            .insert(provider.id, provider.clone());
        self.publish(Collection::ServiceProviders, ChangeKind::Insert, provider.id, Some(&provider));
        Ok(provider)
    }

    async fn set_provider_status(
        &self,
        id: Uuid,
        status: ProviderStatus,
    ) -> Result<Option<ServiceProvider>> {
        let updated = {
            let mut tables = self.tables.write().await;
            tables.providers.get_mut(&id).map(|provider| {
                provider.status = status;
                provider.clone()
            })
        };
        if let Some(provider) = &updated {
            self.publish(Collection::ServiceProviders, ChangeKind::Update, id, Some(provider));
        }
        Ok(updated)
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn upsert_profile(&self, profile: Profile) -> Result<Profile> {
        let existed = self
            .tables
            .write()
            .await
            .profiles
            .insert(profile.id, profile.clone())
            .is_some();
        let kind = if existed {
            ChangeKind::Update
        } else {
            ChangeKind::Insert
        };
        self.publish(Collection::Profiles, kind, profile.id, Some(&profile));
        Ok(profile)
    }
}

// ============================================================================
// FailingStore - Always returns an error
// ============================================================================

/// Store whose every call fails; counts attempts.
///
/// Useful for testing error handling.
#[derive(Debug)]
pub struct FailingStore {
    error_message: String,
    attempts: AtomicUsize,
}

impl FailingStore {
    pub fn new(error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Number of calls made so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::collaborator(self.error_message.clone()))
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new("Storage unavailable")
    }
}

#[async_trait]
impl RequirementStore for FailingStore {
    async fn create_requirement(&self, _form: IntakeForm) -> Result<EventRequirement> {
        self.fail()
    }

    async fn list_requirements(&self) -> Result<Vec<EventRequirement>> {
        self.fail()
    }

    async fn update_requirement_status(
        &self,
        _id: Uuid,
        _status: RequirementStatus,
    ) -> Result<Option<EventRequirement>> {
        self.fail()
    }
}

#[async_trait]
impl EventStore for FailingStore {
    async fn list_upcoming(&self, _from: DateTime<Utc>) -> Result<Vec<LiveEvent>> {
        self.fail()
    }

    async fn create_event(&self, _input: NewLiveEvent) -> Result<LiveEvent> {
        self.fail()
    }

    async fn update_event(&self, _id: Uuid, _update: LiveEventUpdate) -> Result<Option<LiveEvent>> {
        self.fail()
    }

    async fn delete_event(&self, _id: Uuid) -> Result<bool> {
        self.fail()
    }
}
