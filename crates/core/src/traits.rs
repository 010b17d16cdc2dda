// Collaborator traits
//
// The intake session, the feed synchronizer and the HTTP services only talk
// to the outside world through these traits:
// - In-memory implementations for development and testing
// - Database implementations for production
// - The broadcast hub for change notifications

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use uuid::Uuid;

use crate::auth::{AuthOutcome, Credentials, SignUpRequest};
use crate::change::{ChangeNotification, Collection};
use crate::error::Result;
use crate::event::{LiveEvent, LiveEventUpdate, NewLiveEvent};
use crate::intake::IntakeForm;
use crate::notify::Toast;
use crate::profile::Profile;
use crate::provider::{NewServiceProvider, ProviderQuery, ProviderStatus, ServiceProvider};
use crate::requirement::{EventRequirement, RequirementStatus};

// ============================================================================
// RequirementStore - event_requirements collection
// ============================================================================

#[async_trait]
pub trait RequirementStore: Send + Sync {
    /// Store a completed intake form as a new requirement
    async fn create_requirement(&self, form: IntakeForm) -> Result<EventRequirement>;

    /// All requirements, newest first
    async fn list_requirements(&self) -> Result<Vec<EventRequirement>>;

    /// Returns `None` if the requirement does not exist
    async fn update_requirement_status(
        &self,
        id: Uuid,
        status: RequirementStatus,
    ) -> Result<Option<EventRequirement>>;
}

// ============================================================================
// EventStore - events collection
// ============================================================================

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events starting at or after `from`, ascending by start time
    async fn list_upcoming(&self, from: DateTime<Utc>) -> Result<Vec<LiveEvent>>;

    async fn create_event(&self, input: NewLiveEvent) -> Result<LiveEvent>;

    async fn update_event(&self, id: Uuid, update: LiveEventUpdate) -> Result<Option<LiveEvent>>;

    /// Returns whether a row was deleted
    async fn delete_event(&self, id: Uuid) -> Result<bool>;
}

// ============================================================================
// ProviderStore - service_providers collection
// ============================================================================

#[async_trait]
pub trait ProviderStore: Send + Sync {
    async fn list_providers(&self, query: &ProviderQuery) -> Result<Vec<ServiceProvider>>;

    async fn get_provider(&self, id: Uuid) -> Result<Option<ServiceProvider>>;

    async fn create_provider(&self, input: NewServiceProvider) -> Result<ServiceProvider>;

    async fn set_provider_status(
        &self,
        id: Uuid,
        status: ProviderStatus,
    ) -> Result<Option<ServiceProvider>>;
}

// ============================================================================
// ProfileStore - profiles collection
// ============================================================================

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>>;

    /// Insert or replace by id
    async fn upsert_profile(&self, profile: Profile) -> Result<Profile>;
}

// ============================================================================
// ChangeFeed - push notifications per collection
// ============================================================================

/// Stream of change notifications for one collection
pub type ChangeStream = Pin<Box<dyn Stream<Item = ChangeNotification> + Send>>;

pub trait ChangeFeed: Send + Sync {
    /// Open a subscription. Notifications published after this call are
    /// delivered; dropping the stream closes the subscription.
    fn subscribe(&self, collection: Collection) -> ChangeStream;
}

// ============================================================================
// AuthProvider - sign in / sign up / sign out
// ============================================================================

/// Failures are reported through `AuthOutcome`, never as errors
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, credentials: Credentials) -> AuthOutcome;

    async fn sign_up(&self, request: SignUpRequest) -> AuthOutcome;

    async fn sign_out(&self, access_token: &str) -> AuthOutcome;
}

// ============================================================================
// Notifier - user-facing toasts
// ============================================================================

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}
