// Gatherly core
//
// DB-agnostic domain logic for the event-planning marketplace: the guided
// intake flow and the live event feed, plus the marketplace entities.
//
// Key design decisions:
// - Collaborators (storage, change feed, auth, notifications) are traits
// - The intake flow is synchronous and pure; IntakeSession adds the single
//   completion write on top
// - The feed keeps events in an id-keyed list and applies pushes on top of
//   one initial read
// - In-memory implementations cover development and tests

// Domain entity types
pub mod auth;
pub mod category;
pub mod event;
pub mod profile;
pub mod provider;
pub mod requirement;

pub mod change;
pub mod config;
pub mod error;
pub mod feed;
pub mod intake;
pub mod notify;
pub mod traits;

// In-memory implementations for development and testing
pub mod memory;

// Re-exports for convenience
pub use auth::{AuthOutcome, AuthSession, Credentials, SignUpRequest};
pub use category::{categories, Category, ServiceKind};
pub use change::{ChangeHub, ChangeKind, ChangeNotification, Collection};
pub use config::{FeedConfig, FeedConfigBuilder, InsertOrdering};
pub use error::{Error, Result, ValidationError};
pub use event::{LiveEvent, LiveEventUpdate, NewLiveEvent};
pub use feed::{EventList, FeedHandle, FeedState, FeedSynchronizer};
pub use intake::{
    Advance, ChatMessage, EventType, FieldId, GuestCount, InputKind, IntakeFlow, IntakeForm,
    IntakeSession, Sender, StepDescriptor, SubmitState, INTAKE_STEPS,
};
pub use notify::{Severity, Toast, ToastBuffer, TracingNotifier};
pub use profile::{Profile, Role};
pub use provider::{
    NewServiceProvider, ProviderFilter, ProviderOrder, ProviderQuery, ProviderStatus,
    ServiceProvider,
};
pub use requirement::{EventRequirement, RequirementStatus};
pub use traits::{
    AuthProvider, ChangeFeed, ChangeStream, EventStore, Notifier, ProfileStore, ProviderStore,
    RequirementStore,
};
