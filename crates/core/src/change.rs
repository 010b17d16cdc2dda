// Change notifications and the in-process broadcast hub
//
// Every storage write publishes a ChangeNotification. Subscribers filter by
// collection; a slow subscriber that falls behind the channel capacity loses
// the oldest notifications and is told so via a log line.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::traits::{ChangeFeed, ChangeStream};

pub const DEFAULT_HUB_CAPACITY: usize = 1024;

/// Backend collections that publish changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Events,
    EventRequirements,
    ServiceProviders,
    Profiles,
}

impl Collection {
    /// Table name
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Events => "events",
            Collection::EventRequirements => "event_requirements",
            Collection::ServiceProviders => "service_providers",
            Collection::Profiles => "profiles",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One row-level change pushed to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChangeNotification {
    /// Monotonic per hub
    pub seq: u64,
    pub collection: Collection,
    pub kind: ChangeKind,
    /// Id of the changed row
    pub id: Uuid,
    /// New row for insert/update, absent for delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

/// In-process change feed over a tokio broadcast channel
pub struct ChangeHub {
    tx: broadcast::Sender<ChangeNotification>,
    seq: AtomicU64,
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HUB_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            seq: AtomicU64::new(0),
        }
    }

    /// Build and broadcast a notification
    pub fn publish(
        &self,
        collection: Collection,
        kind: ChangeKind,
        id: Uuid,
        record: Option<serde_json::Value>,
    ) -> ChangeNotification {
        let notification = ChangeNotification {
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            collection,
            kind,
            id,
            record,
            timestamp: Utc::now(),
        };
        // Having no subscribers is normal
        if self.tx.send(notification.clone()).is_err() {
            tracing::trace!(collection = %collection, id = %id, "change published without subscribers");
        }
        notification
    }

    /// Serialize a record and publish it. Serialization failures are logged.
    pub fn publish_record<T: Serialize>(
        &self,
        collection: Collection,
        kind: ChangeKind,
        id: Uuid,
        record: &T,
    ) -> Option<ChangeNotification> {
        match serde_json::to_value(record) {
            Ok(value) => Some(self.publish(collection, kind, id, Some(value))),
            Err(e) => {
                tracing::error!(collection = %collection, id = %id, error = %e, "failed to serialize change record");
                None
            }
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl ChangeFeed for ChangeHub {
    fn subscribe(&self, collection: Collection) -> ChangeStream {
        let stream = BroadcastStream::new(self.tx.subscribe()).filter_map(move |item| match item {
            Ok(notification) if notification.collection == collection => Some(notification),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(collection = %collection, skipped, "change subscriber lagged");
                None
            }
        });
        Box::pin(stream)
    }
}
