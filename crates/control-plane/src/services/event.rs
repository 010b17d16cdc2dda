// Event service: upcoming events, the live feed snapshot and admin writes
//
// Writes go through the EventStore, which publishes each change; the feed
// synchronizer and SSE subscribers pick them up from the hub.

use anyhow::Result;
use chrono::Utc;
use gatherly_core::traits::{ChangeFeed, EventStore};
use gatherly_core::{
    ChangeHub, ChangeStream, Collection, FeedHandle, FeedState, LiveEvent, LiveEventUpdate,
    NewLiveEvent,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct EventService {
    store: Arc<dyn EventStore>,
    feed: Arc<FeedHandle>,
    hub: Arc<ChangeHub>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, feed: Arc<FeedHandle>, hub: Arc<ChangeHub>) -> Self {
        Self { store, feed, hub }
    }

    /// Fresh read of upcoming events, ascending by start time
    pub async fn upcoming(&self) -> Result<Vec<LiveEvent>> {
        Ok(self.store.list_upcoming(Utc::now()).await?)
    }

    /// Current state of the live feed, minus events that have already started
    pub async fn live(&self) -> FeedState {
        self.feed.prune_before(Utc::now()).await;
        self.feed.snapshot().await
    }

    /// Change notifications for the events collection
    pub fn subscribe(&self) -> ChangeStream {
        self.hub.subscribe(Collection::Events)
    }

    pub async fn create(&self, input: NewLiveEvent) -> Result<LiveEvent> {
        if input.title.trim().is_empty() {
            anyhow::bail!("title must not be empty");
        }
        let event = self.store.create_event(input).await?;
        tracing::info!(event_id = %event.id, title = %event.title, "event created");
        Ok(event)
    }

    pub async fn update(&self, id: Uuid, update: LiveEventUpdate) -> Result<Option<LiveEvent>> {
        Ok(self.store.update_event(id, update).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let deleted = self.store.delete_event(id).await?;
        if deleted {
            tracing::info!(event_id = %id, "event deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gatherly_core::memory::InMemoryStore;
    use gatherly_core::{FeedConfig, FeedSynchronizer, TracingNotifier};

    fn new_event(title: &str, start_time: chrono::DateTime<Utc>) -> NewLiveEvent {
        NewLiveEvent {
            title: title.to_string(),
            description: None,
            start_time,
            end_time: None,
            location: "Mumbai".to_string(),
            venue: None,
            price: None,
            image_url: None,
            featured: false,
            category: None,
        }
    }

    #[tokio::test]
    async fn test_live_drops_events_that_have_started() {
        let hub = Arc::new(ChangeHub::new());
        let store: Arc<dyn EventStore> = Arc::new(InMemoryStore::with_change_hub(hub.clone()));
        let feed = Arc::new(
            FeedSynchronizer::new(
                store.clone(),
                hub.clone(),
                Arc::new(TracingNotifier),
                FeedConfig::default(),
            )
            .activate(),
        );
        feed.wait_for_revision(1).await;
        let service = EventService::new(store, feed.clone(), hub);

        // Starts shortly, then falls into the past while the feed holds it
        let soon = service
            .create(new_event("Soon", Utc::now() + Duration::milliseconds(100)))
            .await
            .unwrap();
        service
            .create(new_event("Later", Utc::now() + Duration::hours(5)))
            .await
            .unwrap();
        feed.wait_for_revision(3).await;
        assert!(feed.get(soon.id).await.is_some());

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        let state = service.live().await;
        let titles: Vec<_> = state.events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Later"]);
        assert!(feed.get(soon.id).await.is_none());
    }
}
