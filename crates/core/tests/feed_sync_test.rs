// Integration tests for the live event feed synchronizer
//
// Run with: cargo test -p gatherly-core --test feed_sync_test

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use gatherly_core::memory::{FailingStore, InMemoryStore};
use gatherly_core::traits::EventStore;
use gatherly_core::{
    ChangeHub, ChangeKind, Collection, FeedConfig, FeedHandle, FeedSynchronizer, InsertOrdering,
    LiveEvent, LiveEventUpdate, NewLiveEvent, Severity, ToastBuffer,
};
use tokio::sync::Notify;
use uuid::Uuid;

fn new_event(title: &str, hours_from_now: i64) -> NewLiveEvent {
    NewLiveEvent {
        title: title.to_string(),
        description: None,
        start_time: Utc::now() + Duration::hours(hours_from_now),
        end_time: None,
        location: "Mumbai".to_string(),
        venue: None,
        price: None,
        image_url: None,
        featured: false,
        category: Some("Music".to_string()),
    }
}

fn event(title: &str, hours_from_now: i64) -> LiveEvent {
    new_event(title, hours_from_now).into_event(Uuid::now_v7())
}

async fn titles(handle: &FeedHandle) -> Vec<String> {
    handle.events().await.into_iter().map(|e| e.title).collect()
}

async fn wait(handle: &FeedHandle, revision: u64) {
    tokio::time::timeout(StdDuration::from_secs(5), handle.wait_for_revision(revision))
        .await
        .expect("feed did not reach revision in time");
}

struct Setup {
    hub: Arc<ChangeHub>,
    store: InMemoryStore,
    toasts: ToastBuffer,
}

impl Setup {
    fn new() -> Self {
        let hub = Arc::new(ChangeHub::new());
        Self {
            store: InMemoryStore::with_change_hub(hub.clone()),
            hub,
            toasts: ToastBuffer::new(),
        }
    }

    fn activate(&self, ordering: InsertOrdering) -> FeedHandle {
        let config = FeedConfig::builder().insert_ordering(ordering).build();
        FeedSynchronizer::new(
            Arc::new(self.store.clone()),
            self.hub.clone(),
            Arc::new(self.toasts.clone()),
            config,
        )
        .activate()
    }
}

#[tokio::test]
async fn test_initial_read_is_upcoming_ascending() {
    let setup = Setup::new();
    setup
        .store
        .seed_events(vec![event("E2", 20), event("past", -3), event("E1", 10)])
        .await;

    let handle = setup.activate(InsertOrdering::SortedByStart);
    wait(&handle, 1).await;

    let state = handle.snapshot().await;
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(titles(&handle).await, vec!["E1", "E2"]);
}

#[tokio::test]
async fn test_prepend_mode_puts_insert_first() {
    let setup = Setup::new();
    setup
        .store
        .seed_events(vec![event("E1", 10), event("E2", 20)])
        .await;

    let handle = setup.activate(InsertOrdering::Prepend);
    wait(&handle, 1).await;

    setup.store.create_event(new_event("E3", 5)).await.unwrap();
    wait(&handle, 2).await;
    assert_eq!(titles(&handle).await, vec!["E3", "E1", "E2"]);
}

#[tokio::test]
async fn test_sorted_mode_places_insert_by_start() {
    let setup = Setup::new();
    setup
        .store
        .seed_events(vec![event("E1", 10), event("E2", 20)])
        .await;

    let handle = setup.activate(InsertOrdering::SortedByStart);
    wait(&handle, 1).await;

    setup.store.create_event(new_event("E3", 15)).await.unwrap();
    wait(&handle, 2).await;
    assert_eq!(titles(&handle).await, vec!["E1", "E3", "E2"]);
}

#[tokio::test]
async fn test_update_of_unknown_id_changes_nothing() {
    let setup = Setup::new();
    let e1 = event("E1", 10);
    setup.store.seed_events(vec![e1.clone(), event("E2", 20)]).await;

    let handle = setup.activate(InsertOrdering::SortedByStart);
    wait(&handle, 1).await;
    let before = handle.events().await;

    let ghost = event("ghost", 12);
    setup.hub.publish_record(Collection::Events, ChangeKind::Update, ghost.id, &ghost);
    // A known update afterwards marks that the ghost was processed
    setup
        .store
        .update_event(
            e1.id,
            LiveEventUpdate {
                featured: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    wait(&handle, 2).await;

    let after = handle.events().await;
    assert_eq!(after.len(), before.len());
    assert!(after.iter().all(|e| e.id != ghost.id));
    assert!(after[0].featured);
}

#[tokio::test]
async fn test_delete_preserves_relative_order() {
    let setup = Setup::new();
    let e2 = event("E2", 20);
    setup
        .store
        .seed_events(vec![event("E1", 10), e2.clone(), event("E3", 30)])
        .await;

    let handle = setup.activate(InsertOrdering::Prepend);
    wait(&handle, 1).await;

    assert!(setup.store.delete_event(e2.id).await.unwrap());
    wait(&handle, 2).await;
    assert_eq!(titles(&handle).await, vec!["E1", "E3"]);
}

#[tokio::test]
async fn test_undecodable_payload_is_dropped() {
    let setup = Setup::new();
    let handle = setup.activate(InsertOrdering::SortedByStart);
    wait(&handle, 1).await;

    setup.hub.publish(
        Collection::Events,
        ChangeKind::Insert,
        Uuid::now_v7(),
        Some(serde_json::json!({ "title": 42 })),
    );
    setup.store.create_event(new_event("real", 2)).await.unwrap();
    wait(&handle, 2).await;
    assert_eq!(titles(&handle).await, vec!["real"]);
}

#[tokio::test]
async fn test_failed_initial_read_raises_toast_and_keeps_listening() {
    let hub = Arc::new(ChangeHub::new());
    let toasts = ToastBuffer::new();
    let handle = FeedSynchronizer::new(
        Arc::new(FailingStore::new("timeout")),
        hub.clone(),
        Arc::new(toasts.clone()),
        FeedConfig::default(),
    )
    .activate();
    wait(&handle, 1).await;

    let state = handle.snapshot().await;
    assert!(!state.loading);
    assert!(state.events.is_empty());
    assert!(state.error.is_some());
    let raised = toasts.drain();
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].severity, Severity::Error);

    let pushed = event("pushed", 4);
    hub.publish_record(Collection::Events, ChangeKind::Insert, pushed.id, &pushed);
    wait(&handle, 2).await;
    assert_eq!(titles(&handle).await, vec!["pushed"]);
}

/// Event store whose initial read blocks until released
struct GatedStore {
    inner: InMemoryStore,
    gate: Arc<Notify>,
}

#[async_trait]
impl EventStore for GatedStore {
    async fn list_upcoming(&self, from: DateTime<Utc>) -> gatherly_core::Result<Vec<LiveEvent>> {
        let snapshot = self.inner.list_upcoming(from).await;
        self.gate.notified().await;
        snapshot
    }

    async fn create_event(&self, input: NewLiveEvent) -> gatherly_core::Result<LiveEvent> {
        self.inner.create_event(input).await
    }

    async fn update_event(
        &self,
        id: Uuid,
        update: LiveEventUpdate,
    ) -> gatherly_core::Result<Option<LiveEvent>> {
        self.inner.update_event(id, update).await
    }

    async fn delete_event(&self, id: Uuid) -> gatherly_core::Result<bool> {
        self.inner.delete_event(id).await
    }
}

#[tokio::test]
async fn test_push_during_initial_read_is_not_lost() {
    let setup = Setup::new();
    setup.store.seed_events(vec![event("E1", 10)]).await;
    let gate = Arc::new(Notify::new());

    let handle = FeedSynchronizer::new(
        Arc::new(GatedStore {
            inner: setup.store.clone(),
            gate: gate.clone(),
        }),
        setup.hub.clone(),
        Arc::new(setup.toasts.clone()),
        FeedConfig::default(),
    )
    .activate();
    assert!(handle.is_loading().await);

    setup.store.create_event(new_event("E0", 2)).await.unwrap();
    gate.notify_one();

    wait(&handle, 2).await;
    assert_eq!(titles(&handle).await, vec!["E0", "E1"]);
}

#[tokio::test]
async fn test_deactivate_releases_subscription() {
    let setup = Setup::new();
    let handle = setup.activate(InsertOrdering::SortedByStart);
    wait(&handle, 1).await;
    assert_eq!(setup.hub.receiver_count(), 1);
    assert!(handle.is_active());

    handle.deactivate().await;
    assert_eq!(setup.hub.receiver_count(), 0);
}

#[tokio::test]
async fn test_drop_aborts_task() {
    let setup = Setup::new();
    let handle = setup.activate(InsertOrdering::SortedByStart);
    wait(&handle, 1).await;

    drop(handle);
    for _ in 0..100 {
        if setup.hub.receiver_count() == 0 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(setup.hub.receiver_count(), 0);
}
