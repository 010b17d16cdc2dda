// Live event feed synchronizer
//
// Activation subscribes to the `events` collection first and only then reads
// the upcoming events, so pushes that race with the initial read queue up in
// the subscription and are applied on top of the snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::{oneshot, watch, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::list::EventList;
use crate::change::{ChangeKind, ChangeNotification, Collection};
use crate::config::FeedConfig;
use crate::event::LiveEvent;
use crate::notify::Toast;
use crate::traits::{ChangeFeed, ChangeStream, EventStore, Notifier};

/// Point-in-time view of the feed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FeedState {
    pub events: Vec<LiveEvent>,
    /// True until the initial read settles
    pub loading: bool,
    /// Message of a failed initial read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug)]
struct Shared {
    list: EventList,
    loading: bool,
    error: Option<String>,
}

pub struct FeedSynchronizer {
    store: Arc<dyn EventStore>,
    feed: Arc<dyn ChangeFeed>,
    notifier: Arc<dyn Notifier>,
    config: FeedConfig,
}

impl FeedSynchronizer {
    pub fn new(
        store: Arc<dyn EventStore>,
        feed: Arc<dyn ChangeFeed>,
        notifier: Arc<dyn Notifier>,
        config: FeedConfig,
    ) -> Self {
        Self {
            store,
            feed,
            notifier,
            config,
        }
    }

    /// Open the subscription, start the initial read and return a handle
    /// owning the background task
    pub fn activate(&self) -> FeedHandle {
        let stream = self.feed.subscribe(Collection::Events);

        let shared = Arc::new(RwLock::new(Shared {
            list: EventList::new(self.config.insert_ordering),
            loading: true,
            error: None,
        }));
        let (revision_tx, revision_rx) = watch::channel(0u64);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let worker = FeedWorker {
            store: self.store.clone(),
            notifier: self.notifier.clone(),
            shared: shared.clone(),
            revisions: revision_tx,
        };
        let task = tokio::spawn(worker.run(stream, shutdown_rx));

        tracing::debug!(ordering = ?self.config.insert_ordering, "feed synchronizer activated");

        FeedHandle {
            shared,
            revisions: revision_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

struct FeedWorker {
    store: Arc<dyn EventStore>,
    notifier: Arc<dyn Notifier>,
    shared: Arc<RwLock<Shared>>,
    revisions: watch::Sender<u64>,
}

impl FeedWorker {
    async fn run(self, mut stream: ChangeStream, mut shutdown: oneshot::Receiver<()>) {
        tokio::select! {
            biased;
            _ = &mut shutdown => return,
            _ = self.load_initial() => {}
        }

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                next = stream.next() => match next {
                    Some(notification) => self.apply(notification).await,
                    None => {
                        tracing::debug!("event change stream closed");
                        break;
                    }
                },
            }
        }
    }

    async fn load_initial(&self) {
        let result = self.store.list_upcoming(Utc::now()).await;
        let mut shared = self.shared.write().await;
        match result {
            Ok(events) => {
                tracing::debug!(count = events.len(), "loaded upcoming events");
                shared.list.load(events);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load upcoming events");
                shared.error = Some(e.to_string());
                self.notifier.notify(Toast::error(
                    "Couldn't load events",
                    "Live events are unavailable right now. New events will still appear.",
                ));
            }
        }
        shared.loading = false;
        drop(shared);
        self.bump();
    }

    async fn apply(&self, notification: ChangeNotification) {
        let changed = match notification.kind {
            ChangeKind::Insert => match decode(&notification) {
                Some(event) => {
                    self.shared.write().await.list.insert(event);
                    true
                }
                None => false,
            },
            ChangeKind::Update => match decode(&notification) {
                Some(event) => self.shared.write().await.list.update(event),
                None => false,
            },
            ChangeKind::Delete => self.shared.write().await.list.delete(notification.id),
        };

        if changed {
            tracing::trace!(kind = ?notification.kind, id = %notification.id, "applied event change");
            self.bump();
        }
    }

    fn bump(&self) {
        self.revisions.send_modify(|revision| *revision += 1);
    }
}

fn decode(notification: &ChangeNotification) -> Option<LiveEvent> {
    let Some(record) = notification.record.clone() else {
        tracing::warn!(id = %notification.id, kind = ?notification.kind, "event change without record");
        return None;
    };
    match serde_json::from_value::<LiveEvent>(record) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(id = %notification.id, error = %e, "dropping undecodable event change");
            None
        }
    }
}

/// Owner of an active feed. Dropping it aborts the background task.
pub struct FeedHandle {
    shared: Arc<RwLock<Shared>>,
    revisions: watch::Receiver<u64>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    pub async fn snapshot(&self) -> FeedState {
        let shared = self.shared.read().await;
        FeedState {
            events: shared.list.snapshot(),
            loading: shared.loading,
            error: shared.error.clone(),
        }
    }

    pub async fn events(&self) -> Vec<LiveEvent> {
        self.shared.read().await.list.snapshot()
    }

    pub async fn get(&self, id: Uuid) -> Option<LiveEvent> {
        self.shared.read().await.list.get(id).cloned()
    }

    /// Drop events that started before `cutoff`. Not counted as a revision,
    /// since no change arrived from the store.
    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> usize {
        let pruned = self.shared.write().await.list.prune_before(cutoff);
        if pruned > 0 {
            tracing::debug!(pruned, "pruned past events from feed");
        }
        pruned
    }

    pub async fn is_loading(&self) -> bool {
        self.shared.read().await.loading
    }

    /// Counter bumped after the initial read and every applied change
    pub fn revisions(&self) -> watch::Receiver<u64> {
        self.revisions.clone()
    }

    /// Wait until the revision counter reaches `target`
    pub async fn wait_for_revision(&self, target: u64) {
        let mut revisions = self.revisions.clone();
        // Err means the worker is gone; nothing more will change
        let _ = revisions.wait_for(|revision| *revision >= target).await;
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the subscription and wait for the task to finish
    pub async fn deactivate(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "feed task ended abnormally");
            }
        }
        tracing::debug!("feed synchronizer deactivated");
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
