// Live event HTTP routes: upcoming list, feed snapshot and the SSE change stream

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures::{stream, Stream, StreamExt};
use gatherly_core::{ChangeNotification, FeedState, LiveEvent};
use std::{convert::Infallible, sync::Arc};

use super::common::{internal_error, ErrorResponse, ListResponse};
use crate::services::EventService;

#[derive(Clone)]
pub struct AppState {
    pub event_service: Arc<EventService>,
}

impl AppState {
    pub fn new(event_service: Arc<EventService>) -> Self {
        Self { event_service }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/events", get(list_upcoming))
        .route("/v1/events/live", get(live_feed))
        .route("/v1/events/sse", get(stream_changes))
        .with_state(state)
}

/// GET /v1/events - Upcoming events, soonest first
#[utoipa::path(
    get,
    path = "/v1/events",
    responses(
        (status = 200, description = "Upcoming events", body = ListResponse<LiveEvent>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn list_upcoming(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<LiveEvent>>, (StatusCode, Json<ErrorResponse>)> {
    let events = state
        .event_service
        .upcoming()
        .await
        .map_err(|e| internal_error("Failed to list events", e))?;
    Ok(Json(events.into()))
}

/// GET /v1/events/live - Snapshot of the live feed
#[utoipa::path(
    get,
    path = "/v1/events/live",
    responses((status = 200, description = "Feed snapshot", body = FeedState)),
    tag = "events"
)]
pub async fn live_feed(State(state): State<AppState>) -> Json<FeedState> {
    Json(state.event_service.live().await)
}

fn sse_event(notification: &ChangeNotification) -> SseEvent {
    let event = SseEvent::default()
        .event(format!("{:?}", notification.kind).to_lowercase())
        .id(notification.seq.to_string());
    match serde_json::to_string(notification) {
        Ok(data) => event.data(data),
        Err(e) => {
            tracing::warn!(seq = notification.seq, error = %e, "failed to encode change");
            event.data("{}")
        }
    }
}

/// GET /v1/events/sse - Stream event changes via Server-Sent Events
///
/// Sends a `connected` event first, then one `insert`, `update` or `delete`
/// event per change to the events collection.
#[utoipa::path(
    get,
    path = "/v1/events/sse",
    responses((status = 200, description = "SSE stream of event changes", content_type = "text/event-stream")),
    tag = "events"
)]
pub async fn stream_changes(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    // Subscribe before the first poll so no change slips between connect and read
    let changes = state.event_service.subscribe();

    let connected = stream::once(async {
        Ok::<_, Infallible>(SseEvent::default()
            .event("connected")
            .data(r#"{"status":"connected"}"#))
    });
    let stream = connected.chain(changes.map(|n| Ok(sse_event(&n))));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatherly_core::{ChangeKind, Collection};
    use uuid::Uuid;

    #[test]
    fn test_sse_event_names_kind() {
        let notification = ChangeNotification {
            seq: 7,
            collection: Collection::Events,
            kind: ChangeKind::Delete,
            id: Uuid::now_v7(),
            record: None,
            timestamp: Utc::now(),
        };
        let rendered = format!("{:?}", sse_event(&notification));
        assert!(rendered.contains("delete"));
    }
}
