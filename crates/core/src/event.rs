// Live event domain types
//
// LiveEvent mirrors the backend `events` record. The feed synchronizer owns
// the in-memory copies; everything else reads snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Upcoming event listed in the live feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LiveEvent {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub location: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    /// Category name, e.g. "Music"
    #[serde(default)]
    pub category: Option<String>,
}

/// Input for creating an event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewLiveEvent {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub location: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewLiveEvent {
    pub fn into_event(self, id: Uuid) -> LiveEvent {
        LiveEvent {
            id,
            title: self.title,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location,
            venue: self.venue,
            price: self.price,
            image_url: self.image_url,
            featured: self.featured,
            category: self.category,
        }
    }
}

/// Partial update. Only provided fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LiveEventUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub category: Option<String>,
}

impl LiveEventUpdate {
    pub fn apply(self, event: &mut LiveEvent) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = Some(description);
        }
        if let Some(start_time) = self.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            event.end_time = Some(end_time);
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(venue) = self.venue {
            event.venue = Some(venue);
        }
        if let Some(price) = self.price {
            event.price = Some(price);
        }
        if let Some(image_url) = self.image_url {
            event.image_url = Some(image_url);
        }
        if let Some(featured) = self.featured {
            event.featured = featured;
        }
        if let Some(category) = self.category {
            event.category = Some(category);
        }
    }
}
