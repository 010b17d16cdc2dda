// Feed synchronizer configuration
//
// FeedConfig is plain data so it can be:
// - Created directly with defaults
// - Built with FeedConfigBuilder
// - Read from the environment by the control plane

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::change::DEFAULT_HUB_CAPACITY;

/// Where inserted events land in the live list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOrdering {
    /// Keep the list ordered by start time
    #[default]
    SortedByStart,
    /// Put new events at the front without re-sorting
    Prepend,
}

impl FromStr for InsertOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sorted" | "sorted_by_start" => Ok(InsertOrdering::SortedByStart),
            "prepend" => Ok(InsertOrdering::Prepend),
            other => Err(format!("unknown insert ordering '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub insert_ordering: InsertOrdering,

    /// Capacity of the change hub channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    DEFAULT_HUB_CAPACITY
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            insert_ordering: InsertOrdering::default(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl FeedConfig {
    pub fn builder() -> FeedConfigBuilder {
        FeedConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct FeedConfigBuilder {
    insert_ordering: Option<InsertOrdering>,
    channel_capacity: Option<usize>,
}

impl FeedConfigBuilder {
    pub fn insert_ordering(mut self, ordering: InsertOrdering) -> Self {
        self.insert_ordering = Some(ordering);
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    pub fn build(self) -> FeedConfig {
        FeedConfig {
            insert_ordering: self.insert_ordering.unwrap_or_default(),
            channel_capacity: self
                .channel_capacity
                .unwrap_or_else(default_channel_capacity)
                .max(1),
        }
    }
}
