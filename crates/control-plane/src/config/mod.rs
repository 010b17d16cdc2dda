// Server configuration from the environment
//
// Variables:
// - DATABASE_URL: Postgres connection string; in-memory dev mode when unset
// - RUN_MIGRATIONS: apply SQL migrations on startup (default: false)
// - PORT: HTTP port (default: 9000)
// - API_PREFIX: prefix for every API route, e.g. "/api" (default: empty)
// - CORS_ALLOWED_ORIGINS: comma-separated origins (default: same-origin only)
// - FEED_INSERT_ORDERING: sorted | prepend (default: sorted)
// - FEED_CHANNEL_CAPACITY: change hub buffer size

use axum::http::HeaderValue;
use gatherly_core::{FeedConfig, InsertOrdering};

pub const DEFAULT_PORT: u16 = 9000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: Option<String>,
    pub run_migrations: bool,
    pub port: u16,
    pub api_prefix: String,
    pub cors_origins: Vec<HeaderValue>,
    pub feed: FeedConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            run_migrations: false,
            port: DEFAULT_PORT,
            api_prefix: String::new(),
            cors_origins: Vec::new(),
            feed: FeedConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                tracing::warn!("Invalid PORT, using {}: {}", DEFAULT_PORT, e);
                DEFAULT_PORT
            }
            None => DEFAULT_PORT,
        };

        let mut feed = FeedConfig::builder();
        if let Some(raw) = get("FEED_INSERT_ORDERING") {
            match raw.parse::<InsertOrdering>() {
                Ok(ordering) => feed = feed.insert_ordering(ordering),
                Err(e) => tracing::warn!("Ignoring FEED_INSERT_ORDERING: {}", e),
            }
        }
        if let Some(capacity) = get("FEED_CHANNEL_CAPACITY").and_then(|c| c.parse().ok()) {
            feed = feed.channel_capacity(capacity);
        }

        let cors_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|s| s.split(',').filter_map(|s| s.trim().parse().ok()).collect())
            .unwrap_or_default();

        Self {
            database_url: get("DATABASE_URL"),
            run_migrations: get("RUN_MIGRATIONS")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            port,
            api_prefix: get("API_PREFIX").unwrap_or_default(),
            cors_origins,
            feed: feed.build(),
        }
    }

    pub fn is_dev_mode(&self) -> bool {
        self.database_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert!(config.is_dev_mode());
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.api_prefix.is_empty());
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.feed.insert_ordering, InsertOrdering::SortedByStart);
    }

    #[test]
    fn test_from_values() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/gatherly"),
            ("RUN_MIGRATIONS", "true"),
            ("PORT", "8080"),
            ("API_PREFIX", "/api"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example.com, https://b.example.com"),
            ("FEED_INSERT_ORDERING", "prepend"),
        ]));
        assert!(!config.is_dev_mode());
        assert!(config.run_migrations);
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.feed.insert_ordering, InsertOrdering::Prepend);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "not-a-port"),
            ("FEED_INSERT_ORDERING", "random"),
            ("DATABASE_URL", "  "),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.feed.insert_ordering, InsertOrdering::SortedByStart);
        assert!(config.is_dev_mode());
    }
}
