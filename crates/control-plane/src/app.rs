// Application wiring: storage, change hub, live feed, services and router
//
// Shared by the server binary and the router tests.

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{extract::State, routing::get, Json, Router};
use gatherly_core::traits::{ChangeFeed, EventStore};
use gatherly_core::{ChangeHub, FeedHandle, FeedSynchronizer, TracingNotifier};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::auth::{self, AuthConfig, AuthMode, AuthRoutesState, AuthState, PasswordAuthProvider};
use crate::config::ServerConfig;
use crate::openapi::ApiDoc;
use crate::services::{EventService, IntakeService, ProviderService, RequirementService};
use crate::storage::{BackendStore, StorageBackend};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    auth_mode: String,
    storage: &'static str,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    auth_mode: String,
    storage: &'static str,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        auth_mode: state.auth_mode.clone(),
        storage: state.storage,
    })
}

/// Everything the router needs, built once at startup
pub struct Gatherly {
    pub backend: Arc<StorageBackend>,
    pub hub: Arc<ChangeHub>,
    pub feed: Arc<FeedHandle>,
    pub auth_state: AuthState,
    pub auth_provider: Arc<PasswordAuthProvider>,
    pub intake_service: Arc<IntakeService>,
    pub event_service: Arc<EventService>,
    pub provider_service: Arc<ProviderService>,
    pub requirement_service: Arc<RequirementService>,
    api_prefix: String,
    cors_origins: Vec<HeaderValue>,
}

impl Gatherly {
    /// Connect storage per config and wire the application
    pub async fn init(config: &ServerConfig, auth_config: AuthConfig) -> Result<Self> {
        let backend = match &config.database_url {
            Some(url) => {
                let backend = StorageBackend::postgres(url)
                    .await
                    .context("Failed to connect to database")?;
                tracing::info!("Connected to database");
                if config.run_migrations {
                    backend.migrate().await.context("Failed to run migrations")?;
                    tracing::info!("Migrations applied");
                }
                backend
            }
            None => {
                tracing::warn!("DATABASE_URL not set, running in dev mode with in-memory storage");
                StorageBackend::in_memory()
            }
        };

        Self::with_backend(backend, config, auth_config).await
    }

    pub async fn with_backend(
        backend: StorageBackend,
        config: &ServerConfig,
        auth_config: AuthConfig,
    ) -> Result<Self> {
        let backend = Arc::new(backend);
        let hub = Arc::new(ChangeHub::with_capacity(config.feed.channel_capacity));
        let store = Arc::new(BackendStore::new(backend.clone(), hub.clone()));

        // Live feed: one initial read plus pushes from the hub
        let event_store: Arc<dyn EventStore> = store.clone();
        let change_feed: Arc<dyn ChangeFeed> = hub.clone();
        let synchronizer = FeedSynchronizer::new(
            event_store.clone(),
            change_feed,
            Arc::new(TracingNotifier),
            config.feed.clone(),
        );
        let feed = Arc::new(synchronizer.activate());
        tracing::info!(ordering = ?config.feed.insert_ordering, "Live feed activated");

        let auth_state = AuthState::new(auth_config.clone(), backend.clone());
        let auth_provider = Arc::new(PasswordAuthProvider::new(
            &auth_config,
            backend.clone(),
            store.clone(),
            auth_state.jwt_service.clone(),
        ));
        if let Some(admin) = &auth_config.admin {
            auth_provider
                .bootstrap_admin(admin)
                .await
                .context("Failed to create admin account")?;
        }
        tracing::info!(
            mode = ?auth_config.mode,
            signup = auth_config.signup_enabled(),
            "Authentication configured"
        );

        Ok(Self {
            intake_service: Arc::new(IntakeService::new(store.clone())),
            event_service: Arc::new(EventService::new(event_store, feed.clone(), hub.clone())),
            provider_service: Arc::new(ProviderService::new(store.clone())),
            requirement_service: Arc::new(RequirementService::new(store)),
            backend,
            hub,
            feed,
            auth_state,
            auth_provider,
            api_prefix: config.api_prefix.clone(),
            cors_origins: config.cors_origins.clone(),
        })
    }

    /// API routes without prefix, health or layers
    pub fn api_routes(&self) -> Router {
        let auth_routes_state = AuthRoutesState {
            auth: self.auth_state.clone(),
            provider: self.auth_provider.clone(),
        };
        let admin_state = api::admin::AppState {
            auth: self.auth_state.clone(),
            event_service: self.event_service.clone(),
            provider_service: self.provider_service.clone(),
            requirement_service: self.requirement_service.clone(),
        };

        Router::new()
            .merge(api::intake::routes(api::intake::AppState::new(
                self.intake_service.clone(),
            )))
            .merge(api::events::routes(api::events::AppState::new(
                self.event_service.clone(),
            )))
            .merge(api::providers::routes(api::providers::AppState::new(
                self.provider_service.clone(),
            )))
            .merge(api::admin::routes(admin_state))
            .merge(auth::routes::routes(auth_routes_state))
    }

    /// Full application router
    pub fn router(&self) -> Router {
        if !self.api_prefix.is_empty() {
            tracing::info!(prefix = %self.api_prefix, "API prefix configured");
        }

        let health_state = HealthState {
            auth_mode: match self.auth_state.config.mode {
                AuthMode::None => "none".to_string(),
                AuthMode::Full => "full".to_string(),
            },
            storage: if self.backend.is_dev_mode() {
                "memory"
            } else {
                "postgres"
            },
        };

        // Health is not prefixed
        let app = Router::new()
            .route("/health", get(health).with_state(health_state))
            .merge(build_router_with_prefix(self.api_routes(), &self.api_prefix))
            .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

        // Add CORS layer only if origins are configured
        let app = if self.cors_origins.is_empty() {
            tracing::info!("CORS not configured (same-origin requests only)");
            app
        } else {
            tracing::info!(origins = ?self.cors_origins, "CORS origins configured");
            app.layer(
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(self.cors_origins.clone()))
                    .allow_methods([
                        Method::GET,
                        Method::POST,
                        Method::PATCH,
                        Method::DELETE,
                        Method::OPTIONS,
                    ])
                    .allow_headers([
                        header::CONTENT_TYPE,
                        header::AUTHORIZATION,
                        header::ACCEPT,
                        header::ORIGIN,
                        header::CACHE_CONTROL,
                    ])
                    .allow_credentials(true),
            )
        };

        app.layer(TraceLayer::new_for_http())
    }
}

/// Build router with optional API prefix
pub fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_routes() -> Router {
        Router::new().route("/v1/test", get(|| async { "ok" }))
    }

    #[tokio::test]
    async fn test_api_prefix_empty() {
        let app = build_router_with_prefix(test_routes(), "");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_api_prefix_set() {
        let app = build_router_with_prefix(test_routes(), "/api");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_health_reports_dev_storage() {
        let app = Gatherly::init(&ServerConfig::default(), AuthConfig::default())
            .await
            .unwrap();

        let response = app
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["storage"], "memory");
        assert_eq!(json["auth_mode"], "none");
    }
}
