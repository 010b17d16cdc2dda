// Marketplace HTTP routes: categories and provider search

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use gatherly_core::{ProviderFilter, ProviderOrder, ProviderQuery, ServiceKind, ServiceProvider};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use super::common::{internal_error, ErrorResponse, ListResponse};
use super::validation::{check_opt_len, MAX_SEARCH_BYTES};
use crate::services::{CategorySummary, ProviderService};

#[derive(Clone)]
pub struct AppState {
    pub provider_service: Arc<ProviderService>,
}

impl AppState {
    pub fn new(provider_service: Arc<ProviderService>) -> Self {
        Self { provider_service }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/categories", get(list_categories))
        .route("/v1/providers", get(search_providers))
        .with_state(state)
}

/// Search parameters. Status is not selectable; only approved providers are listed.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Category slug, e.g. `photographer`
    pub category: Option<ServiceKind>,
    /// Substring of business name or location
    pub search: Option<String>,
    #[serde(default)]
    pub order: ProviderOrder,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f32>,
    pub location: Option<String>,
}

impl SearchParams {
    fn split(self) -> (ProviderQuery, ProviderFilter) {
        let query = ProviderQuery {
            status: None,
            category: self.category,
            search: self.search.filter(|s| !s.trim().is_empty()),
            order: self.order,
        };
        let filter = ProviderFilter {
            min_price: self.min_price,
            max_price: self.max_price,
            min_rating: self.min_rating,
            location: self.location,
        };
        (query, filter)
    }
}

/// GET /v1/categories - Service categories with approved provider counts
#[utoipa::path(
    get,
    path = "/v1/categories",
    responses(
        (status = 200, description = "Categories", body = ListResponse<CategorySummary>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "providers"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<CategorySummary>>, (StatusCode, Json<ErrorResponse>)> {
    let summaries = state
        .provider_service
        .categories()
        .await
        .map_err(|e| internal_error("Failed to list categories", e))?;
    Ok(Json(summaries.into()))
}

/// GET /v1/providers - Search approved providers
#[utoipa::path(
    get,
    path = "/v1/providers",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching providers", body = ListResponse<ServiceProvider>),
        (status = 400, description = "Search too long", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "providers"
)]
pub async fn search_providers(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ListResponse<ServiceProvider>>, (StatusCode, Json<ErrorResponse>)> {
    check_opt_len(params.search.as_deref(), MAX_SEARCH_BYTES)?;
    check_opt_len(params.location.as_deref(), MAX_SEARCH_BYTES)?;

    let (query, filter) = params.split();
    let providers = state
        .provider_service
        .search(query, &filter)
        .await
        .map_err(|e| internal_error("Failed to search providers", e))?;
    Ok(Json(providers.into()))
}
