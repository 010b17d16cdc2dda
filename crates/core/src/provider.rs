// Service provider domain types, search query and client-side filtering
//
// ProviderQuery is what a storage backend evaluates (equality, pattern match,
// ordering). ProviderFilter is the light filtering applied on a fetched list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

use crate::category::ServiceKind;

/// Approval state of a provider listing.
/// - `pending`: registered, waiting for an admin
/// - `approved`: visible in search
/// - `rejected`: hidden
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderStatus::Pending => write!(f, "pending"),
            ProviderStatus::Approved => write!(f, "approved"),
            ProviderStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl From<&str> for ProviderStatus {
    fn from(s: &str) -> Self {
        match s {
            "approved" => ProviderStatus::Approved,
            "rejected" => ProviderStatus::Rejected,
            _ => ProviderStatus::Pending,
        }
    }
}

/// A business offering services on the marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ServiceProvider {
    pub id: Uuid,
    /// Profile that owns the listing
    pub owner_id: Uuid,
    pub business_name: String,
    pub category: ServiceKind,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    /// Starting price
    #[serde(default)]
    pub price_from: Option<f64>,
    /// Average rating, 0-5
    #[serde(default)]
    pub rating: Option<f32>,
    pub status: ProviderStatus,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewServiceProvider {
    pub owner_id: Uuid,
    pub business_name: String,
    pub category: ServiceKind,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    #[serde(default)]
    pub price_from: Option<f64>,
}

/// Sort order for provider listings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ProviderOrder {
    #[default]
    Name,
    RatingDesc,
    PriceAsc,
    Newest,
}

/// Storage-side provider query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema, IntoParams))]
pub struct ProviderQuery {
    /// Equality on status
    #[serde(default)]
    pub status: Option<ProviderStatus>,
    /// Equality on category
    #[serde(default)]
    pub category: Option<ServiceKind>,
    /// Case-insensitive substring match on business name or location
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub order: ProviderOrder,
}

impl ProviderQuery {
    pub fn approved() -> Self {
        Self {
            status: Some(ProviderStatus::Approved),
            ..Default::default()
        }
    }

    pub fn with_status(status: ProviderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Evaluate the query predicates against one provider
    pub fn matches(&self, provider: &ServiceProvider) -> bool {
        if let Some(status) = self.status {
            if provider.status != status {
                return false;
            }
        }
        if let Some(category) = self.category {
            if provider.category != category {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = provider.business_name.to_lowercase().contains(&needle)
                || provider.location.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }

    /// Sort providers per `order`
    pub fn sort(&self, providers: &mut [ServiceProvider]) {
        match self.order {
            ProviderOrder::Name => providers.sort_by(|a, b| {
                a.business_name
                    .to_lowercase()
                    .cmp(&b.business_name.to_lowercase())
            }),
            // Unrated providers go last
            ProviderOrder::RatingDesc => providers.sort_by(|a, b| {
                b.rating
                    .unwrap_or(-1.0)
                    .total_cmp(&a.rating.unwrap_or(-1.0))
            }),
            ProviderOrder::PriceAsc => providers.sort_by(|a, b| {
                a.price_from
                    .unwrap_or(f64::MAX)
                    .total_cmp(&b.price_from.unwrap_or(f64::MAX))
            }),
            ProviderOrder::Newest => providers.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

/// Client-side filter over an already fetched provider list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema, IntoParams))]
pub struct ProviderFilter {
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_rating: Option<f32>,
    /// Case-insensitive substring of the location
    #[serde(default)]
    pub location: Option<String>,
}

impl ProviderFilter {
    pub fn is_empty(&self) -> bool {
        self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_rating.is_none()
            && self.location.as_deref().map_or(true, |l| l.trim().is_empty())
    }

    pub fn matches(&self, provider: &ServiceProvider) -> bool {
        // Providers without a price only pass when no price bound is set
        if self.min_price.is_some() || self.max_price.is_some() {
            let Some(price) = provider.price_from else {
                return false;
            };
            if self.min_price.is_some_and(|min| price < min) {
                return false;
            }
            if self.max_price.is_some_and(|max| price > max) {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            if provider.rating.map_or(true, |r| r < min_rating) {
                return false;
            }
        }
        if let Some(location) = self.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            if !provider
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        true
    }

    /// Keep matching providers in their original order
    pub fn apply(&self, providers: Vec<ServiceProvider>) -> Vec<ServiceProvider> {
        if self.is_empty() {
            return providers;
        }
        providers.into_iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(name: &str, category: ServiceKind, location: &str, price: Option<f64>, rating: Option<f32>) -> ServiceProvider {
        ServiceProvider {
            id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            business_name: name.to_string(),
            category,
            description: None,
            location: location.to_string(),
            price_from: price,
            rating,
            status: ProviderStatus::Approved,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let plain = provider("Lens & Light", ServiceKind::Photographer, "Mumbai", None, None);
        let odd = provider("100% Decor_Co", ServiceKind::Decorator, "Pune", None, None);
        for needle in ["_", "%", "0%", "r_c"] {
            let query = ProviderQuery {
                search: Some(needle.to_string()),
                ..Default::default()
            };
            assert!(!query.matches(&plain), "{needle} matched a name without it");
        }
        let query = ProviderQuery {
            search: Some("% decor_".to_string()),
            ..Default::default()
        };
        assert!(query.matches(&odd));
    }

    #[test]
    fn test_query_equality_and_pattern() {
        let p = provider("Lens & Light", ServiceKind::Photographer, "Mumbai", Some(20000.0), Some(4.5));
        assert!(ProviderQuery::approved().matches(&p));
        assert!(!ProviderQuery::with_status(ProviderStatus::Pending).matches(&p));

        let query = ProviderQuery {
            category: Some(ServiceKind::Photographer),
            search: Some("lens".to_string()),
            ..Default::default()
        };
        assert!(query.matches(&p));

        let query = ProviderQuery {
            search: Some("mumb".to_string()),
            ..Default::default()
        };
        assert!(query.matches(&p));

        let query = ProviderQuery {
            category: Some(ServiceKind::Venue),
            ..Default::default()
        };
        assert!(!query.matches(&p));
    }

    #[test]
    fn test_query_sort_orders() {
        let mut list = vec![
            provider("b", ServiceKind::Venue, "x", Some(300.0), None),
            provider("A", ServiceKind::Venue, "x", None, Some(3.0)),
            provider("c", ServiceKind::Venue, "x", Some(100.0), Some(4.8)),
        ];
        let mut query = ProviderQuery::default();
        query.sort(&mut list);
        let names: Vec<_> = list.iter().map(|p| p.business_name.as_str()).collect();
        assert_eq!(names, vec!["A", "b", "c"]);

        query.order = ProviderOrder::RatingDesc;
        query.sort(&mut list);
        let names: Vec<_> = list.iter().map(|p| p.business_name.as_str()).collect();
        assert_eq!(names, vec!["c", "A", "b"]);

        query.order = ProviderOrder::PriceAsc;
        query.sort(&mut list);
        let names: Vec<_> = list.iter().map(|p| p.business_name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "A"]);
    }

    #[test]
    fn test_filter_keeps_order_and_bounds() {
        let list = vec![
            provider("one", ServiceKind::Caterer, "Pune", Some(500.0), Some(4.0)),
            provider("two", ServiceKind::Caterer, "Mumbai", Some(1500.0), Some(4.9)),
            provider("three", ServiceKind::Caterer, "Pune", None, Some(5.0)),
            provider("four", ServiceKind::Caterer, "pune east", Some(900.0), Some(3.5)),
        ];

        let filter = ProviderFilter {
            max_price: Some(1000.0),
            location: Some("PUNE".to_string()),
            ..Default::default()
        };
        let names: Vec<_> = filter
            .apply(list.clone())
            .into_iter()
            .map(|p| p.business_name)
            .collect();
        assert_eq!(names, vec!["one", "four"]);

        let filter = ProviderFilter {
            min_rating: Some(4.5),
            ..Default::default()
        };
        let names: Vec<_> = filter.apply(list).into_iter().map(|p| p.business_name).collect();
        assert_eq!(names, vec!["two", "three"]);
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let list = vec![provider("x", ServiceKind::Venue, "Goa", None, None)];
        assert!(ProviderFilter::default().is_empty());
        assert_eq!(ProviderFilter::default().apply(list.clone()), list);
    }
}
