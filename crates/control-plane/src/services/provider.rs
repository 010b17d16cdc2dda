// Provider service: marketplace search, categories and admin approval

use anyhow::Result;
use gatherly_core::traits::ProviderStore;
use gatherly_core::{
    categories, Category, Notifier, ProviderFilter, ProviderQuery, ProviderStatus, ServiceProvider,
    Toast,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Category with the number of approved providers in it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: Category,
    pub provider_count: usize,
}

pub struct ProviderService {
    store: Arc<dyn ProviderStore>,
}

impl ProviderService {
    pub fn new(store: Arc<dyn ProviderStore>) -> Self {
        Self { store }
    }

    /// Approved providers matching the storage query, then the client-side filter.
    /// The query's status is always forced to approved.
    pub async fn search(
        &self,
        mut query: ProviderQuery,
        filter: &ProviderFilter,
    ) -> Result<Vec<ServiceProvider>> {
        query.status = Some(ProviderStatus::Approved);
        let providers = self.store.list_providers(&query).await?;
        Ok(filter.apply(providers))
    }

    pub async fn categories(&self) -> Result<Vec<CategorySummary>> {
        let approved = self.store.list_providers(&ProviderQuery::approved()).await?;
        let mut counts: HashMap<_, usize> = HashMap::new();
        for provider in &approved {
            *counts.entry(provider.category).or_default() += 1;
        }

        Ok(categories()
            .into_iter()
            .map(|category| CategorySummary {
                provider_count: counts.get(&category.kind).copied().unwrap_or(0),
                category,
            })
            .collect())
    }

    /// Admin listing; `None` lists every status
    pub async fn list_by_status(&self, status: Option<ProviderStatus>) -> Result<Vec<ServiceProvider>> {
        let query = ProviderQuery {
            status,
            order: gatherly_core::ProviderOrder::Newest,
            ..Default::default()
        };
        Ok(self.store.list_providers(&query).await?)
    }

    /// Approve or reject a provider. Raises a success or error toast either way.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: ProviderStatus,
        notifier: &dyn Notifier,
    ) -> Result<Option<ServiceProvider>> {
        let verb = match status {
            ProviderStatus::Approved => "approved",
            ProviderStatus::Rejected => "rejected",
            ProviderStatus::Pending => "reset to pending",
        };

        match self.store.set_provider_status(id, status).await {
            Ok(Some(provider)) => {
                tracing::info!(provider_id = %id, status = %status, "provider status updated");
                notifier.notify(Toast::success(
                    format!("Provider {verb}"),
                    format!("{} has been {verb}.", provider.business_name),
                ));
                Ok(Some(provider))
            }
            Ok(None) => {
                notifier.notify(Toast::error(
                    "Provider not found",
                    "The provider may have been removed.",
                ));
                Ok(None)
            }
            Err(e) => {
                tracing::error!(provider_id = %id, error = %e, "failed to update provider status");
                notifier.notify(Toast::error(
                    "Update failed",
                    "Couldn't update the provider. Please try again.",
                ));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatherly_core::memory::InMemoryStore;
    use gatherly_core::{ServiceKind, Severity, ToastBuffer};

    fn provider(name: &str, category: ServiceKind, status: ProviderStatus, price: f64) -> ServiceProvider {
        ServiceProvider {
            id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            business_name: name.to_string(),
            category,
            description: None,
            location: "Mumbai".to_string(),
            price_from: Some(price),
            rating: Some(4.5),
            status,
            created_at: Utc::now(),
        }
    }

    async fn seeded() -> (ProviderService, Vec<ServiceProvider>) {
        let store = InMemoryStore::new();
        let providers = vec![
            provider("Lens Craft", ServiceKind::Photographer, ProviderStatus::Approved, 40000.0),
            provider("Shutter Box", ServiceKind::Photographer, ProviderStatus::Pending, 20000.0),
            provider("Royal Lawns", ServiceKind::Venue, ProviderStatus::Approved, 250000.0),
        ];
        store.seed_providers(providers.clone()).await;
        (ProviderService::new(Arc::new(store)), providers)
    }

    #[tokio::test]
    async fn test_search_only_returns_approved() {
        let (service, _) = seeded().await;
        let mut query = ProviderQuery::with_status(ProviderStatus::Pending);
        query.category = Some(ServiceKind::Photographer);

        let found = service.search(query, &ProviderFilter::default()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].business_name, "Lens Craft");
    }

    #[tokio::test]
    async fn test_search_applies_filter() {
        let (service, _) = seeded().await;
        let filter = ProviderFilter {
            max_price: Some(100000.0),
            ..Default::default()
        };
        let found = service.search(ProviderQuery::default(), &filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, ServiceKind::Photographer);
    }

    #[tokio::test]
    async fn test_category_counts() {
        let (service, _) = seeded().await;
        let summaries = service.categories().await.unwrap();
        assert_eq!(summaries.len(), ServiceKind::ALL.len());
        let count = |kind| {
            summaries
                .iter()
                .find(|s| s.category.kind == kind)
                .map(|s| s.provider_count)
        };
        assert_eq!(count(ServiceKind::Photographer), Some(1));
        assert_eq!(count(ServiceKind::Venue), Some(1));
        assert_eq!(count(ServiceKind::Caterer), Some(0));
    }

    #[tokio::test]
    async fn test_approve_raises_success_toast() {
        let (service, providers) = seeded().await;
        let toasts = ToastBuffer::new();
        let updated = service
            .set_status(providers[1].id, ProviderStatus::Approved, &toasts)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, ProviderStatus::Approved);

        let raised = toasts.drain();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].severity, Severity::Success);
        assert!(raised[0].description.contains("Shutter Box"));
    }

    #[tokio::test]
    async fn test_unknown_provider_raises_error_toast() {
        let (service, _) = seeded().await;
        let toasts = ToastBuffer::new();
        let result = service
            .set_status(Uuid::now_v7(), ProviderStatus::Rejected, &toasts)
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(toasts.drain()[0].severity, Severity::Error);
    }
}
