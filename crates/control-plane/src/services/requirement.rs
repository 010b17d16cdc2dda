// Requirement service: admin view of submitted intake requests

use anyhow::Result;
use gatherly_core::traits::RequirementStore;
use gatherly_core::{EventRequirement, RequirementStatus};
use std::sync::Arc;
use uuid::Uuid;

pub struct RequirementService {
    store: Arc<dyn RequirementStore>,
}

impl RequirementService {
    pub fn new(store: Arc<dyn RequirementStore>) -> Self {
        Self { store }
    }

    /// Newest first
    pub async fn list(&self, status: Option<RequirementStatus>) -> Result<Vec<EventRequirement>> {
        let mut requirements = self.store.list_requirements().await?;
        if let Some(status) = status {
            requirements.retain(|r| r.status == status);
        }
        Ok(requirements)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: RequirementStatus,
    ) -> Result<Option<EventRequirement>> {
        let updated = self.store.update_requirement_status(id, status).await?;
        if updated.is_some() {
            tracing::info!(requirement_id = %id, status = %status, "requirement status updated");
        }
        Ok(updated)
    }
}
