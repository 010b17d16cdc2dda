// Stored intake submissions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::intake::IntakeForm;

/// Follow-up state of a requirement
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum RequirementStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

impl std::fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequirementStatus::New => write!(f, "new"),
            RequirementStatus::Contacted => write!(f, "contacted"),
            RequirementStatus::Closed => write!(f, "closed"),
        }
    }
}

impl From<&str> for RequirementStatus {
    fn from(s: &str) -> Self {
        match s {
            "contacted" => RequirementStatus::Contacted,
            "closed" => RequirementStatus::Closed,
            _ => RequirementStatus::New,
        }
    }
}

/// Event request as stored in `event_requirements`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EventRequirement {
    pub id: Uuid,
    #[serde(flatten)]
    pub form: IntakeForm,
    pub status: RequirementStatus,
    pub created_at: DateTime<Utc>,
}

impl EventRequirement {
    /// Wrap a completed form as a fresh requirement
    pub fn from_form(form: IntakeForm) -> Self {
        Self {
            id: Uuid::now_v7(),
            form,
            status: RequirementStatus::New,
            created_at: Utc::now(),
        }
    }
}
