// Database models (internal, may differ from public DTOs)
//
// Enum columns are stored as text: event types by label, services by slug,
// guest counts by bucket label, statuses lowercase.

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use gatherly_core::{
    EventRequirement, EventType, GuestCount, IntakeForm, LiveEvent, Profile, ProviderStatus,
    RequirementStatus, Role, ServiceKind, ServiceProvider,
};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Auth models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role: Role::from(row.role.as_str()),
            created_at: row.created_at,
        }
    }
}

// ============================================
// Marketplace models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: String,
    pub venue: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub category: Option<String>,
}

impl From<EventRow> for LiveEvent {
    fn from(row: EventRow) -> Self {
        LiveEvent {
            id: row.id,
            title: row.title,
            description: row.description,
            start_time: row.start_time,
            end_time: row.end_time,
            location: row.location,
            venue: row.venue,
            price: row.price,
            image_url: row.image_url,
            featured: row.featured,
            category: row.category,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProviderRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub business_name: String,
    pub category: String,
    pub description: Option<String>,
    pub location: String,
    pub price_from: Option<f64>,
    pub rating: Option<f32>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProviderRow> for ServiceProvider {
    type Error = anyhow::Error;

    fn try_from(row: ProviderRow) -> Result<Self> {
        let category = row.category.parse::<ServiceKind>().map_err(|e| anyhow!(e))?;
        Ok(ServiceProvider {
            id: row.id,
            owner_id: row.owner_id,
            business_name: row.business_name,
            category,
            description: row.description,
            location: row.location,
            price_from: row.price_from,
            rating: row.rating,
            status: ProviderStatus::from(row.status.as_str()),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RequirementRow {
    pub id: Uuid,
    pub event_type: String,
    pub event_date: NaiveDate,
    pub location: String,
    pub guest_count: String,
    pub services: Vec<String>,
    pub budget: f64,
    pub theme: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RequirementRow> for EventRequirement {
    type Error = anyhow::Error;

    fn try_from(row: RequirementRow) -> Result<Self> {
        let event_type = row.event_type.parse::<EventType>().map_err(|e| anyhow!(e))?;
        let guest_count = row.guest_count.parse::<GuestCount>().map_err(|e| anyhow!(e))?;
        let services = row
            .services
            .iter()
            .map(|s| s.parse::<ServiceKind>().map_err(|e| anyhow!(e)))
            .collect::<Result<Vec<_>>>()?;

        Ok(EventRequirement {
            id: row.id,
            form: IntakeForm {
                event_type: Some(event_type),
                event_date: Some(row.event_date),
                location: row.location,
                guest_count: Some(guest_count),
                services,
                budget: Some(row.budget),
                theme: row.theme,
                name: row.name,
                email: row.email,
                phone: row.phone,
            },
            status: RequirementStatus::from(row.status.as_str()),
            created_at: row.created_at,
        })
    }
}

/// Column values for a new requirement row. Built only from a complete form.
#[derive(Debug, Clone)]
pub struct CreateRequirementRow {
    pub event_type: String,
    pub event_date: NaiveDate,
    pub location: String,
    pub guest_count: String,
    pub services: Vec<String>,
    pub budget: f64,
    pub theme: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl TryFrom<&IntakeForm> for CreateRequirementRow {
    type Error = anyhow::Error;

    fn try_from(form: &IntakeForm) -> Result<Self> {
        let missing = || anyhow!("intake form is incomplete: {:?}", form.missing_fields());
        Ok(CreateRequirementRow {
            event_type: form.event_type.ok_or_else(missing)?.label().to_string(),
            event_date: form.event_date.ok_or_else(missing)?,
            location: form.location.clone(),
            guest_count: form.guest_count.ok_or_else(missing)?.label().to_string(),
            services: form.services.iter().map(|s| s.slug().to_string()).collect(),
            budget: form.budget.ok_or_else(missing)?,
            theme: form.theme.clone(),
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
        })
    }
}
