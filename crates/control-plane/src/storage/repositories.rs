// Repository layer for PostgreSQL
//
// Every query returns domain types; rows are converted here so the backend
// enum can dispatch without caring which side produced the value.

use anyhow::Result;
use chrono::{DateTime, Utc};
use gatherly_core::{
    EventRequirement, IntakeForm, LiveEvent, LiveEventUpdate, NewLiveEvent, NewServiceProvider,
    Profile, ProviderOrder, ProviderQuery, ProviderStatus, RequirementStatus, ServiceProvider,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::*;

const EVENT_COLUMNS: &str =
    "id, title, description, start_time, end_time, location, venue, price, image_url, featured, category";
const PROVIDER_COLUMNS: &str =
    "id, owner_id, business_name, category, description, location, price_from, rating, status, created_at";
const REQUIREMENT_COLUMNS: &str = "id, event_type, event_date, location, guest_count, services, \
     budget, theme, name, email, phone, status, created_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations from ./migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.email)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Revoked tokens
    // ============================================

    pub async fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        // Expired entries can never match a valid token again
        sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn is_token_revoked(&self, jti: &str) -> Result<bool> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await?;

        Ok(revoked)
    }

    // ============================================
    // Profiles
    // ============================================

    pub async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, email, full_name, role, created_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    pub async fn upsert_profile(&self, profile: Profile) -> Result<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (id, email, full_name, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                full_name = EXCLUDED.full_name,
                role = EXCLUDED.role
            RETURNING id, email, full_name, role, created_at
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(profile.role.to_string())
        .bind(profile.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    // ============================================
    // Events
    // ============================================

    pub async fn list_upcoming(&self, from: DateTime<Utc>) -> Result<Vec<LiveEvent>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE start_time >= $1 ORDER BY start_time ASC"
        ))
        .bind(from)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LiveEvent::from).collect())
    }

    pub async fn create_event(&self, input: NewLiveEvent) -> Result<LiveEvent> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (id, title, description, start_time, end_time, location, venue,
                                price, image_url, featured, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.location)
        .bind(&input.venue)
        .bind(input.price)
        .bind(&input.image_url)
        .bind(input.featured)
        .bind(&input.category)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn update_event(&self, id: Uuid, update: LiveEventUpdate) -> Result<Option<LiveEvent>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                location = COALESCE($6, location),
                venue = COALESCE($7, venue),
                price = COALESCE($8, price),
                image_url = COALESCE($9, image_url),
                featured = COALESCE($10, featured),
                category = COALESCE($11, category)
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.start_time)
        .bind(update.end_time)
        .bind(&update.location)
        .bind(&update.venue)
        .bind(update.price)
        .bind(&update.image_url)
        .bind(update.featured)
        .bind(&update.category)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LiveEvent::from))
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Service providers
    // ============================================

    pub async fn list_providers(&self, query: &ProviderQuery) -> Result<Vec<ServiceProvider>> {
        let order_by = match query.order {
            ProviderOrder::Name => "lower(business_name) ASC",
            ProviderOrder::RatingDesc => "rating DESC NULLS LAST",
            ProviderOrder::PriceAsc => "price_from ASC NULLS LAST",
            ProviderOrder::Newest => "created_at DESC",
        };
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        let rows = sqlx::query_as::<_, ProviderRow>(&format!(
            r#"
            SELECT {PROVIDER_COLUMNS}
            FROM service_providers
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR category = $2)
              AND ($3::text IS NULL OR business_name ILIKE $3 ESCAPE '\' OR location ILIKE $3 ESCAPE '\')
            ORDER BY {order_by}
            "#
        ))
        .bind(query.status.map(|s| s.to_string()))
        .bind(query.category.map(|c| c.slug().to_string()))
        .bind(search)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ServiceProvider::try_from).collect()
    }

    pub async fn get_provider(&self, id: Uuid) -> Result<Option<ServiceProvider>> {
        let row = sqlx::query_as::<_, ProviderRow>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM service_providers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ServiceProvider::try_from).transpose()
    }

    pub async fn create_provider(&self, input: NewServiceProvider) -> Result<ServiceProvider> {
        let row = sqlx::query_as::<_, ProviderRow>(&format!(
            r#"
            INSERT INTO service_providers (id, owner_id, business_name, category, description,
                                           location, price_from, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING {PROVIDER_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(input.owner_id)
        .bind(&input.business_name)
        .bind(input.category.slug())
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.price_from)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    pub async fn set_provider_status(
        &self,
        id: Uuid,
        status: ProviderStatus,
    ) -> Result<Option<ServiceProvider>> {
        let row = sqlx::query_as::<_, ProviderRow>(&format!(
            "UPDATE service_providers SET status = $2 WHERE id = $1 RETURNING {PROVIDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ServiceProvider::try_from).transpose()
    }

    // ============================================
    // Event requirements
    // ============================================

    pub async fn create_requirement(&self, form: &IntakeForm) -> Result<EventRequirement> {
        let input = CreateRequirementRow::try_from(form)?;
        let row = sqlx::query_as::<_, RequirementRow>(&format!(
            r#"
            INSERT INTO event_requirements (id, event_type, event_date, location, guest_count,
                                            services, budget, theme, name, email, phone, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'new')
            RETURNING {REQUIREMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&input.event_type)
        .bind(input.event_date)
        .bind(&input.location)
        .bind(&input.guest_count)
        .bind(&input.services)
        .bind(input.budget)
        .bind(&input.theme)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    pub async fn list_requirements(&self) -> Result<Vec<EventRequirement>> {
        let rows = sqlx::query_as::<_, RequirementRow>(&format!(
            "SELECT {REQUIREMENT_COLUMNS} FROM event_requirements ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EventRequirement::try_from).collect()
    }

    pub async fn update_requirement_status(
        &self,
        id: Uuid,
        status: RequirementStatus,
    ) -> Result<Option<EventRequirement>> {
        let row = sqlx::query_as::<_, RequirementRow>(&format!(
            "UPDATE event_requirements SET status = $2 WHERE id = $1 RETURNING {REQUIREMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(EventRequirement::try_from).transpose()
    }
}

/// ILIKE pattern matching `needle` as a literal substring
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("lens"), "%lens%");
        assert_eq!(contains_pattern("_"), r"%\_%");
        assert_eq!(contains_pattern("100%"), r"%100\%%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }
}
