// OpenAPI specification generation
//
// Used by the API server (Swagger UI) and the export-openapi binary.

use crate::api;
use crate::api::{ListResponse, ToastedResponse};
use crate::auth::routes as auth_routes;
use crate::services::{CategorySummary, IntakeView, StepView};
use gatherly_core::{
    AuthOutcome, AuthSession, Category, ChangeKind, ChangeNotification, ChatMessage, Collection,
    Credentials, EventRequirement, EventType, FeedState, FieldId, GuestCount, IntakeForm,
    LiveEvent, LiveEventUpdate, NewLiveEvent, ProviderOrder, ProviderStatus, RequirementStatus,
    Role, Sender, ServiceKind, ServiceProvider, Severity, SignUpRequest, SubmitState, Toast,
};
use utoipa::OpenApi;

/// OpenAPI documentation for the Gatherly API
#[derive(OpenApi)]
#[openapi(
    paths(
        api::intake::start_intake,
        api::intake::get_intake,
        api::intake::answer,
        api::intake::toggle,
        api::intake::confirm,
        api::intake::skip,
        api::intake::submit,
        api::events::list_upcoming,
        api::events::live_feed,
        api::events::stream_changes,
        api::providers::list_categories,
        api::providers::search_providers,
        api::admin::list_providers,
        api::admin::approve_provider,
        api::admin::reject_provider,
        api::admin::list_requirements,
        api::admin::update_requirement,
        api::admin::create_event,
        api::admin::update_event,
        api::admin::delete_event,
        auth_routes::get_auth_config,
        auth_routes::sign_in,
        auth_routes::sign_up,
        auth_routes::sign_out,
        auth_routes::current_user,
    ),
    components(
        schemas(
            // Intake
            IntakeView, StepView, IntakeForm, FieldId, EventType, GuestCount, SubmitState,
            ChatMessage, Sender,
            api::intake::IntakeReply, api::intake::AnswerRequest, api::intake::ToggleRequest,
            Toast, Severity,
            // Events
            LiveEvent, NewLiveEvent, LiveEventUpdate, FeedState,
            ChangeNotification, ChangeKind, Collection,
            ListResponse<LiveEvent>,
            // Marketplace
            ServiceKind, Category, CategorySummary,
            ServiceProvider, ProviderStatus, ProviderOrder,
            ListResponse<CategorySummary>,
            ListResponse<ServiceProvider>,
            ToastedResponse<ServiceProvider>,
            // Admin
            EventRequirement, RequirementStatus, api::admin::UpdateRequirementRequest,
            ListResponse<EventRequirement>,
            // Auth
            Credentials, SignUpRequest, AuthOutcome, AuthSession, Role,
            auth_routes::AuthConfigResponse, auth_routes::CurrentUserResponse,
            api::ErrorResponse,
        )
    ),
    tags(
        (name = "intake", description = "Guided event-request intake"),
        (name = "events", description = "Upcoming events and the live feed (SSE)"),
        (name = "providers", description = "Service categories and provider search"),
        (name = "admin", description = "Provider approval, requirements and event management"),
        (name = "auth", description = "Sign-in, sign-up and sign-out")
    ),
    info(
        title = "Gatherly API",
        version = "0.1.0",
        description = "API for the Gatherly event-planning marketplace",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI spec as a pretty-printed JSON string
    pub fn to_json() -> Result<String, serde_json::Error> {
        Self::openapi().to_pretty_json()
    }
}
