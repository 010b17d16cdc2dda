// Services layer for business logic
// Services own validation and logging, and reach storage through the core traits

pub mod event;
pub mod intake;
pub mod provider;
pub mod requirement;

pub use event::EventService;
pub use intake::{ActionOutcome, IntakeAction, IntakeError, IntakeService, IntakeView, StepView};
pub use provider::{CategorySummary, ProviderService};
pub use requirement::RequirementService;
