// Guided intake: step definitions, the forward-only flow and the session
// that stores the finished form

mod flow;
mod form;
mod session;
mod steps;
mod transcript;

pub use flow::{Advance, IntakeFlow};
pub use form::{EventType, FieldId, FieldValue, GuestCount, IntakeForm};
pub use session::{IntakeSession, SubmitState};
pub use steps::{Answer, InputKind, StepDescriptor, INTAKE_STEPS};
pub use transcript::{ChatMessage, Sender};
