// Intake session: the flow plus its collaborators
//
// Reaching the end of the flow triggers exactly one RequirementStore write.
// A failed write is never retried automatically; the form stays intact and
// `submit` may be called again.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::flow::{Advance, IntakeFlow};
use crate::error::{Error, Result};
use crate::notify::Toast;
use crate::requirement::EventRequirement;
use crate::traits::{Notifier, RequirementStore};

/// Progress of the completion write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmitState {
    Idle,
    InFlight,
    Submitted { requirement_id: Uuid },
    Failed { message: String },
}

pub struct IntakeSession {
    id: Uuid,
    flow: IntakeFlow,
    state: SubmitState,
    store: Arc<dyn RequirementStore>,
    notifier: Arc<dyn Notifier>,
}

impl IntakeSession {
    pub fn new(store: Arc<dyn RequirementStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_flow(IntakeFlow::new(), store, notifier)
    }

    pub fn with_flow(
        flow: IntakeFlow,
        store: Arc<dyn RequirementStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            flow,
            state: SubmitState::Idle,
            store,
            notifier,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn flow(&self) -> &IntakeFlow {
        &self.flow
    }

    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    /// Swap the notifier, e.g. for one collecting toasts per request
    pub fn set_notifier(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifier = notifier;
    }

    pub async fn answer(&mut self, step_index: usize, raw: &str) -> Result<Advance> {
        let advance = self.flow.submit_answer(step_index, raw)?;
        self.on_advance(advance).await;
        Ok(advance)
    }

    pub fn toggle(&mut self, option: &str) -> Result<bool> {
        Ok(self.flow.toggle_option(option)?)
    }

    pub async fn confirm(&mut self) -> Result<Advance> {
        let advance = self.flow.confirm_selection()?;
        self.on_advance(advance).await;
        Ok(advance)
    }

    pub async fn skip(&mut self) -> Result<Advance> {
        let advance = self.flow.skip()?;
        self.on_advance(advance).await;
        Ok(advance)
    }

    async fn on_advance(&mut self, advance: Advance) {
        if advance == Advance::Completed {
            // The outcome is recorded in `state` and surfaced as a toast
            let _ = self.submit().await;
        }
    }

    /// Write the collected form as a new requirement
    pub async fn submit(&mut self) -> Result<EventRequirement> {
        match self.state {
            SubmitState::InFlight => return Err(Error::SubmissionInFlight),
            SubmitState::Submitted { .. } => return Err(Error::AlreadySubmitted),
            SubmitState::Idle | SubmitState::Failed { .. } => {}
        }

        let missing = self.flow.form().missing_fields();
        if !missing.is_empty() {
            return Err(Error::Incomplete(missing));
        }

        self.state = SubmitState::InFlight;
        tracing::info!(session_id = %self.id, "submitting event requirement");

        match self.store.create_requirement(self.flow.form().clone()).await {
            Ok(requirement) => {
                tracing::info!(session_id = %self.id, requirement_id = %requirement.id, "event requirement stored");
                self.state = SubmitState::Submitted {
                    requirement_id: requirement.id,
                };
                self.notifier.notify(Toast::success(
                    "Request submitted",
                    "We've received your event details and will be in touch soon.",
                ));
                Ok(requirement)
            }
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "failed to store event requirement");
                self.state = SubmitState::Failed {
                    message: e.to_string(),
                };
                self.notifier.notify(Toast::error(
                    "Submission failed",
                    "We couldn't save your request. Please try again.",
                ));
                Err(e)
            }
        }
    }
}
