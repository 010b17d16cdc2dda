// Intake state machine
//
// Walks the static step sequence strictly forward. The pointer moves only on
// a successful answer, a confirmed selection or a skip of an optional step;
// any validation failure leaves pointer and form untouched.

use super::form::{FieldValue, IntakeForm};
use super::steps::{match_option, InputKind, StepDescriptor, INTAKE_STEPS};
use super::transcript::ChatMessage;
use crate::error::ValidationError;

const GREETING: &str = "Hi! I'll help you put together your event request.";
const FAREWELL: &str = "Thanks! That's everything we need.";
const SKIPPED: &str = "Skipped";

/// Outcome of a step transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Pointer moved to this step index
    Next(usize),
    /// Pointer passed the final step
    Completed,
}

/// Forward-only intake state machine
#[derive(Debug, Clone)]
pub struct IntakeFlow {
    steps: &'static [StepDescriptor],
    pointer: usize,
    form: IntakeForm,
    transcript: Vec<ChatMessage>,
    /// Pending multi-choice toggles, canonical option text in toggle order
    selection: Vec<&'static str>,
}

impl Default for IntakeFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeFlow {
    /// Start a flow over the standard intake steps
    pub fn new() -> Self {
        Self::with_steps(&INTAKE_STEPS)
    }

    /// Start a flow over a custom step sequence
    pub fn with_steps(steps: &'static [StepDescriptor]) -> Self {
        let mut flow = Self {
            steps,
            pointer: 0,
            form: IntakeForm::new(),
            transcript: vec![ChatMessage::bot(GREETING)],
            selection: Vec::new(),
        };
        flow.prompt_current();
        flow
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn steps(&self) -> &'static [StepDescriptor] {
        self.steps
    }

    pub fn is_complete(&self) -> bool {
        self.pointer >= self.steps.len()
    }

    /// Active step, `None` once complete
    pub fn current_step(&self) -> Option<&'static StepDescriptor> {
        self.steps.get(self.pointer)
    }

    pub fn form(&self) -> &IntakeForm {
        &self.form
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Options currently toggled on for a multi-choice step
    pub fn selection(&self) -> Vec<String> {
        self.selection.iter().map(|s| s.to_string()).collect()
    }

    /// Answer the active step.
    ///
    /// `step_index` must equal the current pointer.
    pub fn submit_answer(&mut self, step_index: usize, raw: &str) -> Result<Advance, ValidationError> {
        let step = self.active_step()?;
        if step_index != self.pointer {
            return Err(ValidationError::StaleStep {
                expected: self.pointer,
                got: step_index,
            });
        }

        let value = step.parse(raw)?;
        Ok(self.store_and_advance(value))
    }

    /// Flip one option of a multi-choice step. Never advances.
    ///
    /// Returns whether the option is selected afterwards.
    pub fn toggle_option(&mut self, option: &str) -> Result<bool, ValidationError> {
        let step = self.active_step()?;
        let InputKind::MultiChoice { options } = step.kind else {
            return Err(ValidationError::WrongKind(step.kind.name()));
        };

        let option = match_option(options, option)?;
        if let Some(pos) = self.selection.iter().position(|o| *o == option) {
            self.selection.remove(pos);
            Ok(false)
        } else {
            self.selection.push(option);
            Ok(true)
        }
    }

    /// Commit the toggled selection of a multi-choice step and advance
    pub fn confirm_selection(&mut self) -> Result<Advance, ValidationError> {
        let step = self.active_step()?;
        if !matches!(step.kind, InputKind::MultiChoice { .. }) {
            return Err(ValidationError::WrongKind(step.kind.name()));
        }
        if self.selection.is_empty() && !step.optional {
            return Err(ValidationError::EmptySelection);
        }

        let raw = self.selection.join(",");
        let value = step.parse(&raw)?;
        Ok(self.store_and_advance(value))
    }

    /// Skip an optional step without storing a value
    pub fn skip(&mut self) -> Result<Advance, ValidationError> {
        let step = self.active_step()?;
        if !step.optional {
            return Err(ValidationError::NotOptional);
        }

        self.transcript.push(ChatMessage::user(SKIPPED, step.field));
        Ok(self.advance())
    }

    fn active_step(&self) -> Result<&'static StepDescriptor, ValidationError> {
        self.current_step().ok_or(ValidationError::Finished)
    }

    fn store_and_advance(&mut self, value: FieldValue) -> Advance {
        self.transcript
            .push(ChatMessage::user(value.display(), value.field()));
        self.form.set(value);
        self.advance()
    }

    fn advance(&mut self) -> Advance {
        self.selection.clear();
        self.pointer += 1;
        if self.is_complete() {
            self.transcript.push(ChatMessage::bot(FAREWELL));
            Advance::Completed
        } else {
            self.prompt_current();
            Advance::Next(self.pointer)
        }
    }

    fn prompt_current(&mut self) {
        if let Some(step) = self.current_step() {
            self.transcript.push(
                ChatMessage::bot(step.prompt)
                    .with_choices(step.kind.options())
                    .for_field(step.field),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::ServiceKind;
    use crate::intake::form::{EventType, FieldId};
    use crate::intake::transcript::Sender;

    fn flow_at_services() -> IntakeFlow {
        let mut flow = IntakeFlow::new();
        flow.submit_answer(0, "Wedding").unwrap();
        flow.submit_answer(1, "2025-06-01").unwrap();
        flow.submit_answer(2, "Mumbai").unwrap();
        flow.submit_answer(3, "100-200").unwrap();
        assert_eq!(flow.current_step().unwrap().field, FieldId::Services);
        flow
    }

    #[test]
    fn test_new_flow_prompts_first_step() {
        let flow = IntakeFlow::new();
        assert_eq!(flow.pointer(), 0);
        assert_eq!(flow.transcript().len(), 2);
        let prompt = &flow.transcript()[1];
        assert_eq!(prompt.sender, Sender::Bot);
        assert_eq!(prompt.field, Some(FieldId::EventType));
        assert_eq!(prompt.choices.as_ref().map(|c| c.len()), Some(4));
    }

    #[test]
    fn test_valid_answer_advances_exactly_one() {
        let mut flow = IntakeFlow::new();
        let advance = flow.submit_answer(0, "Birthday").unwrap();
        assert_eq!(advance, Advance::Next(1));
        assert_eq!(flow.pointer(), 1);
        assert_eq!(flow.form().event_type, Some(EventType::Birthday));
    }

    #[test]
    fn test_invalid_answer_keeps_pointer_and_field() {
        let mut flow = IntakeFlow::new();
        let before = flow.transcript().len();
        let err = flow.submit_answer(0, "Gala").unwrap_err();
        assert_eq!(err, ValidationError::NotAnOption("Gala".to_string()));
        assert_eq!(flow.pointer(), 0);
        assert_eq!(flow.form().event_type, None);
        assert_eq!(flow.transcript().len(), before);

        flow.submit_answer(0, "Corporate").unwrap();
        flow.submit_answer(1, "2025-06-01").unwrap();
        flow.submit_answer(2, "Pune").unwrap();
        flow.submit_answer(3, "<50").unwrap();
        flow.submit_answer(4, "Venue").unwrap();
        assert!(flow.submit_answer(5, "-20").is_err());
        assert_eq!(flow.pointer(), 5);
        assert_eq!(flow.form().budget, None);
    }

    #[test]
    fn test_stale_step_index_is_rejected() {
        let mut flow = IntakeFlow::new();
        let err = flow.submit_answer(3, "Wedding").unwrap_err();
        assert_eq!(err, ValidationError::StaleStep { expected: 0, got: 3 });
        assert_eq!(flow.pointer(), 0);
    }

    #[test]
    fn test_toggle_twice_unselects() {
        let mut flow = flow_at_services();
        assert!(flow.toggle_option("Venue").unwrap());
        assert!(!flow.toggle_option("venue").unwrap());
        assert!(flow.selection().is_empty());
        assert_eq!(flow.pointer(), 4);
    }

    #[test]
    fn test_toggles_do_not_advance_until_confirm() {
        let mut flow = flow_at_services();
        flow.toggle_option("Venue").unwrap();
        flow.toggle_option("Photographer").unwrap();
        assert_eq!(flow.pointer(), 4);
        assert!(flow.form().services.is_empty());

        assert_eq!(flow.confirm_selection().unwrap(), Advance::Next(5));
        assert_eq!(
            flow.form().services,
            vec![ServiceKind::Photographer, ServiceKind::Venue]
        );
        assert!(flow.selection().is_empty());
    }

    #[test]
    fn test_confirm_empty_selection_rejected() {
        let mut flow = flow_at_services();
        assert_eq!(flow.confirm_selection(), Err(ValidationError::EmptySelection));
        assert_eq!(flow.pointer(), 4);
    }

    #[test]
    fn test_toggle_on_single_choice_is_wrong_kind() {
        let mut flow = IntakeFlow::new();
        assert_eq!(
            flow.toggle_option("Wedding"),
            Err(ValidationError::WrongKind("single_choice"))
        );
        assert_eq!(flow.confirm_selection(), Err(ValidationError::WrongKind("single_choice")));
    }

    #[test]
    fn test_skip_requires_optional_step() {
        let mut flow = IntakeFlow::new();
        assert_eq!(flow.skip(), Err(ValidationError::NotOptional));
        assert_eq!(flow.pointer(), 0);
    }

    #[test]
    fn test_full_walk_completes() {
        let mut flow = flow_at_services();
        flow.submit_answer(4, "Photographer, Venue").unwrap();
        flow.submit_answer(5, "500000").unwrap();
        flow.submit_answer(6, "Rustic").unwrap();
        flow.submit_answer(7, "Asha Rao").unwrap();
        flow.submit_answer(8, "asha@example.com").unwrap();
        assert!(!flow.is_complete());
        assert_eq!(flow.skip().unwrap(), Advance::Completed);
        assert!(flow.is_complete());
        assert!(flow.form().is_complete());
        assert_eq!(flow.form().phone, "");
        assert_eq!(flow.submit_answer(10, "x"), Err(ValidationError::Finished));
        assert_eq!(flow.skip(), Err(ValidationError::Finished));
    }
}
