// Static step sequence of the intake flow
//
// Each step is a read-only descriptor: prompt text, target field, input kind
// and whether it may be skipped. Validation is split in two stages:
// - InputKind::validate checks the raw text against the kind (one rule per variant)
// - FieldValue::bind turns the kind-level answer into the typed form value

use chrono::NaiveDate;
use serde::Serialize;

use super::form::{FieldId, FieldValue};
use crate::category::ServiceKind;
use crate::error::ValidationError;

const EVENT_TYPE_OPTIONS: &[&str] = &["Wedding", "Birthday", "Corporate", "Other"];
const GUEST_COUNT_OPTIONS: &[&str] = &["<50", "50-100", "100-200", "200+"];
const SERVICE_OPTIONS: &[&str] = &[
    "Photographer",
    "Venue",
    "Caterer",
    "Decorator",
    "Entertainment",
    "Makeup Artist",
];

/// Expected input of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    /// Exactly one of the options
    SingleChoice { options: &'static [&'static str] },
    /// Any non-blank text
    FreeText,
    /// Calendar date, YYYY-MM-DD
    Date,
    /// Finite number >= 0
    Numeric,
    /// One or more of the options, toggled then confirmed
    MultiChoice { options: &'static [&'static str] },
}

/// Kind-level answer produced by `InputKind::validate`
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Choice(&'static str),
    Text(String),
    Date(NaiveDate),
    Number(f64),
    Selection(Vec<&'static str>),
}

impl InputKind {
    pub fn name(&self) -> &'static str {
        match self {
            InputKind::SingleChoice { .. } => "single_choice",
            InputKind::FreeText => "free_text",
            InputKind::Date => "date",
            InputKind::Numeric => "numeric",
            InputKind::MultiChoice { .. } => "multi_choice",
        }
    }

    pub fn options(&self) -> &'static [&'static str] {
        match self {
            InputKind::SingleChoice { options } | InputKind::MultiChoice { options } => options,
            InputKind::FreeText | InputKind::Date | InputKind::Numeric => &[],
        }
    }

    /// Check raw input against this kind.
    ///
    /// Multi-choice input is a comma-separated list; an empty list is only
    /// accepted when `optional` is set.
    pub fn validate(&self, raw: &str, optional: bool) -> Result<Answer, ValidationError> {
        let trimmed = raw.trim();
        match self {
            InputKind::SingleChoice { options } => {
                if trimmed.is_empty() {
                    return Err(ValidationError::Empty);
                }
                match_option(options, trimmed).map(Answer::Choice)
            }
            InputKind::FreeText => {
                if trimmed.is_empty() {
                    return Err(ValidationError::Empty);
                }
                Ok(Answer::Text(trimmed.to_string()))
            }
            InputKind::Date => {
                if trimmed.is_empty() {
                    return Err(ValidationError::Empty);
                }
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .map(Answer::Date)
                    .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
            }
            InputKind::Numeric => {
                let value: f64 = trimmed
                    .parse()
                    .map_err(|_| ValidationError::InvalidNumber(trimmed.to_string()))?;
                if !value.is_finite() {
                    return Err(ValidationError::InvalidNumber(trimmed.to_string()));
                }
                if value < 0.0 {
                    return Err(ValidationError::Negative);
                }
                Ok(Answer::Number(value))
            }
            InputKind::MultiChoice { options } => {
                let mut selected = Vec::new();
                for part in trimmed.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                    let option = match_option(options, part)?;
                    if !selected.contains(&option) {
                        selected.push(option);
                    }
                }
                if selected.is_empty() && !optional {
                    return Err(ValidationError::EmptySelection);
                }
                Ok(Answer::Selection(selected))
            }
        }
    }
}

/// Case-insensitive lookup on label or slug, returning the canonical option text
pub(crate) fn match_option(
    options: &'static [&'static str],
    raw: &str,
) -> Result<&'static str, ValidationError> {
    let needle = raw.trim();
    options
        .iter()
        .copied()
        .find(|option| option.eq_ignore_ascii_case(needle) || slug_matches(option, needle))
        .ok_or_else(|| ValidationError::NotAnOption(needle.to_string()))
}

/// Slug form of a label is lowercase with spaces as underscores ("Makeup Artist" -> "makeup_artist")
fn slug_matches(label: &str, needle: &str) -> bool {
    label.len() == needle.len()
        && label
            .bytes()
            .zip(needle.bytes())
            .all(|(l, n)| match l {
                b' ' => n == b'_',
                _ => l.eq_ignore_ascii_case(&n),
            })
}

impl FieldValue {
    /// Bind a kind-level answer to a form field
    pub fn bind(field: FieldId, answer: Answer) -> Result<FieldValue, ValidationError> {
        let value = match (field, answer) {
            (FieldId::EventType, Answer::Choice(option)) => FieldValue::EventType(
                option
                    .parse()
                    .map_err(|_| ValidationError::NotAnOption(option.to_string()))?,
            ),
            (FieldId::GuestCount, Answer::Choice(option)) => FieldValue::GuestCount(
                option
                    .parse()
                    .map_err(|_| ValidationError::NotAnOption(option.to_string()))?,
            ),
            (FieldId::EventDate, Answer::Date(date)) => FieldValue::EventDate(date),
            (FieldId::Budget, Answer::Number(n)) => FieldValue::Budget(n),
            (FieldId::Services, Answer::Selection(options)) => {
                let mut kinds = Vec::with_capacity(options.len());
                for option in options {
                    let kind: ServiceKind = option
                        .parse()
                        .map_err(|_| ValidationError::NotAnOption(option.to_string()))?;
                    kinds.push(kind);
                }
                FieldValue::Services(kinds)
            }
            (FieldId::Location, Answer::Text(s)) => FieldValue::Location(s),
            (FieldId::Theme, Answer::Text(s)) => FieldValue::Theme(s),
            (FieldId::Name, Answer::Text(s)) => FieldValue::Name(s),
            (FieldId::Email, Answer::Text(s)) => FieldValue::Email(s),
            (FieldId::Phone, Answer::Text(s)) => FieldValue::Phone(s),
            (_, answer) => {
                return Err(ValidationError::WrongKind(match answer {
                    Answer::Choice(_) => "single_choice",
                    Answer::Text(_) => "free_text",
                    Answer::Date(_) => "date",
                    Answer::Number(_) => "numeric",
                    Answer::Selection(_) => "multi_choice",
                }))
            }
        };
        Ok(value)
    }
}

/// Static definition of one prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepDescriptor {
    pub prompt: &'static str,
    pub field: FieldId,
    pub kind: InputKind,
    pub optional: bool,
}

impl StepDescriptor {
    /// Validate raw input and bind it to this step's field
    pub fn parse(&self, raw: &str) -> Result<FieldValue, ValidationError> {
        let answer = self.kind.validate(raw, self.optional)?;
        FieldValue::bind(self.field, answer)
    }
}

/// The fixed step order of the intake flow
pub static INTAKE_STEPS: [StepDescriptor; 10] = [
    StepDescriptor {
        prompt: "What kind of event are you planning?",
        field: FieldId::EventType,
        kind: InputKind::SingleChoice {
            options: EVENT_TYPE_OPTIONS,
        },
        optional: false,
    },
    StepDescriptor {
        prompt: "When is the event? (YYYY-MM-DD)",
        field: FieldId::EventDate,
        kind: InputKind::Date,
        optional: false,
    },
    StepDescriptor {
        prompt: "Where will it take place?",
        field: FieldId::Location,
        kind: InputKind::FreeText,
        optional: false,
    },
    StepDescriptor {
        prompt: "How many guests are you expecting?",
        field: FieldId::GuestCount,
        kind: InputKind::SingleChoice {
            options: GUEST_COUNT_OPTIONS,
        },
        optional: false,
    },
    StepDescriptor {
        prompt: "Which services do you need? Pick all that apply.",
        field: FieldId::Services,
        kind: InputKind::MultiChoice {
            options: SERVICE_OPTIONS,
        },
        optional: false,
    },
    StepDescriptor {
        prompt: "What is your total budget?",
        field: FieldId::Budget,
        kind: InputKind::Numeric,
        optional: false,
    },
    StepDescriptor {
        prompt: "Do you have a theme in mind?",
        field: FieldId::Theme,
        kind: InputKind::FreeText,
        optional: false,
    },
    StepDescriptor {
        prompt: "What's your name?",
        field: FieldId::Name,
        kind: InputKind::FreeText,
        optional: false,
    },
    StepDescriptor {
        prompt: "Which email should providers use to reach you?",
        field: FieldId::Email,
        kind: InputKind::FreeText,
        optional: false,
    },
    StepDescriptor {
        prompt: "Phone number (optional)",
        field: FieldId::Phone,
        kind: InputKind::FreeText,
        optional: true,
    },
];
