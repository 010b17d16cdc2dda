// Intake form record accumulated across steps

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::category::ServiceKind;

/// Kind of event being planned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Wedding,
    Birthday,
    Corporate,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Wedding,
        EventType::Birthday,
        EventType::Corporate,
        EventType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EventType::Wedding => "Wedding",
            EventType::Birthday => "Birthday",
            EventType::Corporate => "Corporate",
            EventType::Other => "Other",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Wedding => write!(f, "wedding"),
            EventType::Birthday => write!(f, "birthday"),
            EventType::Corporate => write!(f, "corporate"),
            EventType::Other => write!(f, "other"),
        }
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        EventType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown event type: {s}"))
    }
}

/// Expected guest count bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum GuestCount {
    #[serde(rename = "<50")]
    Under50,
    #[serde(rename = "50-100")]
    From50To100,
    #[serde(rename = "100-200")]
    From100To200,
    #[serde(rename = "200+")]
    Over200,
}

impl GuestCount {
    pub const ALL: [GuestCount; 4] = [
        GuestCount::Under50,
        GuestCount::From50To100,
        GuestCount::From100To200,
        GuestCount::Over200,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GuestCount::Under50 => "<50",
            GuestCount::From50To100 => "50-100",
            GuestCount::From100To200 => "100-200",
            GuestCount::Over200 => "200+",
        }
    }
}

impl std::fmt::Display for GuestCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GuestCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        GuestCount::ALL
            .into_iter()
            .find(|g| g.label() == needle)
            .ok_or_else(|| format!("unknown guest count: {s}"))
    }
}

/// Field of the intake form a step writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    EventType,
    EventDate,
    Location,
    GuestCount,
    Services,
    Budget,
    Theme,
    Name,
    Email,
    Phone,
}

/// A validated answer, one variant per form field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    EventType(EventType),
    EventDate(NaiveDate),
    Location(String),
    GuestCount(GuestCount),
    Services(Vec<ServiceKind>),
    Budget(f64),
    Theme(String),
    Name(String),
    Email(String),
    Phone(String),
}

impl FieldValue {
    pub fn field(&self) -> FieldId {
        match self {
            FieldValue::EventType(_) => FieldId::EventType,
            FieldValue::EventDate(_) => FieldId::EventDate,
            FieldValue::Location(_) => FieldId::Location,
            FieldValue::GuestCount(_) => FieldId::GuestCount,
            FieldValue::Services(_) => FieldId::Services,
            FieldValue::Budget(_) => FieldId::Budget,
            FieldValue::Theme(_) => FieldId::Theme,
            FieldValue::Name(_) => FieldId::Name,
            FieldValue::Email(_) => FieldId::Email,
            FieldValue::Phone(_) => FieldId::Phone,
        }
    }

    /// Text echoed back into the transcript as the user's answer
    pub fn display(&self) -> String {
        match self {
            FieldValue::EventType(t) => t.label().to_string(),
            FieldValue::EventDate(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::GuestCount(g) => g.label().to_string(),
            FieldValue::Services(kinds) => kinds
                .iter()
                .map(|k| k.label())
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::Budget(b) => format!("{b}"),
            FieldValue::Location(s)
            | FieldValue::Theme(s)
            | FieldValue::Name(s)
            | FieldValue::Email(s)
            | FieldValue::Phone(s) => s.clone(),
        }
    }
}

/// Event request collected by the intake flow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct IntakeForm {
    pub event_type: Option<EventType>,
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: String,
    pub guest_count: Option<GuestCount>,
    /// Sorted, without duplicates
    #[serde(default)]
    pub services: Vec<ServiceKind>,
    pub budget: Option<f64>,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Optional
    #[serde(default)]
    pub phone: String,
}

impl IntakeForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a validated answer under its field
    pub fn set(&mut self, value: FieldValue) {
        match value {
            FieldValue::EventType(v) => self.event_type = Some(v),
            FieldValue::EventDate(v) => self.event_date = Some(v),
            FieldValue::Location(v) => self.location = v,
            FieldValue::GuestCount(v) => self.guest_count = Some(v),
            FieldValue::Services(mut v) => {
                v.sort();
                v.dedup();
                self.services = v;
            }
            FieldValue::Budget(v) => self.budget = Some(v),
            FieldValue::Theme(v) => self.theme = v,
            FieldValue::Name(v) => self.name = v,
            FieldValue::Email(v) => self.email = v,
            FieldValue::Phone(v) => self.phone = v,
        }
    }

    /// Whether the field holds a value
    pub fn is_populated(&self, field: FieldId) -> bool {
        match field {
            FieldId::EventType => self.event_type.is_some(),
            FieldId::EventDate => self.event_date.is_some(),
            FieldId::Location => !self.location.trim().is_empty(),
            FieldId::GuestCount => self.guest_count.is_some(),
            FieldId::Services => !self.services.is_empty(),
            FieldId::Budget => self.budget.is_some(),
            FieldId::Theme => !self.theme.trim().is_empty(),
            FieldId::Name => !self.name.trim().is_empty(),
            FieldId::Email => !self.email.trim().is_empty(),
            FieldId::Phone => !self.phone.trim().is_empty(),
        }
    }

    /// Required fields that are still unset, in step order
    pub fn missing_fields(&self) -> Vec<FieldId> {
        super::steps::INTAKE_STEPS
            .iter()
            .filter(|step| !step.optional && !self.is_populated(step.field))
            .map(|step| step.field)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_count_serde_labels() {
        assert_eq!(serde_json::to_string(&GuestCount::Over200).unwrap(), "\"200+\"");
        let parsed: GuestCount = serde_json::from_str("\"100-200\"").unwrap();
        assert_eq!(parsed, GuestCount::From100To200);
    }

    #[test]
    fn test_event_type_parse_is_case_insensitive() {
        assert_eq!("wedding".parse::<EventType>(), Ok(EventType::Wedding));
        assert_eq!("CORPORATE".parse::<EventType>(), Ok(EventType::Corporate));
        assert!("gala".parse::<EventType>().is_err());
    }

    #[test]
    fn test_services_are_sorted_and_deduplicated() {
        let mut form = IntakeForm::new();
        form.set(FieldValue::Services(vec![
            ServiceKind::Venue,
            ServiceKind::Photographer,
            ServiceKind::Venue,
        ]));
        assert_eq!(
            form.services,
            vec![ServiceKind::Photographer, ServiceKind::Venue]
        );
    }

    #[test]
    fn test_missing_fields_ignores_phone() {
        let form = IntakeForm::new();
        let missing = form.missing_fields();
        assert_eq!(missing.len(), 9);
        assert!(!missing.contains(&FieldId::Phone));
        assert_eq!(missing[0], FieldId::EventType);
    }

    #[test]
    fn test_blank_text_is_not_populated() {
        let mut form = IntakeForm::new();
        form.set(FieldValue::Location("   ".to_string()));
        assert!(!form.is_populated(FieldId::Location));
    }
}
