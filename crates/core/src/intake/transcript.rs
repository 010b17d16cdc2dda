// Chat transcript of an intake conversation
//
// Append-only log replayed by the client; carries no business meaning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::form::FieldId;

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Choices offered with a bot prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    /// Field the entry asks for or answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldId>,
}

impl ChatMessage {
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender: Sender::Bot,
            text: text.into(),
            timestamp: Utc::now(),
            choices: None,
            field: None,
        }
    }

    pub fn user(text: impl Into<String>, field: FieldId) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
            choices: None,
            field: Some(field),
        }
    }

    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        if !choices.is_empty() {
            self.choices = Some(choices.iter().map(|c| c.to_string()).collect());
        }
        self
    }

    pub fn for_field(mut self, field: FieldId) -> Self {
        self.field = Some(field);
        self
    }
}
