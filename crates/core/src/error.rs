// Error types for the intake flow, feed synchronizer and collaborator calls

use thiserror::Error;

use crate::intake::FieldId;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Rejection of a single intake answer.
///
/// Validation errors are produced locally and never reach a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Text or date answer was blank
    #[error("A value is required")]
    Empty,

    /// Choice answer is not one of the offered options
    #[error("'{0}' is not one of the available options")]
    NotAnOption(String),

    /// Date answer did not parse as YYYY-MM-DD
    #[error("'{0}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// Numeric answer did not parse as a finite number
    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    /// Numeric answer was below zero
    #[error("Value must not be negative")]
    Negative,

    /// Multi-choice step confirmed with nothing selected
    #[error("Select at least one option")]
    EmptySelection,

    /// Skip requested on a step that requires an answer
    #[error("This step cannot be skipped")]
    NotOptional,

    /// Operation does not apply to the active step's input kind
    #[error("Operation not supported for a {0} step")]
    WrongKind(&'static str),

    /// Answer addressed a step other than the active one
    #[error("Answer for step {got} but step {expected} is active")]
    StaleStep { expected: usize, got: usize },

    /// Flow already passed its final step
    #[error("The intake flow is already complete")]
    Finished,
}

/// Errors that can occur in core operations
#[derive(Debug, Error)]
pub enum Error {
    /// Bad step input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage, auth or change feed failure
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A completion write is already running
    #[error("Submission already in progress")]
    SubmissionInFlight,

    /// The form was already stored
    #[error("Requirement already submitted")]
    AlreadySubmitted,

    /// Submission attempted before every required field is set
    #[error("Missing required fields: {0:?}")]
    Incomplete(Vec<FieldId>),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// Create a collaborator error
    pub fn collaborator(msg: impl Into<String>) -> Self {
        Error::Collaborator(msg.into())
    }

    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    /// Whether the error was caused by user input rather than a backend failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Incomplete(_))
    }
}
