//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::lock::SubmissionState;
use crate::domain::validation::ValidationIssue;
use crate::domain::Level;

/// Domain errors represent business rule violations on the entity forest.
/// These are independent of storage and presentation concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed forest: {0}")]
    MalformedForest(String),

    #[error("no forest at index {0}")]
    ForestNotFound(usize),

    #[error("{level} '{name}' not found")]
    RecordNotFound { level: Level, name: String },

    #[error("{level} row {index} not found")]
    RowNotFound { level: Level, index: usize },

    #[error("invalid level: {0} (expected 1-4)")]
    InvalidLevel(u8),

    #[error("cannot {action} at {level} level")]
    UnsupportedLevel { level: Level, action: &'static str },

    #[error("{0} level is locked: submit a record at the level above first")]
    LevelLocked(Level),

    #[error("company already exists: {0}")]
    DuplicateCompany(String),

    #[error("{level} '{name}' already exists")]
    DuplicateName { level: Level, name: String },

    #[error("{level} parent '{parent}' is not a submitted record at the level above")]
    InvalidParent { level: Level, parent: String },

    #[error("cannot {action} a record that is {state}")]
    InvalidState {
        state: SubmissionState,
        action: &'static str,
    },

    #[error("name of {level} '{name}' is read-only here, use rename")]
    NameReadOnly { level: Level, name: String },

    #[error("validation failed: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
