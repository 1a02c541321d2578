//! Domain error types.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A single input field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// The offending field name as it appears on the command.
    pub field: &'static str,
    /// Why the value was rejected.
    pub message: String,
}

impl FieldViolation {
    /// Creates a violation for `field`.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for the common "must not be blank" rule.
    #[must_use]
    pub fn blank(field: &'static str) -> Self {
        Self::new(field, "must not be blank")
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Top-level domain error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Optimistic concurrency conflict.
    #[error(
        "concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// One or more input fields failed validation.
    #[error("validation error: {}", describe(.0))]
    Validation(Vec<FieldViolation>),

    /// The aggregate's lifecycle state forbids the attempted operation.
    #[error("cannot {operation} aggregate {aggregate_id} in state {state}")]
    IllegalState {
        /// The aggregate the operation targeted.
        aggregate_id: Uuid,
        /// The lifecycle state it was in.
        state: &'static str,
        /// The rejected operation.
        operation: &'static str,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// True for errors caused by caller input (any validation failure).
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The violated fields, if this is a validation error.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation(violations) => violations,
            _ => &[],
        }
    }
}
