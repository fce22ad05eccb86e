//! Errors and warnings produced by the document engine.
//!
//! Every error and warning carries the [`Position`] of the assignment it was
//! raised for, so callers can report `file:line` context.

use std::fmt;

use thiserror::Error;

use crate::{position::Position, validation::ValidationError};

/// A non-fatal problem reported alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    message: String,
    position: Position,
}

impl Warning {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    /// Warning for a reference to a name that resolves nowhere.
    pub fn missing_variable(name: &str, position: Position) -> Self {
        Self::new(
            format!("the {name} variable is not set; defaulting to empty"),
            position,
        )
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> &Position {
        &self.position
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// Errors raised while evaluating parameter expansions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolationError {
    #[error("{position}: cyclic dependency detected between: {}", participants.join(", "))]
    Cycle {
        participants: Vec<String>,
        position: Position,
    },

    /// A `?` or `:?` operator fired.
    #[error("{position}: {name}: {reason}")]
    RequiredMissing {
        name: String,
        reason: String,
        position: Position,
    },

    #[error("{position}: invalid interpolation in {name}: {message}")]
    InvalidTemplate {
        name: String,
        message: String,
        position: Position,
    },

    #[error("interpolation cancelled")]
    Cancelled,
}

impl InterpolationError {
    /// Position of the assignment the error was raised for.
    pub fn position(&self) -> Option<&Position> {
        match self {
            InterpolationError::Cycle { position, .. }
            | InterpolationError::RequiredMissing { position, .. }
            | InterpolationError::InvalidTemplate { position, .. } => Some(position),
            InterpolationError::Cancelled => None,
        }
    }
}

/// Errors raised by [`Upserter`](crate::upsert::Upserter) construction and
/// [`upsert`](crate::upsert::Upserter::upsert).
///
/// A failed upsert never changes the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpsertError {
    /// The requested placement cannot be satisfied.
    #[error("invalid placement: {0}")]
    Placement(String),

    #[error("key {name} does not exist")]
    Missing { name: String },

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
