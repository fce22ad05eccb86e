//! Error types for dottie operations.
//!
//! [`DottieError`] wraps everything that can go wrong between reading a file
//! and writing it back.

use std::io;

use thiserror::Error;

use dottie_core::{InterpolationError, UpsertError, ValidationError};
use dottie_parser::error::ParseError;

/// The main error type for dottie operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the structured parse
/// diagnostics so callers can render them with source context.
#[derive(Debug, Error)]
pub enum DottieError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),

    #[error(transparent)]
    Upsert(#[from] UpsertError),

    #[error("{} validation error(s): {}", .0.len(), first_message(.0))]
    Validation(Vec<ValidationError>),

    /// Writing `name` into the upstream document failed.
    #[error("failed to merge {name}: {source}")]
    Merge { name: String, source: UpsertError },

    #[error("Configuration error: {0}")]
    Config(String),
}

fn first_message(errors: &[ValidationError]) -> String {
    errors
        .first()
        .map(ValidationError::to_string)
        .unwrap_or_default()
}

impl DottieError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
