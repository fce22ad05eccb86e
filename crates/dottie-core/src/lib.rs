//! Dottie Core Types and Engine
//!
//! This crate provides the document engine behind dottie: the structured,
//! lossless representation of `.env` files and every operation that works on
//! it. It includes:
//!
//! - **AST**: [`ast::Document`] and its statements, groups and annotations
//! - **Selectors**: statement filters used by lookups and rendering ([`selector`])
//! - **Templates**: POSIX-style parameter expansion ([`template`])
//! - **Interpolation**: dependency-ordered evaluation of assignments
//! - **Upsert**: the single primitive that creates or edits assignments ([`upsert`])
//! - **Validation**: tag-driven value checks from `@dottie/validate` ([`validation`])
//! - **Escaping**: value escape / unescape helpers shared with the scanner ([`escape`])
//!
//! Parsing lives in the `dottie-parser` crate and rendering in `dottie`.

pub mod ast;
pub mod cancel;
pub mod error;
pub mod escape;
pub mod position;
pub mod selector;
pub mod template;
pub mod upsert;
pub mod validation;

mod interpolation;

pub use ast::{
    Annotation, Assignment, Banner, Comment, Document, Group, Layout, Newline, Quote, Statement,
};
pub use cancel::CancellationToken;
pub use error::{InterpolationError, UpsertError, Warning};
pub use interpolation::EnvFallback;
pub use position::Position;
pub use selector::{Selection, Selector};
pub use upsert::{Placement, SkipReason, SkippedStatement, UpsertOutcome, UpsertSettings, Upserter};
pub use validation::{ValidationError, ValidationErrorKind};
