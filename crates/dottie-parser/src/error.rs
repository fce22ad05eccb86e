//! Diagnostics produced while scanning and parsing env files.
//!
//! Every problem is a [`Diagnostic`]: a severity, an [`ErrorCode`], a message,
//! labelled byte spans into the source and optional help text. Parsing
//! returns a [`ParseError`] holding one or more diagnostics.
//!
//! # Example
//!
//! ```
//! # use dottie_parser::error::{Diagnostic, ErrorCode};
//! # use dottie_parser::Span;
//!
//! let diag = Diagnostic::error("key `PORT` is defined multiple times")
//!     .with_code(ErrorCode::E101)
//!     .with_label(Span::new(40..44), "duplicate key")
//!     .with_secondary_label(Span::new(0..4), "first defined here")
//!     .with_help("remove one of the definitions");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
