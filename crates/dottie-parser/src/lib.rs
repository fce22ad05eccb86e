//! # Dottie Parser
//!
//! Lossless scanner and parser for `.env` files. Source text is scanned into
//! tokens, and the tokens are folded into a [`dottie_core::Document`] that
//! keeps comments, blank lines, groups and disabled entries so the file can
//! be written back without losing anything.
//!
//! ## Usage
//!
//! ```
//! # use dottie_parser::{parse, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "# Port to listen on\nPORT=8080\n";
//!
//!     let document = parse(source, ".env")?;
//!     assert_eq!(document.get("PORT").unwrap().literal(), "8080");
//!     Ok(())
//! }
//! ```

pub mod error;
mod parser;
#[cfg(test)]
mod parser_tests;
mod scanner;
mod span;
mod tokens;

pub use error::ParseError;
pub use scanner::{MAX_TOKEN_LENGTH, Scanner};
pub use span::Span;
pub use tokens::{ScanIssue, Token, TokenKind};

use dottie_core::{CancellationToken, Document};
use log::debug;

/// Parse env source text into a document.
///
/// This is the main entry point. It runs the complete pipeline:
///
/// 1. **Scan** - Convert source text to tokens, collecting every scan problem
/// 2. **Parse** - Fold the tokens into statements, attaching comments and groups
/// 3. **Initialize** - Build the key index and dependency graph of the document
///
/// `filename` is recorded in statement positions and in every diagnostic.
///
/// # Errors
///
/// Returns a [`ParseError`] holding every scan diagnostic, or the first
/// parse diagnostic when scanning succeeded. Each diagnostic carries the
/// file name and the line it starts on.
pub fn parse(source: &str, filename: &str) -> Result<Document, ParseError> {
    parse_with_cancel(source, filename, &CancellationToken::new())
}

/// Parse raw bytes, reporting invalid UTF-8 as a diagnostic instead of
/// failing up front.
pub fn parse_bytes(bytes: &[u8], filename: &str) -> Result<Document, ParseError> {
    run(Scanner::from_bytes(bytes), filename, &CancellationToken::new())
}

/// Parse with a cancellation token that is polled once per line.
///
/// A cancelled parse fails with [`error::ErrorCode::E102`].
pub fn parse_with_cancel(
    source: &str,
    filename: &str,
    cancel: &CancellationToken,
) -> Result<Document, ParseError> {
    run(Scanner::new(source), filename, cancel)
}

fn run(
    scanner: Scanner<'_>,
    filename: &str,
    cancel: &CancellationToken,
) -> Result<Document, ParseError> {
    // Step 1: Scan
    let tokens = scanner::tokenize(scanner).map_err(|err| err.in_file(filename))?;
    debug!(file = filename, tokens = tokens.len(); "Scanned source");

    // Step 2 and 3: Parse and initialize
    let document = parser::build_document(&tokens, filename, cancel)
        .map_err(|diagnostic| ParseError::from(diagnostic.with_file(filename)))?;
    Ok(document)
}
