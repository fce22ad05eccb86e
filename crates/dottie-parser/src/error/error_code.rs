//! Error codes for env file diagnostics.
//!
//! - `E0xx` - Scanner errors
//! - `E1xx` - Parser errors

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Scanner Errors (E0xx)
    // =========================================================================
    /// Unterminated double-quoted value.
    ///
    /// A value opened with `"` has no closing quote before the end of input.
    /// Double-quoted values may span lines, so the missing quote is often far
    /// from where the scanner gives up.
    E001,

    /// Unterminated single-quoted value.
    E002,

    /// Token too long.
    ///
    /// A single token exceeds the scanner's 64 KiB limit.
    E003,

    /// Invalid UTF-8.
    E004,

    /// Unexpected character.
    ///
    /// A line starts with something that is neither a key, a comment nor
    /// whitespace, or a key is followed by something other than `=`.
    E005,

    /// Content after a quoted value.
    ///
    /// Only whitespace may follow the closing quote on the same line.
    E006,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    E100,

    /// Duplicate key.
    ///
    /// Keys are unique within a document, disabled ones included.
    E101,

    /// Parsing was cancelled.
    E102,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E006 => "E006",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated double-quoted value",
            ErrorCode::E002 => "unterminated single-quoted value",
            ErrorCode::E003 => "token too long",
            ErrorCode::E004 => "invalid UTF-8",
            ErrorCode::E005 => "unexpected character",
            ErrorCode::E006 => "content after quoted value",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "duplicate key",
            ErrorCode::E102 => "parsing cancelled",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
