//! Source positions for statements in a document.

use std::fmt;

/// Location of a statement inside a document.
///
/// `line` is the line of the statement itself. `first_line` and `last_line`
/// cover everything the statement owns: for an assignment with attached
/// comments `first_line` is the line of its first comment. `index` is the
/// statement's ordinal across the whole document and is rewritten by
/// [`Document::reindex_statements`](crate::ast::Document::reindex_statements).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Position {
    file: String,
    line: usize,
    first_line: usize,
    last_line: usize,
    index: usize,
}

impl Position {
    /// Create a position for a single-line statement.
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
            first_line: line,
            last_line: line,
            index: 0,
        }
    }

    /// Set the line range covered by the statement.
    pub fn with_lines(mut self, first_line: usize, last_line: usize) -> Self {
        self.first_line = first_line;
        self.last_line = last_line;
        self
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn first_line(&self) -> usize {
        self.first_line
    }

    pub fn last_line(&self) -> usize {
        self.last_line
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) fn set_file(&mut self, file: &str) {
        if self.file != file {
            self.file = file.to_string();
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "line {}", self.line)
        } else {
            write!(f, "{}:{}", self.file, self.line)
        }
    }
}
