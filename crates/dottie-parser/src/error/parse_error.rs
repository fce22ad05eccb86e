use thiserror::Error;

use crate::error::Diagnostic;

/// A failed scan or parse, carrying every diagnostic found in the source.
///
/// `Display` shows the first error and how many other errors follow.
/// Trailing warnings are not counted.
#[derive(Debug, Error)]
#[error("{}", summarize(.diagnostics))]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics of error severity, in source order.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity().is_error())
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Attach the name of the parsed file to every diagnostic.
    pub fn in_file(self, file: &str) -> Self {
        let diagnostics = self
            .diagnostics
            .into_iter()
            .map(|diagnostic| diagnostic.with_file(file))
            .collect();
        Self::new(diagnostics)
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    let mut errors = diagnostics.iter().filter(|d| d.severity().is_error());
    let Some(first) = errors.next().or_else(|| diagnostics.first()) else {
        return String::new();
    };
    match errors.count() {
        0 => first.to_string(),
        rest => format!("{first} (+{rest} more)"),
    }
}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self::new(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_single_error() {
        let err: ParseError = Diagnostic::error("unterminated value")
            .with_code(ErrorCode::E001)
            .into();

        assert_eq!(err.to_string(), "error[E001]: unterminated value");
    }

    #[test]
    fn test_counts_remaining_errors() {
        let err = ParseError::new(vec![
            Diagnostic::error("unexpected character").with_code(ErrorCode::E005),
            Diagnostic::error("unexpected character").with_code(ErrorCode::E005),
            Diagnostic::error("unterminated value").with_code(ErrorCode::E001),
        ]);

        assert_eq!(err.to_string(), "error[E005]: unexpected character (+2 more)");
    }

    #[test]
    fn test_in_file_names_every_diagnostic() {
        let err = ParseError::new(vec![
            Diagnostic::error("unexpected character").with_line(1),
            Diagnostic::error("unexpected character").with_line(4),
        ])
        .in_file("prod.env");

        assert!(err.diagnostics().iter().all(|d| d.file() == Some("prod.env")));
        assert_eq!(err.to_string(), "prod.env:1: error: unexpected character (+1 more)");
    }

    #[test]
    fn test_trailing_warning_is_not_counted() {
        let err = ParseError::new(vec![
            Diagnostic::error("unexpected character"),
            Diagnostic::warning("7 further problem(s) not shown"),
        ]);

        assert_eq!(err.to_string(), "error: unexpected character");
        assert_eq!(err.errors().count(), 1);
        assert_eq!(err.diagnostics().len(), 2);
    }
}
