use std::fmt;

use crate::{
    error::{ErrorCode, Label, Severity},
    span::Span,
};

/// One problem found in an env source.
///
/// Besides byte spans a diagnostic knows the 1-based line it starts on and,
/// once parsing has attached it, the file name. `Display` leads with
/// `file:line:` when those are known.
///
/// Built with the `with_*` methods:
///
/// ```
/// # use dottie_parser::{Span, error::{Diagnostic, ErrorCode}};
/// let duplicate = Diagnostic::error("key `PORT` is defined multiple times")
///     .with_code(ErrorCode::E101)
///     .with_label(Span::new(20..24), "duplicate key")
///     .with_secondary_label(Span::new(0..4), "first defined here");
///
/// assert_eq!(duplicate.primary_span(), Some(Span::new(20..24)));
/// assert_eq!(
///     duplicate.to_string(),
///     "error[E101]: key `PORT` is defined multiple times"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
    file: Option<String>,
    line: Option<usize>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, message.into())
    }

    fn with_severity(severity: Severity, message: String) -> Self {
        Self {
            severity,
            code: None,
            message,
            labels: Vec::new(),
            help: None,
            file: None,
            line: None,
        }
    }

    pub fn with_code(self, code: ErrorCode) -> Self {
        Self {
            code: Some(code),
            ..self
        }
    }

    pub fn with_line(self, line: usize) -> Self {
        Self {
            line: Some(line),
            ..self
        }
    }

    pub fn with_file(self, file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            ..self
        }
    }

    /// Point at where the problem is.
    pub fn with_label(self, span: Span, message: impl Into<String>) -> Self {
        self.push_label(Label::primary(span, message))
    }

    /// Point at a related location.
    pub fn with_secondary_label(self, span: Span, message: impl Into<String>) -> Self {
        self.push_label(Label::secondary(span, message))
    }

    pub fn with_help(self, help: impl Into<String>) -> Self {
        Self {
            help: Some(help.into()),
            ..self
        }
    }

    fn push_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// 1-based line the problem starts on.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Span of the first primary label.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{file}:{line}: ")?,
            (Some(file), None) => write!(f, "{file}: ")?,
            (None, Some(line)) => write!(f, "line {line}: ")?,
            (None, None) => {}
        }
        match self.code {
            Some(code) => write!(f, "{}[{code}]: {}", self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_error() {
        let diag = Diagnostic::error("unexpected character");

        assert!(diag.severity().is_error());
        assert!(diag.code().is_none());
        assert!(diag.help().is_none());
        assert!(diag.primary_span().is_none());
        assert_eq!(diag.to_string(), "error: unexpected character");
    }

    #[test]
    fn test_primary_span_skips_secondary_labels() {
        let diag = Diagnostic::error("key `A` is defined multiple times")
            .with_secondary_label(Span::new(0..1), "first defined here")
            .with_label(Span::new(4..5), "duplicate key")
            .with_help("remove one of the definitions");

        assert_eq!(diag.labels().len(), 2);
        assert_eq!(diag.primary_span(), Some(Span::new(4..5)));
        assert_eq!(diag.help(), Some("remove one of the definitions"));
    }

    #[test]
    fn test_location_display() {
        let diag = Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E005)
            .with_line(3);
        assert_eq!(diag.to_string(), "line 3: error[E005]: unexpected character");

        let diag = diag.with_file("prod.env");
        assert_eq!(diag.file(), Some("prod.env"));
        assert_eq!(
            diag.to_string(),
            "prod.env:3: error[E005]: unexpected character"
        );
    }

    #[test]
    fn test_warning_display() {
        let diag = Diagnostic::warning("2 further problem(s) not shown");
        assert_eq!(diag.to_string(), "warning: 2 further problem(s) not shown");
    }
}
