//! Turning a [`DottieError`] into miette reports.
//!
//! Each parse diagnostic and each validation violation becomes its own
//! [`Report`]; every other error becomes exactly one.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceCode, SourceSpan};

use dottie::{DottieError, ValidationError};
use dottie_parser::{
    Span,
    error::{Diagnostic, Severity},
};

/// One rendered problem, flattened out of the error it came from.
#[derive(Debug)]
pub struct Report<'a> {
    message: String,
    code: Option<String>,
    help: Option<String>,
    severity: miette::Severity,
    /// Source text plus the spans to underline in it.
    snippet: Option<(&'a str, Vec<LabeledSpan>)>,
    cause: Option<&'a (dyn std::error::Error + 'static)>,
}

impl<'a> Report<'a> {
    fn new(message: String, code: Option<String>) -> Self {
        Self {
            message,
            code,
            help: None,
            severity: miette::Severity::Error,
            snippet: None,
            cause: None,
        }
    }

    fn from_diagnostic(diag: &Diagnostic, src: &'a str) -> Self {
        let labels = diag
            .labels()
            .iter()
            .map(|label| {
                let text = Some(label.message().to_string());
                let span = to_source_span(label.span());
                if label.is_primary() {
                    LabeledSpan::new_primary_with_span(text, span)
                } else {
                    LabeledSpan::new_with_span(text, span)
                }
            })
            .collect();

        Self {
            help: diag.help().map(str::to_string),
            severity: match diag.severity() {
                Severity::Error => miette::Severity::Error,
                Severity::Warning => miette::Severity::Warning,
            },
            snippet: Some((src, labels)),
            ..Self::new(located_message(diag), diag.code().map(|code| code.to_string()))
        }
    }

    fn from_violation(violation: &ValidationError) -> Self {
        let rule = match violation.param() {
            "" => violation.tag().to_string(),
            param => format!("{}={param}", violation.tag()),
        };
        Self {
            help: Some(format!("failed rule: {rule}")),
            ..Self::new(violation.to_string(), Some("dottie::validation".into()))
        }
    }

    fn from_error(err: &'a DottieError) -> Self {
        let code = match err {
            DottieError::Io(_) => Some("dottie::io"),
            DottieError::Parse { .. } => None,
            DottieError::Interpolation(_) => Some("dottie::interpolation"),
            DottieError::Upsert(_) => Some("dottie::upsert"),
            DottieError::Validation(_) => Some("dottie::validation"),
            DottieError::Merge { .. } => Some("dottie::merge"),
            DottieError::Config(_) => Some("dottie::config"),
        };
        Self {
            cause: std::error::Error::source(err),
            ..Self::new(err.to_string(), code.map(str::to_string))
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Report<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
    }
}

impl MietteDiagnostic for Report<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.code
            .as_ref()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity)
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.snippet.as_ref().map(|(src, _)| src as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match &self.snippet {
            Some((_, labels)) if !labels.is_empty() => Some(Box::new(labels.iter().cloned())),
            _ => None,
        }
    }
}

/// The message, led by `file:line:` when the diagnostic knows them.
fn located_message(diag: &Diagnostic) -> String {
    match (diag.file(), diag.line()) {
        (Some(file), Some(line)) => format!("{file}:{line}: {}", diag.message()),
        _ => diag.message().to_string(),
    }
}

fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Split `err` into the reports to print, in source order.
pub fn to_reportables(err: &DottieError) -> Vec<Report<'_>> {
    match err {
        DottieError::Parse { err, src } => err
            .diagnostics()
            .iter()
            .map(|diag| Report::from_diagnostic(diag, src))
            .collect(),
        DottieError::Validation(violations) if !violations.is_empty() => {
            violations.iter().map(Report::from_violation).collect()
        }
        _ => vec![Report::from_error(err)],
    }
}
