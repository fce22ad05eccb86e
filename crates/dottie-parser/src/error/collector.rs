use crate::error::{Diagnostic, ParseError};

/// Most diagnostics reported for one source. A binary file fed in by mistake
/// would otherwise yield one diagnostic per line.
pub(crate) const MAX_DIAGNOSTICS: usize = 100;

/// Gathers scan diagnostics for a whole source.
///
/// Past [`MAX_DIAGNOSTICS`] further problems are only counted, and
/// [`finish`](Self::finish) appends a warning saying how many were dropped.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
    omitted: usize,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.has_errors |= diagnostic.severity().is_error();
        if self.diagnostics.len() < MAX_DIAGNOSTICS {
            self.diagnostics.push(diagnostic);
        } else {
            self.omitted += 1;
        }
    }

    /// `Err` with the collected diagnostics once any error was emitted.
    pub fn finish(mut self) -> Result<(), ParseError> {
        if !self.has_errors {
            return Ok(());
        }
        if self.omitted > 0 {
            self.diagnostics.push(
                Diagnostic::warning(format!("{} further problem(s) not shown", self.omitted))
                    .with_help("fix the problems above and scan the file again"),
            );
        }
        Err(ParseError::new(self.diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    fn illegal(offset: usize) -> Diagnostic {
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E005)
            .with_label(Span::new(offset..offset + 1), "here")
    }

    #[test]
    fn test_collector_empty_is_ok() {
        assert!(DiagnosticCollector::new().finish().is_ok());
    }

    #[test]
    fn test_collector_warnings_only_is_ok() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("odd banner"));
        assert!(collector.finish().is_ok());
    }

    #[test]
    fn test_collector_keeps_every_diagnostic() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(illegal(10));
        collector.emit(illegal(20));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.diagnostics()[1].primary_span(), Some(Span::new(20..21)));
    }

    #[test]
    fn test_collector_caps_diagnostics() {
        let mut collector = DiagnosticCollector::new();
        for offset in 0..MAX_DIAGNOSTICS + 5 {
            collector.emit(illegal(offset));
        }

        let err = collector.finish().unwrap_err();
        let diagnostics = err.diagnostics();
        assert_eq!(diagnostics.len(), MAX_DIAGNOSTICS + 1);

        let summary = &diagnostics[MAX_DIAGNOSTICS];
        assert!(summary.severity().is_warning());
        assert_eq!(summary.message(), "5 further problem(s) not shown");
    }
}
