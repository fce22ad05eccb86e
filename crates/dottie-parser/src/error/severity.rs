use std::fmt;

/// How serious a [`Diagnostic`](super::Diagnostic) is.
///
/// Any error makes the parse fail. Warnings only ride along with errors,
/// such as the note that further problems were left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }

    pub fn is_warning(self) -> bool {
        self == Severity::Warning
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_outrank_warnings() {
        assert!(Severity::Error > Severity::Warning);
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
