use crate::{ast::Annotation, position::Position};

/// A single `#` comment line.
///
/// `value` holds the full line from the leading `#` on; together with the
/// whitespace before the `#` it reproduces the line byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    value: String,
    indent: String,
    annotation: Option<Annotation>,
    group: Option<String>,
    position: Position,
}

impl Comment {
    /// Create a comment from its full line text.
    ///
    /// A value without a leading `#` gets one, so callers can pass plain text.
    pub fn new(value: impl Into<String>) -> Self {
        let mut value = value.into();
        if !value.starts_with('#') {
            value = if value.is_empty() {
                "#".to_string()
            } else {
                format!("# {value}")
            };
        }
        let annotation = Annotation::parse(&value);
        Self {
            value,
            indent: String::new(),
            annotation,
            group: None,
            position: Position::default(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Whitespace before the `#`.
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// The full comment line, including the `#`.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The comment text without the `#` marker and surrounding whitespace.
    pub fn text(&self) -> &str {
        self.value.trim_start_matches('#').trim()
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub(crate) fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    pub(crate) fn set_group(&mut self, group: Option<String>) {
        self.group = group;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_keeps_full_line() {
        let comment = Comment::new("#   spaced out");
        assert_eq!(comment.value(), "#   spaced out");
        assert_eq!(comment.text(), "spaced out");
        assert!(comment.annotation().is_none());
    }

    #[test]
    fn test_comment_adds_marker() {
        assert_eq!(Comment::new("hello").value(), "# hello");
        assert_eq!(Comment::new("").value(), "#");
    }

    #[test]
    fn test_comment_detects_annotation() {
        let comment = Comment::new("# @dottie/validate number");
        let annotation = comment.annotation().unwrap();
        assert_eq!(annotation.key(), "dottie/validate");
        assert_eq!(annotation.value(), "number");
    }
}
