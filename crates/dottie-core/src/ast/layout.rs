//! Whitespace and markers as written in the source.
//!
//! The parser records them so the direct renderer can write a parsed line
//! back unchanged. Statements built in code carry the empty default and
//! render in canonical form.

/// How an assignment line was laid out around its key and value.
///
/// ```text
///   PORT =  "8080"\t
/// ^^    ^ ^^      ^^
/// |     | |       trailing
/// |     | after_assign
/// |     before_assign
/// indent
/// ```
///
/// A disabled line also keeps its marker, the `#` and the whitespace up to
/// the key: `#\t` in `#\tPORT=8080`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    indent: String,
    marker: String,
    before_assign: String,
    after_assign: String,
    trailing: String,
}

impl Layout {
    /// The canonical layout: no indent, `#` marker, no spacing.
    pub const fn new() -> Self {
        Self {
            indent: String::new(),
            marker: String::new(),
            before_assign: String::new(),
            after_assign: String::new(),
            trailing: String::new(),
        }
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// The disable marker of a `#KEY=` line, `#` plus any whitespace before
    /// the key.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Whitespace around `=`.
    pub fn with_assign_spacing(
        mut self,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        self.before_assign = before.into();
        self.after_assign = after.into();
        self
    }

    /// Whitespace after a quoted value.
    pub fn with_trailing(mut self, trailing: impl Into<String>) -> Self {
        self.trailing = trailing.into();
        self
    }

    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// The disable marker, `#` unless the source wrote another one.
    pub fn marker(&self) -> &str {
        if self.marker.is_empty() {
            "#"
        } else {
            &self.marker
        }
    }

    pub fn before_assign(&self) -> &str {
        &self.before_assign
    }

    pub fn after_assign(&self) -> &str {
        &self.after_assign
    }

    pub fn trailing(&self) -> &str {
        &self.trailing
    }

    pub(crate) fn clear_marker(&mut self) {
        self.marker.clear();
    }

    pub(crate) fn clear_trailing(&mut self) {
        self.trailing.clear();
    }
}

/// The three lines of a group banner as written: the opening rule, the title
/// line and the closing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    opening: String,
    title: String,
    closing: String,
}

impl Banner {
    pub fn new(
        opening: impl Into<String>,
        title: impl Into<String>,
        closing: impl Into<String>,
    ) -> Self {
        Self {
            opening: opening.into(),
            title: title.into(),
            closing: closing.into(),
        }
    }

    pub fn opening(&self) -> &str {
        &self.opening
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn closing(&self) -> &str {
        &self.closing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_marker() {
        assert_eq!(Layout::new().marker(), "#");
        assert_eq!(Layout::new().with_marker("#  ").marker(), "#  ");
    }
}
