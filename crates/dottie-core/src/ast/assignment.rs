use std::collections::{BTreeMap, BTreeSet};

use crate::{
    ast::{Annotation, Comment, Layout, Quote},
    position::Position,
    template::Reference,
};

/// A `KEY=value` pair.
///
/// `literal` is the value after quote processing and escape interpretation.
/// `interpolated` is the derived, evaluated view of that literal; it starts
/// out equal to the literal and is only ever written by interpolation.
///
/// Parsed assignments also remember the value exactly as written in the
/// source, so unchanged values render byte for byte. Changing the literal or
/// the quote style drops it. The surrounding whitespace lives in [`Layout`];
/// toggling the enabled state resets the disable marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    name: String,
    literal: String,
    interpolated: String,
    raw: Option<String>,
    quote: Quote,
    layout: Layout,
    enabled: bool,
    complete: bool,
    comments: Vec<Comment>,
    group: Option<String>,
    dependencies: BTreeMap<String, Reference>,
    dependents: BTreeSet<String>,
    position: Position,
}

impl Assignment {
    /// Create an enabled, unquoted assignment.
    pub fn new(name: impl Into<String>, literal: impl Into<String>) -> Self {
        let literal = literal.into();
        Self {
            name: name.into(),
            interpolated: literal.clone(),
            literal,
            raw: None,
            quote: Quote::Unquoted,
            layout: Layout::default(),
            enabled: true,
            complete: true,
            comments: Vec::new(),
            group: None,
            dependencies: BTreeMap::new(),
            dependents: BTreeSet::new(),
            position: Position::default(),
        }
    }

    /// Create a bare `KEY` line that has no `=` sign.
    pub fn incomplete(name: impl Into<String>) -> Self {
        Self {
            complete: false,
            ..Self::new(name, "")
        }
    }

    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quote = quote;
        self
    }

    /// Remember the value text as it appeared in the source, between its
    /// quotes and with escapes uninterpreted.
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn interpolated(&self) -> &str {
        &self.interpolated
    }

    /// The value as written in the source, if the literal is unchanged
    /// since parsing.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn quote(&self) -> Quote {
        self.quote
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `false` for a bare `KEY` line without `=`.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn has_comments(&self) -> bool {
        !self.comments.is_empty()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Names referenced by this assignment's literal.
    pub fn dependencies(&self) -> &BTreeMap<String, Reference> {
        &self.dependencies
    }

    /// Names of the assignments whose literals reference this one.
    pub fn dependents(&self) -> &BTreeSet<String> {
        &self.dependents
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Annotations found in the attached comments.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.comments.iter().filter_map(Comment::annotation)
    }

    /// Value of the first attached annotation with the given key.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations()
            .find(|annotation| annotation.key() == key)
            .map(Annotation::value)
    }

    /// The rule of a `@dottie/validate` annotation, which only counts as the
    /// first attached comment.
    pub fn validation_rule(&self) -> Option<&str> {
        self.comments
            .first()
            .and_then(Comment::annotation)
            .filter(|annotation| annotation.key() == Annotation::VALIDATE)
            .map(Annotation::value)
            .filter(|rule| !rule.trim().is_empty())
    }

    /// Returns `true` when an attached `@dottie/hidden` annotation is present.
    pub fn is_hidden(&self) -> bool {
        self.annotation(Annotation::HIDDEN).is_some()
    }

    pub(crate) fn set_literal(&mut self, literal: impl Into<String>) {
        let literal = literal.into();
        if literal != self.literal {
            self.drop_raw();
        }
        self.literal = literal;
    }

    pub(crate) fn set_interpolated(&mut self, interpolated: impl Into<String>) {
        self.interpolated = interpolated.into();
    }

    pub(crate) fn set_quote(&mut self, quote: Quote) {
        if quote != self.quote {
            self.drop_raw();
        }
        self.quote = quote;
    }

    /// Trailing whitespace would join a rewritten bare value.
    fn drop_raw(&mut self) {
        self.raw = None;
        self.layout.clear_trailing();
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            self.layout.clear_marker();
        }
        self.enabled = enabled;
    }

    pub(crate) fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    pub(crate) fn set_comments(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
        let group = self.group.clone();
        for comment in &mut self.comments {
            comment.set_group(group.clone());
        }
    }

    pub(crate) fn set_group(&mut self, group: Option<String>) {
        for comment in &mut self.comments {
            comment.set_group(group.clone());
        }
        self.group = group;
    }

    pub(crate) fn set_dependencies(&mut self, dependencies: BTreeMap<String, Reference>) {
        self.dependencies = dependencies;
    }

    pub(crate) fn set_dependents(&mut self, dependents: BTreeSet<String>) {
        self.dependents = dependents;
    }

    pub(crate) fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    pub(crate) fn comments_mut(&mut self) -> &mut [Comment] {
        &mut self.comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assignment_defaults() {
        let assignment = Assignment::new("PORT", "8080");
        assert_eq!(assignment.name(), "PORT");
        assert_eq!(assignment.literal(), "8080");
        assert_eq!(assignment.interpolated(), "8080");
        assert_eq!(assignment.quote(), Quote::Unquoted);
        assert!(assignment.is_enabled());
        assert!(assignment.is_complete());
    }

    #[test]
    fn test_incomplete_assignment() {
        let assignment = Assignment::incomplete("FLAG");
        assert!(!assignment.is_complete());
        assert_eq!(assignment.literal(), "");
    }

    #[test]
    fn test_validation_rule_from_first_comment() {
        let assignment = Assignment::new("EMAIL", "a@b.c").with_comments(vec![
            Comment::new("# @dottie/validate required,email"),
            Comment::new("# Contact address"),
        ]);
        assert_eq!(assignment.validation_rule(), Some("required,email"));
        assert!(!assignment.is_hidden());
    }

    #[test]
    fn test_validation_rule_after_plain_comment_is_ignored() {
        let assignment = Assignment::new("EMAIL", "nope").with_comments(vec![
            Comment::new("# Contact address"),
            Comment::new("# @dottie/validate required,email"),
        ]);
        assert_eq!(assignment.validation_rule(), None);
    }

    #[test]
    fn test_edits_reset_layout_parts() {
        let layout = Layout::new()
            .with_indent("  ")
            .with_marker("# ")
            .with_trailing("  ");
        let mut assignment = Assignment::new("A", "1")
            .with_quote(Quote::Double)
            .with_raw("1")
            .with_enabled(false)
            .with_layout(layout);

        assignment.set_literal("1");
        assert_eq!(assignment.layout().trailing(), "  ");

        assignment.set_enabled(true);
        assert_eq!(assignment.layout().marker(), "#");

        assignment.set_literal("2");
        assert_eq!(assignment.layout().trailing(), "");
        assert_eq!(assignment.layout().indent(), "  ");
    }

    #[test]
    fn test_raw_is_dropped_when_literal_changes() {
        let mut assignment = Assignment::new("PATH", "C:\\x")
            .with_quote(Quote::Double)
            .with_raw("C:\\\\x");
        assignment.set_literal("C:\\x");
        assert!(assignment.raw().is_some());
        assignment.set_literal("D:\\x");
        assert!(assignment.raw().is_none());
    }

    #[test]
    fn test_hidden_annotation() {
        let assignment =
            Assignment::new("SECRET", "x").with_comments(vec![Comment::new("# @dottie/hidden")]);
        assert!(assignment.is_hidden());
    }
}
