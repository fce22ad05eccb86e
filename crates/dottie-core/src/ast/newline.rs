use crate::position::Position;

/// A blank line kept so the direct renderer can reproduce spacing.
///
/// A line holding only spaces or tabs keeps them as its `whitespace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Newline {
    blank: bool,
    whitespace: String,
    group: Option<String>,
    position: Position,
}

impl Newline {
    pub fn blank(position: Position) -> Self {
        Self {
            blank: true,
            whitespace: String::new(),
            group: None,
            position,
        }
    }

    pub fn with_whitespace(mut self, whitespace: impl Into<String>) -> Self {
        self.whitespace = whitespace.into();
        self
    }

    pub fn whitespace(&self) -> &str {
        &self.whitespace
    }

    pub fn is_blank(&self) -> bool {
        self.blank
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
