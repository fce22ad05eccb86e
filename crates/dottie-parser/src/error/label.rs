use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Where the problem is.
    Primary,
    /// A related location, such as the first definition of a duplicated key.
    Secondary,
}

/// A message pinned to a byte range of the env source.
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    role: Role,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self::new(span, message, Role::Primary)
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self::new(span, message, Role::Secondary)
    }

    fn new(span: Span, message: impl Into<String>, role: Role) -> Self {
        Self {
            span,
            message: message.into(),
            role,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.role == Role::Primary
    }

    pub fn is_secondary(&self) -> bool {
        self.role == Role::Secondary
    }
}
