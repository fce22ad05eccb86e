//! Statement filters.
//!
//! A [`Selector`] decides whether a statement is kept. Lookups and the
//! renderer combine several selectors; a statement survives only when every
//! selector keeps it.

use crate::ast::Statement;

/// Outcome of applying a selector to a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Keep,
    Exclude,
}

impl From<bool> for Selection {
    fn from(keep: bool) -> Self {
        if keep {
            Selection::Keep
        } else {
            Selection::Exclude
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Drop `#KEY=value` assignments.
    ExcludeDisabled,
    /// Drop enabled assignments.
    ExcludeActive,
    /// Drop free-standing comments.
    ExcludeComments,
    /// Drop assignments carrying `@dottie/hidden`.
    ExcludeHidden,
    /// Drop blank lines.
    ExcludeBlankLines,
    /// Keep only assignments whose name starts with the prefix.
    RetainKeyPrefix(String),
    /// Drop assignments whose name starts with the prefix.
    ExcludeKeyPrefix(String),
    /// Keep only statements owned by the named group.
    RetainGroup(String),
}

impl Selector {
    pub fn select(&self, statement: &Statement) -> Selection {
        match (self, statement) {
            (Selector::ExcludeDisabled, Statement::Assignment(assignment)) => {
                assignment.is_enabled().into()
            }
            (Selector::ExcludeActive, Statement::Assignment(assignment)) => {
                (!assignment.is_enabled()).into()
            }
            (Selector::ExcludeComments, Statement::Comment(_)) => Selection::Exclude,
            (Selector::ExcludeHidden, Statement::Assignment(assignment)) => {
                (!assignment.is_hidden()).into()
            }
            (Selector::ExcludeBlankLines, Statement::Newline(newline)) => {
                (!newline.is_blank()).into()
            }
            (Selector::RetainKeyPrefix(prefix), statement) => statement
                .as_assignment()
                .is_some_and(|assignment| assignment.name().starts_with(prefix.as_str()))
                .into(),
            (Selector::ExcludeKeyPrefix(prefix), Statement::Assignment(assignment)) => {
                (!assignment.name().starts_with(prefix.as_str())).into()
            }
            (Selector::RetainGroup(group), statement) => {
                (statement.group() == Some(group.as_str())).into()
            }
            _ => Selection::Keep,
        }
    }
}

/// Apply every selector; the statement is kept only if all of them keep it.
pub fn select_all(selectors: &[Selector], statement: &Statement) -> Selection {
    selectors
        .iter()
        .all(|selector| selector.select(statement) == Selection::Keep)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Assignment, Comment, Newline},
        position::Position,
    };

    #[test]
    fn test_disabled_and_active() {
        let active: Statement = Assignment::new("A", "1").into();
        let disabled: Statement = Assignment::new("B", "2").with_enabled(false).into();

        assert_eq!(Selector::ExcludeDisabled.select(&active), Selection::Keep);
        assert_eq!(Selector::ExcludeDisabled.select(&disabled), Selection::Exclude);
        assert_eq!(Selector::ExcludeActive.select(&active), Selection::Exclude);
        assert_eq!(Selector::ExcludeActive.select(&disabled), Selection::Keep);
    }

    #[test]
    fn test_hidden() {
        let hidden: Statement = Assignment::new("TOKEN", "x")
            .with_comments(vec![Comment::new("# @dottie/hidden")])
            .into();
        assert_eq!(Selector::ExcludeHidden.select(&hidden), Selection::Exclude);
    }

    #[test]
    fn test_key_prefix() {
        let db: Statement = Assignment::new("DB_HOST", "x").into();
        let app: Statement = Assignment::new("APP_NAME", "x").into();
        let comment: Statement = Comment::new("# note").into();

        let retain = Selector::RetainKeyPrefix("DB_".to_string());
        assert_eq!(retain.select(&db), Selection::Keep);
        assert_eq!(retain.select(&app), Selection::Exclude);
        assert_eq!(retain.select(&comment), Selection::Exclude);

        let exclude = Selector::ExcludeKeyPrefix("DB_".to_string());
        assert_eq!(exclude.select(&db), Selection::Exclude);
        assert_eq!(exclude.select(&comment), Selection::Keep);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let comment: Statement = Comment::new("# note").into();
        let blank: Statement = Newline::blank(Position::new(".env", 1)).into();
        assert_eq!(Selector::ExcludeComments.select(&comment), Selection::Exclude);
        assert_eq!(Selector::ExcludeComments.select(&blank), Selection::Keep);
        assert_eq!(Selector::ExcludeBlankLines.select(&blank), Selection::Exclude);
    }

    #[test]
    fn test_select_all_requires_every_selector() {
        let statement: Statement = Assignment::new("DB_HOST", "x").with_enabled(false).into();
        let selectors = [
            Selector::RetainKeyPrefix("DB_".to_string()),
            Selector::ExcludeDisabled,
        ];
        assert_eq!(select_all(&selectors, &statement), Selection::Exclude);
        assert_eq!(select_all(&[], &statement), Selection::Keep);
    }
}
