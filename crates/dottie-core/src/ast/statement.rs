use crate::{
    ast::{Assignment, Comment, Newline},
    position::Position,
};

/// A top-level entry of a document or group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Assignment(Assignment),
    Comment(Comment),
    Newline(Newline),
}

impl Statement {
    pub fn position(&self) -> &Position {
        match self {
            Statement::Assignment(assignment) => assignment.position(),
            Statement::Comment(comment) => comment.position(),
            Statement::Newline(newline) => newline.position(),
        }
    }

    pub(crate) fn position_mut(&mut self) -> &mut Position {
        match self {
            Statement::Assignment(assignment) => assignment.position_mut(),
            Statement::Comment(comment) => comment.position_mut(),
            Statement::Newline(newline) => newline.position_mut(),
        }
    }

    /// Name of the owning group, if any.
    pub fn group(&self) -> Option<&str> {
        match self {
            Statement::Assignment(assignment) => assignment.group(),
            Statement::Comment(comment) => comment.group(),
            Statement::Newline(newline) => newline.group(),
        }
    }

    pub(crate) fn set_group(&mut self, group: Option<String>) {
        match self {
            Statement::Assignment(assignment) => assignment.set_group(group),
            Statement::Comment(comment) => comment.set_group(group),
            Statement::Newline(newline) => newline.set_group(group),
        }
    }

    pub fn as_assignment(&self) -> Option<&Assignment> {
        match self {
            Statement::Assignment(assignment) => Some(assignment),
            _ => None,
        }
    }

    pub(crate) fn as_assignment_mut(&mut self) -> Option<&mut Assignment> {
        match self {
            Statement::Assignment(assignment) => Some(assignment),
            _ => None,
        }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(self, Statement::Assignment(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Statement::Comment(_))
    }

    pub fn is_newline(&self) -> bool {
        matches!(self, Statement::Newline(_))
    }
}

impl From<Assignment> for Statement {
    fn from(assignment: Assignment) -> Self {
        Statement::Assignment(assignment)
    }
}

impl From<Comment> for Statement {
    fn from(comment: Comment) -> Self {
        Statement::Comment(comment)
    }
}

impl From<Newline> for Statement {
    fn from(newline: Newline) -> Self {
        Statement::Newline(newline)
    }
}
