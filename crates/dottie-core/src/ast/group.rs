use crate::{
    ast::{Banner, Statement},
    position::Position,
};

/// A named region of a document introduced by a banner:
///
/// ```text
/// ################################################################################
/// # database
/// ################################################################################
/// ```
///
/// The group owns every statement from its banner up to the next banner.
/// Parsed groups keep their banner lines as written; groups created in code
/// render the canonical banner above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    statements: Vec<Statement>,
    banner: Option<Banner>,
    position: Position,
}

impl Group {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            statements: Vec::new(),
            banner: None,
            position,
        }
    }

    pub fn with_banner(mut self, banner: Banner) -> Self {
        self.banner = Some(banner);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The banner lines as they appeared in the source.
    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Line of the opening banner.
    pub fn first_line(&self) -> usize {
        self.position.first_line()
    }

    /// Line of the last statement in the group.
    pub fn last_line(&self) -> usize {
        self.position.last_line()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns `true` when the group owns at least one assignment.
    pub fn has_assignments(&self) -> bool {
        self.statements.iter().any(Statement::is_assignment)
    }

    pub(crate) fn statements_mut(&mut self) -> &mut Vec<Statement> {
        &mut self.statements
    }

    pub(crate) fn set_last_line(&mut self, last_line: usize) {
        let first_line = self.position.first_line();
        self.position = self.position.clone().with_lines(first_line, last_line);
    }
}
