use std::collections::{BTreeMap, BTreeSet, HashMap};

use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    ast::{Annotation, Assignment, Group, Statement},
    cancel::CancellationToken,
    error::{InterpolationError, UpsertError, Warning},
    interpolation::{self, EnvFallback, Interpolator},
    position::Position,
    selector::{self, Selection, Selector},
    template::Template,
    upsert::{UpsertOutcome, UpsertSettings, Upserter},
    validation::{ValidationError, Validator},
};

/// Location of an assignment inside the document: the owning container
/// (`None` for top-level statements, otherwise a group index) and the offset
/// within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub group: Option<usize>,
    pub offset: usize,
}

/// A parsed env file.
///
/// Top-level statements come first, followed by the groups in source order.
/// Everything after the first banner belongs to a group, so iterating the
/// top-level statements and then every group's statements visits the whole
/// document in order.
///
/// The name index and the dependency edges are derived state. They are
/// rebuilt by [`reindex_statements`](Self::reindex_statements) and
/// [`initialize`](Self::initialize).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    file: String,
    statements: Vec<Statement>,
    groups: Vec<Group>,
    annotations: Vec<Annotation>,
    index: IndexMap<String, Slot>,
    env_fallback: EnvFallback,
}

impl Document {
    /// Create an empty document for the named file.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            statements: Vec::new(),
            groups: Vec::new(),
            annotations: Vec::new(),
            index: IndexMap::new(),
            env_fallback: EnvFallback::default(),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Statements before the first group.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name() == name)
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.group(name).is_some()
    }

    /// Every statement in document order, including the contents of groups.
    pub fn iter_statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements
            .iter()
            .chain(self.groups.iter().flat_map(|group| group.statements()))
    }

    /// Number of statements in the whole document.
    pub fn statement_count(&self) -> usize {
        self.statements.len()
            + self
                .groups
                .iter()
                .map(|group| group.statements().len())
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.statement_count() == 0 && self.groups.is_empty()
    }

    /// Reserved `dottie/*` annotations in document order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Values of every reserved annotation with the given key.
    pub fn annotation(&self, key: &str) -> Vec<&str> {
        self.annotations
            .iter()
            .filter(|annotation| annotation.key() == key)
            .map(Annotation::value)
            .collect()
    }

    /// First value of a `dottie/*` annotation.
    ///
    /// The `dottie/` prefix may be omitted: `get_config("source")` reads
    /// `@dottie/source`.
    pub fn get_config(&self, key: &str) -> Option<&str> {
        let key = if key.starts_with("dottie/") {
            key.to_string()
        } else {
            format!("dottie/{key}")
        };
        self.annotation(&key).into_iter().next()
    }

    pub fn get(&self, name: &str) -> Option<&Assignment> {
        let slot = self.index.get(name)?;
        self.container(slot.group)?
            .get(slot.offset)?
            .as_assignment()
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Assignment> {
        let slot = *self.index.get(name)?;
        self.container_mut(slot.group)?
            .get_mut(slot.offset)?
            .as_assignment_mut()
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub(crate) fn slot(&self, name: &str) -> Option<Slot> {
        self.index.get(name).copied()
    }

    /// Assignments in document order that every selector keeps.
    pub fn all_assignments<'a>(
        &'a self,
        selectors: &[Selector],
    ) -> impl Iterator<Item = &'a Assignment> {
        self.iter_statements()
            .filter(move |statement| selector::select_all(selectors, statement) == Selection::Keep)
            .filter_map(Statement::as_assignment)
    }

    pub fn env_fallback(&self) -> &EnvFallback {
        &self.env_fallback
    }

    /// Choose how names missing from the document are resolved during
    /// interpolation.
    pub fn set_env_fallback(&mut self, env_fallback: EnvFallback) {
        self.env_fallback = env_fallback;
    }

    pub fn with_env_fallback(mut self, env_fallback: EnvFallback) -> Self {
        self.env_fallback = env_fallback;
        self
    }

    /// Append a statement to the last open group, or to the top level when
    /// the document has no groups yet.
    pub fn push_statement(&mut self, statement: impl Into<Statement>) {
        let mut statement = statement.into();
        statement.position_mut().set_file(&self.file);
        match self.groups.last_mut() {
            Some(group) => {
                statement.set_group(Some(group.name().to_string()));
                group.statements_mut().push(statement);
            }
            None => {
                statement.set_group(None);
                self.statements.push(statement);
            }
        }
    }

    /// Open a new group; following statements are appended to it.
    pub fn push_group(&mut self, group: Group) {
        debug!(group = group.name(); "Opening group");
        self.groups.push(group);
    }

    /// Return the named group, creating an empty one at the end of the
    /// document when it does not exist yet.
    ///
    /// Returns `None` for an empty name.
    pub fn ensure_group(&mut self, name: &str) -> Option<&Group> {
        if name.is_empty() {
            return None;
        }
        let position = match self.groups.iter().position(|group| group.name() == name) {
            Some(position) => position,
            None => {
                let line = self
                    .iter_statements()
                    .map(|statement| statement.position().last_line())
                    .chain(self.groups.iter().map(Group::last_line))
                    .max()
                    .unwrap_or(0)
                    + 1;
                debug!(group = name; "Creating group");
                self.groups
                    .push(Group::new(name, Position::new(self.file.clone(), line)));
                self.groups.len() - 1
            }
        };
        self.groups.get(position)
    }

    /// Renumber every statement `0..N-1` in document order and rebuild the
    /// name index.
    pub fn reindex_statements(&mut self) {
        let mut index = IndexMap::new();
        let mut next = 0;

        for (offset, statement) in self.statements.iter_mut().enumerate() {
            statement.position_mut().set_index(next);
            next += 1;
            if let Some(assignment) = statement.as_assignment() {
                index.insert(
                    assignment.name().to_string(),
                    Slot {
                        group: None,
                        offset,
                    },
                );
            }
        }

        for (group_index, group) in self.groups.iter_mut().enumerate() {
            let mut last_line = group.first_line();
            for (offset, statement) in group.statements_mut().iter_mut().enumerate() {
                statement.position_mut().set_index(next);
                next += 1;
                last_line = last_line.max(statement.position().last_line());
                if let Some(assignment) = statement.as_assignment() {
                    index.insert(
                        assignment.name().to_string(),
                        Slot {
                            group: Some(group_index),
                            offset,
                        },
                    );
                }
            }
            group.set_last_line(last_line);
        }

        trace!(statements = next; "Reindexed statements");
        self.index = index;
    }

    /// Rebuild every derived index: statement positions, the name index,
    /// group membership, reserved annotations and the dependency edges of
    /// every assignment.
    ///
    /// Edge sets are replaced, so references removed by an edit disappear.
    /// Calling this repeatedly yields the same document.
    pub fn initialize(&mut self) {
        for statement in &mut self.statements {
            statement.set_group(None);
        }
        for group in &mut self.groups {
            let name = group.name().to_string();
            for statement in group.statements_mut() {
                statement.set_group(Some(name.clone()));
            }
        }

        self.reindex_statements();

        self.annotations = self
            .iter_statements()
            .flat_map(|statement| match statement {
                Statement::Comment(comment) => {
                    comment.annotation().into_iter().collect::<Vec<_>>()
                }
                Statement::Assignment(assignment) => assignment.annotations().collect(),
                Statement::Newline(_) => Vec::new(),
            })
            .filter(|annotation| annotation.is_reserved())
            .cloned()
            .collect();

        let mut dependencies = HashMap::new();
        for assignment in self.iter_statements().filter_map(Statement::as_assignment) {
            dependencies.insert(assignment.name().to_string(), extract_dependencies(assignment));
        }

        let mut dependents: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (name, references) in &dependencies {
            for dependency in references.keys() {
                if self.index.contains_key(dependency) {
                    dependents
                        .entry(dependency.clone())
                        .or_default()
                        .insert(name.clone());
                }
            }
        }

        for assignment in self.assignments_mut() {
            let name = assignment.name().to_string();
            assignment.set_dependencies(dependencies.remove(&name).unwrap_or_default());
            assignment.set_dependents(dependents.remove(&name).unwrap_or_default());
        }
    }

    /// Evaluate every enabled assignment in dependency order.
    ///
    /// On error the document is left untouched.
    pub fn interpolate_all(&mut self) -> Result<Vec<Warning>, InterpolationError> {
        self.interpolate_all_with_cancel(&CancellationToken::new())
    }

    /// Like [`interpolate_all`](Self::interpolate_all), polling `cancel`
    /// before each assignment.
    pub fn interpolate_all_with_cancel(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Warning>, InterpolationError> {
        let evaluation = Interpolator::new(self).evaluate_all(cancel)?;
        Ok(self.commit(evaluation))
    }

    /// Evaluate a single assignment, evaluating what it depends on first.
    ///
    /// Only the named assignment's `interpolated` value is written.
    pub fn interpolate_statement(&mut self, name: &str) -> Result<Vec<Warning>, InterpolationError> {
        let evaluation = Interpolator::new(self).evaluate_one(name)?;
        Ok(self.commit(evaluation))
    }

    /// Expand `text` against the current interpolated values of this
    /// document.
    pub fn interpolate_text(&self, text: &str) -> Result<(String, Vec<Warning>), InterpolationError> {
        let template = Template::parse(text).map_err(|err| InterpolationError::InvalidTemplate {
            name: String::new(),
            message: err.to_string(),
            position: Position::new(self.file.clone(), 0),
        })?;
        let mapper = self.interpolation_mapper(None);
        interpolation::expand_template(
            &template,
            "",
            &Position::new(self.file.clone(), 0),
            &mapper,
        )
    }

    /// The lookup used when expanding `target`'s value.
    ///
    /// Names resolve to the current interpolated value of enabled
    /// assignments. Disabled assignments and `target` itself are invisible;
    /// those names fall through to the configured [`EnvFallback`].
    pub fn interpolation_mapper<'a>(
        &'a self,
        target: Option<&'a str>,
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| interpolation::resolve(self, target, name, None)
    }

    /// Write `input` unconditionally using the default placement.
    pub fn set(&mut self, input: Assignment) -> Result<UpsertOutcome<'_>, UpsertError> {
        self.upsert(input, UpsertSettings::default())
    }

    /// Create or update an assignment with the default placement.
    ///
    /// Use an [`Upserter`] directly for placement and group control.
    pub fn upsert(
        &mut self,
        input: Assignment,
        settings: UpsertSettings,
    ) -> Result<UpsertOutcome<'_>, UpsertError> {
        let upserter = Upserter::builder().settings(settings).build(self)?;
        upserter.upsert(self, input)
    }

    /// Mark an existing assignment as enabled.
    pub fn enable(&mut self, name: &str) -> Result<UpsertOutcome<'_>, UpsertError> {
        self.toggle(name, true)
    }

    /// Mark an existing assignment as disabled. The literal is kept.
    pub fn disable(&mut self, name: &str) -> Result<UpsertOutcome<'_>, UpsertError> {
        self.toggle(name, false)
    }

    fn toggle(&mut self, name: &str, enabled: bool) -> Result<UpsertOutcome<'_>, UpsertError> {
        let input = self
            .get(name)
            .cloned()
            .ok_or_else(|| UpsertError::Missing {
                name: name.to_string(),
            })?
            .with_enabled(enabled);
        self.upsert(input, UpsertSettings::ERROR_IF_MISSING)
    }

    /// Validate every enabled assignment carrying a rule, in document order.
    pub fn validate(&self) -> Vec<(&Assignment, ValidationError)> {
        let validator = Validator::new(self);
        self.all_assignments(&[Selector::ExcludeDisabled])
            .filter_map(|assignment| {
                validator
                    .validate(assignment)
                    .map(|error| (assignment, error))
            })
            .collect()
    }

    /// Validate one assignment; returns the first violation.
    pub fn validate_single_assignment(&self, assignment: &Assignment) -> Option<ValidationError> {
        Validator::new(self).validate(assignment)
    }

    pub(crate) fn container(&self, group: Option<usize>) -> Option<&[Statement]> {
        match group {
            None => Some(&self.statements),
            Some(index) => self.groups.get(index).map(Group::statements),
        }
    }

    pub(crate) fn container_mut(&mut self, group: Option<usize>) -> Option<&mut Vec<Statement>> {
        match group {
            None => Some(&mut self.statements),
            Some(index) => self.groups.get_mut(index).map(Group::statements_mut),
        }
    }

    pub(crate) fn group_index(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|group| group.name() == name)
    }

    /// Insert a statement into a container, then reindex.
    pub(crate) fn insert_statement(
        &mut self,
        group: Option<usize>,
        offset: usize,
        statement: impl Into<Statement>,
    ) -> Option<()> {
        let group_name = group
            .and_then(|index| self.groups.get(index))
            .map(|group| group.name().to_string());
        let mut statement = statement.into();
        statement.position_mut().set_file(&self.file);
        statement.set_group(group_name);

        let container = self.container_mut(group)?;
        let offset = offset.min(container.len());
        container.insert(offset, statement);
        self.reindex_statements();
        Some(())
    }

    fn assignments_mut(&mut self) -> impl Iterator<Item = &mut Assignment> {
        self.statements
            .iter_mut()
            .chain(
                self.groups
                    .iter_mut()
                    .flat_map(|group| group.statements_mut().iter_mut()),
            )
            .filter_map(Statement::as_assignment_mut)
    }

    fn commit(&mut self, evaluation: interpolation::Evaluation) -> Vec<Warning> {
        for (name, value) in evaluation.values {
            if let Some(assignment) = self.get_mut(&name) {
                assignment.set_interpolated(value);
            }
        }
        evaluation.warnings
    }
}

/// References made by an assignment's literal, excluding itself.
fn extract_dependencies(assignment: &Assignment) -> BTreeMap<String, crate::template::Reference> {
    if !assignment.quote().is_interpolated() || !assignment.is_complete() {
        return BTreeMap::new();
    }
    match Template::parse(assignment.literal()) {
        Ok(template) => {
            let mut references = template.references();
            references.remove(assignment.name());
            references
        }
        Err(_) => BTreeMap::new(),
    }
}
