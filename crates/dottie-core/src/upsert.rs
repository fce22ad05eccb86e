//! Creating and editing assignments.
//!
//! [`Upserter`] is the only code path that adds an assignment to a document
//! or changes an existing one. It looks the name up, applies the configured
//! skip rules, inserts new assignments at the configured [`Placement`],
//! writes the new value, interpolates it and optionally validates it.
//!
//! Every upsert is staged on a copy of the document and committed only when
//! all steps succeed, so a failed upsert leaves the document unchanged.

use std::{
    fmt,
    ops::{BitOr, BitOrAssign},
};

use log::{debug, info};

use crate::{
    ast::{Assignment, Document},
    error::{UpsertError, Warning},
    position::Position,
};

/// Flags controlling an upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UpsertSettings(u8);

impl UpsertSettings {
    /// Skip when the existing literal and enabled state match the input.
    pub const SKIP_IF_SAME: Self = Self(1);
    /// Skip when the name already exists.
    pub const SKIP_IF_EXISTS: Self = Self(1 << 1);
    /// Skip when the name exists with a non-empty literal that is not one of
    /// the configured empty sentinels.
    pub const SKIP_IF_SET: Self = Self(1 << 2);
    /// Skip when the input literal is empty.
    pub const SKIP_IF_EMPTY: Self = Self(1 << 3);
    /// Validate the written assignment; the first violation is an error.
    pub const VALIDATE: Self = Self(1 << 4);
    /// Fail instead of creating a missing assignment.
    pub const ERROR_IF_MISSING: Self = Self(1 << 5);
    /// Replace the comments of an existing assignment with the input's.
    pub const UPDATE_COMMENTS: Self = Self(1 << 6);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for UpsertSettings {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for UpsertSettings {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

/// Where a new assignment is inserted. Ignored for existing assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Placement {
    /// First statement of the target container.
    AddFirst,
    /// After the last non-blank statement of the target container.
    #[default]
    AddLast,
    /// Directly before the given key, inside its container.
    AddBeforeKey(String),
    /// Directly after the given key, inside its container.
    AddAfterKey(String),
}

impl Placement {
    /// The key a relative placement refers to.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Placement::AddBeforeKey(key) | Placement::AddAfterKey(key) => Some(key),
            Placement::AddFirst | Placement::AddLast => None,
        }
    }
}

/// Why an upsert did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Same,
    Exists,
    Set,
    Empty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::Same => "the value is unchanged",
            SkipReason::Exists => "the key already exists",
            SkipReason::Set => "the key already has a value",
            SkipReason::Empty => "the new value is empty",
        };
        f.write_str(text)
    }
}

/// An upsert that was skipped.
///
/// `warning` marks skips the caller probably wants to surface: the input
/// carried a value that was not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStatement {
    name: String,
    reason: SkipReason,
    warning: bool,
}

impl SkippedStatement {
    fn new(name: String, reason: SkipReason) -> Self {
        let warning = matches!(reason, SkipReason::Exists | SkipReason::Set);
        Self {
            name,
            reason,
            warning,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reason(&self) -> SkipReason {
        self.reason
    }

    pub fn is_warning(&self) -> bool {
        self.warning
    }
}

impl fmt::Display for SkippedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} was skipped: {}", self.name, self.reason)
    }
}

/// Result of a successful upsert.
#[derive(Debug)]
pub enum UpsertOutcome<'d> {
    Changed {
        assignment: &'d Assignment,
        warnings: Vec<Warning>,
    },
    Skipped(SkippedStatement),
}

impl<'d> UpsertOutcome<'d> {
    pub fn assignment(&self) -> Option<&'d Assignment> {
        match self {
            UpsertOutcome::Changed { assignment, .. } => Some(assignment),
            UpsertOutcome::Skipped(_) => None,
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            UpsertOutcome::Changed { warnings, .. } => warnings,
            UpsertOutcome::Skipped(_) => &[],
        }
    }

    pub fn skipped(&self) -> Option<&SkippedStatement> {
        match self {
            UpsertOutcome::Skipped(skipped) => Some(skipped),
            UpsertOutcome::Changed { .. } => None,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, UpsertOutcome::Changed { .. })
    }
}

/// Builder for [`Upserter`].
#[derive(Debug, Clone, Default)]
pub struct UpserterBuilder {
    placement: Placement,
    group: Option<String>,
    create_group: bool,
    group_from_placement: bool,
    settings: UpsertSettings,
    empty_sentinels: Vec<String>,
}

impl UpserterBuilder {
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Insert new assignments into the named group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        let group = group.into();
        self.group = (!group.is_empty()).then_some(group);
        self
    }

    /// Create the group given to [`group`](Self::group) when it is missing.
    pub fn create_group(mut self, create_group: bool) -> Self {
        self.create_group = create_group;
        self
    }

    /// Use the group of the placement's reference key.
    pub fn group_from_placement(mut self) -> Self {
        self.group_from_placement = true;
        self
    }

    pub fn settings(mut self, settings: UpsertSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Literals that [`UpsertSettings::SKIP_IF_SET`] treats as empty.
    pub fn empty_sentinels<I, S>(mut self, sentinels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.empty_sentinels = sentinels.into_iter().map(Into::into).collect();
        self
    }

    /// Check the options against `document` and build the upserter.
    ///
    /// Fails when a relative placement names a missing key, when the group
    /// does not exist and may not be created, or when the options conflict.
    pub fn build(self, document: &Document) -> Result<Upserter, UpsertError> {
        let reference_group = match self.placement.reference() {
            Some(key) => {
                let assignment = document.get(key).ok_or_else(|| {
                    UpsertError::Placement(format!("reference key {key} does not exist"))
                })?;
                Some(assignment.group().map(str::to_string))
            }
            None => None,
        };

        let group = if self.group_from_placement {
            let Some(reference_group) = &reference_group else {
                return Err(UpsertError::Placement(
                    "the group can only be derived from a relative placement".to_string(),
                ));
            };
            if self.group.is_some() && self.group != *reference_group {
                return Err(UpsertError::Placement(
                    "an explicit group conflicts with the group of the reference key".to_string(),
                ));
            }
            reference_group.clone()
        } else {
            self.group
        };

        if let (Some(group), Some(reference_group), Some(key)) =
            (&group, &reference_group, self.placement.reference())
        {
            if reference_group.as_deref() != Some(group.as_str()) {
                return Err(UpsertError::Placement(format!(
                    "reference key {key} is not in group {group}"
                )));
            }
        }

        if let Some(group) = &group {
            if !self.create_group && !document.has_group(group) {
                return Err(UpsertError::Placement(format!(
                    "group {group} does not exist"
                )));
            }
        }

        Ok(Upserter {
            placement: self.placement,
            group,
            settings: self.settings,
            empty_sentinels: self.empty_sentinels,
        })
    }
}

/// A validated set of upsert options.
#[derive(Debug, Clone)]
pub struct Upserter {
    placement: Placement,
    group: Option<String>,
    settings: UpsertSettings,
    empty_sentinels: Vec<String>,
}

impl Upserter {
    pub fn builder() -> UpserterBuilder {
        UpserterBuilder::default()
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn settings(&self) -> UpsertSettings {
        self.settings
    }

    /// Create or update the assignment named by `input`.
    ///
    /// The input's enabled state, literal, quote and completeness are
    /// written. Its comments are written for new assignments, and for
    /// existing ones only with [`UpsertSettings::UPDATE_COMMENTS`].
    pub fn upsert<'d>(
        &self,
        document: &'d mut Document,
        input: Assignment,
    ) -> Result<UpsertOutcome<'d>, UpsertError> {
        let name = input.name().to_string();
        let existing = document.get(&name);

        if let Some(reason) = self.skip_reason(existing, &input) {
            debug!(name = name.as_str(), reason:% = reason; "Skipping upsert");
            return Ok(UpsertOutcome::Skipped(SkippedStatement::new(name, reason)));
        }

        let exists = existing.is_some();
        if !exists && self.settings.contains(UpsertSettings::ERROR_IF_MISSING) {
            return Err(UpsertError::Missing { name });
        }

        let mut staged = document.clone();
        if !exists {
            self.insert(&mut staged, &name)?;
        }

        let assignment = staged
            .get_mut(&name)
            .ok_or_else(|| UpsertError::Missing { name: name.clone() })?;
        assignment.set_enabled(input.is_enabled());
        assignment.set_complete(input.is_complete());
        assignment.set_literal(input.literal());
        assignment.set_quote(input.quote());
        assignment.set_interpolated(input.literal());
        if !exists || self.settings.contains(UpsertSettings::UPDATE_COMMENTS) {
            assignment.set_comments(input.comments().to_vec());
        }

        staged.initialize();

        let warnings = if input.is_enabled() {
            staged.interpolate_statement(&name)?
        } else {
            Vec::new()
        };

        if self.settings.contains(UpsertSettings::VALIDATE) {
            let violation = staged
                .get(&name)
                .and_then(|assignment| staged.validate_single_assignment(assignment));
            if let Some(violation) = violation {
                return Err(violation.into());
            }
        }

        *document = staged;
        info!(name = name.as_str(), created = !exists; "Upserted assignment");

        document
            .get(&name)
            .map(|assignment| UpsertOutcome::Changed {
                assignment,
                warnings,
            })
            .ok_or(UpsertError::Missing { name })
    }

    fn skip_reason(&self, existing: Option<&Assignment>, input: &Assignment) -> Option<SkipReason> {
        let settings = self.settings;
        if let Some(existing) = existing {
            if settings.contains(UpsertSettings::SKIP_IF_SAME)
                && existing.literal() == input.literal()
                && existing.is_enabled() == input.is_enabled()
            {
                return Some(SkipReason::Same);
            }
            if settings.contains(UpsertSettings::SKIP_IF_EXISTS) {
                return Some(SkipReason::Exists);
            }
            if settings.contains(UpsertSettings::SKIP_IF_SET)
                && !existing.literal().is_empty()
                && !self
                    .empty_sentinels
                    .iter()
                    .any(|sentinel| sentinel == existing.literal())
            {
                return Some(SkipReason::Set);
            }
        }
        if settings.contains(UpsertSettings::SKIP_IF_EMPTY) && input.literal().is_empty() {
            return Some(SkipReason::Empty);
        }
        None
    }

    /// Insert an empty assignment named `name` at the configured placement.
    fn insert(&self, document: &mut Document, name: &str) -> Result<(), UpsertError> {
        let group = match &self.group {
            Some(group) => {
                document.ensure_group(group);
                let index = document.group_index(group).ok_or_else(|| {
                    UpsertError::Placement(format!("group {group} does not exist"))
                })?;
                Some(index)
            }
            None => None,
        };

        let (container, offset) = match &self.placement {
            Placement::AddFirst => (group, 0),
            Placement::AddLast => {
                let statements = document.container(group).unwrap_or_default();
                let trailing_blanks = statements
                    .iter()
                    .rev()
                    .take_while(|statement| statement.is_newline())
                    .count();
                (group, statements.len() - trailing_blanks)
            }
            Placement::AddBeforeKey(key) | Placement::AddAfterKey(key) => {
                let slot = document.slot(key).ok_or_else(|| {
                    UpsertError::Placement(format!("reference key {key} does not exist"))
                })?;
                let after = matches!(self.placement, Placement::AddAfterKey(_));
                (slot.group, slot.offset + usize::from(after))
            }
        };

        let line = document
            .container(container)
            .and_then(|statements| offset.checked_sub(1).and_then(|i| statements.get(i)))
            .map_or(1, |previous| previous.position().last_line() + 1);

        debug!(
            name = name,
            group = self.group.as_deref().unwrap_or(""),
            offset = offset;
            "Inserting assignment"
        );
        let assignment =
            Assignment::new(name, "").with_position(Position::new(document.file(), line));
        document
            .insert_statement(container, offset, assignment)
            .ok_or_else(|| UpsertError::Placement(format!("cannot insert {name}")))
    }
}
