//! Merging a local document into a newer upstream one.
//!
//! Every enabled local assignment is upserted into a copy of the upstream
//! document. Values already set upstream win unless they are one of the
//! configured empty sentinels. New assignments are placed next to their
//! closest neighbour that upstream also has, or in the same group when the
//! group exists upstream. The copy replaces the upstream document only when
//! every assignment merged.

use log::{debug, info, trace};

use dottie_core::{
    Assignment, Document, Placement, Selector, SkippedStatement, Statement, UpsertError,
    UpsertOutcome, UpsertSettings, Upserter, ValidationError, Warning, upsert::UpserterBuilder,
};

use crate::error::DottieError;

/// Merge options.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    validate: bool,
    fail_on_violation: bool,
    empty_sentinels: Vec<String>,
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every written assignment against its rule.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Abort the merge on the first violation instead of reporting it.
    pub fn with_fail_on_violation(mut self, fail_on_violation: bool) -> Self {
        self.fail_on_violation = fail_on_violation;
        self
    }

    /// Upstream literals that count as unset, such as `changeme`.
    pub fn with_empty_sentinels(mut self, empty_sentinels: Vec<String>) -> Self {
        self.empty_sentinels = empty_sentinels;
        self
    }

    pub fn validate(&self) -> bool {
        self.validate
    }

    pub fn fail_on_violation(&self) -> bool {
        self.fail_on_violation
    }

    pub fn empty_sentinels(&self) -> &[String] {
        &self.empty_sentinels
    }
}

/// What a merge did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Names written into the upstream document, in local order.
    pub changed: Vec<String>,
    pub skipped: Vec<SkippedStatement>,
    pub warnings: Vec<Warning>,
    /// Violations found when validation is on and not fatal.
    pub violations: Vec<ValidationError>,
}

impl MergeReport {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.skipped.is_empty()
    }
}

/// Local comments replace upstream ones only when the local assignment has
/// any.
fn merge_settings(assignment: &Assignment) -> UpsertSettings {
    let mut settings =
        UpsertSettings::SKIP_IF_SAME | UpsertSettings::SKIP_IF_EMPTY | UpsertSettings::SKIP_IF_SET;
    if assignment.has_comments() {
        settings |= UpsertSettings::UPDATE_COMMENTS;
    }
    settings
}

/// Merge the enabled assignments of `local` into `upstream`.
///
/// # Errors
///
/// Returns [`DottieError::Merge`] naming the assignment that could not be
/// written, or that violated its rule when violations are fatal. `upstream`
/// is left unchanged on error.
pub fn merge_from_upstream(
    local: &Document,
    upstream: &mut Document,
    options: &MergeOptions,
) -> Result<MergeReport, DottieError> {
    info!(local = local.file(), upstream = upstream.file(); "Merging documents");

    let order: Vec<&Assignment> = local
        .iter_statements()
        .filter_map(Statement::as_assignment)
        .collect();

    let mut working = upstream.clone();
    let mut report = MergeReport::default();

    for (index, assignment) in order.iter().enumerate() {
        if !assignment.is_enabled() {
            continue;
        }
        let name = assignment.name();
        let upserter = upserter_for(&working, &order, index, options)
            .build(&working)
            .map_err(|source| merge_error(name, source))?;
        trace!(name = name, placement:? = upserter.placement(); "Merging assignment");

        match upserter.upsert(&mut working, (*assignment).clone()) {
            Ok(UpsertOutcome::Changed { warnings, .. }) => {
                report.warnings.extend(warnings);
                report.changed.push(name.to_string());
            }
            Ok(UpsertOutcome::Skipped(skipped)) => {
                debug!(name = name, reason:% = skipped.reason(); "Assignment not merged");
                report.skipped.push(skipped);
                continue;
            }
            Err(source) => return Err(merge_error(name, source)),
        }

        if options.validate() {
            let violation = working
                .get(name)
                .and_then(|merged| working.validate_single_assignment(merged));
            if let Some(violation) = violation {
                if options.fail_on_violation() {
                    return Err(merge_error(name, UpsertError::Validation(violation)));
                }
                report.violations.push(violation);
            }
        }
    }

    *upstream = working;
    info!(
        changed = report.changed.len(),
        skipped = report.skipped.len(),
        violations = report.violations.len();
        "Merge complete"
    );
    Ok(report)
}

fn merge_error(name: &str, source: UpsertError) -> DottieError {
    DottieError::Merge {
        name: name.to_string(),
        source,
    }
}

/// Choose placement and group for the local assignment at `index`.
///
/// Only matters when the name is new upstream; existing assignments stay
/// where they are.
fn upserter_for(
    working: &Document,
    order: &[&Assignment],
    index: usize,
    options: &MergeOptions,
) -> UpserterBuilder {
    let builder = Upserter::builder()
        .settings(merge_settings(order[index]))
        .empty_sentinels(options.empty_sentinels().iter().cloned());

    let neighbour = neighbour_placement(working, order, index);
    let local_group = order[index]
        .group()
        .filter(|group| working.has_group(group));

    match (local_group, neighbour) {
        (Some(group), Some(placement)) => {
            let reference_group = placement
                .reference()
                .and_then(|key| working.get(key))
                .and_then(Assignment::group);
            if reference_group == Some(group) {
                builder.placement(placement).group_from_placement()
            } else {
                builder.group(group)
            }
        }
        (Some(group), None) => builder.group(group),
        (None, Some(placement)) => builder.placement(placement).group_from_placement(),
        (None, None) => builder,
    }
}

/// After the closest earlier local assignment present upstream, else before
/// the closest later one.
fn neighbour_placement(working: &Document, order: &[&Assignment], index: usize) -> Option<Placement> {
    let exists = |assignment: &&&Assignment| working.has(assignment.name());
    if let Some(previous) = order[..index].iter().rev().find(exists) {
        return Some(Placement::AddAfterKey(previous.name().to_string()));
    }
    order[index + 1..]
        .iter()
        .find(exists)
        .map(|next| Placement::AddBeforeKey(next.name().to_string()))
}

/// Names of enabled assignments `local` has and `upstream` lacks.
pub fn missing_upstream<'a>(local: &'a Document, upstream: &Document) -> Vec<&'a str> {
    local
        .all_assignments(&[Selector::ExcludeDisabled])
        .map(Assignment::name)
        .filter(|name| !upstream.has(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Document {
        dottie_parser::parse(source, ".env").expect("Failed to parse")
    }

    fn names(document: &Document) -> Vec<&str> {
        document
            .iter_statements()
            .filter_map(Statement::as_assignment)
            .map(Assignment::name)
            .collect()
    }

    #[test]
    fn test_local_values_fill_unset_upstream() {
        let local = parse("HOST=db.internal\nPORT=6543\n");
        let mut upstream = parse("HOST=\nPORT=5432\n");

        let report = merge_from_upstream(&local, &mut upstream, &MergeOptions::new()).unwrap();

        assert_eq!(report.changed, ["HOST"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name(), "PORT");
        assert_eq!(upstream.get("HOST").unwrap().literal(), "db.internal");
        assert_eq!(upstream.get("PORT").unwrap().literal(), "5432");
    }

    #[test]
    fn test_empty_sentinels_are_replaced() {
        let local = parse("TOKEN=secret\n");
        let mut upstream = parse("TOKEN=changeme\n");
        let options = MergeOptions::new().with_empty_sentinels(vec!["changeme".to_string()]);

        merge_from_upstream(&local, &mut upstream, &options).unwrap();

        assert_eq!(upstream.get("TOKEN").unwrap().literal(), "secret");
    }

    #[test]
    fn test_new_assignment_follows_its_neighbour() {
        let local = parse("A=1\nEXTRA=x\nB=2\n");
        let mut upstream = parse("A=1\nB=2\nC=3\n");

        merge_from_upstream(&local, &mut upstream, &MergeOptions::new()).unwrap();

        assert_eq!(names(&upstream), ["A", "EXTRA", "B", "C"]);
    }

    #[test]
    fn test_new_assignment_lands_in_its_group() {
        let local = parse("###\n# Database\n###\nDB_POOL=5\n");
        let mut upstream = parse("APP=1\n###\n# Database\n###\nDB_HOST=localhost\n");

        merge_from_upstream(&local, &mut upstream, &MergeOptions::new()).unwrap();

        assert_eq!(upstream.get("DB_POOL").unwrap().group(), Some("Database"));
        assert_eq!(names(&upstream), ["APP", "DB_HOST", "DB_POOL"]);
    }

    #[test]
    fn test_disabled_and_empty_local_assignments_are_ignored() {
        let local = parse("#OFF=1\nEMPTY=\n");
        let mut upstream = parse("APP=1\n");

        let report = merge_from_upstream(&local, &mut upstream, &MergeOptions::new()).unwrap();

        assert!(report.changed.is_empty());
        assert!(!upstream.has("OFF"));
        assert!(!upstream.has("EMPTY"));
    }

    #[test]
    fn test_violation_reported() {
        let local = parse("PORT=abc\n");
        let mut upstream = parse("# @dottie/validate number\nPORT=\n");
        let options = MergeOptions::new().with_validation(true);

        let report = merge_from_upstream(&local, &mut upstream, &options).unwrap();

        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].tag(), "number");
        assert_eq!(upstream.get("PORT").unwrap().literal(), "abc");
    }

    #[test]
    fn test_fatal_violation_leaves_upstream_untouched() {
        let local = parse("HOST=db\nPORT=abc\n");
        let mut upstream = parse("HOST=\n# @dottie/validate number\nPORT=\n");
        let options = MergeOptions::new()
            .with_validation(true)
            .with_fail_on_violation(true);

        let err = merge_from_upstream(&local, &mut upstream, &options).unwrap_err();

        assert!(matches!(err, DottieError::Merge { ref name, .. } if name == "PORT"));
        assert_eq!(upstream.get("HOST").unwrap().literal(), "");
    }

    #[test]
    fn test_missing_upstream() {
        let local = parse("A=1\nB=2\n#C=3\n");
        let upstream = parse("A=1\n");
        assert_eq!(missing_upstream(&local, &upstream), ["B"]);
    }
}
