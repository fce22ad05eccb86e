//! Tag-driven validation of interpolated values.
//!
//! Rules come from `@dottie/validate` annotations. Each failing assignment
//! yields a [`ValidationError`] carrying the tag and parameter that failed so
//! callers can phrase a message of their own.

mod rule;
mod tags;

use std::fmt;

use log::debug;

pub use rule::{Rule, Tag};

use crate::{
    ast::{Assignment, Document},
    position::Position,
};

/// Why a tag did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The value does not satisfy the tag.
    Failed,
    /// The rule names a tag that does not exist.
    UnknownTag,
    /// The tag's parameter could not be interpreted.
    InvalidParameter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    name: String,
    value: String,
    tag: String,
    param: String,
    position: Position,
    kind: ValidationErrorKind,
}

impl ValidationError {
    fn new(assignment: &Assignment, tag: String, param: String, kind: ValidationErrorKind) -> Self {
        Self {
            name: assignment.name().to_string(),
            value: assignment.interpolated().to_string(),
            tag,
            param,
            position: assignment.position().clone(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The interpolated value that was checked.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The failing tag. Alternatives that all failed are joined with `|`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    /// A human readable description of the failure.
    pub fn message(&self) -> String {
        match self.kind {
            ValidationErrorKind::UnknownTag => {
                return format!("unknown validation tag '{}'", self.tag);
            }
            ValidationErrorKind::InvalidParameter => {
                return format!("invalid parameter '{}' for tag '{}'", self.param, self.tag);
            }
            ValidationErrorKind::Failed => {}
        }

        let param = &self.param;
        match self.tag.as_str() {
            "required" => "is required".to_string(),
            "required_if" => format!("is required when {param}"),
            "required_unless" => format!("is required unless {param}"),
            "required_with" => format!("is required when any of [{param}] is set"),
            "required_without" => format!("is required when any of [{param}] is missing"),
            "excluded_if" => format!("must be empty when {param}"),
            "len" => format!("must be exactly {param} characters long"),
            "min" | "gte" => format!("must be at least {param}"),
            "max" | "lte" => format!("must be at most {param}"),
            "gt" => format!("must be greater than {param}"),
            "lt" => format!("must be less than {param}"),
            "eq" => format!("must equal '{param}'"),
            "ne" => format!("must not equal '{param}'"),
            "oneof" | "oneofci" => format!("must be one of [{param}]"),
            "number" => "must be a whole number".to_string(),
            "numeric" => "must be numeric".to_string(),
            "boolean" => "must be a boolean".to_string(),
            "alpha" => "must contain only letters".to_string(),
            "alphanum" => "must contain only letters and digits".to_string(),
            "ascii" => "must contain only ASCII characters".to_string(),
            "lowercase" => "must be lowercase".to_string(),
            "uppercase" => "must be uppercase".to_string(),
            "contains" => format!("must contain '{param}'"),
            "excludes" => format!("must not contain '{param}'"),
            "startswith" => format!("must start with '{param}'"),
            "endswith" => format!("must end with '{param}'"),
            "email" => "must be a valid email address".to_string(),
            "url" | "uri" => "must be a valid URL".to_string(),
            "http_url" => "must be an http or https URL".to_string(),
            "https_url" => "must be an https URL".to_string(),
            "hostname" | "hostname_rfc1123" => "must be a valid hostname".to_string(),
            "fqdn" => "must be a fully qualified domain name".to_string(),
            "hostname_port" => "must be a host:port pair".to_string(),
            "ip" => "must be an IP address".to_string(),
            "ipv4" => "must be an IPv4 address".to_string(),
            "ipv6" => "must be an IPv6 address".to_string(),
            "cidr" => "must be CIDR notation".to_string(),
            "mac" => "must be a MAC address".to_string(),
            "dir" => "must be an existing directory".to_string(),
            "dirpath" => "must be a directory path".to_string(),
            "file" => "must be an existing file".to_string(),
            "filepath" => "must be a file path".to_string(),
            "uuid" => "must be a UUID".to_string(),
            "ulid" => "must be a ULID".to_string(),
            "semver" => "must be a semantic version".to_string(),
            "cron" => "must be a cron expression".to_string(),
            "json" => "must be valid JSON".to_string(),
            "jwt" => "must be a JWT".to_string(),
            "hexcolor" => "must be a hex colour".to_string(),
            "rgb" => "must be an rgb() colour".to_string(),
            "rgba" => "must be an rgba() colour".to_string(),
            "base64" => "must be base64 encoded".to_string(),
            "timezone" => "must be a time zone name".to_string(),
            tag if param.is_empty() => format!("failed on '{tag}'"),
            tag => format!("failed on '{tag}={param}'"),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.position, self.name, self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of evaluating one tag or one term.
#[derive(Debug)]
enum Outcome {
    Pass,
    /// The value is empty and allowed to be; no further tags apply.
    SkipRest,
    Fail(ValidationErrorKind),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => f.write_str("pass"),
            Outcome::SkipRest => f.write_str("skip"),
            Outcome::Fail(kind) => write!(f, "fail ({kind:?})"),
        }
    }
}

/// Checks assignments against their rules, resolving cross-key conditions
/// against a document.
pub(crate) struct Validator<'d> {
    document: &'d Document,
}

impl<'d> Validator<'d> {
    pub(crate) fn new(document: &'d Document) -> Self {
        Self { document }
    }

    /// Returns the first violation of the assignment's rule, if any.
    pub(crate) fn validate(&self, assignment: &Assignment) -> Option<ValidationError> {
        let rule = Rule::parse(assignment.validation_rule()?);
        let value = assignment.interpolated();

        for term in rule.terms() {
            match self.evaluate_term(term, value) {
                Ok(Outcome::Pass) => continue,
                Ok(Outcome::SkipRest) => return None,
                Ok(Outcome::Fail(kind)) => {
                    let tag = join(term, Tag::name);
                    let param = join(term, Tag::param);
                    debug!(name = assignment.name(), tag = tag.as_str(); "Validation failed");
                    return Some(ValidationError::new(assignment, tag, param, kind));
                }
                Err((tag, kind)) => {
                    debug!(name = assignment.name(), tag = tag.name(), kind:? = kind; "Invalid validation rule");
                    return Some(ValidationError::new(
                        assignment,
                        tag.name().to_string(),
                        tag.param().to_string(),
                        kind,
                    ));
                }
            }
        }
        None
    }

    /// A term passes when any alternative passes. Configuration errors in
    /// any alternative are reported on their own.
    fn evaluate_term<'t>(
        &self,
        term: &'t [Tag],
        value: &str,
    ) -> Result<Outcome, (&'t Tag, ValidationErrorKind)> {
        let mut skipped = false;
        for tag in term {
            let outcome = self.evaluate_tag(tag, value);
            log::trace!(tag = tag.name(), outcome:% = outcome; "Evaluated tag");
            match outcome {
                Outcome::Pass => return Ok(Outcome::Pass),
                Outcome::SkipRest => skipped = true,
                Outcome::Fail(ValidationErrorKind::Failed) => {}
                Outcome::Fail(kind) => return Err((tag, kind)),
            }
        }
        Ok(if skipped {
            Outcome::SkipRest
        } else {
            Outcome::Fail(ValidationErrorKind::Failed)
        })
    }

    fn evaluate_tag(&self, tag: &Tag, value: &str) -> Outcome {
        let name = tag.name();
        let param = tag.param();

        if name == "omitempty" {
            return if value.is_empty() {
                Outcome::SkipRest
            } else {
                Outcome::Pass
            };
        }

        if tags::CONDITIONAL_TAGS.contains(&name) {
            return match self.condition(name, param) {
                Ok(condition) => conditional_outcome(name, condition, value),
                Err(kind) => Outcome::Fail(kind),
            };
        }

        match tags::check(name, param, value) {
            Ok(true) => Outcome::Pass,
            Ok(false) => Outcome::Fail(ValidationErrorKind::Failed),
            Err(kind) => Outcome::Fail(kind),
        }
    }

    /// Evaluates the condition of a cross-key tag.
    fn condition(&self, name: &str, param: &str) -> Result<bool, ValidationErrorKind> {
        let words: Vec<&str> = param.split_whitespace().collect();
        match name {
            "required_if" | "required_unless" | "excluded_if" => {
                if words.is_empty() || words.len() % 2 != 0 {
                    return Err(ValidationErrorKind::InvalidParameter);
                }
                let all_match = words
                    .chunks(2)
                    .all(|pair| self.value_of(pair[0]) == pair[1]);
                Ok(if name == "required_unless" {
                    !all_match
                } else {
                    all_match
                })
            }
            "required_with" => {
                if words.is_empty() {
                    return Err(ValidationErrorKind::InvalidParameter);
                }
                Ok(words.iter().any(|key| !self.value_of(key).is_empty()))
            }
            "required_without" => {
                if words.is_empty() {
                    return Err(ValidationErrorKind::InvalidParameter);
                }
                Ok(words.iter().any(|key| self.value_of(key).is_empty()))
            }
            _ => Err(ValidationErrorKind::UnknownTag),
        }
    }

    /// Interpolated value of another enabled key, or empty.
    fn value_of(&self, key: &str) -> &'d str {
        self.document
            .get(key)
            .filter(|assignment| assignment.is_enabled())
            .map_or("", Assignment::interpolated)
    }
}

fn conditional_outcome(name: &str, condition: bool, value: &str) -> Outcome {
    if name == "excluded_if" {
        return if condition && !value.is_empty() {
            Outcome::Fail(ValidationErrorKind::Failed)
        } else {
            Outcome::Pass
        };
    }
    match (condition, value.is_empty()) {
        (true, true) => Outcome::Fail(ValidationErrorKind::Failed),
        (false, true) => Outcome::SkipRest,
        (_, false) => Outcome::Pass,
    }
}

fn join(term: &[Tag], field: fn(&Tag) -> &str) -> String {
    let parts: Vec<&str> = term.iter().map(field).collect();
    if parts.iter().all(|part| part.is_empty()) {
        String::new()
    } else {
        parts.join("|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Comment;

    fn rule(name: &str, value: &str, rule: &str) -> Assignment {
        let mut assignment = Assignment::new(name, value)
            .with_comments(vec![Comment::new(format!("# @dottie/validate {rule}"))]);
        assignment.set_interpolated(value);
        assignment
    }

    fn document(assignments: Vec<Assignment>) -> Document {
        let mut document = Document::new(".env");
        for assignment in assignments {
            document.push_statement(assignment);
        }
        document.initialize();
        document
            .interpolate_all()
            .expect("test documents interpolate");
        document
    }

    #[test]
    fn test_passing_and_failing_rules() {
        let doc = document(vec![
            rule("PORT", "8080", "required,number,max=65535"),
            rule("HOST", "", "required"),
            rule("EMAIL", "nope", "email"),
        ]);

        let errors = doc.validate();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].0.name(), "HOST");
        assert_eq!(errors[0].1.tag(), "required");
        assert_eq!(errors[1].1.tag(), "email");
        assert_eq!(errors[1].1.value(), "nope");
    }

    #[test]
    fn test_first_failing_tag_is_reported() {
        let doc = document(vec![rule("PORT", "70000", "number,max=65535,min=1")]);
        let error = doc.validate_single_assignment(doc.get("PORT").unwrap()).unwrap();
        assert_eq!(error.tag(), "max");
        assert_eq!(error.param(), "65535");
        assert_eq!(error.message(), "must be at most 65535");
    }

    #[test]
    fn test_alternatives() {
        let doc = document(vec![
            rule("WORKERS", "auto", "number|oneof=auto off"),
            rule("THREADS", "many", "number|oneof=auto off"),
        ]);
        let errors = doc.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].1.tag(), "number|oneof");
        assert_eq!(errors[0].1.param(), "|auto off");
    }

    #[test]
    fn test_omitempty_skips_remaining_tags() {
        let doc = document(vec![
            rule("OPTIONAL", "", "omitempty,email"),
            rule("PRESENT", "bad", "omitempty,email"),
        ]);
        let errors = doc.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0.name(), "PRESENT");
    }

    #[test]
    fn test_required_if() {
        let doc = document(vec![
            Assignment::new("MODE", "tls"),
            rule("CERT", "", "required_if=MODE tls,filepath"),
            rule("KEY", "", "required_if=MODE plain,filepath"),
        ]);
        let errors = doc.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0.name(), "CERT");
        assert_eq!(errors[0].1.message(), "is required when MODE tls");
    }

    #[test]
    fn test_required_with_and_without() {
        let doc = document(vec![
            Assignment::new("USER", "admin"),
            rule("PASSWORD", "", "required_with=USER"),
            rule("TOKEN", "", "required_without=USER"),
            rule("FALLBACK", "", "required_without=MISSING"),
        ]);
        let names: Vec<&str> = doc.validate().iter().map(|(a, _)| a.name()).collect();
        assert_eq!(names, ["PASSWORD", "FALLBACK"]);
    }

    #[test]
    fn test_required_unless_and_excluded_if() {
        let doc = document(vec![
            Assignment::new("ENV", "dev"),
            rule("SECRET", "", "required_unless=ENV dev"),
            rule("DEBUG_KEY", "x", "excluded_if=ENV dev"),
        ]);
        let errors = doc.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0.name(), "DEBUG_KEY");
        assert_eq!(errors[0].1.tag(), "excluded_if");
    }

    #[test]
    fn test_disabled_keys_do_not_satisfy_conditions() {
        let doc = document(vec![
            Assignment::new("USER", "admin").with_enabled(false),
            rule("PASSWORD", "", "required_with=USER"),
        ]);
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_disabled_assignments_are_not_validated() {
        let doc = document(vec![rule("HOST", "", "required").with_enabled(false)]);
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_unknown_tag_and_bad_parameter() {
        let doc = document(vec![
            rule("A", "x", "frobnicate"),
            rule("B", "x", "max=lots"),
            rule("C", "", "required_if=ONLY_KEY"),
        ]);
        let kinds: Vec<ValidationErrorKind> = doc.validate().iter().map(|(_, e)| e.kind()).collect();
        assert_eq!(
            kinds,
            [
                ValidationErrorKind::UnknownTag,
                ValidationErrorKind::InvalidParameter,
                ValidationErrorKind::InvalidParameter,
            ]
        );
    }

    #[test]
    fn test_interpolated_value_is_checked() {
        let doc = document(vec![
            Assignment::new("HOST", "localhost"),
            rule("URL", "http://${HOST}:8080", "http_url"),
        ]);
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_display_includes_position_and_name() {
        let doc = document(vec![rule("HOST", "", "required")]);
        let (_, error) = &doc.validate()[0];
        assert_eq!(error.to_string(), format!("{}: HOST: is required", error.position()));
    }
}
