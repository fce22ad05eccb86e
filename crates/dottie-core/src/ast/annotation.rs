use once_cell::sync::Lazy;
use regex::Regex;

static ANNOTATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#\s*@([\p{L}0-9_.\-]+(?:/[\p{L}0-9_.\-]+)*)(?:\s+(.*?))?\s*$")
        .expect("annotation pattern is a valid regex")
});

/// A structured comment of the form `# @key value`.
///
/// Keys under the `dottie/` namespace are reserved for the engine and its
/// collaborators; every other key is kept as user metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    key: String,
    value: String,
}

impl Annotation {
    /// Attaches a validation rule to the following assignment.
    pub const VALIDATE: &'static str = "dottie/validate";
    /// Hides the following assignment from filtered output.
    pub const HIDDEN: &'static str = "dottie/hidden";
    /// Upstream location used by the update command.
    pub const SOURCE: &'static str = "dottie/source";
    /// Shell command whose output provides a value.
    pub const EXEC: &'static str = "dottie/exec";

    const RESERVED_PREFIX: &'static str = "dottie/";

    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse the full text of a comment line (including its `#`).
    ///
    /// Returns `None` when the comment is not an annotation.
    pub fn parse(comment: &str) -> Option<Self> {
        let captures = ANNOTATION_PATTERN.captures(comment)?;
        let key = captures.get(1)?.as_str();
        let value = captures.get(2).map_or("", |m| m.as_str());
        Some(Self::new(key, value))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns `true` for keys in the `dottie/` namespace.
    pub fn is_reserved(&self) -> bool {
        self.key.starts_with(Self::RESERVED_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_annotation_with_value() {
        let annotation = Annotation::parse("# @dottie/validate required,email").unwrap();
        assert_eq!(annotation.key(), "dottie/validate");
        assert_eq!(annotation.value(), "required,email");
        assert!(annotation.is_reserved());
    }

    #[test]
    fn test_parse_annotation_without_value() {
        let annotation = Annotation::parse("# @dottie/hidden").unwrap();
        assert_eq!(annotation.key(), Annotation::HIDDEN);
        assert_eq!(annotation.value(), "");
    }

    #[test]
    fn test_parse_user_annotation() {
        let annotation = Annotation::parse("# @owner platform team").unwrap();
        assert_eq!(annotation.key(), "owner");
        assert_eq!(annotation.value(), "platform team");
        assert!(!annotation.is_reserved());
    }

    #[test]
    fn test_plain_comment_is_not_annotation() {
        assert!(Annotation::parse("# just a comment").is_none());
        assert!(Annotation::parse("# email me @ home").is_none());
    }
}
