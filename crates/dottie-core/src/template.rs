//! POSIX-style parameter expansion.
//!
//! A value such as `postgres://${DB_USER}:${DB_PASS:-secret}@$DB_HOST` is
//! parsed once into a [`Template`]. The same tree drives both
//! [`Template::references`], which feeds the dependency graph, and
//! [`Template::expand`], which evaluates it, so the two always agree on what
//! counts as a reference.
//!
//! Supported forms:
//!
//! | Form | Meaning |
//! |---|---|
//! | `$NAME`, `${NAME}` | value of `NAME` |
//! | `${NAME-word}` | `word` if `NAME` is unset |
//! | `${NAME:-word}` | `word` if `NAME` is unset or empty |
//! | `${NAME+word}` | `word` if `NAME` is set |
//! | `${NAME:+word}` | `word` if `NAME` is set and non-empty |
//! | `${NAME?word}` | error with `word` if `NAME` is unset |
//! | `${NAME:?word}` | error with `word` if `NAME` is unset or empty |
//! | `$$` | a literal `$` |
//!
//! `word` may itself contain expansions. A `$` that does not start one of the
//! forms above is kept as text.

mod expand;
mod parser;

use std::{collections::BTreeMap, fmt};

pub use expand::{Evaluated, ExpandError};
pub use parser::TemplateError;

/// Operator of a `${NAME OP word}` expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `-`
    Default,
    /// `:-`
    DefaultOrEmpty,
    /// `+`
    Alternate,
    /// `:+`
    AlternateNonEmpty,
    /// `?`
    Required,
    /// `:?`
    RequiredNonEmpty,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Default => "-",
            Operator::DefaultOrEmpty => ":-",
            Operator::Alternate => "+",
            Operator::AlternateNonEmpty => ":+",
            Operator::Required => "?",
            Operator::RequiredNonEmpty => ":?",
        }
    }

    /// Whether the `:` form, which also treats empty values as unset.
    pub fn checks_empty(self) -> bool {
        matches!(
            self,
            Operator::DefaultOrEmpty | Operator::AlternateNonEmpty | Operator::RequiredNonEmpty
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `$NAME` or `${...}` expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    name: String,
    modifier: Option<(Operator, Template)>,
    offset: usize,
}

impl Expansion {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operator(&self) -> Option<Operator> {
        self.modifier.as_ref().map(|(operator, _)| *operator)
    }

    pub fn word(&self) -> Option<&Template> {
        self.modifier.as_ref().map(|(_, word)| word)
    }

    /// Byte offset of the `$` in the parsed text.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Expansion(Expansion),
}

/// A parsed value: literal text interleaved with expansions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    parts: Vec<Part>,
}

/// How a name is referenced somewhere in a template.
///
/// When a name appears several times the flags accumulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    name: String,
    has_default: bool,
    has_alternate: bool,
    required: bool,
}

impl Reference {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            has_default: false,
            has_alternate: false,
            required: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Referenced with `-` or `:-`.
    pub fn has_default(&self) -> bool {
        self.has_default
    }

    /// Referenced with `+` or `:+`.
    pub fn has_alternate(&self) -> bool {
        self.has_alternate
    }

    /// Referenced with `?` or `:?`.
    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl Template {
    /// Parse a value into a template.
    pub fn parse(input: &str) -> Result<Self, TemplateError> {
        parser::parse(input)
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Returns `true` when the template contains no expansions.
    pub fn is_plain(&self) -> bool {
        self.parts.iter().all(|part| matches!(part, Part::Text(_)))
    }

    /// Every name referenced by the template, including names inside words.
    pub fn references(&self) -> BTreeMap<String, Reference> {
        let mut references = BTreeMap::new();
        self.collect_references(&mut references);
        references
    }

    fn collect_references(&self, references: &mut BTreeMap<String, Reference>) {
        for part in &self.parts {
            let Part::Expansion(expansion) = part else {
                continue;
            };
            let reference = references
                .entry(expansion.name.clone())
                .or_insert_with(|| Reference::new(&expansion.name));
            match expansion.operator() {
                Some(Operator::Default | Operator::DefaultOrEmpty) => reference.has_default = true,
                Some(Operator::Alternate | Operator::AlternateNonEmpty) => {
                    reference.has_alternate = true
                }
                Some(Operator::Required | Operator::RequiredNonEmpty) => reference.required = true,
                None => {}
            }
            if let Some(word) = expansion.word() {
                word.collect_references(references);
            }
        }
    }

    /// Evaluate the template, resolving names through `lookup`.
    ///
    /// `lookup` returns `None` for unset names. Words are only evaluated
    /// when their operator selects them.
    pub fn expand<F>(&self, lookup: &F) -> Result<Evaluated, ExpandError>
    where
        F: Fn(&str) -> Option<String>,
    {
        expand::expand(self, lookup)
    }
}
