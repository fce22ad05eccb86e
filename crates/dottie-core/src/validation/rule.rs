//! Parsing of `@dottie/validate` rules.
//!
//! A rule is a `,`-separated list of terms that must all pass. A term is a
//! `|`-separated list of tags of which at least one must pass. A tag is a
//! name with an optional `=parameter`:
//!
//! ```text
//! required,number|oneof=auto off,max=65535
//! ```
//!
//! `0x2C` and `0x7C` inside a parameter stand for a literal `,` and `|`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    param: String,
}

impl Tag {
    fn parse(atom: &str) -> Self {
        let (name, param) = atom.split_once('=').unwrap_or((atom, ""));
        Self {
            name: name.trim().to_string(),
            param: param.replace("0x2C", ",").replace("0x7C", "|"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param(&self) -> &str {
        &self.param
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.param.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}={}", self.name, self.param)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    terms: Vec<Vec<Tag>>,
}

impl Rule {
    pub fn parse(rule: &str) -> Self {
        let terms = rule
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| {
                term.split('|')
                    .map(str::trim)
                    .filter(|atom| !atom.is_empty())
                    .map(Tag::parse)
                    .collect::<Vec<_>>()
            })
            .filter(|alternatives| !alternatives.is_empty())
            .collect();
        Self { terms }
    }

    /// Terms in order; each holds one or more alternative tags.
    pub fn terms(&self) -> &[Vec<Tag>] {
        &self.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule() {
        let rule = Rule::parse("required, number|oneof=auto off ,max=65535");
        let terms = rule.terms();
        assert_eq!(terms.len(), 3);
        assert_eq!(terms[0][0].name(), "required");
        assert_eq!(terms[1].len(), 2);
        assert_eq!(terms[1][1].name(), "oneof");
        assert_eq!(terms[1][1].param(), "auto off");
        assert_eq!(terms[2][0].to_string(), "max=65535");
    }

    #[test]
    fn test_escaped_separators() {
        let rule = Rule::parse("contains=0x2C,excludes=0x7C");
        assert_eq!(rule.terms()[0][0].param(), ",");
        assert_eq!(rule.terms()[1][0].param(), "|");
    }

    #[test]
    fn test_empty_rule() {
        assert!(Rule::parse(" , ").terms().is_empty());
    }
}
