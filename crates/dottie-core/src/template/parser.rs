//! Winnow parser for parameter-expansion templates.

use thiserror::Error;
use winnow::{
    Parser as _,
    combinator::{alt, cut_err, opt, preceded, repeat},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location},
    token::{literal, one_of, take_while},
};

use super::{Expansion, Operator, Part, Template};

/// A malformed expansion, such as `${` without a closing brace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct TemplateError {
    message: String,
    offset: usize,
}

impl TemplateError {
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Byte offset of the `$` that starts the malformed expansion.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Context attached to winnow errors so the failing expansion can be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TemplateIssue {
    message: &'static str,
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<TemplateIssue>>;

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `NAME` after a bare `$`.
fn bare_name<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (one_of(is_name_start), take_while(0.., is_name_char))
        .take()
        .parse_next(input)
}

/// `NAME` inside braces; dots are allowed here.
fn braced_name<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (
        one_of(is_name_start),
        take_while(0.., |c: char| is_name_char(c) || c == '.'),
    )
        .take()
        .parse_next(input)
}

/// Two-character operators must be tried before their one-character prefixes.
fn operator(input: &mut Input<'_>) -> IResult<Operator> {
    alt((
        literal(":-").value(Operator::DefaultOrEmpty),
        literal(":+").value(Operator::AlternateNonEmpty),
        literal(":?").value(Operator::RequiredNonEmpty),
        '-'.value(Operator::Default),
        '+'.value(Operator::Alternate),
        '?'.value(Operator::Required),
    ))
    .parse_next(input)
}

/// The word of `${NAME OP word}`; runs up to the closing brace.
fn word(input: &mut Input<'_>) -> IResult<Template> {
    template(input, true)
}

/// `${NAME}` or `${NAME OP word}`. Commits once `${` is seen.
fn braced(input: &mut Input<'_>) -> IResult<Part> {
    let start = input.current_token_start();
    preceded(
        literal("${"),
        cut_err((
            braced_name.context(TemplateIssue {
                message: "expected a variable name after `${`",
                start,
            }),
            opt((operator, word)),
            '}'.context(TemplateIssue {
                message: "expected `}` or an operator in expansion",
                start,
            }),
        )),
    )
    .map(|(name, modifier, _)| {
        Part::Expansion(Expansion {
            name: name.to_string(),
            modifier,
            offset: start,
        })
    })
    .parse_next(input)
}

/// `$NAME`
fn bare(input: &mut Input<'_>) -> IResult<Part> {
    let start = input.current_token_start();
    preceded('$', bare_name)
        .map(|name: &str| {
            Part::Expansion(Expansion {
                name: name.to_string(),
                modifier: None,
                offset: start,
            })
        })
        .parse_next(input)
}

fn part(input: &mut Input<'_>, nested: bool) -> IResult<Part> {
    alt((
        literal("$$").value(Part::Text("$".to_string())),
        braced,
        bare,
        // A `$` that starts nothing is plain text.
        '$'.value(Part::Text("$".to_string())),
        take_while(1.., move |c: char| c != '$' && !(nested && c == '}'))
            .map(|text: &str| Part::Text(text.to_string())),
    ))
    .parse_next(input)
}

fn template(input: &mut Input<'_>, nested: bool) -> IResult<Template> {
    repeat(0.., |input: &mut Input<'_>| part(input, nested))
        .fold(Vec::new, |mut parts: Vec<Part>, part| {
            if let Part::Text(more) = &part {
                if let Some(Part::Text(text)) = parts.last_mut() {
                    text.push_str(more);
                    return parts;
                }
            }
            parts.push(part);
            parts
        })
        .map(|parts| Template { parts })
        .parse_next(input)
}

pub(super) fn parse(source: &str) -> Result<Template, TemplateError> {
    let mut input = LocatingSlice::new(source);
    template(&mut input, false).map_err(|err| {
        let error_pos = input.current_token_start();
        let context = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };
        match context.context().next() {
            Some(issue) => TemplateError {
                message: issue.message.to_string(),
                offset: issue.start,
            },
            None => TemplateError {
                message: "invalid expansion".to_string(),
                offset: error_pos,
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expansion(template: &Template, index: usize) -> &Expansion {
        match &template.parts()[index] {
            Part::Expansion(expansion) => expansion,
            Part::Text(text) => panic!("expected expansion, found text {text:?}"),
        }
    }

    #[test]
    fn test_parse_bare_and_braced() {
        let template = parse("$HOST:${PORT}").unwrap();
        assert_eq!(template.parts().len(), 3);
        assert_eq!(expansion(&template, 0).name(), "HOST");
        assert_eq!(template.parts()[1], Part::Text(":".to_string()));
        assert_eq!(expansion(&template, 2).name(), "PORT");
        assert_eq!(expansion(&template, 2).offset(), 6);
    }

    #[test]
    fn test_parse_operators() {
        for (source, operator) in [
            ("${A-x}", Operator::Default),
            ("${A:-x}", Operator::DefaultOrEmpty),
            ("${A+x}", Operator::Alternate),
            ("${A:+x}", Operator::AlternateNonEmpty),
            ("${A?x}", Operator::Required),
            ("${A:?x}", Operator::RequiredNonEmpty),
        ] {
            let template = parse(source).unwrap();
            assert_eq!(expansion(&template, 0).operator(), Some(operator), "{source}");
        }
    }

    #[test]
    fn test_parse_nested_word() {
        let template = parse("${A:-${B:-fallback}-suffix}").unwrap();
        let word = expansion(&template, 0).word().unwrap();
        assert_eq!(expansion(word, 0).name(), "B");
        assert_eq!(word.parts()[1], Part::Text("-suffix".to_string()));
    }

    #[test]
    fn test_dollar_escapes_and_lone_dollars() {
        let template = parse("$$HOME costs $5 $").unwrap();
        assert_eq!(
            template.parts(),
            &[Part::Text("$HOME costs $5 $".to_string())]
        );
    }

    #[test]
    fn test_braces_outside_expansions_are_text() {
        let template = parse("{\"json\": true}").unwrap();
        assert!(template.is_plain());
    }

    #[test]
    fn test_unterminated_expansion() {
        let err = parse("prefix ${NAME").unwrap_err();
        assert_eq!(err.offset(), 7);
        assert!(err.message().contains('}'));
    }

    #[test]
    fn test_missing_name() {
        let err = parse("${}").unwrap_err();
        assert_eq!(err.offset(), 0);
        assert!(err.message().contains("variable name"));
    }

    #[test]
    fn test_invalid_character_in_expansion() {
        assert!(parse("${A B}").is_err());
    }
}
