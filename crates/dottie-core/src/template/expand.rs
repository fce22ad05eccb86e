//! Recursive evaluation of parsed templates.

use thiserror::Error;

use super::{Expansion, Operator, Part, Template};

/// The result of expanding a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluated {
    /// The expanded text.
    pub value: String,
    /// Names that were looked up without an operator and were unset, in
    /// first-seen order.
    pub missing: Vec<String>,
}

impl Evaluated {
    fn record_missing(&mut self, name: &str) {
        if !self.missing.iter().any(|missing| missing == name) {
            self.missing.push(name.to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// `${NAME?word}` or `${NAME:?word}` with `NAME` unset.
    #[error("{name}: {reason}")]
    Required { name: String, reason: String },
}

pub(super) fn expand<F>(template: &Template, lookup: &F) -> Result<Evaluated, ExpandError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut evaluated = Evaluated::default();
    expand_into(template, lookup, &mut evaluated)?;
    Ok(evaluated)
}

fn expand_into<F>(template: &Template, lookup: &F, out: &mut Evaluated) -> Result<(), ExpandError>
where
    F: Fn(&str) -> Option<String>,
{
    for part in &template.parts {
        match part {
            Part::Text(text) => out.value.push_str(text),
            Part::Expansion(expansion) => expand_expansion(expansion, lookup, out)?,
        }
    }
    Ok(())
}

fn expand_expansion<F>(
    expansion: &Expansion,
    lookup: &F,
    out: &mut Evaluated,
) -> Result<(), ExpandError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(&expansion.name);

    let Some((operator, word)) = &expansion.modifier else {
        match value {
            Some(value) => out.value.push_str(&value),
            None => out.record_missing(&expansion.name),
        }
        return Ok(());
    };

    let is_set = match &value {
        Some(value) if operator.checks_empty() => !value.is_empty(),
        Some(_) => true,
        None => false,
    };

    match operator {
        Operator::Default | Operator::DefaultOrEmpty => match value {
            Some(value) if is_set => out.value.push_str(&value),
            _ => expand_into(word, lookup, out)?,
        },
        Operator::Alternate | Operator::AlternateNonEmpty => {
            if is_set {
                expand_into(word, lookup, out)?;
            }
        }
        Operator::Required | Operator::RequiredNonEmpty => match value {
            Some(value) if is_set => out.value.push_str(&value),
            _ => {
                let mut reason = Evaluated::default();
                expand_into(word, lookup, &mut reason)?;
                let reason = if reason.value.is_empty() {
                    match operator {
                        Operator::RequiredNonEmpty => "parameter null or not set",
                        _ => "parameter not set",
                    }
                    .to_string()
                } else {
                    reason.value
                };
                return Err(ExpandError::Required {
                    name: expansion.name.clone(),
                    reason,
                });
            }
        },
    }
    Ok(())
}
