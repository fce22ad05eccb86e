//! Escape handling for assignment values.
//!
//! Double-quoted and bare values interpret `\n \t \r \v \f \\`; double-quoted
//! values also interpret `\"`. Single-quoted values only interpret `\'`.
//! Any other backslash sequence is kept verbatim.
//!
//! The `escape_*` functions are the inverse of the matching `unescape_*`
//! functions: `unescape_double(&escape_double(v)) == v` for every `v`. They
//! only double a backslash when leaving it alone would change its meaning,
//! so values such as Windows paths (`C:\Users`) come back unchanged.

use crate::ast::Quote;

fn unescape_with(raw: &str, quote_escape: Option<char>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let replacement = match chars.peek() {
            Some('n') => Some('\n'),
            Some('t') => Some('\t'),
            Some('r') => Some('\r'),
            Some('v') => Some('\u{0B}'),
            Some('f') => Some('\u{0C}'),
            Some('\\') => Some('\\'),
            Some(&c) if Some(c) == quote_escape => Some(c),
            _ => None,
        };
        match replacement {
            Some(replacement) => {
                chars.next();
                out.push(replacement);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Interpret the escapes of a double-quoted value.
pub fn unescape_double(raw: &str) -> String {
    unescape_with(raw, Some('"'))
}

/// Interpret the escapes of a bare value.
pub fn unescape_bare(raw: &str) -> String {
    unescape_with(raw, None)
}

/// Interpret the only escape of a single-quoted value, `\'`.
pub fn unescape_single(raw: &str) -> String {
    raw.replace("\\'", "'")
}

/// Interpret the escapes of a value written with the given quote style.
pub fn unescape(raw: &str, quote: Quote) -> String {
    match quote {
        Quote::Double => unescape_double(raw),
        Quote::Single => unescape_single(raw),
        Quote::Unquoted => unescape_bare(raw),
    }
}

fn control_escape(ch: char) -> Option<&'static str> {
    match ch {
        '\n' => Some("\\n"),
        '\t' => Some("\\t"),
        '\r' => Some("\\r"),
        '\u{0B}' => Some("\\v"),
        '\u{0C}' => Some("\\f"),
        _ => None,
    }
}

fn escape_with(value: &str, quote_escape: Option<char>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            // A backslash must be doubled when the next output character
            // would otherwise combine with it into an escape.
            let double = match chars.peek() {
                None => true,
                Some(&next) => {
                    matches!(next, 'n' | 't' | 'r' | 'v' | 'f' | '\\')
                        || Some(next) == quote_escape
                        || control_escape(next).is_some()
                }
            };
            out.push_str(if double { "\\\\" } else { "\\" });
        } else if let Some(escaped) = control_escape(ch) {
            out.push_str(escaped);
        } else if Some(ch) == quote_escape {
            out.push('\\');
            out.push(ch);
        } else {
            out.push(ch);
        }
    }
    out
}

/// Escape a value for writing between double quotes.
pub fn escape_double(value: &str) -> String {
    escape_with(value, Some('"'))
}

/// Escape a value for writing without quotes.
pub fn escape_bare(value: &str) -> String {
    escape_with(value, None)
}

/// Escape a value for writing between single quotes.
///
/// Single quotes only know the `\'` escape, so the result reads back
/// unchanged only when [`fits_single_quotes`] holds.
pub fn escape_single(value: &str) -> String {
    value.replace('\'', "\\'")
}

/// Returns `true` when a value can be written between single quotes and
/// read back unchanged. A trailing backslash would swallow the closing
/// quote and a literal `\'` would read back as `'`.
pub fn fits_single_quotes(value: &str) -> bool {
    !value.ends_with('\\') && !value.contains("\\'")
}

/// Escape a value for the given quote style.
pub fn escape(value: &str, quote: Quote) -> String {
    match quote {
        Quote::Double => escape_double(value),
        Quote::Single => escape_single(value),
        Quote::Unquoted => escape_bare(value),
    }
}

/// Returns `true` when a value cannot be written without quotes and read
/// back unchanged: it spans lines, or starts with a quote character or
/// whitespace.
pub fn requires_quotes(value: &str) -> bool {
    value.contains(['\n', '\r'])
        || value.starts_with(['"', '\'', ' ', '\t'])
}
