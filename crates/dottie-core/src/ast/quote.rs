use std::fmt;

/// Quoting style of an assignment value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Quote {
    /// `KEY="value"`: escapes are interpreted and the value is interpolated.
    Double,
    /// `KEY='value'`: raw text, never interpolated.
    Single,
    /// `KEY=value`: runs to end of line, escapes are interpreted.
    #[default]
    Unquoted,
}

impl Quote {
    /// The quote character, or `None` for unquoted values.
    pub fn as_char(self) -> Option<char> {
        match self {
            Quote::Double => Some('"'),
            Quote::Single => Some('\''),
            Quote::Unquoted => None,
        }
    }

    /// The quote as a string slice; empty for unquoted values.
    pub fn as_str(self) -> &'static str {
        match self {
            Quote::Double => "\"",
            Quote::Single => "'",
            Quote::Unquoted => "",
        }
    }

    /// Whether values with this quote style take part in interpolation.
    pub fn is_interpolated(self) -> bool {
        !matches!(self, Quote::Single)
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quote::Double => write!(f, "double"),
            Quote::Single => write!(f, "single"),
            Quote::Unquoted => write!(f, "none"),
        }
    }
}
