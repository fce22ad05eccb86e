use std::ops::Range;

/// Half-open byte range `start..end` into an env source.
///
/// An inverted range collapses to an empty span at `start`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The covered text, or `None` when the span falls outside `source` or
    /// splits a UTF-8 character.
    pub fn text<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_range_is_empty() {
        let span = Span::new(9..4);
        assert_eq!(span.start(), 9);
        assert!(span.is_empty());
    }

    #[test]
    fn test_text() {
        let source = "NAME=Zoë\n";
        assert_eq!(Span::new(0..4).text(source), Some("NAME"));
        assert_eq!(Span::new(5..9).text(source), Some("Zoë"));
        assert_eq!(Span::new(5..8).text(source), None);
        assert_eq!(Span::new(8..40).text(source), None);
    }

    #[test]
    fn test_range_conversions() {
        let span: Span = (3..7).into();
        assert_eq!(span.len(), 4);
        assert_eq!(Range::from(span), 3..7);
    }
}
