//! Layout policies for the renderer.
//!
//! The renderer walks the document once and asks its [`Policy`] where blank
//! lines go. [`Direct`] reproduces the blank lines of the source;
//! [`Format`] drops them and synthesises its own spacing.

/// What the renderer emitted, as far as spacing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Element {
    /// An assignment; `commented` when its comments were rendered with it
    Assignment { commented: bool },
    /// A free-standing comment
    Comment,
    /// A group banner
    Banner,
}

pub(crate) trait Policy {
    /// Whether blank lines from the source are rendered.
    fn keep_blank_lines(&self) -> bool;

    /// Whether a blank line is synthesised between `previous` and `next`.
    fn separate(&self, previous: Option<Element>, next: Element) -> bool;
}

/// Keep the source layout.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Direct;

impl Policy for Direct {
    fn keep_blank_lines(&self) -> bool {
        true
    }

    fn separate(&self, _previous: Option<Element>, _next: Element) -> bool {
        false
    }
}

/// Normalised spacing.
///
/// One blank line goes between assignments when either carries comments,
/// around group banners, and between a free-standing comment and whatever
/// follows it. Assignments without comments stay cuddled, as do runs of
/// free-standing comments.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Format;

impl Policy for Format {
    fn keep_blank_lines(&self) -> bool {
        false
    }

    fn separate(&self, previous: Option<Element>, next: Element) -> bool {
        let Some(previous) = previous else {
            return false;
        };
        match (previous, next) {
            (
                Element::Assignment { commented: before },
                Element::Assignment { commented: after },
            ) => before || after,
            (Element::Comment, Element::Comment) => false,
            _ => true,
        }
    }
}
