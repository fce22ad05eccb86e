//! Rendering documents back to text.
//!
//! One visitor walks the document: top-level statements first, then every
//! group behind its banner. A [`Policy`](policy::Policy) decides where blank
//! lines go and an [`Output`](output::Output) backend writes each statement.
//! [`Settings`] choose both and filter what is shown.
//!
//! Without formatting, parsed lines keep their layout: indents, spacing
//! around `=`, the disable marker and group banners are written as they
//! appeared. Values are written the way they appeared in the source as long
//! as the literal is unchanged. A value whose text spans lines is always
//! written double-quoted, so a bare value with `\n` escapes comes back
//! quoted.

mod output;
mod policy;
mod settings;

pub use output::BANNER_WIDTH;
pub use settings::{OutputKind, Settings};

use std::fmt;

use log::{debug, trace};

use dottie_core::{
    Assignment, Comment, Document, Group, Quote, Selection, Selector, Statement, escape, selector,
};

use output::{AssignmentLine, CANONICAL, Colorized, CompletionKeys, Output, Plain};
use policy::{Direct, Element, Format, Policy};

/// Walks statements and writes them to a sink.
pub struct Renderer<'s> {
    settings: &'s Settings,
    selectors: Vec<Selector>,
    policy: Box<dyn Policy>,
    output: Box<dyn Output>,
    /// Write parsed lines with their source layout.
    preserve: bool,
    previous: Option<Element>,
}

impl<'s> Renderer<'s> {
    pub fn new(settings: &'s Settings) -> Self {
        let policy: Box<dyn Policy> = if settings.format_output() {
            Box::new(Format)
        } else {
            Box::new(Direct)
        };
        let output: Box<dyn Output> = match settings.output() {
            OutputKind::Plain => Box::new(Plain),
            OutputKind::Colorized(palette) => Box::new(Colorized::new(palette)),
            OutputKind::CompletionKeys => Box::new(CompletionKeys),
        };
        Self {
            settings,
            selectors: settings.selectors(),
            policy,
            output,
            preserve: !settings.format_output(),
            previous: None,
        }
    }

    /// Render a whole document. Every emitted line ends with a newline.
    pub fn document<W: fmt::Write>(&mut self, document: &Document, sink: &mut W) -> fmt::Result {
        debug!(
            file = document.file(),
            format = self.settings.format_output();
            "Rendering document"
        );
        for statement in document.statements() {
            self.statement(statement, sink)?;
        }
        for group in document.groups() {
            self.group(group, sink)?;
        }
        Ok(())
    }

    /// Render a group: its banner, then its statements.
    ///
    /// The banner is left out when filters hide every statement of a group
    /// that has content. Groups holding only blank lines count as empty.
    pub fn group<W: fmt::Write>(&mut self, group: &Group, sink: &mut W) -> fmt::Result {
        if !self.group_visible(group) {
            trace!(group = group.name(); "Group hidden by filters");
            return Ok(());
        }
        if self.settings.show_group_banners() {
            let written = group.banner().filter(|_| self.preserve);
            if let Some(banner) = self.output.banner(group.name(), written) {
                self.emit(Element::Banner, &banner, sink)?;
            }
        }
        for statement in group.statements() {
            self.statement(statement, sink)?;
        }
        Ok(())
    }

    /// Render one statement if the settings keep it.
    pub fn statement<W: fmt::Write>(&mut self, statement: &Statement, sink: &mut W) -> fmt::Result {
        if !self.visible(statement) {
            return Ok(());
        }
        match statement {
            Statement::Newline(newline) => match self.output.blank() {
                Some(blank) if self.preserve => writeln!(sink, "{}{blank}", newline.whitespace()),
                Some(blank) => writeln!(sink, "{blank}"),
                None => Ok(()),
            },
            Statement::Comment(comment) => match self.comment(comment) {
                Some(text) => self.emit(Element::Comment, &text, sink),
                None => Ok(()),
            },
            Statement::Assignment(assignment) => self.assignment(assignment, sink),
        }
    }

    fn assignment<W: fmt::Write>(&mut self, assignment: &Assignment, sink: &mut W) -> fmt::Result {
        let comments: Vec<String> = if self.settings.show_comments() {
            assignment
                .comments()
                .iter()
                .filter_map(|comment| self.comment(comment))
                .collect()
        } else {
            Vec::new()
        };

        let line = AssignmentLine {
            name: assignment.name(),
            value: assignment
                .is_complete()
                .then(|| render_value(assignment, self.settings.use_interpolated_values())),
            enabled: assignment.is_enabled(),
            export: self.settings.export(),
            layout: if self.preserve {
                assignment.layout()
            } else {
                &CANONICAL
            },
        };
        let Some(text) = self.output.assignment(&line) else {
            return Ok(());
        };

        let element = Element::Assignment {
            commented: !comments.is_empty(),
        };
        let mut block = comments;
        block.push(text);
        self.emit(element, &block.join("\n"), sink)
    }

    fn comment(&self, comment: &Comment) -> Option<String> {
        let text = self.output.comment(comment)?;
        if self.preserve {
            Some(format!("{}{text}", comment.indent()))
        } else {
            Some(text)
        }
    }

    fn emit<W: fmt::Write>(&mut self, element: Element, text: &str, sink: &mut W) -> fmt::Result {
        if self.policy.separate(self.previous, element) {
            writeln!(sink)?;
        }
        self.previous = Some(element);
        writeln!(sink, "{text}")
    }

    fn visible(&self, statement: &Statement) -> bool {
        if statement.is_newline() && !self.policy.keep_blank_lines() {
            return false;
        }
        selector::select_all(&self.selectors, statement) == Selection::Keep
    }

    fn group_visible(&self, group: &Group) -> bool {
        let empty = group.statements().iter().all(Statement::is_newline);
        if empty {
            return !self.settings.is_narrowed();
        }
        group
            .statements()
            .iter()
            .any(|statement| self.visible(statement))
    }
}

/// The value part of an assignment line, escaped and quoted.
///
/// An unchanged parsed value is written exactly as it appeared in the source.
/// A single-quoted value that single quotes cannot hold, one ending in a
/// backslash or containing `\'`, is written double-quoted instead.
pub fn render_value(assignment: &Assignment, interpolated: bool) -> String {
    let value = if interpolated {
        assignment.interpolated()
    } else {
        assignment.literal()
    };
    let spans_lines = value.contains(['\n', '\r']);

    if !interpolated {
        if let Some(raw) = assignment.raw() {
            let kept = match assignment.quote() {
                Quote::Unquoted => !spans_lines,
                Quote::Double => true,
                Quote::Single => !spans_lines,
            };
            if kept {
                return quote(raw, assignment.quote());
            }
        }
    }

    let style = match assignment.quote() {
        _ if spans_lines => Quote::Double,
        Quote::Unquoted if escape::requires_quotes(value) => Quote::Double,
        Quote::Single if !escape::fits_single_quotes(value) => Quote::Double,
        quote => quote,
    };
    quote(&escape::escape(value, style), style)
}

fn quote(text: &str, quote: Quote) -> String {
    match quote.as_char() {
        Some(q) => format!("{q}{text}{q}"),
        None => text.to_string(),
    }
}

/// Render a document with the given settings.
///
/// # Examples
///
/// ```
/// use dottie::render::{Settings, render};
///
/// let document = dottie_parser::parse("# Port\nPORT=8080\n#DEBUG=1\n", ".env").unwrap();
///
/// assert_eq!(render(&document, &Settings::new()), "# Port\nPORT=8080\n#DEBUG=1\n");
///
/// let settings = Settings::new().with_disabled(false).with_comments(false);
/// assert_eq!(render(&document, &settings), "PORT=8080\n");
/// ```
pub fn render(document: &Document, settings: &Settings) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = render_to(document, settings, &mut out);
    out
}

/// Render a document into `sink`.
pub fn render_to<W: fmt::Write>(
    document: &Document,
    settings: &Settings,
    sink: &mut W,
) -> fmt::Result {
    Renderer::new(settings).document(document, sink)
}

/// Render a document with normalised spacing.
pub fn format(document: &Document, settings: &Settings) -> String {
    render(document, &settings.clone().with_format_output(true))
}
