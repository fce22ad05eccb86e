//! Parser for env file tokens.
//!
//! Lines are recognised with winnow over the token stream produced by the
//! [`scanner`](super::scanner); [`DocumentBuilder`] then folds the lines into
//! a [`Document`], attaching comments to the assignment that follows them
//! and opening a group at every banner header.

use std::collections::HashMap;

use log::{debug, info, trace};
use winnow::{
    Parser as _,
    combinator::{alt, cut_err, eof, opt},
    error::{ContextError, ErrMode, ModalResult},
    stream::{Stream, TokenSlice},
    token::any,
};

use dottie_core::{
    Assignment, Banner, CancellationToken, Comment, Document, Group, Layout, Newline, Position,
    escape,
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
    tokens::{Token, TokenKind},
};

/// Context attached to parser errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what was expected
    Label(&'static str),
}

type Input<'t, 'src> = TokenSlice<'t, Token<'src>>;
type IResult<O> = ModalResult<O, ContextError<Context>>;

/// One logical line of an env file, without its indentation.
///
/// The `&str` fields hold whitespace exactly as written.
#[derive(Debug)]
pub(crate) enum Line<'t, 'src> {
    Blank(&'t Token<'src>),
    Comment(&'t Token<'src>),
    /// `banner / # name / banner`
    GroupHeader {
        name: String,
        banner: &'t Token<'src>,
        /// Title and closing banner lines, each with its indentation.
        title: String,
        closing: String,
    },
    Assignment {
        key: &'t Token<'src>,
        value: Option<&'t Token<'src>>,
        before_assign: &'src str,
        after_assign: &'src str,
        trailing: &'src str,
    },
}

fn expect<'t, 'src>(input: &mut Input<'t, 'src>, kind: TokenKind) -> IResult<&'t Token<'src>> {
    any.verify(|token: &Token<'_>| token.kind == kind)
        .parse_next(input)
}

fn space_token<'t, 'src>(input: &mut Input<'t, 'src>) -> IResult<&'t Token<'src>> {
    expect(input, TokenKind::Space)
}

fn newline<'t, 'src>(input: &mut Input<'t, 'src>) -> IResult<&'t Token<'src>> {
    expect(input, TokenKind::NewLine)
}

fn assign<'t, 'src>(input: &mut Input<'t, 'src>) -> IResult<&'t Token<'src>> {
    expect(input, TokenKind::Assign)
}

/// Optional run of whitespace, `""` when there is none
fn space<'src>(input: &mut Input<'_, 'src>) -> IResult<&'src str> {
    opt(space_token)
        .map(|token| token.map_or("", |token| token.literal))
        .parse_next(input)
}

/// Whitespace up to the end of the line, returning the whitespace.
fn line_end<'src>(input: &mut Input<'_, 'src>) -> IResult<&'src str> {
    let trailing = space(input)?;
    alt((newline.void(), eof.void()))
        .context(Context::Label("end of line"))
        .parse_next(input)?;
    Ok(trailing)
}

fn blank_line<'t, 'src>(input: &mut Input<'t, 'src>) -> IResult<Line<'t, 'src>> {
    newline.map(Line::Blank).parse_next(input)
}

fn group_header<'t, 'src>(input: &mut Input<'t, 'src>) -> IResult<Line<'t, 'src>> {
    let banner = expect(input, TokenKind::GroupBanner)?;
    newline(input)?;
    let title_indent = space(input)?;
    let title = expect(input, TokenKind::Comment)?;
    newline(input)?;
    let closing_indent = space(input)?;
    let closing = expect(input, TokenKind::GroupBanner)?;
    let trailing = line_end(input)?;

    let name = Comment::new(title.literal).text().to_string();
    if name.is_empty() {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    Ok(Line::GroupHeader {
        name,
        banner,
        title: format!("{title_indent}{}", title.literal),
        closing: format!("{closing_indent}{}{trailing}", closing.literal),
    })
}

fn comment_line<'t, 'src>(input: &mut Input<'t, 'src>) -> IResult<Line<'t, 'src>> {
    let comment = any
        .verify(|token: &Token<'_>| {
            matches!(
                token.kind,
                TokenKind::Comment | TokenKind::CommentAnnotation | TokenKind::GroupBanner
            )
        })
        .parse_next(input)?;
    cut_err(line_end).parse_next(input)?;
    Ok(Line::Comment(comment))
}

fn assignment_line<'t, 'src>(input: &mut Input<'t, 'src>) -> IResult<Line<'t, 'src>> {
    let key = expect(input, TokenKind::Identifier)?;
    let before_assign = space(input)?;

    let (after_assign, value) = if opt(assign).parse_next(input)?.is_some() {
        let after_assign = space(input)?;
        let value = cut_err(any.verify(|token: &Token<'_>| {
            matches!(token.kind, TokenKind::Value | TokenKind::RawValue)
        }))
        .context(Context::Label("value"))
        .parse_next(input)?;
        (after_assign, Some(value))
    } else {
        ("", None)
    };

    let trailing = cut_err(line_end).parse_next(input)?;
    Ok(Line::Assignment {
        key,
        value,
        before_assign,
        after_assign,
        trailing,
    })
}

/// Parse the next line. Leading whitespace is skipped.
pub(crate) fn line<'t, 'src>(input: &mut Input<'t, 'src>) -> IResult<Line<'t, 'src>> {
    space(input)?;
    alt((blank_line, group_header, comment_line, assignment_line))
        .context(Context::Label("key, comment or blank line"))
        .parse_next(input)
}

/// Convert a winnow error into a diagnostic pointing at the token where
/// parsing stopped.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[Token<'_>],
    current_remaining: usize,
) -> Diagnostic {
    let position = tokens.len() - current_remaining;
    let at = tokens.get(position).or_else(|| tokens.last());
    let span = at.map(Token::span).unwrap_or_default();

    let expected: Vec<&str> = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e
            .context()
            .map(|ctx| match ctx {
                Context::Label(label) => *label,
            })
            .collect(),
        ErrMode::Incomplete(_) => Vec::new(),
    };

    let found = tokens
        .get(position)
        .map_or_else(|| "end of input".to_string(), ToString::to_string);
    let message = match expected.first() {
        Some(label) => format!("expected {label}, found {found}"),
        None => format!("unexpected {found}"),
    };

    let diagnostic = Diagnostic::error(message)
        .with_code(ErrorCode::E100)
        .with_label(span, ErrorCode::E100.description());
    match at {
        Some(token) => diagnostic.with_line(token.line),
        None => diagnostic,
    }
}

/// Folds parsed lines into a document.
pub(crate) struct DocumentBuilder<'src> {
    file: String,
    document: Document,
    pending: Vec<Comment>,
    keys: HashMap<&'src str, Span>,
}

impl<'src> DocumentBuilder<'src> {
    pub(crate) fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
            document: Document::new(file),
            pending: Vec::new(),
            keys: HashMap::new(),
        }
    }

    fn position(&self, line: usize) -> Position {
        Position::new(self.file.clone(), line)
    }

    /// Fold one line, `indent` being the whitespace that led it.
    pub(crate) fn accept(&mut self, indent: &str, line: Line<'_, 'src>) -> Result<(), Diagnostic> {
        trace!(line:? = line; "Parsed line");
        match line {
            Line::Blank(token) => {
                self.flush_pending();
                let newline = Newline::blank(self.position(token.line)).with_whitespace(indent);
                self.document.push_statement(newline);
            }
            Line::Comment(token) => {
                let comment = Comment::new(token.literal)
                    .with_indent(indent)
                    .with_position(self.position(token.line));
                self.pending.push(comment);
            }
            Line::GroupHeader {
                name,
                banner,
                title,
                closing,
            } => {
                self.flush_pending();
                debug!(group = name.as_str(), line = banner.line; "Found group banner");
                let written = Banner::new(format!("{indent}{}", banner.literal), title, closing);
                let group = Group::new(name, self.position(banner.line)).with_banner(written);
                self.document.push_group(group);
            }
            Line::Assignment {
                key,
                value,
                before_assign,
                after_assign,
                trailing,
            } => {
                let layout = Layout::new()
                    .with_indent(indent)
                    .with_marker(key.marker)
                    .with_assign_spacing(before_assign, after_assign)
                    .with_trailing(trailing);
                self.assignment(key, value, layout)?;
            }
        }
        Ok(())
    }

    fn assignment(
        &mut self,
        key: &Token<'src>,
        value: Option<&Token<'src>>,
        layout: Layout,
    ) -> Result<(), Diagnostic> {
        if let Some(first) = self.keys.get(key.literal) {
            return Err(Diagnostic::error(format!(
                "key `{}` is defined multiple times",
                key.literal
            ))
            .with_code(ErrorCode::E101)
            .with_line(key.line)
            .with_label(key.span(), "duplicate key")
            .with_secondary_label(*first, "first defined here")
            .with_help("remove one of the definitions"));
        }
        self.keys.insert(key.literal, key.span());

        let comments = std::mem::take(&mut self.pending);
        let first_line = comments
            .first()
            .map_or(key.line, |comment| comment.position().line());
        let last_line = value.map_or(key.line, |value| {
            value.line + value.literal.matches('\n').count()
        });
        let position = self
            .position(key.line)
            .with_lines(first_line, last_line);

        let assignment = match value {
            Some(value) => {
                Assignment::new(key.literal, escape::unescape(value.literal, value.quote))
                    .with_quote(value.quote)
                    .with_raw(value.literal)
            }
            None => Assignment::incomplete(key.literal),
        };
        let assignment = assignment
            .with_layout(layout)
            .with_enabled(!key.commented)
            .with_comments(comments)
            .with_position(position);

        self.document.push_statement(assignment);
        Ok(())
    }

    /// Comments not followed by an assignment stand on their own.
    fn flush_pending(&mut self) {
        for comment in std::mem::take(&mut self.pending) {
            self.document.push_statement(comment);
        }
    }

    pub(crate) fn finish(mut self) -> Document {
        self.flush_pending();
        self.document.initialize();
        self.document
    }
}

/// Build a document from scanned tokens.
///
/// The cancellation token is polled before every line.
pub(crate) fn build_document<'src>(
    tokens: &[Token<'src>],
    file: &str,
    cancel: &CancellationToken,
) -> Result<Document, Diagnostic> {
    let mut input = TokenSlice::new(tokens);
    let mut builder = DocumentBuilder::new(file);

    loop {
        if cancel.is_cancelled() {
            info!(file = file; "Parsing cancelled");
            return Err(Diagnostic::error("parsing was cancelled").with_code(ErrorCode::E102));
        }

        // Trailing whitespace on the last line is not a statement.
        let indent = space(&mut input).map_err(|e| convert_error(e, tokens, input.eof_offset()))?;
        if input.eof_offset() == 0 {
            break;
        }

        let parsed = line
            .parse_next(&mut input)
            .map_err(|e| convert_error(e, tokens, input.eof_offset()))?;
        builder.accept(indent, parsed)?;
    }

    let document = builder.finish();
    info!(file = file, statements = document.statement_count(); "Parsed document");
    Ok(document)
}
