use std::fmt;

use winnow::stream::Location;

use dottie_core::Quote;

use crate::{error::ErrorCode, span::Span};

/// Token kinds of the env grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Input the scanner could not tokenize; carries a diagnostic
    Illegal,
    Eof,
    /// A line of three or more `#`
    GroupBanner,
    Comment,
    /// A comment of the form `# @key value`
    CommentAnnotation,
    /// `=`
    Assign,
    Identifier,
    /// Double-quoted or bare value
    Value,
    /// Single-quoted value
    RawValue,
    Space,
    NewLine,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Illegal => "illegal input",
            TokenKind::Eof => "end of input",
            TokenKind::GroupBanner => "group banner",
            TokenKind::Comment => "comment",
            TokenKind::CommentAnnotation => "annotation",
            TokenKind::Assign => "`=`",
            TokenKind::Identifier => "key",
            TokenKind::Value => "value",
            TokenKind::RawValue => "single-quoted value",
            TokenKind::Space => "whitespace",
            TokenKind::NewLine => "newline",
        };
        f.write_str(name)
    }
}

/// Why the scanner produced an [`TokenKind::Illegal`] token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanIssue {
    pub code: ErrorCode,
    pub message: &'static str,
    pub help: Option<&'static str>,
}

/// A token with its position in the source.
///
/// `literal` is the token text. For values it is the raw text between the
/// quotes, before escape processing. For a disabled assignment's identifier
/// (`#KEY=...`) it is the key alone while the span covers the `#` as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub literal: &'src str,
    /// 1-based line on which the token starts.
    pub line: usize,
    /// Byte offset of the token in the source.
    pub offset: usize,
    /// Length of the token in source bytes.
    pub length: usize,
    /// Set on identifiers that were preceded by `#`.
    pub commented: bool,
    /// For those identifiers, the `#` and any whitespace before the key.
    pub marker: &'src str,
    pub quote: Quote,
    pub issue: Option<ScanIssue>,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, literal: &'src str, line: usize, span: Span) -> Self {
        Self {
            kind,
            literal,
            line,
            offset: span.start(),
            length: span.len(),
            commented: false,
            marker: "",
            quote: Quote::Unquoted,
            issue: None,
        }
    }

    pub(crate) fn illegal(issue: ScanIssue, line: usize, span: Span) -> Token<'static> {
        Token {
            issue: Some(issue),
            ..Token::new(TokenKind::Illegal, issue.message, line, span)
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.offset..self.offset + self.length)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl Location for Token<'_> {
    fn previous_token_end(&self) -> usize {
        self.offset
    }

    fn current_token_start(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier | TokenKind::Value | TokenKind::RawValue => {
                write!(f, "{} `{}`", self.kind, self.literal)
            }
            kind => kind.fmt(f),
        }
    }
}
