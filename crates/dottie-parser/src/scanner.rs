//! Scanner for env file source text.
//!
//! The scanner is line oriented: what a character means depends on where it
//! appears on the line, so [`Scanner`] keeps a small mode alongside the
//! winnow input and picks the token parsers for that mode. Problems do not
//! abort scanning; they become [`TokenKind::Illegal`] tokens carrying a
//! [`ScanIssue`], and scanning resumes at the next line.

use std::ops::Range;

use log::trace;
use winnow::{
    Parser as _,
    combinator::{alt, cut_err, delimited, peek, preceded, repeat},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, one_of, take_till, take_while},
};

use dottie_core::{Annotation, Quote};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{ScanIssue, Token, TokenKind},
};

/// Longest literal the scanner accepts for a single token.
pub const MAX_TOKEN_LENGTH: usize = 64 * 1024;

const BOM: char = '\u{FEFF}';

const UNTERMINATED_DOUBLE: ScanIssue = ScanIssue {
    code: ErrorCode::E001,
    message: "unterminated double-quoted value",
    help: Some("add the closing `\"`; double-quoted values may span lines"),
};

const UNTERMINATED_SINGLE: ScanIssue = ScanIssue {
    code: ErrorCode::E002,
    message: "unterminated single-quoted value",
    help: Some("add the closing `'`"),
};

const TOO_LONG: ScanIssue = ScanIssue {
    code: ErrorCode::E003,
    message: "token exceeds the maximum length of 65536 bytes",
    help: None,
};

const INVALID_UTF8: ScanIssue = ScanIssue {
    code: ErrorCode::E004,
    message: "invalid UTF-8",
    help: Some("env files must be UTF-8 encoded"),
};

const UNEXPECTED_CHARACTER: ScanIssue = ScanIssue {
    code: ErrorCode::E005,
    message: "unexpected character",
    help: Some("lines hold `KEY=value`, a `#` comment or nothing"),
};

const EXPECTED_ASSIGN: ScanIssue = ScanIssue {
    code: ErrorCode::E005,
    message: "expected `=` after key",
    help: Some("write `KEY=value`, or `KEY` alone to declare an unset key"),
};

const TRAILING_CONTENT: ScanIssue = ScanIssue {
    code: ErrorCode::E006,
    message: "unexpected content after value",
    help: Some("quote the whole value, or move the comment to its own line"),
};

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<ScanIssue>>;

/// A recognised piece of input before position information is attached.
#[derive(Debug, Clone, Copy)]
struct Lexeme<'a> {
    kind: TokenKind,
    literal: &'a str,
    commented: bool,
    marker: &'a str,
    quote: Quote,
}

impl<'a> Lexeme<'a> {
    fn new(kind: TokenKind, literal: &'a str) -> Self {
        Self {
            kind,
            literal,
            commented: false,
            marker: "",
            quote: Quote::Unquoted,
        }
    }

    fn quoted(kind: TokenKind, literal: &'a str, quote: Quote) -> Self {
        Self {
            quote,
            ..Self::new(kind, literal)
        }
    }
}

fn is_key_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '.' | '-' | ',')
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | ',')
}

/// Spaces and tabs
fn blanks<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    take_while(1.., [' ', '\t'])
        .map(|s| Lexeme::new(TokenKind::Space, s))
        .parse_next(input)
}

/// `\n` or `\r\n`
fn line_break<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    alt(("\r\n", "\n"))
        .map(|s| Lexeme::new(TokenKind::NewLine, s))
        .parse_next(input)
}

/// Everything up to the line break, without a trailing `\r`
fn rest_of_line<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_till(0.., '\n')
        .map(|s: &'a str| s.strip_suffix('\r').unwrap_or(s))
        .parse_next(input)
}

fn key<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (one_of(is_key_start), take_while(0.., is_key_char))
        .take()
        .parse_next(input)
}

/// `#KEY=` or `# KEY=`: the key of a disabled assignment
fn disabled_key<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    (('#', take_while(0.., [' ', '\t'])).take(), key, peek('='))
        .map(|(marker, name, _)| Lexeme {
            commented: true,
            marker,
            ..Lexeme::new(TokenKind::Identifier, name)
        })
        .parse_next(input)
}

fn banner<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    preceded(peek("###"), rest_of_line)
        .map(|s| Lexeme::new(TokenKind::GroupBanner, s))
        .parse_next(input)
}

fn comment<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    preceded(peek('#'), rest_of_line)
        .map(|s| {
            let kind = if Annotation::parse(s).is_some() {
                TokenKind::CommentAnnotation
            } else {
                TokenKind::Comment
            };
            Lexeme::new(kind, s)
        })
        .parse_next(input)
}

/// The raw text between a pair of quotes. A backslash always consumes the
/// following character so an escaped quote does not close the value.
fn quoted<'a>(input: &mut Input<'a>, quote: char, issue: ScanIssue) -> IResult<&'a str> {
    let body = repeat::<_, _, (), _, _>(
        0..,
        alt((('\\', any).void(), take_till(1.., ['\\', quote]).void())),
    )
    .take();

    delimited(quote, body, cut_err(quote).context(issue)).parse_next(input)
}

fn double_quoted<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    quoted(input, '"', UNTERMINATED_DOUBLE)
        .map(|s| Lexeme::quoted(TokenKind::Value, s, Quote::Double))
}

fn single_quoted<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    quoted(input, '\'', UNTERMINATED_SINGLE)
        .map(|s| Lexeme::quoted(TokenKind::RawValue, s, Quote::Single))
}

/// A bare value runs to the end of the line and may be empty.
fn bare<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    rest_of_line
        .map(|s| Lexeme::new(TokenKind::Value, s))
        .parse_next(input)
}

fn line_start_token<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    alt((
        line_break,
        blanks,
        banner,       // Must come before comment
        disabled_key, // Must come before comment
        comment,
        key.map(|name| Lexeme::new(TokenKind::Identifier, name)),
    ))
    .parse_next(input)
}

fn after_key_token<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    alt((
        blanks,
        '='.take().map(|s| Lexeme::new(TokenKind::Assign, s)),
        line_break,
    ))
    .parse_next(input)
}

fn value_token<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    alt((blanks, double_quoted, single_quoted, bare)).parse_next(input)
}

fn after_value_token<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    alt((blanks, line_break)).parse_next(input)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    LineStart,
    AfterKey,
    Value,
    AfterValue,
    Done,
}

/// Produces [`Token`]s from env file source.
///
/// [`next_token`](Self::next_token) returns [`TokenKind::Eof`] once the
/// input is exhausted, and keeps returning it. The iterator implementation
/// stops before `Eof`.
#[derive(Debug, Clone)]
pub struct Scanner<'src> {
    source: &'src str,
    input: Input<'src>,
    invalid: Option<Range<usize>>,
    line: usize,
    mode: Mode,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut input = LocatingSlice::new(source);
        if source.starts_with(BOM) {
            input.next_slice(BOM.len_utf8());
        }
        Self {
            source,
            input,
            invalid: None,
            line: 1,
            mode: Mode::LineStart,
        }
    }

    /// Scan raw bytes. Input up to the first invalid UTF-8 sequence is
    /// scanned normally; the sequence itself becomes an
    /// [`TokenKind::Illegal`] token covering the offending bytes.
    pub fn from_bytes(bytes: &'src [u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(source) => Self::new(source),
            Err(err) => {
                let valid = err.valid_up_to();
                let end = err.error_len().map_or(bytes.len(), |len| valid + len);
                let prefix = std::str::from_utf8(&bytes[..valid]).unwrap_or_default();
                Self {
                    invalid: Some(valid..end),
                    ..Self::new(prefix)
                }
            }
        }
    }

    pub fn next_token(&mut self) -> Token<'src> {
        let token = match self.mode {
            Mode::Done => self.eof(),
            Mode::Value => self.scan(value_token, UNEXPECTED_CHARACTER),
            _ if self.input.eof_offset() == 0 => self.end_of_input(),
            Mode::LineStart => self.scan(line_start_token, UNEXPECTED_CHARACTER),
            Mode::AfterKey => self.scan(after_key_token, EXPECTED_ASSIGN),
            Mode::AfterValue => self.scan(after_value_token, TRAILING_CONTENT),
        };

        let token = if token.length > MAX_TOKEN_LENGTH && token.issue.is_none() {
            Token::illegal(TOO_LONG, token.line, token.span())
        } else {
            token
        };

        trace!(kind:% = token.kind, line = token.line, offset = token.offset; "Scanned token");
        token
    }

    fn offset(&self) -> usize {
        self.input.current_token_start()
    }

    fn eof(&self) -> Token<'src> {
        let end = self.offset();
        Token::new(TokenKind::Eof, "", self.line, Span::new(end..end))
    }

    fn end_of_input(&mut self) -> Token<'src> {
        self.mode = Mode::Done;
        match self.invalid.take() {
            Some(range) => Token::illegal(INVALID_UTF8, self.line, Span::new(range)),
            None => self.eof(),
        }
    }

    fn scan(
        &mut self,
        parser: fn(&mut Input<'src>) -> IResult<Lexeme<'src>>,
        fallback: ScanIssue,
    ) -> Token<'src> {
        let start = self.offset();
        let line = self.line;
        let checkpoint = self.input.checkpoint();

        match parser(&mut self.input) {
            Ok(lexeme) => {
                let end = self.offset();
                self.line += self.source[start..end].matches('\n').count();
                self.mode = match lexeme.kind {
                    TokenKind::NewLine => Mode::LineStart,
                    TokenKind::Identifier => Mode::AfterKey,
                    TokenKind::Assign => Mode::Value,
                    TokenKind::Space => self.mode,
                    _ => Mode::AfterValue,
                };
                Token {
                    commented: lexeme.commented,
                    marker: lexeme.marker,
                    quote: lexeme.quote,
                    ..Token::new(lexeme.kind, lexeme.literal, line, Span::new(start..end))
                }
            }
            Err(err) => {
                let context = match &err {
                    ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx.context().next().copied(),
                    ErrMode::Incomplete(_) => None,
                };
                self.input.reset(&checkpoint);
                let issue = match context {
                    Some(issue) => {
                        // An unterminated quote swallows the rest of the input.
                        self.input.next_slice(self.input.eof_offset());
                        issue
                    }
                    None => {
                        let _ = rest_of_line(&mut self.input);
                        fallback
                    }
                };
                let end = self.offset();
                self.line += self.source[start..end].matches('\n').count();
                self.mode = Mode::AfterValue;
                Token::illegal(issue, line, Span::new(start..end))
            }
        }
    }
}

impl<'src> Iterator for Scanner<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        (!token.is(TokenKind::Eof)).then_some(token)
    }
}

fn issue_diagnostic(issue: ScanIssue, token: &Token<'_>) -> Diagnostic {
    let diagnostic = Diagnostic::error(issue.message)
        .with_code(issue.code)
        .with_line(token.line)
        .with_label(token.span(), issue.code.description());
    match issue.help {
        Some(help) => diagnostic.with_help(help),
        None => diagnostic,
    }
}

/// Scan the whole input, collecting a diagnostic for every illegal token.
///
/// The returned tokens exclude [`TokenKind::Eof`].
pub(crate) fn tokenize(scanner: Scanner<'_>) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let mut diagnostics = DiagnosticCollector::new();

    for token in scanner {
        match token.issue {
            Some(issue) => diagnostics.emit(issue_diagnostic(issue, &token)),
            None => tokens.push(token),
        }
    }

    diagnostics.finish().map(|()| tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source).map(|token| token.kind).collect()
    }

    fn first_issue(source: &str) -> ScanIssue {
        Scanner::new(source)
            .find_map(|token| token.issue)
            .expect("expected an illegal token")
    }

    #[test]
    fn test_assignment_tokens() {
        let tokens: Vec<Token<'_>> = Scanner::new("KEY=value\n").collect();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].literal, "KEY");
        assert_eq!(tokens[1].kind, TokenKind::Assign);
        assert_eq!(tokens[2].kind, TokenKind::Value);
        assert_eq!(tokens[2].literal, "value");
        assert_eq!(tokens[2].quote, Quote::Unquoted);
        assert_eq!(tokens[3].kind, TokenKind::NewLine);
    }

    #[test]
    fn test_offsets_and_lines() {
        let tokens: Vec<Token<'_>> = Scanner::new("A=1\nB=2").collect();
        let b = &tokens[4];
        assert_eq!(b.literal, "B");
        assert_eq!(b.line, 2);
        assert_eq!(b.offset, 4);
        assert_eq!(b.length, 1);
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut scanner = Scanner::new("A=1");
        while !scanner.next_token().is(TokenKind::Eof) {}
        assert!(scanner.next_token().is(TokenKind::Eof));
        assert!(scanner.next_token().is(TokenKind::Eof));
    }

    #[test]
    fn test_quoted_values() {
        let tokens: Vec<Token<'_>> = Scanner::new("A=\"x \\\" y\"\nB='raw $x'").collect();
        assert_eq!(tokens[2].literal, "x \\\" y");
        assert_eq!(tokens[2].quote, Quote::Double);
        assert_eq!(tokens[6].kind, TokenKind::RawValue);
        assert_eq!(tokens[6].literal, "raw $x");
        assert_eq!(tokens[6].quote, Quote::Single);
    }

    #[test]
    fn test_multiline_double_quoted_value() {
        let tokens: Vec<Token<'_>> = Scanner::new("A=\"one\ntwo\"\nB=3").collect();
        assert_eq!(tokens[2].literal, "one\ntwo");
        let b = tokens.iter().find(|t| t.literal == "B").unwrap();
        assert_eq!(b.line, 3);
    }

    #[test]
    fn test_bare_value_keeps_hash() {
        let tokens: Vec<Token<'_>> = Scanner::new("A=x # not a comment").collect();
        assert_eq!(tokens[2].literal, "x # not a comment");
    }

    #[test]
    fn test_empty_and_incomplete_values() {
        assert_eq!(
            kinds("A=\nB\n"),
            [
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Value,
                TokenKind::NewLine,
                TokenKind::Identifier,
                TokenKind::NewLine,
            ]
        );
        assert_eq!(
            kinds("A="),
            [TokenKind::Identifier, TokenKind::Assign, TokenKind::Value]
        );
    }

    #[test]
    fn test_comments_and_annotations() {
        assert_eq!(
            kinds("# plain\n# @dottie/validate required\n"),
            [
                TokenKind::Comment,
                TokenKind::NewLine,
                TokenKind::CommentAnnotation,
                TokenKind::NewLine,
            ]
        );
    }

    #[test]
    fn test_banner() {
        let tokens: Vec<Token<'_>> = Scanner::new("#####\n# db\n#####\n").collect();
        assert_eq!(tokens[0].kind, TokenKind::GroupBanner);
        assert_eq!(tokens[2].kind, TokenKind::Comment);
        assert_eq!(tokens[4].kind, TokenKind::GroupBanner);
        assert!(!Scanner::new("## two").any(|t| t.is(TokenKind::GroupBanner)));
    }

    #[test]
    fn test_disabled_assignment() {
        for source in ["#KEY=value", "# KEY=value"] {
            let tokens: Vec<Token<'_>> = Scanner::new(source).collect();
            assert_eq!(tokens[0].kind, TokenKind::Identifier, "{source}");
            assert_eq!(tokens[0].literal, "KEY");
            assert!(tokens[0].commented);
            assert_eq!(tokens[0].offset, 0);
            assert_eq!(tokens[2].literal, "value");
        }
        let tokens: Vec<Token<'_>> = Scanner::new("#\t KEY=value").collect();
        assert_eq!(tokens[0].marker, "#\t ");
        assert_eq!(kinds("# KEY = value"), [TokenKind::Comment]);
    }

    #[test]
    fn test_unicode_identifier() {
        let tokens: Vec<Token<'_>> = Scanner::new("GRÜSSE=hallo").collect();
        assert_eq!(tokens[0].literal, "GRÜSSE");
    }

    #[test]
    fn test_crlf_line_endings() {
        let tokens: Vec<Token<'_>> = Scanner::new("A=1\r\nB=2\r\n").collect();
        assert_eq!(tokens[2].literal, "1");
        assert_eq!(tokens[3].kind, TokenKind::NewLine);
        assert_eq!(tokens[4].literal, "B");
    }

    #[test]
    fn test_bom_is_skipped() {
        let tokens: Vec<Token<'_>> = Scanner::new("\u{FEFF}A=1").collect();
        assert_eq!(tokens[0].literal, "A");
        assert_eq!(tokens[0].offset, 3);
    }

    #[test]
    fn test_unterminated_values() {
        assert_eq!(first_issue("A=\"open\nB=2").code, ErrorCode::E001);
        assert_eq!(first_issue("A='open").code, ErrorCode::E002);
    }

    #[test]
    fn test_unexpected_input() {
        assert_eq!(first_issue("=value").code, ErrorCode::E005);
        assert_eq!(first_issue("KEY value").code, ErrorCode::E005);
        assert_eq!(first_issue("A=\"x\" trailing").code, ErrorCode::E006);
    }

    #[test]
    fn test_scanning_resumes_after_illegal_line() {
        let tokens: Vec<Token<'_>> = Scanner::new("=bad\nA=1").collect();
        assert_eq!(tokens[0].kind, TokenKind::Illegal);
        assert!(tokens.iter().any(|t| t.literal == "A" && t.line == 2));
    }

    #[test]
    fn test_oversized_token() {
        let source = format!("A={}", "x".repeat(MAX_TOKEN_LENGTH + 1));
        assert_eq!(first_issue(&source).code, ErrorCode::E003);
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = b"A=1\nB=\xff\xfe";
        let illegal = Scanner::from_bytes(bytes)
            .find(|token| token.is(TokenKind::Illegal))
            .unwrap();
        assert_eq!(illegal.issue.unwrap().code, ErrorCode::E004);
        assert_eq!(illegal.offset, 6);
        assert_eq!(illegal.length, 1);
    }

    #[test]
    fn test_tokenize_collects_every_issue() {
        let err = tokenize(Scanner::new("=one\n=two\nA=1")).unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E005));
        assert_eq!(err.diagnostics()[1].line(), Some(2));
    }
}
