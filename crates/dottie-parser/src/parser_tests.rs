//! Unit tests for the env file parser
//!
//! These run the scanner and parser together over small sources and check
//! the resulting document structure and the diagnostics for bad input.

use dottie_core::{CancellationToken, Document, Quote, Statement};

use crate::{
    error::{ErrorCode, ParseError},
    parser, scanner,
};

/// Scan and parse a source string
fn parse_source(source: &str) -> Result<Document, ParseError> {
    let tokens = scanner::tokenize(scanner::Scanner::new(source))?;
    let document = parser::build_document(&tokens, ".env", &CancellationToken::new())?;
    Ok(document)
}

/// Parse a source string and panic with the diagnostic on failure
fn assert_parses_successfully(source: &str) -> Document {
    match parse_source(source) {
        Ok(document) => document,
        Err(e) => panic!("Expected parsing to succeed, but got error: {e}"),
    }
}

/// Parse a source string and return the code of the first diagnostic
fn assert_parse_fails(source: &str) -> ErrorCode {
    let Err(err) = parse_source(source) else {
        panic!("Expected parsing to fail, but it succeeded");
    };
    err.diagnostics()
        .first()
        .and_then(|diagnostic| diagnostic.code())
        .expect("Expected a diagnostic with an error code")
}

fn literal<'a>(document: &'a Document, name: &str) -> &'a str {
    document
        .get(name)
        .unwrap_or_else(|| panic!("Expected {name} to be defined"))
        .literal()
}

mod assignments {
    use super::*;

    #[test]
    fn test_bare_value() {
        let document = assert_parses_successfully("PORT=8080\n");
        let port = document.get("PORT").unwrap();
        assert_eq!(port.literal(), "8080");
        assert_eq!(port.quote(), Quote::Unquoted);
        assert!(port.is_enabled());
        assert!(port.is_complete());
    }

    #[test]
    fn test_whitespace_around_assign() {
        let document = assert_parses_successfully("  NAME =  value\n");
        assert_eq!(literal(&document, "NAME"), "value");
    }

    #[test]
    fn test_bare_value_keeps_hash() {
        let document = assert_parses_successfully("URL=http://host/#anchor\n");
        assert_eq!(literal(&document, "URL"), "http://host/#anchor");
    }

    #[test]
    fn test_bare_value_interprets_escapes() {
        let document = assert_parses_successfully("TEXT=a\\tb\\nc\n");
        assert_eq!(literal(&document, "TEXT"), "a\tb\nc");
    }

    #[test]
    fn test_empty_value() {
        let document = assert_parses_successfully("EMPTY=\nLAST=");
        assert_eq!(literal(&document, "EMPTY"), "");
        assert_eq!(literal(&document, "LAST"), "");
        assert!(document.get("LAST").unwrap().is_complete());
    }

    #[test]
    fn test_key_without_assign_is_incomplete() {
        let document = assert_parses_successfully("TOKEN\n");
        let token = document.get("TOKEN").unwrap();
        assert!(!token.is_complete());
        assert_eq!(token.literal(), "");
    }

    #[test]
    fn test_identifier_characters() {
        let document = assert_parses_successfully("my.key-name,x_1=ok\nÜBER=1\n");
        assert!(document.has("my.key-name,x_1"));
        assert!(document.has("ÜBER"));
    }

    #[test]
    fn test_missing_final_newline() {
        let document = assert_parses_successfully("A=1\nB=2");
        assert_eq!(literal(&document, "B"), "2");
        assert_eq!(document.statement_count(), 2);
    }

    #[test]
    fn test_crlf_line_endings() {
        let document = assert_parses_successfully("A=1\r\nB=two\r\n");
        assert_eq!(literal(&document, "A"), "1");
        assert_eq!(literal(&document, "B"), "two");
    }

    #[test]
    fn test_leading_bom_is_skipped() {
        let document = assert_parses_successfully("\u{FEFF}A=1\n");
        assert!(document.has("A"));
    }
}

mod quotes {
    use super::*;

    #[test]
    fn test_double_quoted_value() {
        let document = assert_parses_successfully("GREETING=\"hello \\\"world\\\"\"\n");
        let greeting = document.get("GREETING").unwrap();
        assert_eq!(greeting.literal(), "hello \"world\"");
        assert_eq!(greeting.quote(), Quote::Double);
        assert_eq!(greeting.raw(), Some("hello \\\"world\\\""));
    }

    #[test]
    fn test_single_quoted_value_is_raw() {
        let document = assert_parses_successfully("PATTERN='a\\nb $HOME \\'x\\''\n");
        let pattern = document.get("PATTERN").unwrap();
        assert_eq!(pattern.literal(), "a\\nb $HOME 'x'");
        assert_eq!(pattern.quote(), Quote::Single);
    }

    #[test]
    fn test_multiline_double_quoted_value() {
        let document = assert_parses_successfully("KEY=\"line one\nline two\"\nNEXT=1\n");
        assert_eq!(literal(&document, "KEY"), "line one\nline two");

        let key = document.get("KEY").unwrap();
        assert_eq!(key.position().line(), 1);
        assert_eq!(key.position().last_line(), 2);
        assert_eq!(document.get("NEXT").unwrap().position().line(), 3);
    }

    #[test]
    fn test_quoted_value_followed_by_whitespace() {
        let document = assert_parses_successfully("A=\"x\"   \n");
        assert_eq!(literal(&document, "A"), "x");
    }

    #[test]
    fn test_unterminated_double_quote() {
        assert_eq!(assert_parse_fails("A=\"open\nB=1\n"), ErrorCode::E001);
    }

    #[test]
    fn test_unterminated_single_quote() {
        assert_eq!(assert_parse_fails("A='open\n"), ErrorCode::E002);
    }

    #[test]
    fn test_content_after_quoted_value() {
        assert_eq!(assert_parse_fails("A=\"x\" trailing\n"), ErrorCode::E006);
    }
}

mod comments {
    use super::*;

    #[test]
    fn test_comment_attaches_to_next_assignment() {
        let document = assert_parses_successfully("# first\n# second\nKEY=1\n");
        let key = document.get("KEY").unwrap();
        let comments: Vec<&str> = key.comments().iter().map(|c| c.value()).collect();
        assert_eq!(comments, ["# first", "# second"]);
        assert_eq!(document.statement_count(), 1);
    }

    #[test]
    fn test_blank_line_detaches_comment() {
        let document = assert_parses_successfully("# standalone\n\nKEY=1\n");
        assert!(!document.get("KEY").unwrap().has_comments());

        let kinds: Vec<bool> = document
            .iter_statements()
            .map(Statement::is_comment)
            .collect();
        assert_eq!(kinds, [true, false, false]);
        assert!(document.statements()[1].is_newline());
    }

    #[test]
    fn test_trailing_comment_is_standalone() {
        let document = assert_parses_successfully("KEY=1\n# the end\n");
        assert_eq!(document.statement_count(), 2);
        assert!(document.statements()[1].is_comment());
    }

    #[test]
    fn test_comment_keeps_exact_text() {
        let document = assert_parses_successfully("#no space   \n");
        let Statement::Comment(comment) = &document.statements()[0] else {
            panic!("Expected a comment");
        };
        assert_eq!(comment.value(), "#no space   ");
    }

    #[test]
    fn test_indented_comment() {
        let document = assert_parses_successfully("   # indented\nKEY=1\n");
        assert_eq!(document.get("KEY").unwrap().comments().len(), 1);
    }
}

mod annotations {
    use super::*;

    #[test]
    fn test_validation_rule_is_attached() {
        let document =
            assert_parses_successfully("# @dottie/validate required,number\nPORT=8080\n");
        let port = document.get("PORT").unwrap();
        assert_eq!(port.validation_rule(), Some("required,number"));
    }

    #[test]
    fn test_hidden_annotation() {
        let document = assert_parses_successfully("# @dottie/hidden\nSECRET=x\nSHOWN=y\n");
        assert!(document.get("SECRET").unwrap().is_hidden());
        assert!(!document.get("SHOWN").unwrap().is_hidden());
    }

    #[test]
    fn test_reserved_annotations_are_indexed() {
        let source = "# @dottie/source https://example.com/.env\n\n# @owner team-a\nA=1\n";
        let document = assert_parses_successfully(source);
        assert_eq!(
            document.get_config("source"),
            Some("https://example.com/.env")
        );
        assert!(document.annotation("owner").is_empty());
        assert_eq!(document.get("A").unwrap().annotation("owner"), Some("team-a"));
    }
}

mod disabled {
    use super::*;

    #[test]
    fn test_disabled_assignment() {
        let document = assert_parses_successfully("#DEBUG=true\n");
        let debug = document.get("DEBUG").unwrap();
        assert!(!debug.is_enabled());
        assert_eq!(debug.literal(), "true");
    }

    #[test]
    fn test_disabled_assignment_with_space_after_hash() {
        let document = assert_parses_successfully("#   DEBUG=\"on\"\n");
        let debug = document.get("DEBUG").unwrap();
        assert!(!debug.is_enabled());
        assert_eq!(debug.quote(), Quote::Double);
    }

    #[test]
    fn test_hash_word_without_assign_is_comment() {
        let document = assert_parses_successfully("# DEBUG mode below\n#TODO\nA=1\n");
        assert!(!document.has("DEBUG"));
        assert!(!document.has("TODO"));
        assert_eq!(document.get("A").unwrap().comments().len(), 2);
    }

    #[test]
    fn test_disabled_assignment_takes_comments() {
        let document = assert_parses_successfully("# Turn on tracing\n#TRACE=1\n");
        assert_eq!(document.get("TRACE").unwrap().comments().len(), 1);
    }
}

mod groups {
    use super::*;

    pub(super) const SOURCE: &str = "\
TOP=1

################################################################################
# Database
################################################################################

DB_HOST=localhost
DB_PORT=5432

################################################################################
# Cache
################################################################################
REDIS_URL=redis://localhost
";

    #[test]
    fn test_groups_are_opened_by_banners() {
        let document = assert_parses_successfully(SOURCE);
        let names: Vec<&str> = document.groups().iter().map(|g| g.name()).collect();
        assert_eq!(names, ["Database", "Cache"]);
        assert_eq!(document.get("TOP").unwrap().group(), None);
        assert_eq!(document.get("DB_PORT").unwrap().group(), Some("Database"));
        assert_eq!(document.get("REDIS_URL").unwrap().group(), Some("Cache"));
    }

    #[test]
    fn test_group_line_range() {
        let document = assert_parses_successfully(SOURCE);
        let database = document.group("Database").unwrap();
        assert_eq!(database.first_line(), 3);
        assert_eq!(database.last_line(), 9);
    }

    #[test]
    fn test_blank_lines_inside_group_belong_to_it() {
        let document = assert_parses_successfully(SOURCE);
        let database = document.group("Database").unwrap();
        assert!(database.statements()[0].is_newline());
        assert_eq!(database.statements()[0].group(), Some("Database"));
    }

    #[test]
    fn test_short_banner() {
        let document = assert_parses_successfully("###\n# Small\n###\nA=1\n");
        assert!(document.has_group("Small"));
    }
}

mod positions {
    use super::*;

    #[test]
    fn test_first_line_covers_comments() {
        let document = assert_parses_successfully("A=1\n\n# about b\n# more\nB=2\n");
        let b = document.get("B").unwrap().position();
        assert_eq!(b.line(), 5);
        assert_eq!(b.first_line(), 3);
        assert_eq!(b.last_line(), 5);
    }

    #[test]
    fn test_indices_are_sequential() {
        let document = assert_parses_successfully(groups::SOURCE);
        let indices: Vec<usize> = document
            .iter_statements()
            .map(|statement| statement.position().index())
            .collect();
        let expected: Vec<usize> = (0..document.statement_count()).collect();
        assert_eq!(indices, expected);
    }

    #[test]
    fn test_file_is_recorded() {
        let document = assert_parses_successfully("A=1\n");
        assert_eq!(document.get("A").unwrap().position().file(), ".env");
    }
}

mod dependencies {
    use super::*;

    #[test]
    fn test_edges_are_built() {
        let document = assert_parses_successfully("HOST=db\nURL=postgres://${HOST}:${PORT:-5432}\n");
        let url = document.get("URL").unwrap();
        assert!(url.dependencies().contains_key("HOST"));
        assert!(url.dependencies().contains_key("PORT"));
        assert!(document.get("HOST").unwrap().dependents().contains("URL"));
    }

    #[test]
    fn test_single_quoted_values_have_no_edges() {
        let document = assert_parses_successfully("HOST=db\nURL='${HOST}'\n");
        assert!(document.get("URL").unwrap().dependencies().is_empty());
    }
}

mod errors {
    use super::*;

    #[test]
    fn test_duplicate_key() {
        assert_eq!(assert_parse_fails("A=1\nB=2\nA=3\n"), ErrorCode::E101);
    }

    #[test]
    fn test_key_followed_by_garbage() {
        assert_eq!(assert_parse_fails("KEY value\n"), ErrorCode::E005);
    }

    #[test]
    fn test_line_starting_with_symbol() {
        assert_eq!(assert_parse_fails("=value\n"), ErrorCode::E005);
    }

    #[test]
    fn test_every_scan_problem_is_reported() {
        let err = parse_source("=a\nB=1\n!c\n").unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
    }

    #[test]
    fn test_diagnostic_points_at_token() {
        let err = parse_source("A=1\nA=2\n").unwrap_err();
        let span = err.diagnostics()[0].primary_span().unwrap();
        assert_eq!(span.start(), 4);
        assert_eq!(span.len(), 1);
    }
}
