//! Lexical analyzer for Ziggurat source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! It handles whitespace, comments, string literals, and all language tokens
//! defined in the [`tokens`](crate::tokens) module.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, opt, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, none_of, one_of, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()` to provide detailed error
/// messages with codes, help text, and precise span information.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    pub code: ErrorCode,
    pub message: &'static str,
    pub help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    pub start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Parse an escape sequence in a string starting with backslash.
///
/// Valid escapes: `\n`, `\t`, `\\`, `\'`.
fn string_escape<'a>(input: &mut Input<'a>) -> IResult<'a, char> {
    let escape_start = input.current_token_start();

    '\\'.parse_next(input)?;

    if let Ok(c) = one_of::<_, _, ContextError<LexerDiagnostic>>(['n', 't', '\\', '\''])
        .parse_next(input)
    {
        return Ok(match c {
            'n' => '\n',
            't' => '\t',
            other => other,
        });
    }

    Err(ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        LexerDiagnostic {
            code: ErrorCode::E003,
            message: "invalid escape sequence",
            help: Some("valid escapes: `\\n`, `\\t`, `\\\\`, `\\'`"),
            start: escape_start,
        },
    )))
}

/// Parse a complete string literal with single quotes.
///
/// Handles:
/// - Basic strings: `'hello world'`
/// - Escape sequences: `'it\'s'`, `'line\nbreak'`
/// - Empty strings: `''`
///
/// Strings may not span lines; an unescaped newline ends the literal with
/// an E001 diagnostic.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    // Regular string content (not quotes, backslashes, or newlines)
    let string_char = none_of(['\'', '\\', '\n', '\r']);

    let string_content =
        repeat(0.., alt((string_escape, string_char))).fold(String::new, |mut acc, ch| {
            acc.push(ch);
            acc
        });

    let start_pos = input.current_token_start();

    '\''.parse_next(input)
        .map_err(|_: ErrMode<ContextError<LexerDiagnostic>>| {
            ErrMode::Backtrack(ContextError::new())
        })?;

    // Commit after the opening quote; the error span covers from the quote
    // to the error position.
    cut_err(terminated(string_content, '\''))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `'`"),
            start: start_pos,
        })
        .parse_next(input)
        .map(Token::StringLiteral)
}

/// Parse an integer or float literal.
///
/// Digits with an optional fractional part. `42` lexes as an integer,
/// `0.85` as a float. An integer too large for `u64` falls back to float.
fn number_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let text = (
        take_while(1.., |c: char| c.is_ascii_digit()),
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))),
    )
        .take()
        .parse_next(input)?;

    if !text.contains('.') {
        if let Ok(n) = text.parse::<u64>() {
            return Ok(Token::IntLiteral(n));
        }
    }
    Ok(Token::FloatLiteral(text.parse::<f64>().unwrap_or(0.0)))
}

/// Parse line comment starting with '//'
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    preceded("//", take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

/// Parse a keyword or identifier.
///
/// Lexes one identifier-shaped word, then promotes it to a keyword token
/// when it matches a reserved word exactly. This gives word-boundary
/// behavior for free: `CONTEXTS` is an identifier, not `CONTEXT` + `S`.
fn word<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || c == '_'
    })
    .verify(|s: &str| {
        s.chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    })
    .map(|word: &str| match word {
        "CONTEXT" => Token::Context,
        "IDENTITY" => Token::Identity,
        "STORAGE" => Token::Storage,
        "HUB" => Token::Hub,
        "SATELLITE" => Token::Satellite,
        "LINK" => Token::Link,
        "WITH" => Token::With,
        "CONNECTS" => Token::Connects,
        "COMMAND" => Token::Command,
        "VALIDATION" => Token::Validation,
        "EXECUTION" => Token::Execution,
        "VECTORIZATION" => Token::Vectorization,
        "EMBEDDINGS" => Token::Embeddings,
        "PRESENTATION" => Token::Presentation,
        "STYLE" => Token::Style,
        "RULESET" => Token::RuleSet,
        "RAG_QUERY" => Token::RagQuery,
        "RETRIEVAL" => Token::Retrieval,
        "GENERATION" => Token::Generation,
        "BUSINESS_KEY" => Token::BusinessKey,
        "FUZZY_RESOLUTION" => Token::FuzzyResolution,
        "SPATIAL_ID" => Token::SpatialId,
        "temporal_tracking" => Token::TemporalTracking,
        "MATCH" => Token::Match,
        "USING" => Token::Using,
        "THRESHOLD" => Token::Threshold,
        "PRIMARY" => Token::Primary,
        "KEY" => Token::Key,
        "UNIQUE" => Token::Unique,
        "PARTITION" => Token::Partition,
        "CLUSTERED" => Token::Clustered,
        "BY" => Token::By,
        "MODEL" => Token::Model,
        "CHECK" => Token::Check,
        "ACTION" => Token::Action,
        "TARGET" => Token::Target,
        "PAYLOAD" => Token::Payload,
        other => Token::Identifier(other),
    })
    .parse_next(input)
}

/// Parse the arrow operator `->`
fn arrow<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    literal("->").value(Token::Arrow).parse_next(input)
}

/// Parse single character tokens
fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        ':'.value(Token::Colon),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        ';'.value(Token::Semicolon),
        ','.value(Token::Comma),
    ))
    .parse_next(input)
}

/// Parse whitespace (spaces, tabs, etc. but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

/// Parse newline
fn newline<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,      // Must come before single chars
        string_literal,    // Must come before any single char
        arrow,             // Must come before single char operators
        number_literal,    // Must come before word
        word,              // Keywords and identifiers
        single_char_token, // Single character tokens
        newline,           // Must come before whitespace
        whitespace,        // General whitespace
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    let span = Span::new(start_pos..end_pos);

    Ok(PositionedToken::new(token, span))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => {
                    self.tokens.push(token);
                }
                Err(e) => {
                    // Get position before recovery
                    let error_pos = input.current_token_start();

                    let diagnostic = Self::convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    // Single-character skip. A failed escape inside a string
                    // cascades into E001 because the closing quote then opens
                    // a new unterminated string.
                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    /// Finish lexing and return tokens or collected errors.
    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Extracts `LexerDiagnostic` from the error context for rich error info
    /// with code, message, and help. Falls back to E002 (unexpected character)
    /// if no diagnostic context is found.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        // Use the first diagnostic context if available
        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos);

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        // Fallback when no context is present
        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Parse tokens from a string input, collecting multiple errors.
///
/// Attempts to recover from errors and continue tokenizing, collecting
/// all errors encountered. This provides better user experience by
/// reporting multiple issues in a single pass.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens successfully parsed
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let located_input = LocatingSlice::new(input);
    let mut lexer = Lexer::new();
    lexer.tokenize(located_input);
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_single_token(input: &str, expected: Token<'_>) {
        let mut located_input = LocatingSlice::new(input);
        let result = positioned_token(&mut located_input);
        assert!(result.is_ok(), "Failed to parse: {}", input);
        let positioned = result.unwrap();
        assert_eq!(positioned.token, expected);
    }

    #[test]
    fn test_block_keywords() {
        test_single_token("CONTEXT", Token::Context);
        test_single_token("IDENTITY", Token::Identity);
        test_single_token("STORAGE", Token::Storage);
        test_single_token("HUB", Token::Hub);
        test_single_token("SATELLITE", Token::Satellite);
        test_single_token("LINK", Token::Link);
        test_single_token("WITH", Token::With);
        test_single_token("CONNECTS", Token::Connects);
        test_single_token("COMMAND", Token::Command);
        test_single_token("VALIDATION", Token::Validation);
        test_single_token("EXECUTION", Token::Execution);
        test_single_token("VECTORIZATION", Token::Vectorization);
        test_single_token("EMBEDDINGS", Token::Embeddings);
        test_single_token("PRESENTATION", Token::Presentation);
        test_single_token("STYLE", Token::Style);
        test_single_token("RULESET", Token::RuleSet);
        test_single_token("RAG_QUERY", Token::RagQuery);
        test_single_token("RETRIEVAL", Token::Retrieval);
        test_single_token("GENERATION", Token::Generation);
        test_single_token("BUSINESS_KEY", Token::BusinessKey);
        test_single_token("FUZZY_RESOLUTION", Token::FuzzyResolution);
        test_single_token("SPATIAL_ID", Token::SpatialId);
        test_single_token("temporal_tracking", Token::TemporalTracking);
    }

    #[test]
    fn test_clause_keywords() {
        test_single_token("MATCH", Token::Match);
        test_single_token("USING", Token::Using);
        test_single_token("THRESHOLD", Token::Threshold);
        test_single_token("PRIMARY", Token::Primary);
        test_single_token("KEY", Token::Key);
        test_single_token("UNIQUE", Token::Unique);
        test_single_token("PARTITION", Token::Partition);
        test_single_token("CLUSTERED", Token::Clustered);
        test_single_token("BY", Token::By);
        test_single_token("MODEL", Token::Model);
        test_single_token("CHECK", Token::Check);
        test_single_token("ACTION", Token::Action);
        test_single_token("TARGET", Token::Target);
        test_single_token("PAYLOAD", Token::Payload);
    }

    #[test]
    fn test_identifiers() {
        test_single_token("hello", Token::Identifier("hello"));
        test_single_token("_private", Token::Identifier("_private"));
        test_single_token("var123", Token::Identifier("var123"));
        test_single_token("CamelCase", Token::Identifier("CamelCase"));
        test_single_token("VARCHAR", Token::Identifier("VARCHAR"));
    }

    #[test]
    fn test_keyword_word_boundaries() {
        // Keywords are only promoted on exact match
        test_single_token("CONTEXT", Token::Context);
        test_single_token("CONTEXTS", Token::Identifier("CONTEXTS"));
        test_single_token("CONTEXT_A", Token::Identifier("CONTEXT_A"));
        test_single_token("HUBCAP", Token::Identifier("HUBCAP"));
        // Keywords are case-sensitive
        test_single_token("context", Token::Identifier("context"));
        test_single_token("hub", Token::Identifier("hub"));

        let input = "HUB Person";
        let tokens = tokenize(input).unwrap();
        assert_eq!(tokens.len(), 3); // HUB, space, Person
        assert_eq!(tokens[0].token, Token::Hub);
        assert_eq!(tokens[1].token, Token::Whitespace);
        assert_eq!(tokens[2].token, Token::Identifier("Person"));
    }

    #[test]
    fn test_operators() {
        test_single_token("->", Token::Arrow);
        test_single_token(":", Token::Colon);
    }

    #[test]
    fn test_punctuation() {
        test_single_token("{", Token::LeftBrace);
        test_single_token("}", Token::RightBrace);
        test_single_token("(", Token::LeftParen);
        test_single_token(")", Token::RightParen);
        test_single_token("[", Token::LeftBracket);
        test_single_token("]", Token::RightBracket);
        test_single_token(";", Token::Semicolon);
        test_single_token(",", Token::Comma);
    }

    #[test]
    fn test_string_literals() {
        test_single_token(
            "'hello world'",
            Token::StringLiteral("hello world".to_string()),
        );
        test_single_token("''", Token::StringLiteral("".to_string()));
        test_single_token("'abc123'", Token::StringLiteral("abc123".to_string()));
        test_single_token(
            "'VARCHAR(200)'",
            Token::StringLiteral("VARCHAR(200)".to_string()),
        );
    }

    #[test]
    fn test_string_escape_sequences() {
        test_single_token(
            "'hello\\nworld'",
            Token::StringLiteral("hello\nworld".to_string()),
        );
        test_single_token(
            "'it\\'s fine'",
            Token::StringLiteral("it's fine".to_string()),
        );
        test_single_token(
            "'tab:\\tafter'",
            Token::StringLiteral("tab:\tafter".to_string()),
        );
        test_single_token(
            "'backslash: \\\\'",
            Token::StringLiteral("backslash: \\".to_string()),
        );
    }

    #[test]
    fn test_int_literals() {
        test_single_token("0", Token::IntLiteral(0));
        test_single_token("5", Token::IntLiteral(5));
        test_single_token("42", Token::IntLiteral(42));
        test_single_token("10000", Token::IntLiteral(10000));
    }

    #[test]
    fn test_float_literals() {
        test_single_token("1.0", Token::FloatLiteral(1.0));
        test_single_token("0.85", Token::FloatLiteral(0.85));
        test_single_token("0.5", Token::FloatLiteral(0.5));
        test_single_token("999999.999999", Token::FloatLiteral(999999.999999));
    }

    #[test]
    fn test_comments() {
        test_single_token(
            "// this is a comment",
            Token::LineComment(" this is a comment"),
        );
        test_single_token("//", Token::LineComment(""));
        test_single_token("//no space", Token::LineComment("no space"));
    }

    #[test]
    fn test_whitespace() {
        test_single_token(" ", Token::Whitespace);
        test_single_token("\t", Token::Whitespace);
        test_single_token("   ", Token::Whitespace);
        test_single_token("\n", Token::Newline);
    }

    #[test]
    fn test_full_lexing() {
        let input = "HUB Person { PersonKey: UUID PRIMARY KEY; }";
        let result = tokenize(input);

        assert!(result.is_ok(), "Lexing failed: {:?}", result);
        let tokens = result.unwrap();
        let token_types: Vec<_> = tokens.iter().map(|p| &p.token).collect();

        assert!(matches!(token_types[0], Token::Hub));
        assert!(matches!(token_types[1], Token::Whitespace));
        assert!(matches!(token_types[2], Token::Identifier("Person")));
        assert!(matches!(token_types[3], Token::Whitespace));
        assert!(matches!(token_types[4], Token::LeftBrace));
        assert!(matches!(token_types[5], Token::Whitespace));
        assert!(matches!(token_types[6], Token::Identifier("PersonKey")));
        assert!(matches!(token_types[7], Token::Colon));
        assert!(matches!(token_types[8], Token::Whitespace));
        assert!(matches!(token_types[9], Token::Identifier("UUID")));
        assert!(matches!(token_types[10], Token::Whitespace));
        assert!(matches!(token_types[11], Token::Primary));
        assert!(matches!(token_types[12], Token::Whitespace));
        assert!(matches!(token_types[13], Token::Key));
        assert!(matches!(token_types[14], Token::Semicolon));
    }

    #[test]
    fn test_arrow_in_execution_step() {
        let tokens = tokenize("ingest -> staging").unwrap();
        let token_types: Vec<_> = tokens.iter().map(|p| &p.token).collect();
        assert!(matches!(token_types[0], Token::Identifier("ingest")));
        assert!(matches!(token_types[2], Token::Arrow));
        assert!(matches!(token_types[4], Token::Identifier("staging")));
    }

    #[test]
    fn test_span_tracking() {
        let input = "hello world";
        let result = tokenize(input);

        assert!(result.is_ok());
        let tokens = result.unwrap();

        assert_eq!(tokens.len(), 3); // "hello", " ", "world"

        assert_eq!(tokens[0].span.start(), 0);
        assert_eq!(tokens[0].span.end(), 5); // "hello"
        assert_eq!(tokens[1].span.start(), 5);
        assert_eq!(tokens[1].span.end(), 6); // " "
        assert_eq!(tokens[2].span.start(), 6);
        assert_eq!(tokens[2].span.end(), 11); // "world"
    }

    /// Comprehensive lexer error tests focusing on error codes and spans
    mod lexer_error_tests {
        use super::*;

        /// Helper to verify error codes in diagnostics match exactly in order.
        fn assert_error_codes(input: &str, expected_codes: &[ErrorCode]) {
            let result = tokenize(input);
            assert!(result.is_err(), "Expected lexer to fail on input: '{input}'");
            let parse_error = result.unwrap_err();
            let diagnostics = parse_error.diagnostics();
            assert_eq!(
                diagnostics.len(),
                expected_codes.len(),
                "Expected {} errors for input '{input}', got {}",
                expected_codes.len(),
                diagnostics.len()
            );
            for (i, (diag, expected)) in diagnostics.iter().zip(expected_codes).enumerate() {
                assert_eq!(
                    diag.code(),
                    Some(*expected),
                    "Error {i}: expected {expected:?} for input '{input}', got {:?}",
                    diag.code()
                );
            }
        }

        #[test]
        fn test_error_code_e001_unterminated_string() {
            assert_error_codes("'unterminated", &[ErrorCode::E001]);
            assert_error_codes("'", &[ErrorCode::E001]);
        }

        #[test]
        fn test_error_code_e002_unexpected_character() {
            assert_error_codes(">", &[ErrorCode::E002]);
            assert_error_codes("$", &[ErrorCode::E002]);
            assert_error_codes("=", &[ErrorCode::E002]);
        }

        #[test]
        fn test_error_code_e003_invalid_escape_sequence() {
            // Invalid escape produces E003, then the closing quote opens a
            // new unterminated string and cascades into E001.
            assert_error_codes("'test\\x'", &[ErrorCode::E003, ErrorCode::E001]);
            assert_error_codes("'test\\q'", &[ErrorCode::E003, ErrorCode::E001]);
            assert_error_codes("'test\\1'", &[ErrorCode::E003, ErrorCode::E001]);
        }

        #[test]
        fn test_multiple_unterminated_strings() {
            assert_error_codes(
                "'first\n'second\n'third",
                &[ErrorCode::E001, ErrorCode::E001, ErrorCode::E001],
            );
        }

        #[test]
        fn test_mixed_error_types() {
            assert_error_codes(
                "> 'unterminated\n$",
                &[ErrorCode::E002, ErrorCode::E001, ErrorCode::E002],
            );
        }

        #[test]
        fn test_errors_with_valid_tokens_between() {
            assert_error_codes(
                "valid > identifier $ another",
                &[ErrorCode::E002, ErrorCode::E002],
            );
        }

        #[test]
        fn test_unterminated_string_span() {
            // Span covers from the opening quote to the error position
            let input = "foo 'hello world\nbar";
            let result = tokenize(input);
            assert!(result.is_err());

            let parse_error = result.unwrap_err();
            let diagnostics = parse_error.diagnostics();
            assert!(!diagnostics.is_empty(), "Expected at least one diagnostic");
            let labels = diagnostics[0].labels();
            assert!(!labels.is_empty(), "Expected at least one label");

            let span = labels[0].span();
            assert_eq!(span.start(), 4, "Span should start at the opening quote");
            assert_eq!(span.end(), 16, "Span should end at the newline");
        }
    }
}
