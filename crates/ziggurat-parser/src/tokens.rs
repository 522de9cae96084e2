//! Token types for the Ziggurat language.

use std::fmt;

use winnow::stream::Location;

use crate::span::Span;

/// Token types for the Ziggurat language.
///
/// Block keywords are lexed as dedicated tokens. Attribute directives that
/// only ever appear as `NAME:` inside a block (`COLOR`, `ALGORITHM`,
/// `TOP_K`, ...) stay plain identifiers and are matched by name in the
/// parser, which keeps the keyword set down to the words that shape the
/// block structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Block keywords
    Context,
    Identity,
    Storage,
    Hub,
    Satellite,
    Link,
    With,
    Connects,
    Command,
    Validation,
    Execution,
    Vectorization,
    Embeddings,
    Presentation,
    Style,
    RuleSet,
    RagQuery,
    Retrieval,
    Generation,
    BusinessKey,
    FuzzyResolution,
    SpatialId,
    TemporalTracking,

    // Clause keywords
    Match,
    Using,
    Threshold,
    Primary,
    Key,
    Unique,
    Partition,
    Clustered,
    By,
    Model,
    Check,
    Action,
    Target,
    Payload,

    // Literals
    StringLiteral(String),
    IntLiteral(u64),
    FloatLiteral(f64),
    Identifier(&'src str),

    // Operators
    Arrow, // ->
    Colon, // :

    // Punctuation
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Semicolon,    // ;
    Comma,        // ,

    // Comments
    LineComment(&'src str), // // comment

    // Whitespace
    Whitespace,
    Newline,
}

/// A token with position information for winnow integration.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<'src> AsRef<Token<'src>> for PositionedToken<'src> {
    fn as_ref(&self) -> &Token<'src> {
        &self.token
    }
}

impl<'src> fmt::Display for PositionedToken<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl Location for PositionedToken<'_> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Context => write!(f, "CONTEXT"),
            Token::Identity => write!(f, "IDENTITY"),
            Token::Storage => write!(f, "STORAGE"),
            Token::Hub => write!(f, "HUB"),
            Token::Satellite => write!(f, "SATELLITE"),
            Token::Link => write!(f, "LINK"),
            Token::With => write!(f, "WITH"),
            Token::Connects => write!(f, "CONNECTS"),
            Token::Command => write!(f, "COMMAND"),
            Token::Validation => write!(f, "VALIDATION"),
            Token::Execution => write!(f, "EXECUTION"),
            Token::Vectorization => write!(f, "VECTORIZATION"),
            Token::Embeddings => write!(f, "EMBEDDINGS"),
            Token::Presentation => write!(f, "PRESENTATION"),
            Token::Style => write!(f, "STYLE"),
            Token::RuleSet => write!(f, "RULESET"),
            Token::RagQuery => write!(f, "RAG_QUERY"),
            Token::Retrieval => write!(f, "RETRIEVAL"),
            Token::Generation => write!(f, "GENERATION"),
            Token::BusinessKey => write!(f, "BUSINESS_KEY"),
            Token::FuzzyResolution => write!(f, "FUZZY_RESOLUTION"),
            Token::SpatialId => write!(f, "SPATIAL_ID"),
            Token::TemporalTracking => write!(f, "temporal_tracking"),

            Token::Match => write!(f, "MATCH"),
            Token::Using => write!(f, "USING"),
            Token::Threshold => write!(f, "THRESHOLD"),
            Token::Primary => write!(f, "PRIMARY"),
            Token::Key => write!(f, "KEY"),
            Token::Unique => write!(f, "UNIQUE"),
            Token::Partition => write!(f, "PARTITION"),
            Token::Clustered => write!(f, "CLUSTERED"),
            Token::By => write!(f, "BY"),
            Token::Model => write!(f, "MODEL"),
            Token::Check => write!(f, "CHECK"),
            Token::Action => write!(f, "ACTION"),
            Token::Target => write!(f, "TARGET"),
            Token::Payload => write!(f, "PAYLOAD"),

            Token::StringLiteral(s) => write!(f, "'{s}'"),
            Token::IntLiteral(n) => write!(f, "{n}"),
            Token::FloatLiteral(n) => write!(f, "{n}"),
            Token::Identifier(name) => write!(f, "{name}"),

            Token::Arrow => write!(f, "->"),
            Token::Colon => write!(f, ":"),

            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),

            Token::LineComment(comment) => write!(f, "//{comment}"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => write!(f, "\\n"),
        }
    }
}
