//! Error codes for the Ziggurat diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Lowering (AST construction) errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but never closed.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that is not valid in this context.
    E002,

    /// Invalid escape sequence.
    ///
    /// An unrecognized escape sequence was used in a string literal.
    /// Valid escapes are: `\n`, `\t`, `\\`, `\'`.
    E003,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended unexpectedly before a complete construct was parsed.
    E101,

    // =========================================================================
    // Lowering Errors (E2xx)
    // =========================================================================
    /// Fuzzy threshold out of range.
    ///
    /// A `FUZZY_RESOLUTION` threshold must lie in `[0, 1]`.
    E200,

    /// Duplicate storage block.
    ///
    /// A context may declare at most one `STORAGE` section.
    E201,

    /// Duplicate singleton block.
    ///
    /// A context may declare at most one `VECTORIZATION`, `RULESET`, or
    /// `PRESENTATION` section.
    E202,

    /// Temporal tracking on a non-satellite.
    ///
    /// The `temporal_tracking` flag is only valid on `SATELLITE` tables.
    E203,

    /// Connects clause on a non-link.
    ///
    /// The `CONNECTS` clause is only valid on `LINK` tables.
    E204,

    /// Duplicate table name.
    ///
    /// Two tables in the same storage block share a name.
    E205,

    /// Duplicate column name.
    ///
    /// Two columns in the same table share a name.
    E206,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            // Parser errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            // Lowering errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            // Parser errors
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            // Lowering errors
            ErrorCode::E200 => "fuzzy threshold out of range",
            ErrorCode::E201 => "duplicate storage block",
            ErrorCode::E202 => "duplicate singleton block",
            ErrorCode::E203 => "temporal tracking on a non-satellite",
            ErrorCode::E204 => "connects clause on a non-link",
            ErrorCode::E205 => "duplicate table name",
            ErrorCode::E206 => "duplicate column name",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
