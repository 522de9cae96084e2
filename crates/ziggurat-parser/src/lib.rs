//! # Ziggurat Parser
//!
//! Parser for the Ziggurat modeling language. This crate provides the
//! pipeline from source text to the semantic program representation in
//! `ziggurat_core::ast`.
//!
//! ## Usage
//!
//! ```
//! # use ziggurat_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         CONTEXT Sales {
//!             STORAGE {
//!                 HUB hub_customer WITH {
//!                     customer_key: UUID PRIMARY KEY
//!                 }
//!             }
//!         }
//!     "#;
//!
//!     let program = parse(source)?;
//!     assert_eq!(program.contexts.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;
mod lexer;
mod lower;
mod parser;
mod parser_types;
mod span;
mod tokens;

pub use error::ParseError;
pub use span::{Span, Spanned};

use ziggurat_core::ast::Program;

/// Parse source text into a semantic [`Program`].
///
/// This is the main entry point for parsing Ziggurat source code. It
/// orchestrates the complete pipeline:
///
/// 1. **Tokenize** - Convert source text to tokens, collecting all lexical
///    errors in one pass
/// 2. **Parse** - Build the parse tree, recovering at context granularity
/// 3. **Lower** - Decode the parse tree into the semantic AST, running the
///    semantic checks (thresholds, singleton blocks, kind restrictions,
///    duplicate names)
///
/// Each phase accumulates as many diagnostics as it can; any error fails
/// the overall parse with every collected diagnostic attached.
///
/// # Example
///
/// ```
/// # use ziggurat_parser::parse;
///
/// let err = parse("CONTEXT Broken {").expect_err("unclosed context");
/// assert!(!err.diagnostics().is_empty());
/// ```
pub fn parse(source: &str) -> Result<Program, ParseError> {
    // Step 1: Tokenize
    let tokens = lexer::tokenize(source)?;

    // Step 2: Parse
    let parsed = parser::build_program(&tokens)?;

    // Step 3: Lower
    lower::lower(&parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pipeline_end_to_end() {
        let program = parse(
            "CONTEXT Sales {
                STORAGE {
                    HUB hub_customer WITH { customer_key: UUID PRIMARY KEY }
                }
                COMMAND Ingest {
                    EXECUTION { ACTION: a -> TARGET: hub_customer; }
                }
            }",
        )
        .expect("should parse");

        assert_eq!(program.contexts.len(), 1);
        assert!(program.contexts[0].storage.is_some());
        assert_eq!(program.contexts[0].commands.len(), 1);
    }

    #[test]
    fn test_parse_reports_lexer_errors() {
        let err = parse("CONTEXT Sales { $ }").expect_err("should fail");
        assert!(!err.diagnostics().is_empty());
    }

    #[test]
    fn test_parse_reports_lowering_errors() {
        let err = parse(
            "CONTEXT C {
                IDENTITY I {
                    FUZZY_RESOLUTION { MATCH: a USING exact THRESHOLD 3.5; }
                }
            }",
        )
        .expect_err("should fail");
        assert_eq!(err.diagnostics().len(), 1);
    }
}
