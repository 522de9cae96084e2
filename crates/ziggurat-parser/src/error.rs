//! The Ziggurat diagnostic system.
//!
//! Every phase of the pipeline (lexing, parsing, lowering) reports problems
//! as [`Diagnostic`]s with precise source spans. Phases accumulate
//! diagnostics in a [`DiagnosticCollector`] so a single run can report as
//! many problems as possible; a non-empty error collection halts the
//! pipeline before the next phase.

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;

/// A type alias for `Result<T, Diagnostic>`.
pub type Result<T> = std::result::Result<T, Diagnostic>;
