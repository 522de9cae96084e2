//! Error types for Ziggurat compilation.
//!
//! This module provides the main error type [`ZigguratError`] which wraps
//! the error conditions that can occur while compiling a program and
//! writing its artifacts.

use std::io;

use thiserror::Error;

use ziggurat_parser::error::ParseError;

/// The main error type for Ziggurat operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the structured diagnostics collected by the
/// parsing pipeline together with the source text, so callers can render
/// rich reports with source spans.
#[derive(Debug, Error)]
pub enum ZigguratError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },
}

impl ZigguratError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
