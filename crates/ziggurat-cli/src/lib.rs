//! CLI logic for the Ziggurat compiler.
//!
//! This module contains the core CLI logic for the Ziggurat compiler.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;

use ziggurat::{Compiler, ZigguratError};

/// Run the Ziggurat CLI application
///
/// This function compiles the input file through the Ziggurat pipeline
/// and writes every produced artifact into the output directory, sharing
/// the input file's stem. Returns the paths of the written artifacts.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `ZigguratError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
pub fn run(args: &Args) -> Result<Vec<PathBuf>, ZigguratError> {
    info!(
        input_path = args.input,
        out_dir = args.out_dir;
        "Compiling program"
    );

    // Load configuration
    let app_config = config::load_config(args.config.as_ref())?;

    // Read input file
    let source = fs::read_to_string(&args.input)?;

    // Compile using the Compiler API
    let compiler = Compiler::new(app_config);
    let artifacts = compiler.compile(&source)?;

    // Artifacts share the input file's stem
    let input_path = Path::new(&args.input);
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("out");

    let out_dir = Path::new(&args.out_dir);
    fs::create_dir_all(out_dir)?;
    let written = artifacts.write_to(out_dir, stem)?;

    info!(count = written.len(); "Artifacts exported successfully");

    Ok(written)
}
