//! Command-line argument definitions for the Ziggurat CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input path, output directory,
//! configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Ziggurat compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input Ziggurat source file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Directory the generated artifacts are written into
    #[arg(short, long, default_value = ".")]
    pub out_dir: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
