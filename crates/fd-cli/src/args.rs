//! Command-line argument definitions for the fd CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the input path, output format,
//! configuration file selection, error budget and logging verbosity.

use clap::{Parser, ValueEnum};
use serde::Deserialize;

/// How the syntax tree is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// S-expression of named nodes and fields
    #[default]
    Sexp,
    /// Canonically formatted fd source
    Pretty,
}

/// Command-line arguments for the fd parser tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input fd file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Output format; overrides the configuration file
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Stop recovering after this many syntax errors; overrides the
    /// configuration file
    #[arg(long)]
    pub max_errors: Option<usize>,
}
