//! Error type for CLI runs.

use std::io;

use thiserror::Error;

use fd_syntax::error::ParseError;

use crate::config::ConfigError;

/// Everything that can make a CLI run fail.
///
/// The `Parse` variant carries the source so diagnostics can be rendered
/// with snippets.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{err}")]
    Parse { err: ParseError, src: String },
}

impl CliError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
