//! CLI logic for the fd parser tool.
//!
//! This module parses an fd file, writes its syntax tree to an output
//! stream, and reports diagnostics as an error.

pub mod config;
pub mod error;
pub mod error_adapter;

mod args;

pub use args::{Args, OutputFormat};
pub use error::CliError;

use std::{fs, io::Write};

use log::info;

use fd_syntax::error::ParseError;

/// Run the fd CLI application
///
/// The tree is always written to `out`, even when the document has errors.
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Documents with diagnostics
pub fn run(args: &Args, out: &mut impl Write) -> Result<(), CliError> {
    info!(input_path = args.input; "Parsing document");

    let app_config = config::load_config(args.config.as_ref())?;
    let mut parse_config = app_config.parser().clone();
    if let Some(max_errors) = args.max_errors {
        parse_config = parse_config.with_error_budget(max_errors);
    }
    let format = args.format.unwrap_or(app_config.output().format());

    let source = fs::read_to_string(&args.input)?;
    let tree = fd_syntax::parse_with_config(&source, &parse_config);

    let rendered = match format {
        OutputFormat::Sexp => format!("{}\n", tree.to_sexp()),
        OutputFormat::Pretty => fd_syntax::print(&tree),
    };
    out.write_all(rendered.as_bytes())?;

    if !tree.diagnostics().is_empty() {
        info!(diagnostics = tree.diagnostics().len(); "Document has errors");
        let err = ParseError::new(tree.diagnostics().to_vec());
        return Err(CliError::new_parse_error(err, source));
    }

    info!(format:?; "Tree written");
    Ok(())
}
