//! Diagnostics for the fd syntax engine.
//!
//! Diagnostics are collected, never thrown: a parse always yields a tree
//! plus an ordered list of [`Diagnostic`]s. Each diagnostic carries:
//! - an [`ErrorCode`] for documentation and searchability
//! - a [`DiagnosticKind`] class (lexical, syntactic, unterminated construct)
//! - one or more labeled spans
//! - optional help text
//!
//! # Example
//!
//! ```
//! # use fd_syntax::error::{Diagnostic, DiagnosticKind, ErrorCode};
//! # use fd_syntax::Span;
//!
//! let diag = Diagnostic::error("expected value")
//!     .with_code(ErrorCode::E101)
//!     .with_label(Span::new(12..12), "value missing here")
//!     .with_help("add a value after `=`");
//!
//! assert_eq!(diag.kind(), Some(DiagnosticKind::SyntaxError));
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::{DiagnosticKind, ErrorCode};
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
