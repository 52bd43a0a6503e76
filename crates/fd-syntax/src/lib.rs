//! Lexer and error-recovering parser for the fd diagram language.
//!
//! fd documents declare shapes, styles, annotations, animations and layout
//! constraints:
//!
//! ```text
//! style primary { fill = 3B82F6 }
//!
//! rect @box1 "Inbox" {
//!   use = primary
//!   width = 120
//!   @status draft
//!   anim: on_hover { opacity = 50 }
//! }
//!
//! box1 -> @box2 : depends_on
//! ```
//!
//! Parsing never fails. [`parse`] always returns a [`SyntaxTree`] covering
//! the whole input; malformed regions become `ERROR` nodes or zero-width
//! missing tokens, each reported once in [`SyntaxTree::diagnostics`].
//!
//! # Pipeline
//!
//! The [`lexer`] is mode driven: the parser tells it which tokens the
//! current state expects, so the same text can lex as a keyword, an
//! identifier, a hex color or annotation text depending on position. The
//! [`table`] is a canonical LR(1) table built once from the [`grammar`].
//!
//! # Example
//!
//! ```
//! use fd_syntax::{Field, Rule};
//!
//! let tree = fd_syntax::parse("rect @box1 { width = 10 }");
//! assert!(tree.diagnostics().is_empty());
//!
//! let declaration = tree.root().child_nodes().next().unwrap();
//! assert_eq!(declaration.kind(), Rule::NodeDeclaration);
//!
//! let id = declaration.field(Field::Id).unwrap();
//! assert_eq!(tree.text(id), "@box1");
//! ```

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod printer;
pub mod table;
pub mod tokens;
pub mod tree;

mod config;
mod parser;
mod span;

#[cfg(test)]
mod parser_tests;

pub use config::ParseConfig;
pub use grammar::{Field, Production, ProductionId, Rule};
pub use printer::print;
pub use span::{LineIndex, Span};
pub use tokens::{Token, TokenKind};
pub use tree::{Element, Node, SyntaxTree, unescape_annotation_text};

use parser::Parser;

/// Parse `source` with the default configuration.
pub fn parse(source: &str) -> SyntaxTree<'_> {
    parse_with_config(source, &ParseConfig::default())
}

/// Parse `source`, stopping error recovery once the configured budget is
/// spent.
pub fn parse_with_config<'src>(source: &'src str, config: &ParseConfig) -> SyntaxTree<'src> {
    Parser::new(source, config).parse()
}
