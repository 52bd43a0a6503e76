//! Error codes for the fd diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors

use std::fmt;

/// The class a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A byte sequence no lexer mode could classify.
    LexError,
    /// The parser had no valid action and had to recover.
    SyntaxError,
    /// A string ran to end of input. The token stream is still complete.
    UnterminatedConstruct,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::LexError => write!(f, "lex error"),
            DiagnosticKind::SyntaxError => write!(f, "syntax error"),
            DiagnosticKind::UnterminatedConstruct => write!(f, "unterminated construct"),
        }
    }
}

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but end of input came first.
    E001,

    /// Unexpected character.
    ///
    /// A character that starts no token in any lexer mode.
    E002,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser skipped one or more tokens to resynchronize.
    E100,

    /// Missing token.
    ///
    /// The parser inserted a zero-width placeholder to continue.
    E101,

    /// Error budget exhausted.
    ///
    /// The configured number of recovery events was reached; the remaining
    /// input was not parsed.
    E102,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "missing token",
            ErrorCode::E102 => "error budget exhausted",
        }
    }

    /// The diagnostic class this code belongs to.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            ErrorCode::E001 => DiagnosticKind::UnterminatedConstruct,
            ErrorCode::E002 => DiagnosticKind::LexError,
            ErrorCode::E100 | ErrorCode::E101 | ErrorCode::E102 => DiagnosticKind::SyntaxError,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
