//! Collector for accumulating diagnostics during a parse.
//!
//! The lexer and the parser engine each report into a
//! [`DiagnosticCollector`]; the engine merges them when the parse completes.

use crate::error::Diagnostic;

/// A collector for accumulating diagnostics during a processing phase.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection, ordering diagnostics by source position.
    ///
    /// The sort is stable, so diagnostics at the same offset keep their
    /// emission order.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|d| d.span().map_or(usize::MAX, |span| span.start()));
        self.diagnostics
    }
}
