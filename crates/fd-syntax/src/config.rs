//! Parser configuration.
//!
//! [`ParseConfig`] implements [`serde::Deserialize`] so callers can embed it
//! in their own configuration files.
//!
//! # Example
//!
//! ```
//! # use fd_syntax::ParseConfig;
//! let config = ParseConfig::default().with_error_budget(8);
//! assert_eq!(config.error_budget(), Some(8));
//! ```

use serde::Deserialize;

/// Options that control a single parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParseConfig {
    /// Maximum number of error recoveries before the rest of the input is
    /// left unparsed. `None` means unlimited.
    #[serde(default)]
    error_budget: Option<usize>,
}

impl ParseConfig {
    /// Creates a new [`ParseConfig`] with the given error budget.
    pub fn new(error_budget: Option<usize>) -> Self {
        Self { error_budget }
    }

    /// Returns a copy limited to `budget` recoveries.
    pub fn with_error_budget(mut self, budget: usize) -> Self {
        self.error_budget = Some(budget);
        self
    }

    /// Returns the error budget, if one is set.
    pub fn error_budget(&self) -> Option<usize> {
        self.error_budget
    }
}
