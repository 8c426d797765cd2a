//! Errors raised while building or compiling a grammar.

use std::io;

use crate::usefulness::UnusedComponents;

/// Every failure is fatal to the current build. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    /// Builder options failed validation. Raised before anything is committed.
    #[error("ill-formed {what}: {reason}")]
    IllFormedOptions { what: &'static str, reason: String },

    #[error("duplicate symbol `{name}`")]
    DuplicateSymbol { name: String },

    #[error("duplicate rule `{symbol} -> {rhs}`")]
    DuplicateRule { symbol: String, rhs: String },

    /// A terminal literal is empty or spans more than one token.
    #[error("malformed terminal `{literal}` on `{symbol}`: terminals must be a single token")]
    MalformedTerminal { symbol: String, literal: String },

    #[error("symbol #{id} does not belong to this grammar")]
    UnknownSymbol { id: usize },

    #[error("semantic `{name}` accepts {min_params}..={max_params} arguments, but was given {given}")]
    ArityViolation {
        name: String,
        min_params: usize,
        max_params: usize,
        given: usize,
    },

    #[error("duplicate semantic `{name}`")]
    DuplicateSemantic { name: String },

    #[error("unknown semantic function `{name}`")]
    UnknownSemantic { name: String },

    /// Aggregated findings of the unused-component check.
    #[error("grammar has unused components:\n{0}")]
    UnreachableComponents(UnusedComponents),

    #[error("artifact I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("artifact encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for grammar building and compilation.
pub type Result<T, E = GrammarError> = std::result::Result<T, E>;

impl GrammarError {
    pub(crate) fn ill_formed(what: &'static str, reason: impl Into<String>) -> Self {
        GrammarError::IllFormedOptions {
            what,
            reason: reason.into(),
        }
    }
}

/// Checks that a cost is finite and nonnegative.
pub(crate) fn check_cost(what: &'static str, field: &str, cost: f64) -> Result<()> {
    if cost.is_finite() && cost >= 0.0 {
        Ok(())
    } else {
        Err(GrammarError::ill_formed(
            what,
            format!("`{}` must be a finite, nonnegative number, got {}", field, cost),
        ))
    }
}
