//! Engine error taxonomy
//!
//! - [`EngineError`]: structural failures. Fatal, the engine stops.
//! - [`UsageError`]: misused directives. Logged, the directive is skipped
//!   or kept as literal content.
//! - [`EvalError`]: expression failures. Rendered inline via
//!   [`error_text`] and logged.

use thiserror::Error;

use crate::expr::EvalError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unmatched END event: no open level to close")]
    UnmatchedEnd,

    #[error(
        "event stream ended early: {open_levels} open level(s), \
         {pending_captures} pending capture(s), {open_continuations} open continuation(s)"
    )]
    TruncatedStream {
        open_levels: usize,
        pending_captures: usize,
        open_continuations: usize,
    },

    #[error("engine halted by an earlier fatal error")]
    Poisoned,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("unknown directive '{0}'")]
    UnknownDirective(String),

    #[error(":each bad syntax argument: '{0}' (expected 'name[, index] in expression')")]
    BadEachArgument(String),

    #[error(":each: expression '{expr}' is a {found}, not a list")]
    NotASequence { expr: String, found: &'static str },

    #[error(":on without a selector: '{0}'")]
    MissingSelector(String),

    #[error(":through called outside of an :on context")]
    ThroughOutsideOn,

    #[error(":through called twice for the same :on context")]
    ThroughTwice,
}

/// Inline marker substituted into the output when an expression fails
pub fn error_text(err: &EvalError) -> String {
    format!("[expression error: {}]", err)
}
