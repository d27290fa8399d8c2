//! # Expression evaluation capability
//!
//! The engine never interprets expression text itself. It hands the text of
//! a directive argument to an [`Evaluator`] together with the current
//! [`Scope`], and gets back either a [`Val`] or an [`EvalError`].
//!
//! [`BuiltinEvaluator`] is the default implementation; hosts can substitute
//! any other engine through the trait.

pub mod ast;
pub mod eval;
pub mod parser;
pub mod scope;
pub mod values;


use thiserror::Error;

pub use eval::BuiltinEvaluator;
pub use scope::{Overlay, Scope};
pub use values::Val;

/// Evaluation failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("{0} is not defined")]
    Undefined(String),

    #[error("type error: {0}")]
    Type(String),
}

/// Evaluates directive expressions against a variable scope
///
/// Lookups must observe every overlay currently installed on `scope`.
/// Implementations may write to `scope` (assignments performed by `:eval`).
pub trait Evaluator {
    fn evaluate(&self, expr: &str, scope: &mut Scope) -> Result<Val, EvalError>;
}
