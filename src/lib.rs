pub mod cli;
pub mod config;
pub mod engine;
pub mod expr;
pub mod types;

// Re-export main types
pub use engine::{DebugState, Engine, EngineError, EngineOptions, EngineResult};
pub use expr::{BuiltinEvaluator, EvalError, Evaluator, Scope, Val};
pub use types::Event;
