//! Structural failures and evaluator substitution

use super::helpers::{events, render, run};
use crate::engine::errors::error_text;
use crate::engine::{Engine, EngineError, EngineOptions};
use crate::expr::{BuiltinEvaluator, EvalError, Evaluator, Scope, Val};
use crate::types::Event;

#[test]
fn test_end_at_root_is_fatal_and_poisons() {
    let mut engine = Engine::new(EngineOptions::default());
    engine.submit(Event::text("x")).unwrap();

    let err = engine.submit(Event::End).unwrap_err();
    assert_eq!(err, EngineError::UnmatchedEnd);

    // Output forwarded before the failure stays available
    assert_eq!(engine.take_output(), vec![Event::text("x")]);

    assert_eq!(
        engine.submit(Event::text("y")).unwrap_err(),
        EngineError::Poisoned
    );
    assert_eq!(engine.finish().unwrap_err(), EngineError::Poisoned);
}

#[test]
fn test_unmatched_end_inside_directive_body() {
    let mut engine = Engine::new(EngineOptions::default());
    let result = engine.run(events("<:if>true</:if></x>"));
    assert_eq!(result.unwrap_err(), EngineError::UnmatchedEnd);
}

#[test]
fn test_finish_with_pending_capture() {
    let mut engine = Engine::new(EngineOptions::default());
    engine.submit_all(events("<:if>true")).unwrap();

    let err = engine.finish().unwrap_err();
    assert_eq!(
        err,
        EngineError::TruncatedStream {
            open_levels: 1,
            pending_captures: 1,
            open_continuations: 0,
        }
    );
}

#[test]
fn test_finish_with_open_element() {
    let mut engine = Engine::new(EngineOptions::default());
    engine.submit_all(events("<a><b>x</b>")).unwrap();

    assert_eq!(
        engine.finish().unwrap_err(),
        EngineError::TruncatedStream {
            open_levels: 1,
            pending_captures: 0,
            open_continuations: 0,
        }
    );
}

#[test]
fn test_finish_with_suspended_deferred_body() {
    let mut engine = Engine::new(EngineOptions::default());
    engine
        .submit_all(events("<::>x<w><:through></:through></w></::><x>a"))
        .unwrap();

    let err = engine.finish().unwrap_err();
    assert!(matches!(
        err,
        EngineError::TruncatedStream {
            open_continuations: 1,
            ..
        }
    ));
}

#[test]
fn test_syntax_error_is_contained() {
    let err = BuiltinEvaluator
        .evaluate("1 +", &mut Scope::new())
        .unwrap_err();
    assert!(matches!(err, EvalError::Syntax(_)));

    assert_eq!(
        run("<p><=>1 +</=>after</p>"),
        format!("<p>{}after</p>", error_text(&err))
    );
}

/* ===================== Evaluator trait ===================== */

/// Treats every expression as a literal string, upper-cased
struct ShoutingEvaluator;

impl Evaluator for ShoutingEvaluator {
    fn evaluate(&self, expr: &str, _scope: &mut Scope) -> Result<Val, EvalError> {
        if expr.is_empty() {
            return Err(EvalError::Syntax("empty".to_string()));
        }
        Ok(Val::Str(expr.to_uppercase()))
    }
}

#[test]
fn test_custom_evaluator_is_used() {
    let mut engine = Engine::with_evaluator(EngineOptions::default(), Box::new(ShoutingEvaluator));
    let output = engine
        .run(events("<p=>hello</p=><:if>yes<b></b></:if>"))
        .unwrap();
    assert_eq!(render(&output), "<p>HELLO</p><b></b>");
}
