//! # Tree event engine
//!
//! Executes directives embedded in a stream of tree events and forwards the
//! transformed stream.
//!
//! ## Core Principles
//!
//! 1. **Queue-driven execution**: every event goes through one queue; the
//!    dispatch loop drains it until empty and observes every mutation made
//!    while an event is being handled
//! 2. **Single consumer**: only the capture on top of the context stack (or
//!    the default router when none is active) sees a dequeued event
//! 3. **Explicit continuations**: a directive waiting for more input is a
//!    [`capture::Capture`] or a [`queue::Queued::Callback`] holding its
//!    completion, never a suspended thread
//! 4. **Synchronous**: no I/O and no async; `submit` returns once the queue
//!    is drained

pub mod capture;
pub mod commands;
pub mod continuation;
pub mod errors;
pub mod exec_loop;
pub mod levels;
pub mod queue;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::expr::{BuiltinEvaluator, EvalError, Evaluator, Scope, Val};
use crate::types::Event;
use capture::Capture;
use continuation::Continuations;
use levels::LevelStack;
use queue::EventQueue;

pub use commands::{Directive, TagKind};
pub use errors::{EngineError, EngineResult, UsageError};
pub use levels::LevelClose;

/* ===================== Options ===================== */

/// How directive nodes are recognised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Start-event names beginning with this prefix are directives
    pub directive_prefix: String,
    /// Short form of the deferred-match directive
    pub deferred_alias: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            directive_prefix: ":".to_string(),
            deferred_alias: "::".to_string(),
        }
    }
}

/* ===================== Engine ===================== */

pub struct Engine {
    options: EngineOptions,
    evaluator: Box<dyn Evaluator>,
    scope: Scope,
    queue: EventQueue,
    levels: LevelStack,
    /// Context stack above the default router, innermost last
    captures: Vec<Capture>,
    continuations: Continuations,
    outbox: Vec<Event>,
    poisoned: bool,
}

/// Snapshot of the engine internals, as dumped by `:debug`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugState {
    pub queue_len: usize,
    /// Root first
    pub level_tags: Vec<String>,
    /// Includes the default router
    pub context_depth: usize,
    pub open_continuations: usize,
    pub overlay_depth: usize,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self::with_evaluator(options, Box::new(BuiltinEvaluator))
    }

    pub fn with_evaluator(options: EngineOptions, evaluator: Box<dyn Evaluator>) -> Self {
        Self {
            options,
            evaluator,
            scope: Scope::new(),
            queue: EventQueue::new(),
            levels: LevelStack::new(),
            captures: Vec::new(),
            continuations: Continuations::new(),
            outbox: Vec::new(),
            poisoned: false,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    /* ===================== Public API ===================== */

    /// Feed one upstream event and process everything it makes runnable
    pub fn submit(&mut self, event: Event) -> EngineResult<()> {
        if self.poisoned {
            return Err(EngineError::Poisoned);
        }
        self.queue.push_back(event);
        let result = self.drain();
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    pub fn submit_all<I>(&mut self, events: I) -> EngineResult<()>
    where
        I: IntoIterator<Item = Event>,
    {
        for event in events {
            self.submit(event)?;
        }
        Ok(())
    }

    /// Declare the end of the upstream stream
    ///
    /// Fails if a directive is still waiting for events or elements are
    /// still open.
    pub fn finish(&mut self) -> EngineResult<()> {
        if self.poisoned {
            return Err(EngineError::Poisoned);
        }
        let open_levels = self.levels.depth() - 1;
        let pending_captures = self.captures.len();
        let open_continuations = self.continuations.depth();
        if open_levels > 0 || pending_captures > 0 || open_continuations > 0 {
            self.poisoned = true;
            return Err(EngineError::TruncatedStream {
                open_levels,
                pending_captures,
                open_continuations,
            });
        }
        Ok(())
    }

    /// Drain the events forwarded so far
    pub fn take_output(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    /// Process a complete stream and return the output
    pub fn run<I>(&mut self, events: I) -> EngineResult<Vec<Event>>
    where
        I: IntoIterator<Item = Event>,
    {
        self.submit_all(events)?;
        self.finish()?;
        Ok(self.take_output())
    }

    pub fn debug_state(&self) -> DebugState {
        DebugState {
            queue_len: self.queue.len(),
            level_tags: self.levels.tags(),
            context_depth: self.captures.len() + 1,
            open_continuations: self.continuations.depth(),
            overlay_depth: self.scope.overlay_depth(),
        }
    }

    /* ===================== Handler Primitives ===================== */

    /// Forward an event to the output
    pub fn emit(&mut self, event: Event) {
        tracing::trace!(%event, "emit");
        self.outbox.push(event);
    }

    /// Evaluate `expr` against the current scope, logging failures
    pub fn evaluate(&mut self, expr: &str) -> Result<Val, EvalError> {
        let result = self.evaluator.evaluate(expr, &mut self.scope);
        if let Err(err) = &result {
            error!(expr, %err, "expression evaluation failed");
        }
        result
    }

    /// Close the innermost level, running its hook
    pub fn shift_level(&mut self) -> EngineResult<LevelClose> {
        let mut level = self.levels.pop()?;
        match level.take_on_end() {
            Some(hook) => Ok(hook(self)),
            None => Ok(LevelClose::Forward),
        }
    }
}
