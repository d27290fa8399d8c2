//! Level stack and selector registry
//!
//! One [`LevelState`] per open tree depth. Each level owns the selectors
//! registered while it was current; lookups walk from the innermost level
//! towards the root, so a level sees every ancestor's selectors unless it
//! shadows the key itself. Registering never touches an ancestor, and a
//! level's selectors disappear when it closes.

use std::collections::HashMap;
use std::rc::Rc;

use super::errors::{EngineError, EngineResult};
use super::Engine;
use crate::types::Event;

/// Selector key matching any element name
pub const WILDCARD: &str = "*";
/// Selector key for closing events
pub const END_KEY: &str = "END";
/// Selector key for text events
pub const TEXT_KEY: &str = "TEXT";
/// Selector key for attribute events
pub const ATTR_KEY: &str = "ATTR";

pub type Handler = Rc<dyn Fn(&mut Engine, Event) -> EngineResult<()>>;

/// Hook run once when a level closes
pub type EndHook = Box<dyn FnOnce(&mut Engine) -> LevelClose>;

/// What to do with the End event that closed a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelClose {
    Forward,
    Suppress,
}

pub struct LevelState {
    /// Name of the Start event that opened the level (`None` for the root)
    pub tag: Option<String>,
    selectors: HashMap<String, Handler>,
    on_end: Option<EndHook>,
}

impl LevelState {
    fn new(tag: Option<String>) -> Self {
        Self {
            tag,
            selectors: HashMap::new(),
            on_end: None,
        }
    }

    pub fn take_on_end(&mut self) -> Option<EndHook> {
        self.on_end.take()
    }
}

pub struct LevelStack {
    /// `levels[0]` is the root and is never popped
    levels: Vec<LevelState>,
}

impl Default for LevelStack {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelStack {
    pub fn new() -> Self {
        Self {
            levels: vec![LevelState::new(None)],
        }
    }

    /// Number of open levels, root included
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn push(&mut self, tag: impl Into<String>) {
        self.levels.push(LevelState::new(Some(tag.into())));
    }

    pub fn pop(&mut self) -> EngineResult<LevelState> {
        if self.levels.len() <= 1 {
            return Err(EngineError::UnmatchedEnd);
        }
        self.levels.pop().ok_or(EngineError::UnmatchedEnd)
    }

    /// Replace the innermost level's close hook
    pub fn set_on_end(&mut self, hook: EndHook) {
        if let Some(level) = self.levels.last_mut() {
            level.on_end = Some(hook);
        }
    }

    /// Register `handler` for `key` on the innermost level
    pub fn register(&mut self, key: impl Into<String>, handler: Handler) {
        if let Some(level) = self.levels.last_mut() {
            level.selectors.insert(key.into(), handler);
        }
    }

    /// Resolve the first of `keys` that any visible level registers
    ///
    /// Keys are tried in order; for each key the innermost registration wins.
    pub fn lookup(&self, keys: &[&str]) -> Option<Handler> {
        keys.iter().find_map(|key| {
            self.levels
                .iter()
                .rev()
                .find_map(|level| level.selectors.get(*key).cloned())
        })
    }

    /// Tags from root to innermost
    pub fn tags(&self) -> Vec<String> {
        self.levels
            .iter()
            .map(|level| level.tag.clone().unwrap_or_else(|| "(root)".to_string()))
            .collect()
    }
}
