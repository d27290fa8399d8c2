//! Variable scope and transient overlays
//!
//! The scope is the ambient set of variables expressions see. Handlers that
//! need temporary bindings (loop items, matched events) install an overlay
//! and release it once their replay completes. Releasing restores the exact
//! prior state, including removing names that did not exist before.

use std::collections::HashMap;

use super::values::Val;

#[derive(Debug, Clone, Default)]
pub struct Scope {
    vars: HashMap<String, Val>,
    overlays: usize,
}

/// Handle returned by [`Scope::install`]
///
/// Holds the values the overlay shadowed. Must be handed back to
/// [`Scope::release`]; dropping it leaves the bindings in place.
#[must_use = "an overlay must be released to restore the scope"]
#[derive(Debug)]
pub struct Overlay {
    saved: Vec<(String, Option<Val>)>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Val> {
        self.vars.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Val) {
        self.vars.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Number of overlays currently installed
    pub fn overlay_depth(&self) -> usize {
        self.overlays
    }

    /// Apply bindings over the current variables
    ///
    /// A name bound twice in `bindings` keeps the last value; only its first
    /// prior state is recorded.
    pub fn install<I, K>(&mut self, bindings: I) -> Overlay
    where
        I: IntoIterator<Item = (K, Val)>,
        K: Into<String>,
    {
        let mut saved: Vec<(String, Option<Val>)> = Vec::new();
        for (name, value) in bindings {
            let name = name.into();
            if !saved.iter().any(|(n, _)| *n == name) {
                saved.push((name.clone(), self.vars.get(&name).cloned()));
            }
            self.vars.insert(name, value);
        }
        self.overlays += 1;
        Overlay { saved }
    }

    pub fn release(&mut self, overlay: Overlay) {
        for (name, prior) in overlay.saved.into_iter().rev() {
            match prior {
                Some(value) => {
                    self.vars.insert(name, value);
                }
                None => {
                    self.vars.remove(&name);
                }
            }
        }
        self.overlays = self.overlays.saturating_sub(1);
    }
}

impl<K: Into<String>> FromIterator<(K, Val)> for Scope {
    fn from_iter<T: IntoIterator<Item = (K, Val)>>(iter: T) -> Self {
        Scope {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            overlays: 0,
        }
    }
}
