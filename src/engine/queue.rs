//! Event queue
//!
//! Pending work for the dispatch loop. Upstream events are appended at the
//! tail; replays and continuations are inserted at the head so they run
//! "immediately next". A [`Queued::Callback`] is a completion marker: when
//! it reaches the head, everything queued ahead of it has been fully
//! processed and its action runs instead of a delivery.

use std::collections::VecDeque;
use std::fmt;

use super::errors::EngineResult;
use super::Engine;
use crate::types::Event;

pub type Callback = Box<dyn FnOnce(&mut Engine) -> EngineResult<()>>;

pub enum Queued {
    Event(Event),
    Callback(Callback),
}

impl fmt::Debug for Queued {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Queued::Event(event) => write!(f, "{}", event),
            Queued::Callback(_) => write!(f, "callback"),
        }
    }
}

#[derive(Debug, Default)]
pub struct EventQueue {
    items: VecDeque<Queued>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pop_front(&mut self) -> Option<Queued> {
        self.items.pop_front()
    }

    /// Normal arrival
    pub fn push_back(&mut self, event: Event) {
        self.items.push_back(Queued::Event(event));
    }

    /// Re-observe an event before anything else pending
    pub fn push_front(&mut self, event: Event) {
        self.items.push_front(Queued::Event(event));
    }

    /// Insert `events` at the head followed by the completion `callback`
    pub fn replay(&mut self, events: Vec<Event>, callback: Callback) {
        self.items.push_front(Queued::Callback(callback));
        for event in events.into_iter().rev() {
            self.items.push_front(Queued::Event(event));
        }
    }

    /// Re-insert previously spliced items at the head, order preserved
    pub fn prepend(&mut self, items: Vec<Queued>) {
        for item in items.into_iter().rev() {
            self.items.push_front(item);
        }
    }

    /// Splice the first `count` items out of the queue
    pub fn take_front(&mut self, count: usize) -> Vec<Queued> {
        let count = count.min(self.items.len());
        self.items.drain(..count).collect()
    }
}
