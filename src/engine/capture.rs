//! Capture primitives
//!
//! A capture is a consumer pushed on the context stack. While it is on top it
//! receives every delivered event instead of the default router. When it
//! decides it is done it is popped and its completion runs with whatever it
//! accumulated; the completion is where a directive continues.

use tracing::{debug, trace};

use super::errors::EngineResult;
use super::Engine;
use crate::expr::{EvalError, Val};
use crate::types::Event;

pub type Completion<T> = Box<dyn FnOnce(&mut Engine, T) -> EngineResult<()>>;

pub enum Capture {
    /// Accumulates leading text children, stops at the first Start or End
    FirstText { text: String, then: Completion<String> },

    /// Owns everything up to the End closing the current level
    SubLevel {
        depth: i64,
        discard: bool,
        buffer: Vec<Event>,
        then: Completion<Vec<Event>>,
    },
}

pub enum Feed {
    Pending,
    /// The capture is finished; carries the event that finished it
    Done(Event),
}

impl Capture {
    pub fn feed(&mut self, event: Event) -> Feed {
        match self {
            Capture::FirstText { text, .. } => match event {
                Event::Text { text: chunk } => {
                    text.push_str(&chunk);
                    Feed::Pending
                }
                Event::Attr { .. } => {
                    trace!(%event, "dropping attribute of directive node");
                    Feed::Pending
                }
                Event::Start { .. } | Event::End => Feed::Done(event),
            },
            Capture::SubLevel {
                depth,
                discard,
                buffer,
                ..
            } => {
                match event {
                    Event::Start { .. } => *depth += 1,
                    Event::End => *depth -= 1,
                    _ => {}
                }
                if *depth < 0 {
                    return Feed::Done(event);
                }
                if *discard {
                    trace!(%event, "discarding captured event");
                } else {
                    buffer.push(event);
                }
                Feed::Pending
            }
        }
    }

    /// Run the completion once the capture has been popped
    pub fn complete(self, engine: &mut Engine, boundary: Event) -> EngineResult<()> {
        match self {
            Capture::FirstText { text, then } => {
                // The boundary belongs to normal routing
                engine.queue.push_front(boundary);
                then(engine, text)
            }
            Capture::SubLevel { buffer, then, .. } => {
                engine.shift_level()?;
                debug!(events = buffer.len(), "sub-level captured");
                then(engine, buffer)
            }
        }
    }
}

/* ===================== Engine Primitives ===================== */

impl Engine {
    /// Collect the text children leading the current node
    pub fn capture_first_text<F>(&mut self, then: F)
    where
        F: FnOnce(&mut Engine, String) -> EngineResult<()> + 'static,
    {
        self.captures.push(Capture::FirstText {
            text: String::new(),
            then: Box::new(then),
        });
    }

    /// Collect the leading text and evaluate it as an expression
    pub fn capture_text_and_eval<F>(&mut self, then: F)
    where
        F: FnOnce(&mut Engine, Result<Val, EvalError>) -> EngineResult<()> + 'static,
    {
        self.capture_first_text(move |engine, text| {
            let value = engine.evaluate(&text);
            then(engine, value)
        });
    }

    /// Take ownership of the rest of the current node, up to and including its End
    ///
    /// The level is closed when the End arrives; the buffered events (none if
    /// `discard`) are passed to `then`.
    pub fn capture_sub_level<F>(&mut self, discard: bool, then: F)
    where
        F: FnOnce(&mut Engine, Vec<Event>) -> EngineResult<()> + 'static,
    {
        self.captures.push(Capture::SubLevel {
            depth: 0,
            discard,
            buffer: Vec::new(),
            then: Box::new(then),
        });
    }

    /// Drop the rest of the current node
    pub fn discard_sub_level(&mut self) -> EngineResult<()> {
        self.capture_sub_level(true, |_, _| Ok(()));
        Ok(())
    }

    /// Re-inject `events` at the head of the queue
    ///
    /// `then` runs once every replayed event, and anything those events
    /// queued ahead of the completion marker, has drained.
    pub fn play_buffer<F>(&mut self, events: Vec<Event>, then: F)
    where
        F: FnOnce(&mut Engine) -> EngineResult<()> + 'static,
    {
        debug!(events = events.len(), "replaying buffer");
        self.queue.replay(events, Box::new(then));
    }
}
