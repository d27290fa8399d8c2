//! Core dispatch loop
//!
//! ## Function Organization
//! 1. drain() - Top-level driver (pops the queue until empty)
//! 2. deliver() - Hands an event to the active consumer
//! 3. execute_default() - Routes events when no capture is active

use tracing::{trace, warn};

use super::capture::Feed;
use super::commands::{op_affect, TagKind};
use super::errors::{EngineResult, UsageError};
use super::levels::{LevelClose, ATTR_KEY, END_KEY, TEXT_KEY, WILDCARD};
use super::queue::Queued;
use super::Engine;
use crate::types::Event;

impl Engine {
    /// Run until the queue is empty
    ///
    /// The queue is re-read on every iteration: handlers push to the head or
    /// tail while an event is being delivered.
    pub(super) fn drain(&mut self) -> EngineResult<()> {
        while let Some(item) = self.queue.pop_front() {
            match item {
                Queued::Callback(callback) => {
                    trace!("callback reached");
                    callback(self)?;
                }
                Queued::Event(event) => self.deliver(event)?,
            }
        }
        Ok(())
    }

    fn deliver(&mut self, event: Event) -> EngineResult<()> {
        let feed = match self.captures.last_mut() {
            None => return self.execute_default(event),
            Some(capture) => capture.feed(event),
        };
        match feed {
            Feed::Pending => Ok(()),
            Feed::Done(boundary) => match self.captures.pop() {
                Some(capture) => capture.complete(self, boundary),
                None => Ok(()),
            },
        }
    }

    /// Default router: the bottom of the context stack
    fn execute_default(&mut self, event: Event) -> EngineResult<()> {
        trace!(%event, depth = self.levels.depth(), "route");
        let handler = match &event {
            Event::Start { name } => {
                let name = name.clone();
                self.levels.push(name.clone());
                match TagKind::classify(&name, &self.options) {
                    TagKind::Directive(directive) => return directive.run(self, event),
                    TagKind::Affect => return op_affect(self, name),
                    TagKind::UnknownDirective => {
                        warn!("{}", UsageError::UnknownDirective(name.clone()));
                    }
                    TagKind::Element => {}
                }
                self.levels.lookup(&[name.as_str(), WILDCARD])
            }
            Event::End => {
                if self.shift_level()? == LevelClose::Suppress {
                    return Ok(());
                }
                self.levels.lookup(&[END_KEY])
            }
            Event::Text { .. } => self.levels.lookup(&[TEXT_KEY]),
            Event::Attr { .. } => self.levels.lookup(&[ATTR_KEY]),
        };

        match handler {
            Some(handler) => handler(self, event),
            None => {
                self.emit(event);
                Ok(())
            }
        }
    }
}
