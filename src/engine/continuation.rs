//! Continuation markers
//!
//! Every running deferred body (`:on` / `::`) owns one marker. While open it
//! records the queue length at the moment the body started replaying: the
//! queue items in front of that many trailing items are exactly what the
//! body has left to run. `:through` claims the innermost marker to splice
//! those items out and release them later.

use super::errors::UsageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Open { queue_len: usize },
    Claimed,
}

#[derive(Debug, Default)]
pub struct Continuations {
    /// Innermost marker last
    markers: Vec<Marker>,
}

impl Continuations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.markers.len()
    }

    pub fn open(&mut self, queue_len: usize) {
        self.markers.push(Marker::Open { queue_len });
    }

    pub fn close(&mut self) -> Option<Marker> {
        self.markers.pop()
    }

    /// Claim the innermost marker, returning its recorded queue length
    ///
    /// Outer markers are never claimed, even when the innermost one has
    /// already been claimed.
    pub fn claim(&mut self) -> Result<usize, UsageError> {
        match self.markers.last_mut() {
            None => Err(UsageError::ThroughOutsideOn),
            Some(marker) => match *marker {
                Marker::Claimed => Err(UsageError::ThroughTwice),
                Marker::Open { queue_len } => {
                    *marker = Marker::Claimed;
                    Ok(queue_len)
                }
            },
        }
    }
}
