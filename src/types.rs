use serde::{Deserialize, Serialize};
use std::fmt;

/// One atomic unit of a tree event stream
///
/// Upstream parsers emit these in document order; the engine forwards the
/// same shape downstream. `End` carries no name: it always closes the most
/// recently opened `Start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Start { name: String },
    End,
    Text { text: String },
    Attr { name: String, value: String },
}

impl Event {
    pub fn start(name: impl Into<String>) -> Self {
        Event::Start { name: name.into() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Event::Text { text: text.into() }
    }

    pub fn attr(name: impl Into<String>, value: impl Into<String>) -> Self {
        Event::Attr {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Event::Start { .. })
    }

    /// Lowercase kind, as used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Start { .. } => "start",
            Event::End => "end",
            Event::Text { .. } => "text",
            Event::Attr { .. } => "attr",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Start { name } => write!(f, "start({})", name),
            Event::End => write!(f, "end"),
            Event::Text { text } => write!(f, "text({:?})", text),
            Event::Attr { name, value } => write!(f, "attr({}={:?})", name, value),
        }
    }
}
