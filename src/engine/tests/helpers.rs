//! Test helpers for engine tests
//!
//! Event streams are written as compact markup: `<name>` is a Start event,
//! `</...>` an End (the name is ignored) and anything between tags a Text
//! event. Output is rendered back into the same notation so assertions read
//! like documents.

use crate::engine::{Engine, EngineOptions};
use crate::expr::Val;
use crate::types::Event;
use std::collections::HashMap;

/// Parse compact markup into events
pub fn events(markup: &str) -> Vec<Event> {
    let mut out = Vec::new();
    let mut text = String::new();
    let mut chars = markup.chars();

    while let Some(c) = chars.next() {
        if c != '<' {
            text.push(c);
            continue;
        }
        if !text.is_empty() {
            out.push(Event::text(std::mem::take(&mut text)));
        }
        let tag: String = chars.by_ref().take_while(|c| *c != '>').collect();
        if tag.starts_with('/') {
            out.push(Event::End);
        } else {
            out.push(Event::start(tag));
        }
    }
    if !text.is_empty() {
        out.push(Event::text(text));
    }
    out
}

/// Render events back into compact markup
pub fn render(events: &[Event]) -> String {
    let mut out = String::new();
    let mut open: Vec<&str> = Vec::new();
    for event in events {
        match event {
            Event::Start { name } => {
                out.push_str(&format!("<{}>", name));
                open.push(name);
            }
            Event::End => {
                let name = open.pop().unwrap_or("?");
                out.push_str(&format!("</{}>", name));
            }
            Event::Text { text } => out.push_str(text),
            Event::Attr { name, value } => out.push_str(&format!("[{}={}]", name, value)),
        }
    }
    out
}

/// Run markup through a fresh engine with default options
pub fn run(markup: &str) -> String {
    run_with_scope(markup, HashMap::new())
}

/// Run markup with variables seeded into the scope
pub fn run_with_scope(markup: &str, vars: HashMap<&str, Val>) -> String {
    let mut engine = engine_with_scope(vars);
    let output = engine.run(events(markup)).expect("engine run failed");
    render(&output)
}

pub fn engine_with_scope(vars: HashMap<&str, Val>) -> Engine {
    let mut engine = Engine::new(EngineOptions::default());
    for (name, value) in vars {
        engine.scope_mut().set(name, value);
    }
    engine
}

#[test]
fn test_markup_helpers_round_trip() {
    let markup = "<a>x<:if>true</:if><b></b></a>";
    let parsed = events(markup);
    assert_eq!(
        parsed,
        vec![
            Event::start("a"),
            Event::text("x"),
            Event::start(":if"),
            Event::text("true"),
            Event::End,
            Event::start("b"),
            Event::End,
            Event::End,
        ]
    );
    assert_eq!(render(&parsed), markup);
}
