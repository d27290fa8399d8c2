//! Tests for `name=` and `=` nodes

use super::helpers::{run, run_with_scope};
use crate::engine::{Engine, EngineOptions};
use crate::expr::Val;
use crate::types::Event;
use maplit::hashmap;

#[test]
fn test_named_affect_emits_element_with_value() {
    assert_eq!(run("<p=>1 + 2</p=>"), "<p>3</p>");
}

#[test]
fn test_named_affect_keeps_children() {
    let vars = hashmap! { "name" => Val::Str("Ann".into()) };
    assert_eq!(
        run_with_scope("<p=>name<b>x</b></p=>", vars),
        "<p>Ann<b>x</b></p>"
    );
}

#[test]
fn test_bare_affect_replaces_node() {
    assert_eq!(run("<=>1<b>x</b></=>"), "1");
}

#[test]
fn test_affect_value_formatting() {
    assert_eq!(run("<=>1.5</=>"), "1.5");
    assert_eq!(run("<=>[1, 'a', true]</=>"), "1,a,true");
    assert_eq!(run("<=>{a: 1}</=>"), "{\"a\":1}");
    assert_eq!(run("<=>null</=>"), "null");
}

#[test]
fn test_affect_reads_object_members() {
    let vars = hashmap! {
        "user" => Val::from(&serde_json::json!({ "name": "Bob", "tags": ["x", "y"] })),
    };
    assert_eq!(
        run_with_scope("<=>user.name + ':' + user.tags.length</=>", vars),
        "Bob:2"
    );
}

#[test]
fn test_affect_expression_error_renders_inline() {
    assert_eq!(
        run("<a><=>nope</=>ok</a>"),
        "<a>[expression error: nope is not defined]ok</a>"
    );
    assert_eq!(
        run("<a><b=>nope</b=></a>"),
        "<a><b>[expression error: nope is not defined]</b></a>"
    );
}

#[test]
fn test_attributes_in_expression_text_are_dropped() {
    let input = vec![
        Event::start("b="),
        Event::attr("class", "x"),
        Event::text("1"),
        Event::End,
        Event::start(":if"),
        Event::attr("id", "y"),
        Event::text("true"),
        Event::start("p"),
        Event::End,
        Event::End,
    ];
    let mut engine = Engine::new(EngineOptions::default());
    let output = engine.run(input).unwrap();
    assert_eq!(
        output,
        vec![
            Event::start("b"),
            Event::text("1"),
            Event::End,
            Event::start("p"),
            Event::End,
        ]
    );
}
