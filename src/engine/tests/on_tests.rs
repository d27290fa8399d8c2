//! Tests for :on / :: and :through

use super::helpers::{events, render, run};
use crate::engine::{Engine, EngineOptions};
use crate::types::Event;

/* ===================== Matching ===================== */

#[test]
fn test_on_replaces_matched_subtree() {
    assert_eq!(
        run("<root><::>item<li>[</li><li>]</li></::><item>a</item>b</root>"),
        "<root><li>[</li><li>]</li>b</root>"
    );
}

#[test]
fn test_on_long_form() {
    assert_eq!(
        run("<root><:on>item<hit></hit></:on><item>a</item></root>"),
        "<root><hit></hit></root>"
    );
}

#[test]
fn test_on_fires_for_every_match() {
    assert_eq!(
        run("<r><::>x<y></y></::><x>1</x><x>2</x><z></z></r>"),
        "<r><y></y><y></y><z></z></r>"
    );
}

#[test]
fn test_on_binds_matched_event() {
    assert_eq!(
        run("<::>it=item<=>it.name</=><=>_.type</=></::><item>x</item>"),
        "itemstart"
    );
}

#[test]
fn test_on_text_selector() {
    assert_eq!(
        run("<p><::>t=TEXT<b=>t</b=></::>hello</p>"),
        "<p><b>hello</b></p>"
    );
}

#[test]
fn test_on_end_selector() {
    let mut engine = Engine::new(EngineOptions::default());
    let output = engine
        .run(events("<div><::>END<=>'!'</=></::><p>x</p></div>"))
        .unwrap();

    // The End of <p> is consumed by the handler; the End of <div> is looked
    // up after its own level is gone and passes through
    assert_eq!(
        output,
        vec![
            Event::start("div"),
            Event::start("p"),
            Event::text("x"),
            Event::text("!"),
            Event::End,
        ]
    );
}

#[test]
fn test_on_attr_selector() {
    let input = vec![
        Event::start("a"),
        Event::start("::"),
        Event::text("at=ATTR"),
        Event::start("="),
        Event::text("at.name + '=' + at.value"),
        Event::End,
        Event::End,
        Event::attr("href", "/x"),
        Event::End,
    ];
    let mut engine = Engine::new(EngineOptions::default());
    let output = engine.run(input).unwrap();
    assert_eq!(render(&output), "<a>href=/x</a>");
}

#[test]
fn test_on_wildcard_selector() {
    assert_eq!(
        run("<r><::>*<=>'[' + _.name + ']'</=></::><a>1</a><b>2</b></r>"),
        "<r>[a][b]</r>"
    );
}

#[test]
fn test_on_is_scoped_to_containing_level() {
    assert_eq!(
        run("<a><::>x<y>!</y></::><x>1</x></a><b><x>2</x></b>"),
        "<a><y>!</y></a><b><x>2</x></b>"
    );
}

#[test]
fn test_inner_registration_shadows_outer() {
    assert_eq!(
        run("<::>x<=>'outer'</=></::><div><::>x<=>'inner'</=></::><x></x></div><x></x>"),
        "<div>inner</div>outer"
    );
}

#[test]
fn test_on_missing_selector_is_dropped() {
    assert_eq!(run("<::>it=<p>x</p></::><p>y</p>"), "<p>y</p>");
}

#[test]
fn test_on_binding_is_released_after_body() {
    let mut engine = Engine::new(EngineOptions::default());
    let output = engine
        .run(events("<::>it=item<=>'x'</=></::><item></item>"))
        .unwrap();
    assert_eq!(render(&output), "x");
    assert!(!engine.scope().contains("it"));
    assert!(!engine.scope().contains("_"));
    assert_eq!(engine.debug_state().open_continuations, 0);
}

/* ===================== :through ===================== */

#[test]
fn test_through_lets_matched_subtree_continue() {
    assert_eq!(
        run("<root><::>item<li>[</li><:through></:through><li>]</li></::><item>a</item>b</root>"),
        "<root><li>[</li>a<li>]</li>b</root>"
    );
}

#[test]
fn test_through_wraps_matched_subtree() {
    assert_eq!(
        run("<::>x<wrap><:through></:through></wrap></::><x>1<b>2</b></x>"),
        "<wrap>1<b>2</b></wrap>"
    );
}

#[test]
fn test_through_with_incremental_input() {
    let input = events("<::>x<w><:through></:through></w></::><x>a</x>z");
    let mut engine = Engine::new(EngineOptions::default());

    let mut collected = Vec::new();
    for event in input {
        engine.submit(event).unwrap();
        collected.extend(engine.take_output());
    }
    engine.finish().unwrap();

    assert_eq!(render(&collected), "<w>a</w>z");
}

#[test]
fn test_through_outside_on_is_ignored() {
    assert_eq!(run("<a><:through></:through>x</a>"), "<a>x</a>");
}

#[test]
fn test_through_twice_only_first_counts() {
    assert_eq!(
        run("<::>item<:through></:through><:through></:through></::><item>a</item>"),
        "a"
    );
}

#[test]
fn test_nested_deferred_bodies_both_through() {
    assert_eq!(
        run(concat!(
            "<::>a<A><:through></:through></A></::>",
            "<::>b<B><:through></:through></B></::>",
            "<a><b>x</b></a>"
        )),
        "<A><B>x</B></A>"
    );
}

#[test]
fn test_through_claims_innermost_deferred_body() {
    // The body for `b` fires inside the body for `a`. Its :through claims
    // the `b` match; the `a` match stays unclaimed and its sub-tree is
    // dropped.
    assert_eq!(
        run(concat!(
            "<::>b<B><:through></:through></B></::>",
            "<::>a<b>inner</b></::>",
            "<a>x</a>"
        )),
        "<B>inner</B>"
    );
}
