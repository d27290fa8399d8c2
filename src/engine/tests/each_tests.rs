//! Tests for :each

use super::helpers::{engine_with_scope, events, render, run, run_with_scope};
use crate::expr::Val;
use maplit::hashmap;
use std::collections::HashMap;

#[test]
fn test_each_replays_body_per_item() {
    assert_eq!(
        run("<ul><:each>item in [1, 2, 3]<li><=>item</=></li></:each></ul>"),
        "<ul><li>1</li><li>2</li><li>3</li></ul>"
    );
}

#[test]
fn test_each_with_index() {
    assert_eq!(
        run("<:each>x, i in ['a', 'b']<=>i + ':' + x</=></:each>"),
        "0:a1:b"
    );
}

#[test]
fn test_each_over_scope_variable() {
    let vars = hashmap! {
        "names" => Val::List(vec![Val::Str("ann".into()), Val::Str("bob".into())]),
    };
    assert_eq!(
        run_with_scope("<:each>n in names<p><=>n</=></p></:each>", vars),
        "<p>ann</p><p>bob</p>"
    );
}

#[test]
fn test_each_empty_list_emits_nothing() {
    assert_eq!(run("<ul><:each>x in []<li>a</li></:each></ul>"), "<ul></ul>");
}

#[test]
fn test_each_restores_bindings_afterwards() {
    // Unbound before the loop: removed again afterwards
    let mut engine = engine_with_scope(HashMap::new());
    let output = engine
        .run(events("<:each>item, idx in [1, 2]<=>item</=></:each>"))
        .unwrap();
    assert_eq!(render(&output), "12");
    assert!(!engine.scope().contains("item"));
    assert!(!engine.scope().contains("idx"));
    assert_eq!(engine.scope().overlay_depth(), 0);

    // Bound before the loop: prior value comes back
    let vars = hashmap! { "item" => Val::Str("seed".into()) };
    assert_eq!(
        run_with_scope("<:each>item in [1, 2]<=>item</=></:each><=>item</=>", vars),
        "12seed"
    );
}

#[test]
fn test_nested_each() {
    assert_eq!(
        run("<:each>row in [[1, 2], [3]]<r><:each>c in row<=>c</=></:each></r></:each>"),
        "<r>12</r><r>3</r>"
    );
}

#[test]
fn test_each_with_conditional_body() {
    assert_eq!(
        run("<:each>n in [1, 2, 3, 4]<:if>n % 2 == 0<=>n</=></:if></:each>"),
        "24"
    );
}

#[test]
fn test_each_body_side_effects_accumulate() {
    assert_eq!(
        run(concat!(
            "<:eval>total = 0</:eval>",
            "<:each>n in [1, 2, 3]<:eval>total = total + n</:eval></:each>",
            "<=>total</=>"
        )),
        "6"
    );
}

#[test]
fn test_each_non_sequence_drops_body() {
    assert_eq!(run("<:each>x in 5<li>a</li></:each>done"), "done");
    assert_eq!(run("<:each>x in 'abc'<li>a</li></:each>done"), "done");
}

#[test]
fn test_each_malformed_argument_is_kept_literally() {
    assert_eq!(
        run("<:each>items<li>a</li></:each>"),
        "<:each>items<li>a</li></:each>"
    );
}

#[test]
fn test_each_expression_error_renders_inline() {
    assert_eq!(
        run("<:each>x in nope<li>a</li></:each>done"),
        "[expression error: nope is not defined]done"
    );
}
