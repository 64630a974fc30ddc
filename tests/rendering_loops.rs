//! Rendering `{% loop %}` blocks.
//!
//! Arrays iterate in element order with `item` bound per element;
//! objects iterate in key order with `item.key` and `item.value`;
//! everything else iterates zero times.

use curly::curly::testing::render_str;
use serde_json::json;

#[test]
fn test_array_elements_in_order() {
    let context = json!({"items": ["a", "b"]});
    assert_eq!(
        render_str("{% loop items %}-{{ item }}{% /loop %}", &context),
        "-a-b"
    );
}

#[test]
fn test_empty_array_renders_nothing() {
    assert_eq!(
        render_str("[{% loop xs %}!{% /loop %}]", &json!({"xs": []})),
        "[]"
    );
}

#[test]
fn test_missing_source_renders_nothing() {
    assert_eq!(render_str("[{% loop xs %}!{% /loop %}]", &json!({})), "[]");
}

#[test]
fn test_scalar_and_string_sources_render_nothing() {
    for value in [json!(5), json!("text"), json!(true), json!(null)] {
        let context = json!({ "xs": value });
        assert_eq!(
            render_str("[{% loop xs %}!{% /loop %}]", &context),
            "[]",
            "source {context}"
        );
    }
}

#[test]
fn test_item_outside_a_loop_is_an_ordinary_key() {
    let context = json!({"item": "plain"});
    assert_eq!(render_str("{{ item }}", &context), "plain");
}

#[test]
fn test_item_paths_reach_into_elements() {
    let context = json!({"rows": [{"name": "a", "n": 1}, {"name": "b", "n": 2}]});
    assert_eq!(
        render_str("{% loop rows %}{{ item.name }}={{ item.n }};{% /loop %}", &context),
        "a=1;b=2;"
    );
}

#[test]
fn test_mixed_element_types_print_canonically() {
    let context = json!({"xs": [1, "two", [3], {"f": 4}, null, true]});
    assert_eq!(
        render_str("{% loop xs %}{{ item }};{% /loop %}", &context),
        r#"1;two;[3];{"f":4};;true;"#
    );
}

#[test]
fn test_object_entries_iterate_in_key_order() {
    let context = json!({"map": {"zz": 1, "aa": 2, "mm": 3}});
    assert_eq!(
        render_str(
            "{% loop map %}{{ item.key }}:{{ item.value }} {% /loop %}",
            &context
        ),
        "aa:2 mm:3 zz:1 "
    );
}

#[test]
fn test_object_entry_values_may_be_collections() {
    let context = json!({"map": {"a": [1, 2]}});
    assert_eq!(
        render_str("{% loop map %}{{ item.value }}{% /loop %}", &context),
        "[1,2]"
    );
}

#[test]
fn test_object_entry_paths_walk_into_values() {
    let context = json!({"map": {"a": {"deep": 1}}});
    assert_eq!(
        render_str("{% loop map %}{{ item.value.deep }}{% /loop %}", &context),
        "1"
    );
}

#[test]
fn test_nested_loops_shadow_item() {
    let context = json!({"xs": [{"ys": [1, 2]}, {"ys": [3]}]});
    assert_eq!(
        render_str(
            "{% loop xs %}({% loop item.ys %}{{ item }}{% /loop %}){% /loop %}",
            &context
        ),
        "(12)(3)"
    );
}

#[test]
fn test_outer_item_returns_after_inner_loop() {
    let context = json!({"xs": [{"id": "A", "ys": [1]}, {"id": "B", "ys": [2]}]});
    assert_eq!(
        render_str(
            "{% loop xs %}{{ item.id }}[{% loop item.ys %}{{ item }}{% /loop %}]{{ item.id }} {% /loop %}",
            &context
        ),
        "A[1]A B[2]B "
    );
}

#[test]
fn test_loop_over_the_bound_item() {
    let context = json!({"xs": [[1, 2], [3]]});
    assert_eq!(
        render_str(
            "{% loop xs %}({% loop item %}{{ item }}{% /loop %}){% /loop %}",
            &context
        ),
        "(12)(3)"
    );
}

#[test]
fn test_loop_bodies_mix_literals_and_conditionals() {
    let text = "{% loop xs %}{% if item %}{{ item }}{% /if %};{% /loop %}";
    let context = json!({"xs": [true, false, 1, 0]});
    assert_eq!(render_str(text, &context), "true;;1;;");
}

#[test]
fn test_loops_inside_conditionals() {
    let text = "{% if xs %}{% loop xs %}{{ item }}{% /loop %}{% else %}empty{% /if %}";
    assert_eq!(render_str(text, &json!({"xs": [1, 2]})), "12");
    assert_eq!(render_str(text, &json!({"xs": []})), "empty");
}
