use crate::arena::NodeArena;
use crate::identifier::{is_valid_identifier, to_identifier};
use crate::node::NodeIndex;
use crate::predicates::*;

#[test]
fn test_member_property_is_not_referenced() {
    let mut arena = NodeArena::new();
    let obj = arena.identifier("a").unwrap();
    let prop = arena.identifier("b").unwrap();
    let member = arena.member_expression(obj, prop, false).unwrap();
    assert!(is_referenced(&arena, obj, member, NodeIndex::NONE));
    assert!(!is_referenced(&arena, prop, member, NodeIndex::NONE));

    let obj2 = arena.identifier("a").unwrap();
    let prop2 = arena.identifier("k").unwrap();
    let computed = arena.member_expression(obj2, prop2, true).unwrap();
    assert!(is_referenced(&arena, prop2, computed, NodeIndex::NONE));
}

#[test]
fn test_declarator_and_assignment_sides() {
    let mut arena = NodeArena::new();
    let id = arena.identifier("x").unwrap();
    let init = arena.identifier("y").unwrap();
    let decl = arena.variable_declarator(id, init).unwrap();
    assert!(!is_referenced(&arena, id, decl, NodeIndex::NONE));
    assert!(is_referenced(&arena, init, decl, NodeIndex::NONE));
    assert!(is_binding(&arena, id, decl));
    assert!(!is_binding(&arena, init, decl));

    let left = arena.identifier("x").unwrap();
    let right = arena.identifier("z").unwrap();
    let assign = arena.assignment_expression("=", left, right).unwrap();
    assert!(!is_referenced(&arena, left, assign, NodeIndex::NONE));
    assert!(is_referenced(&arena, right, assign, NodeIndex::NONE));
}

#[test]
fn test_object_pattern_value_is_a_binding() {
    let mut arena = NodeArena::new();
    let key = arena.identifier("a").unwrap();
    let value = arena.identifier("b").unwrap();
    let prop = arena.object_property(key, value).unwrap();
    let pattern = arena.object_pattern(vec![prop]).unwrap();
    assert!(!is_referenced(&arena, value, prop, pattern));
    assert!(!is_referenced(&arena, key, prop, pattern));

    let key2 = arena.identifier("a").unwrap();
    let value2 = arena.identifier("b").unwrap();
    let prop2 = arena.object_property(key2, value2).unwrap();
    let object = arena.object_expression(vec![prop2]).unwrap();
    assert!(is_referenced(&arena, value2, prop2, object));
}

#[test]
fn test_labels_are_not_references() {
    let mut arena = NodeArena::new();
    let label = arena.identifier("outer").unwrap();
    let brk = arena.break_statement(label).unwrap();
    assert!(!is_referenced(&arena, label, brk, NodeIndex::NONE));
}

#[test]
fn test_get_binding_identifiers_through_patterns() {
    let mut arena = NodeArena::new();
    let a = arena.identifier("a").unwrap();
    let b = arena.identifier("b").unwrap();
    let rest = arena.identifier("rest").unwrap();
    let rest_el = arena.rest_element(rest).unwrap();
    let default = arena.numeric_literal(1.0).unwrap();
    let with_default = arena.assignment_pattern(b, default).unwrap();
    let arr = arena.array_pattern(vec![a, NodeIndex::NONE, with_default, rest_el]).unwrap();
    let init = arena.identifier("src").unwrap();
    let decl = arena.variable_declarator(arr, init).unwrap();
    let var = arena.variable_declaration("let", vec![decl]).unwrap();

    let ids = get_binding_identifiers(&arena, var, false);
    let names: Vec<&str> = ids.keys().map(String::as_str).collect();
    assert_eq!(names, ["a", "b", "rest"]);
    assert_eq!(ids["b"], vec![b]);
}

#[test]
fn test_outer_only_function_identifiers() {
    let mut arena = NodeArena::new();
    let id = arena.identifier("f").unwrap();
    let param = arena.identifier("p").unwrap();
    let body = arena.block_statement(vec![]).unwrap();
    let func = arena.function_declaration(id, vec![param], body).unwrap();

    let all = get_binding_identifiers(&arena, func, false);
    assert!(all.contains_key("f") && all.contains_key("p"));
    let outer = get_binding_identifiers(&arena, func, true);
    assert_eq!(outer.keys().collect::<Vec<_>>(), ["f"]);
}

#[test]
fn test_scope_and_block_scoping() {
    let mut arena = NodeArena::new();
    let body = arena.block_statement(vec![]).unwrap();
    let func = arena.function_declaration(NodeIndex::NONE, vec![], body).unwrap();
    assert!(is_scope(&arena, func, NodeIndex::NONE));
    assert!(!is_scope(&arena, body, func));

    let inner = arena.block_statement(vec![]).unwrap();
    let outer = arena.block_statement(vec![inner]).unwrap();
    assert!(is_scope(&arena, inner, outer));

    let x = arena.identifier("x").unwrap();
    let decl = arena.variable_declarator(x, NodeIndex::NONE).unwrap();
    let let_decl = arena.variable_declaration("let", vec![decl]).unwrap();
    assert!(is_let(&arena, let_decl));
    assert!(is_block_scoped(&arena, let_decl));
    assert!(!is_var(&arena, let_decl));
    assert!(is_block_scoped(&arena, func));
}

#[test]
fn test_matches_pattern() {
    let mut arena = NodeArena::new();
    let a = arena.identifier("a").unwrap();
    let b = arena.identifier("b").unwrap();
    let ab = arena.member_expression(a, b, false).unwrap();
    let c = arena.string_literal("c").unwrap();
    let abc = arena.member_expression(ab, c, true).unwrap();

    assert!(matches_pattern(&arena, abc, "a.b.c", false));
    assert!(!matches_pattern(&arena, abc, "a.b", false));
    assert!(matches_pattern(&arena, abc, "a.b", true));
    assert!(!matches_pattern(&arena, abc, "a.x.c", false));
    assert!(!matches_pattern(&arena, a, "a", false));
}

#[test]
fn test_identifier_helpers() {
    assert!(is_valid_identifier("_a1"));
    assert!(!is_valid_identifier("1a"));
    assert!(!is_valid_identifier("class"));
    assert_eq!(to_identifier("foo-bar"), "fooBar");
    assert_eq!(to_identifier("9lives"), "lives");
    assert_eq!(to_identifier("class"), "_class");
    assert_eq!(to_identifier(""), "_");
}
