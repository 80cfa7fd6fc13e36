use weft_ast::{NodeArena, NodeIndex};

use crate::evaluation::{EvalResult, EvalValue};
use crate::tree::Tree;

type Build = fn(&mut NodeArena) -> (Vec<NodeIndex>, NodeIndex);

/// Evaluate the expression `build` returns, placed after its statements.
fn evaluate(build: Build) -> EvalResult {
    let mut arena = NodeArena::new();
    let (mut body, expression) = build(&mut arena);
    let last = body.len();
    body.push(arena.expression_statement(expression).unwrap());
    let program = arena.program(body).unwrap();
    let mut tree = Tree::new(arena, program);
    let root = tree.root_path();
    let path = tree.get(root, &format!("body.{last}.expression")).unwrap();
    tree.evaluate(path).unwrap()
}

fn value(build: Build) -> EvalValue {
    let result = evaluate(build);
    assert!(result.confident, "expected a confident result");
    result.value.unwrap()
}

fn declare(arena: &mut NodeArena, kind: &str, name: &str, init: NodeIndex) -> NodeIndex {
    let id = arena.identifier(name).unwrap();
    let declarator = arena.variable_declarator(id, init).unwrap();
    arena.variable_declaration(kind, vec![declarator]).unwrap()
}

fn num(arena: &mut NodeArena, n: f64) -> NodeIndex {
    arena.numeric_literal(n).unwrap()
}

#[test]
fn test_arithmetic() {
    let v = value(|a| {
        let (one, two, three) = (num(a, 1.0), num(a, 2.0), num(a, 3.0));
        let product = a.binary_expression("*", two, three).unwrap();
        (vec![], a.binary_expression("+", one, product).unwrap())
    });
    assert_eq!(v, EvalValue::Number(7.0));

    let v = value(|a| {
        let s = a.string_literal("a").unwrap();
        let one = num(a, 1.0);
        (vec![], a.binary_expression("+", s, one).unwrap())
    });
    assert_eq!(v, EvalValue::String("a1".into()));

    let v = value(|a| {
        let (minus_one, zero) = (num(a, 1.0), num(a, 0.0));
        let minus_one = a.unary_expression("-", minus_one).unwrap();
        (vec![], a.binary_expression(">>>", minus_one, zero).unwrap())
    });
    assert_eq!(v, EvalValue::Number(4_294_967_295.0));
}

#[test]
fn test_constant_binding_is_followed() {
    let v = value(|a| {
        let two = num(a, 2.0);
        let declaration = declare(a, "const", "k", two);
        let k = a.identifier("k").unwrap();
        let five = num(a, 5.0);
        (vec![declaration], a.binary_expression("*", k, five).unwrap())
    });
    assert_eq!(v, EvalValue::Number(10.0));
}

#[test]
fn test_binding_value_is_memoized() {
    let mut arena = NodeArena::new();
    let four = arena.numeric_literal(4.0).unwrap();
    let declaration = declare(&mut arena, "let", "k", four);
    let k = arena.identifier("k").unwrap();
    let statement = arena.expression_statement(k).unwrap();
    let program = arena.program(vec![declaration, statement]).unwrap();
    let mut tree = Tree::new(arena, program);
    let root = tree.root_path();
    let path = tree.get(root, "body.1.expression").unwrap();

    assert_eq!(tree.evaluate(path).unwrap().value, Some(EvalValue::Number(4.0)));
    let scope = tree.scope_of(path).unwrap().unwrap();
    let id = tree.get_binding(scope, "k").unwrap();
    let binding = tree.binding(id).unwrap();
    assert!(binding.has_value);
    assert_eq!(binding.value, Some(EvalValue::Number(4.0)));
}

#[test]
fn test_reassigned_binding_deopts() {
    let mut arena = NodeArena::new();
    let one = arena.numeric_literal(1.0).unwrap();
    let declaration = declare(&mut arena, "let", "b", one);
    let target = arena.identifier("b").unwrap();
    let two = arena.numeric_literal(2.0).unwrap();
    let assign = arena.assignment_expression("=", target, two).unwrap();
    let assign = arena.expression_statement(assign).unwrap();
    let b = arena.identifier("b").unwrap();
    let read = arena.expression_statement(b).unwrap();
    let program = arena.program(vec![declaration, assign, read]).unwrap();
    let mut tree = Tree::new(arena, program);
    let root = tree.root_path();
    let path = tree.get(root, "body.2.expression").unwrap();

    let result = tree.evaluate(path).unwrap();
    assert!(!result.confident);
    assert_eq!(result.value, None);
    let declarator = tree.get(root, "body.0.declarations.0").unwrap();
    assert_eq!(result.deopt, Some(declarator));
}

#[test]
fn test_unknowns_and_cycles_deopt() {
    let result = evaluate(|a| (vec![], a.identifier("window").unwrap()));
    assert!(!result.confident);

    // var c = c; c
    let result = evaluate(|a| {
        let init = a.identifier("c").unwrap();
        let declaration = declare(a, "var", "c", init);
        (vec![declaration], a.identifier("c").unwrap())
    });
    assert!(!result.confident);

    let result = evaluate(|a| {
        let callee = a.identifier("f").unwrap();
        (vec![], a.call_expression(callee, vec![]).unwrap())
    });
    assert!(!result.confident);
}

#[test]
fn test_globals_with_known_values() {
    let v = value(|a| {
        let undefined = a.identifier("undefined").unwrap();
        (vec![], a.unary_expression("typeof", undefined).unwrap())
    });
    assert_eq!(v, EvalValue::String("undefined".into()));

    let v = value(|a| {
        let zero = num(a, 0.0);
        (vec![], a.unary_expression("void", zero).unwrap())
    });
    assert_eq!(v, EvalValue::Undefined);

    let v = value(|a| {
        let infinity = a.identifier("Infinity").unwrap();
        (vec![], a.unary_expression("-", infinity).unwrap())
    });
    assert_eq!(v, EvalValue::Number(f64::NEG_INFINITY));
}

#[test]
fn test_logical_confidence() {
    // true || unknown
    let v = value(|a| {
        let t = a.boolean_literal(true).unwrap();
        let unknown = a.identifier("unknown").unwrap();
        (vec![], a.logical_expression("||", t, unknown).unwrap())
    });
    assert_eq!(v, EvalValue::Bool(true));

    // false && unknown
    let v = value(|a| {
        let f = a.boolean_literal(false).unwrap();
        let unknown = a.identifier("unknown").unwrap();
        (vec![], a.logical_expression("&&", f, unknown).unwrap())
    });
    assert_eq!(v, EvalValue::Bool(false));

    // null ?? "x"
    let v = value(|a| {
        let null = a.null_literal().unwrap();
        let x = a.string_literal("x").unwrap();
        (vec![], a.logical_expression("??", null, x).unwrap())
    });
    assert_eq!(v, EvalValue::String("x".into()));

    // unknown || true
    let result = evaluate(|a| {
        let unknown = a.identifier("unknown").unwrap();
        let t = a.boolean_literal(true).unwrap();
        (vec![], a.logical_expression("||", unknown, t).unwrap())
    });
    assert!(!result.confident);
}

#[test]
fn test_conditional_template_and_length() {
    let v = value(|a| {
        let test = num(a, 1.0);
        let yes = a.string_literal("yes").unwrap();
        let unknown = a.identifier("unknown").unwrap();
        (vec![], a.conditional_expression(test, yes, unknown).unwrap())
    });
    assert_eq!(v, EvalValue::String("yes".into()));

    let v = value(|a| {
        let head = a.template_element("a", false).unwrap();
        let tail = a.template_element("b", true).unwrap();
        let (one, two) = (num(a, 1.0), num(a, 1.5));
        let sum = a.binary_expression("+", one, two).unwrap();
        (vec![], a.template_literal(vec![head, tail], vec![sum]).unwrap())
    });
    assert_eq!(v, EvalValue::String("a2.5b".into()));

    let v = value(|a| {
        let s = a.string_literal("héllo").unwrap();
        let length = a.identifier("length").unwrap();
        (vec![], a.member_expression(s, length, false).unwrap())
    });
    assert_eq!(v, EvalValue::Number(5.0));

    let v = value(|a| {
        let (one, two) = (num(a, 1.0), num(a, 2.0));
        (vec![], a.sequence_expression(vec![one, two]).unwrap())
    });
    assert_eq!(v, EvalValue::Number(2.0));
}

#[test]
fn test_evaluate_truthy() {
    let mut arena = NodeArena::new();
    let zero = arena.numeric_literal(0.0).unwrap();
    let not_zero = arena.unary_expression("!", zero).unwrap();
    let first = arena.expression_statement(not_zero).unwrap();
    let foo = arena.identifier("foo").unwrap();
    let second = arena.expression_statement(foo).unwrap();
    let program = arena.program(vec![first, second]).unwrap();
    let mut tree = Tree::new(arena, program);
    let root = tree.root_path();

    let path = tree.get(root, "body.0.expression").unwrap();
    assert_eq!(tree.evaluate_truthy(path).unwrap(), Some(true));
    let path = tree.get(root, "body.1.expression").unwrap();
    assert_eq!(tree.evaluate_truthy(path).unwrap(), None);
}

#[test]
fn test_js_conversions() {
    let n = |v: f64| EvalValue::Number(v).to_js_string();
    assert_eq!(n(-0.0), "0");
    assert_eq!(n(0.1), "0.1");
    assert_eq!(n(42.0), "42");
    assert_eq!(n(1e21), "1e+21");
    assert_eq!(n(1.5e-7), "1.5e-7");
    assert_eq!(n(f64::NAN), "NaN");
    assert_eq!(n(f64::NEG_INFINITY), "-Infinity");

    let s = |v: &str| EvalValue::String(v.into()).to_number();
    assert_eq!(s(" 42 "), 42.0);
    assert_eq!(s(""), 0.0);
    assert_eq!(s("0x1F"), 31.0);
    assert_eq!(s("1e3"), 1000.0);
    assert!(s("inf").is_nan());
    assert!(s("12px").is_nan());

    assert!(EvalValue::Null.loose_equals(&EvalValue::Undefined));
    assert!(EvalValue::String("1".into()).loose_equals(&EvalValue::Number(1.0)));
    assert!(EvalValue::Bool(true).loose_equals(&EvalValue::Number(1.0)));
    assert!(!EvalValue::Null.loose_equals(&EvalValue::Number(0.0)));
    assert!(!EvalValue::Number(f64::NAN).strict_equals(&EvalValue::Number(f64::NAN)));
    assert!(EvalValue::Number(0.0).strict_equals(&EvalValue::Number(-0.0)));
    assert_eq!(EvalValue::Null.type_of(), "object");
    assert!(!EvalValue::String(String::new()).to_boolean());
}
