//! Path mutations outside of a traversal: insertion, replacement and
//! removal, and the scope bookkeeping that follows them.

use weft_ast::{NodeArena, NodeIndex, NodeType, Value};
use weft_traverse::{Slot, Tree};

fn statement(arena: &mut NodeArena, name: &str) -> NodeIndex {
    let id = arena.identifier(name).unwrap();
    arena.expression_statement(id).unwrap()
}

fn program_of(mut arena: NodeArena, body: Vec<NodeIndex>) -> Tree {
    let program = arena.program(body).unwrap();
    Tree::new(arena, program)
}

fn statements(names: &[&str]) -> Tree {
    let mut arena = NodeArena::new();
    let body = names.iter().map(|name| statement(&mut arena, name)).collect();
    program_of(arena, body)
}

/// Expression names of a statement list; anything unnamed shows its type.
fn names(tree: &Tree, parent: NodeIndex, list: &str) -> Vec<String> {
    let arena = tree.arena();
    arena
        .list(parent, list)
        .unwrap()
        .iter()
        .map(|&statement| match arena.ty(statement) {
            Some(NodeType::ExpressionStatement) => {
                let expression = arena.child(statement, "expression").unwrap();
                match arena.name(expression) {
                    Some(name) => name.to_string(),
                    None => arena.ty(expression).map_or("?", NodeType::name).to_string(),
                }
            }
            ty => ty.map_or("?", NodeType::name).to_string(),
        })
        .collect()
}

fn declaration(arena: &mut NodeArena, kind: &str, name: &str, value: f64) -> NodeIndex {
    let id = arena.identifier(name).unwrap();
    let init = arena.numeric_literal(value).unwrap();
    let declarator = arena.variable_declarator(id, init).unwrap();
    arena.variable_declaration(kind, vec![declarator]).unwrap()
}

fn body(tree: &Tree) -> Vec<String> {
    names(tree, tree.root(), "body")
}

#[test]
fn test_container_insertions() {
    let mut tree = statements(&["b"]);
    let root = tree.root_path();

    let c = statement(tree.arena_mut(), "c");
    let pushed = tree.push_container(root, "body", &[c]).unwrap();
    let a = statement(tree.arena_mut(), "a");
    tree.unshift_container(root, "body", &[a]).unwrap();

    assert_eq!(body(&tree), vec!["a", "b", "c"]);
    assert_eq!(tree.location(pushed[0]), "program.body[2]");
    assert!(tree.unshift_container(root, "directives", &[]).unwrap().is_empty());
    assert!(tree.push_container(root, "sourceType", &[]).is_err());
}

#[test]
fn test_insert_around_list_entries() {
    let mut tree = statements(&["a", "b"]);
    let root = tree.root_path();
    let b = tree.get(root, "body.1").unwrap();

    let x = statement(tree.arena_mut(), "x");
    let inserted = tree.insert_before(b, &[x]).unwrap();
    let y = statement(tree.arena_mut(), "y");
    tree.insert_after(b, &[y]).unwrap();

    assert_eq!(body(&tree), vec!["a", "x", "b", "y"]);
    assert_eq!(tree.location(inserted[0]), "program.body[1]");
    assert_eq!(
        tree.slot(b),
        Slot::Index {
            list: "body",
            index: 2
        }
    );
}

#[test]
fn test_insert_next_to_a_single_statement_body_makes_a_block() {
    // if (t) a;
    let mut arena = NodeArena::new();
    let t = arena.identifier("t").unwrap();
    let a = statement(&mut arena, "a");
    let if_statement = arena.if_statement(t, a, NodeIndex::NONE).unwrap();
    let mut tree = program_of(arena, vec![if_statement]);
    let root = tree.root_path();
    let consequent = tree.get(root, "body.0.consequent").unwrap();

    let b = statement(tree.arena_mut(), "b");
    tree.insert_after(consequent, &[b]).unwrap();

    assert_eq!(tree.node_type(consequent), Some(NodeType::BlockStatement));
    assert_eq!(names(&tree, tree.node(consequent), "body"), vec!["a", "b"]);
}

#[test]
fn test_insert_before_an_expression_makes_a_sequence() {
    // f(x)
    let mut arena = NodeArena::new();
    let f = arena.identifier("f").unwrap();
    let x = arena.identifier("x").unwrap();
    let call = arena.call_expression(f, vec![x]).unwrap();
    let call = arena.expression_statement(call).unwrap();
    let mut tree = program_of(arena, vec![call]);
    let root = tree.root_path();
    let argument = tree.get(root, "body.0.expression.arguments.0").unwrap();

    let y = statement(tree.arena_mut(), "y");
    tree.insert_before(argument, &[y]).unwrap();

    assert_eq!(tree.node_type(argument), Some(NodeType::SequenceExpression));
    let expressions = tree.arena().list(tree.node(argument), "expressions").unwrap();
    let found: Vec<_> = expressions
        .iter()
        .map(|&e| tree.arena().name(e).unwrap())
        .collect();
    assert_eq!(found, vec!["y", "x"]);
}

#[test]
fn test_insert_after_an_expression_keeps_its_value() {
    // x = f();
    let mut arena = NodeArena::new();
    let x = arena.identifier("x").unwrap();
    let f = arena.identifier("f").unwrap();
    let call = arena.call_expression(f, Vec::new()).unwrap();
    let assignment = arena.assignment_expression("=", x, call).unwrap();
    let assignment = arena.expression_statement(assignment).unwrap();
    let mut tree = program_of(arena, vec![assignment]);
    let root = tree.root_path();
    let right = tree.get(root, "body.0.expression.right").unwrap();

    let g = statement(tree.arena_mut(), "g");
    tree.insert_after(right, &[g]).unwrap();

    // var temp; x = (temp = f(), g, temp);
    assert_eq!(body(&tree), vec!["VariableDeclaration", "AssignmentExpression"]);
    assert_eq!(tree.node_type(right), Some(NodeType::SequenceExpression));
    let expressions = tree.arena().list(tree.node(right), "expressions").unwrap().to_vec();
    assert_eq!(expressions.len(), 3);
    assert!(tree.arena().is(expressions[0], NodeType::AssignmentExpression));
    assert_eq!(tree.arena().name(expressions[1]), Some("g"));
    assert_eq!(tree.arena().name(expressions[2]), Some("temp"));

    let scope = tree.scope_of(root).unwrap().unwrap();
    assert!(tree.has_own_binding(scope, "temp"));
}

#[test]
fn test_replace_with_multiple() {
    let mut tree = statements(&["a", "b"]);
    let root = tree.root_path();
    let a = tree.get(root, "body.0").unwrap();

    let x = statement(tree.arena_mut(), "x");
    let y = statement(tree.arena_mut(), "y");
    let paths = tree.replace_with_multiple(a, &[x, y]).unwrap();

    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0], a);
    assert_eq!(body(&tree), vec!["x", "y", "b"]);

    tree.replace_with_multiple(a, &[]).unwrap();
    assert!(tree.is_removed(a));
    assert_eq!(body(&tree), vec!["y", "b"]);
}

#[test]
fn test_expression_into_statement_slot_is_wrapped() {
    let mut tree = statements(&["a"]);
    let root = tree.root_path();
    let a = tree.get(root, "body.0").unwrap();

    let b = tree.arena_mut().identifier("b").unwrap();
    tree.replace_with(a, b).unwrap();

    assert_eq!(tree.node_type(a), Some(NodeType::ExpressionStatement));
    assert_eq!(body(&tree), vec!["b"]);

    let other = tree.arena_mut().program(Vec::new()).unwrap();
    let call = tree.arena_mut().identifier("c").unwrap();
    assert!(tree.replace_with(root, call).is_err());
    tree.replace_with(root, other).unwrap();
    assert_eq!(tree.root(), other);
    assert!(body(&tree).is_empty());
}

#[test]
fn test_statements_into_expression_slot_use_a_function() {
    // r = <if (t) 1; else 2;>
    let mut arena = NodeArena::new();
    let r = arena.identifier("r").unwrap();
    let placeholder = arena.identifier("placeholder").unwrap();
    let assignment = arena.assignment_expression("=", r, placeholder).unwrap();
    let assignment = arena.expression_statement(assignment).unwrap();
    let mut tree = program_of(arena, vec![assignment]);
    let root = tree.root_path();
    let right = tree.get(root, "body.0.expression.right").unwrap();

    let arena = tree.arena_mut();
    let t = arena.identifier("t").unwrap();
    let one = arena.numeric_literal(1.0).unwrap();
    let one = arena.expression_statement(one).unwrap();
    let two = arena.numeric_literal(2.0).unwrap();
    let two = arena.expression_statement(two).unwrap();
    let if_statement = arena.if_statement(t, one, two).unwrap();
    tree.replace_expression_with_statements(right, &[if_statement]).unwrap();

    assert_eq!(tree.node_type(right), Some(NodeType::CallExpression));
    let consequent = tree.get(right, "callee.body.body.0.consequent").unwrap();
    let alternate = tree.get(right, "callee.body.body.0.alternate").unwrap();
    assert_eq!(tree.node_type(consequent), Some(NodeType::ReturnStatement));
    assert_eq!(tree.node_type(alternate), Some(NodeType::ReturnStatement));
}

#[test]
fn test_removal_simplifies_parents() {
    // x = 1 + 2; (a, b); y;
    let mut arena = NodeArena::new();
    let x = arena.identifier("x").unwrap();
    let one = arena.numeric_literal(1.0).unwrap();
    let two = arena.numeric_literal(2.0).unwrap();
    let sum = arena.binary_expression("+", one, two).unwrap();
    let assignment = arena.assignment_expression("=", x, sum).unwrap();
    let assignment = arena.expression_statement(assignment).unwrap();
    let a = arena.identifier("a").unwrap();
    let b = arena.identifier("b").unwrap();
    let sequence = arena.sequence_expression(vec![a, b]).unwrap();
    let sequence = arena.expression_statement(sequence).unwrap();
    let y = statement(&mut arena, "y");
    let mut tree = program_of(arena, vec![assignment, sequence, y]);
    let root = tree.root_path();

    let right_operand = tree.get(root, "body.0.expression.right.right").unwrap();
    tree.remove(right_operand).unwrap();
    let right = tree.get(root, "body.0.expression.right").unwrap();
    assert_eq!(tree.node_type(right), Some(NodeType::NumericLiteral));

    let a = tree.get(root, "body.1.expression.expressions.0").unwrap();
    tree.remove(a).unwrap();
    assert!(tree.is_removed(a));
    assert_eq!(body(&tree)[1], "b");

    // Removing the expression takes the statement with it.
    let y = tree.get(root, "body.2.expression").unwrap();
    tree.remove(y).unwrap();
    assert_eq!(body(&tree).len(), 2);
    assert!(tree.remove(root).is_err());
}

#[test]
fn test_removal_keeps_required_slots_filled() {
    // if (t) a; else b; while (w) c;
    let mut arena = NodeArena::new();
    let t = arena.identifier("t").unwrap();
    let a = statement(&mut arena, "a");
    let b = statement(&mut arena, "b");
    let if_statement = arena.if_statement(t, a, b).unwrap();
    let w = arena.identifier("w").unwrap();
    let c = statement(&mut arena, "c");
    let while_statement = arena.while_statement(w, c).unwrap();
    let mut tree = program_of(arena, vec![if_statement, while_statement]);
    let root = tree.root_path();

    let consequent = tree.get(root, "body.0.consequent").unwrap();
    tree.remove(consequent).unwrap();
    let consequent = tree.get(root, "body.0.consequent").unwrap();
    assert_eq!(tree.node_type(consequent), Some(NodeType::BlockStatement));

    let alternate = tree.get(root, "body.0.alternate").unwrap();
    tree.remove(alternate).unwrap();
    let if_path = tree.get(root, "body.0").unwrap();
    let if_node = tree.node(if_path);
    assert!(tree.arena().child(if_node, "alternate").unwrap().is_none());

    let loop_body = tree.get(root, "body.1.body").unwrap();
    tree.remove(loop_body).unwrap();
    let loop_body = tree.get(root, "body.1.body").unwrap();
    assert_eq!(tree.node_type(loop_body), Some(NodeType::BlockStatement));

    // A loop without its test goes away entirely.
    let test = tree.get(root, "body.1.test").unwrap();
    tree.remove(test).unwrap();
    assert_eq!(body(&tree), vec!["IfStatement"]);
}

#[test]
fn test_removing_a_declaration_drops_its_binding() {
    // let a = 1; a;
    let mut arena = NodeArena::new();
    let id = arena.identifier("a").unwrap();
    let one = arena.numeric_literal(1.0).unwrap();
    let declarator = arena.variable_declarator(id, one).unwrap();
    let declaration = arena.variable_declaration("let", vec![declarator]).unwrap();
    let a = statement(&mut arena, "a");
    let mut tree = program_of(arena, vec![declaration, a]);
    let root = tree.root_path();
    let scope = tree.scope_of(root).unwrap().unwrap();
    assert!(tree.has_own_binding(scope, "a"));

    let declarator = tree.get(root, "body.0.declarations.0").unwrap();
    tree.remove(declarator).unwrap();
    assert_eq!(body(&tree), vec!["a"]);
    assert!(!tree.has_own_binding(scope, "a"));
    assert!(tree.has_global(scope, "a"));
}

#[test]
fn test_removing_one_var_declaration_keeps_the_merged_binding() {
    // var x = 1; var x = 2; x;
    let mut arena = NodeArena::new();
    let first = declaration(&mut arena, "var", "x", 1.0);
    let second = declaration(&mut arena, "var", "x", 2.0);
    let read = statement(&mut arena, "x");
    let mut tree = program_of(arena, vec![first, second, read]);
    let root = tree.root_path();
    let scope = tree.scope_of(root).unwrap().unwrap();
    let id = tree.get_own_binding(scope, "x").unwrap();
    let binding = tree.binding(id).unwrap();
    assert_eq!((binding.references, binding.constant_violations.len()), (1, 1));

    let removed = tree.get(root, "body.0").unwrap();
    tree.remove(removed).unwrap();

    let survivor = tree.get(root, "body.0.declarations.0").unwrap();
    assert_eq!(tree.get_own_binding(scope, "x"), Some(id));
    let binding = tree.binding(id).unwrap();
    assert_eq!(binding.path, survivor);
    assert_eq!(binding.references, 1);
    assert!(binding.constant);
    assert!(binding.constant_violations.is_empty());
    assert!(binding.redeclarations.is_empty());
    assert!(!tree.has_global(scope, "x"));
}

#[test]
fn test_removing_a_shadowing_declaration_rebinds_its_reads() {
    // let x = 1; { let x = 2; x; }
    let mut arena = NodeArena::new();
    let outer = declaration(&mut arena, "let", "x", 1.0);
    let inner = declaration(&mut arena, "let", "x", 2.0);
    let read = statement(&mut arena, "x");
    let block = arena.block_statement(vec![inner, read]).unwrap();
    let mut tree = program_of(arena, vec![outer, block]);
    let root = tree.root_path();
    let program_scope = tree.scope_of(root).unwrap().unwrap();
    let block_path = tree.get(root, "body.1").unwrap();
    let block_scope = tree.scope_of(block_path).unwrap().unwrap();
    let outer_id = tree.get_own_binding(program_scope, "x").unwrap();
    assert_eq!(tree.binding(outer_id).unwrap().references, 0);

    let inner_path = tree.get(block_path, "body.0").unwrap();
    tree.remove(inner_path).unwrap();

    assert!(!tree.has_own_binding(block_scope, "x"));
    assert_eq!(tree.get_binding(block_scope, "x"), Some(outer_id));
    assert_eq!(tree.binding(outer_id).unwrap().references, 1);
    assert!(!tree.has_global(program_scope, "x"));
}

#[test]
fn test_replacing_with_a_nested_function_keeps_its_scope() {
    // (() => function (a) { a; });  becomes  (function (a) { a; });
    let mut arena = NodeArena::new();
    let a = arena.identifier("a").unwrap();
    let read = statement(&mut arena, "a");
    let block = arena.block_statement(vec![read]).unwrap();
    let inner = arena.function_expression(NodeIndex::NONE, vec![a], block).unwrap();
    let arrow = arena.arrow_function_expression(Vec::new(), inner).unwrap();
    let outer = arena.expression_statement(arrow).unwrap();
    let mut tree = program_of(arena, vec![outer]);
    let root = tree.root_path();
    let program_scope = tree.scope_of(root).unwrap().unwrap();
    let arrow_path = tree.get(root, "body.0.expression").unwrap();
    let inner_path = tree.get(arrow_path, "body").unwrap();
    let inner_scope = tree.scope_of(inner_path).unwrap().unwrap();
    assert_ne!(tree.scope_parent(inner_scope), Some(program_scope));

    tree.replace_with(arrow_path, inner).unwrap();

    assert_eq!(tree.node(arrow_path), inner);
    assert_eq!(tree.scope_of(arrow_path).unwrap(), Some(inner_scope));
    assert_eq!(tree.scope_parent(inner_scope), Some(program_scope));
    let param = tree.get_own_binding(inner_scope, "a").unwrap();
    assert_eq!(tree.binding(param).unwrap().references, 1);
}

#[test]
fn test_inserted_declarations_are_registered() {
    let mut tree = statements(&["x"]);
    let root = tree.root_path();
    let scope = tree.scope_of(root).unwrap().unwrap();
    assert!(tree.has_global(scope, "x"));

    let arena = tree.arena_mut();
    let id = arena.identifier("x").unwrap();
    let zero = arena.numeric_literal(0.0).unwrap();
    let declarator = arena.variable_declarator(id, zero).unwrap();
    let declaration = arena.variable_declaration("var", vec![declarator]).unwrap();
    tree.unshift_container(root, "body", &[declaration]).unwrap();

    let binding = tree.get_own_binding(scope, "x").unwrap();
    assert_eq!(tree.binding(binding).unwrap().kind.name(), "var");
}

#[test]
fn test_ensure_block() {
    // () => x; while (w) y;
    let mut arena = NodeArena::new();
    let x = arena.identifier("x").unwrap();
    let arrow = arena.arrow_function_expression(Vec::new(), x).unwrap();
    let arrow = arena.expression_statement(arrow).unwrap();
    let w = arena.identifier("w").unwrap();
    let y = statement(&mut arena, "y");
    let while_statement = arena.while_statement(w, y).unwrap();
    let mut tree = program_of(arena, vec![arrow, while_statement]);
    let root = tree.root_path();

    let arrow = tree.get(root, "body.0.expression").unwrap();
    let block = tree.ensure_block(arrow).unwrap();
    assert_eq!(tree.node_type(block), Some(NodeType::BlockStatement));
    let ret = tree.get(block, "body.0").unwrap();
    assert_eq!(tree.node_type(ret), Some(NodeType::ReturnStatement));
    assert_eq!(tree.field(arrow, "expression").unwrap(), Value::Bool(false));
    // Already a block: nothing changes.
    assert_eq!(tree.ensure_block(arrow).unwrap(), block);

    let loop_path = tree.get(root, "body.1").unwrap();
    let block = tree.ensure_block(loop_path).unwrap();
    assert_eq!(names(&tree, tree.node(block), "body"), vec!["y"]);
}

#[test]
fn test_replace_inline_in_a_list() {
    let mut tree = statements(&["a", "b", "c"]);
    let root = tree.root_path();
    let b = tree.get(root, "body.1").unwrap();

    let x = statement(tree.arena_mut(), "x");
    let y = statement(tree.arena_mut(), "y");
    let paths = tree.replace_inline(b, &[x, y]).unwrap();
    assert_eq!(body(&tree), vec!["a", "x", "y", "c"]);
    assert_eq!(paths.len(), 2);
    assert_eq!(tree.node(paths[0]), x);
    assert!(tree.is_removed(b));

    let z = statement(tree.arena_mut(), "z");
    let c = tree.get(root, "body.3").unwrap();
    assert_eq!(tree.replace_inline(c, &[z]).unwrap(), vec![c]);
    assert_eq!(body(&tree), vec!["a", "x", "y", "z"]);
}

/// `function f() { return 1 + 2; }`
fn constant_in_function() -> Tree {
    let mut arena = NodeArena::new();
    let one = arena.numeric_literal(1.0).unwrap();
    let two = arena.numeric_literal(2.0).unwrap();
    let sum = arena.binary_expression("+", one, two).unwrap();
    let ret = arena.return_statement(sum).unwrap();
    let block = arena.block_statement(vec![ret]).unwrap();
    let id = arena.identifier("f").unwrap();
    let function = arena.function_declaration(id, vec![], block).unwrap();
    program_of(arena, vec![function])
}

#[test]
fn test_hoist_moves_a_constant_out_of_its_function() {
    let mut tree = constant_in_function();
    let root = tree.root_path();
    let sum = tree.get(root, "body.0.body.body.0.argument").unwrap();

    let declaration = tree.hoist(sum).unwrap().unwrap();
    assert_eq!(tree.location(declaration), "program.body[0]");
    assert_eq!(body(&tree), vec!["VariableDeclaration", "FunctionDeclaration"]);

    let argument = tree.get(root, "body.1.body.body.0.argument").unwrap();
    let uid = tree.arena().name(tree.node(argument)).unwrap().to_string();
    let init = tree.get(declaration, "declarations.0.init").unwrap();
    assert_eq!(tree.node_type(init), Some(NodeType::BinaryExpression));

    let scope = tree.scope_of(root).unwrap().unwrap();
    let id = tree.get_own_binding(scope, &uid).unwrap();
    let binding = tree.binding(id).unwrap();
    assert_eq!(binding.references, 1);
    assert_eq!(binding.reference_paths, vec![argument]);
}

#[test]
fn test_hoist_stops_at_the_scope_owning_a_read() {
    // function outer() { var a = 1; return function () { return a + 1; }; }
    let mut arena = NodeArena::new();
    let a = arena.identifier("a").unwrap();
    let one = arena.numeric_literal(1.0).unwrap();
    let sum = arena.binary_expression("+", a, one).unwrap();
    let inner_return = arena.return_statement(sum).unwrap();
    let inner_body = arena.block_statement(vec![inner_return]).unwrap();
    let inner = arena.function_expression(NodeIndex::NONE, vec![], inner_body).unwrap();
    let outer_return = arena.return_statement(inner).unwrap();
    let declaration = declaration(&mut arena, "var", "a", 1.0);
    let outer_body = arena.block_statement(vec![declaration, outer_return]).unwrap();
    let id = arena.identifier("outer").unwrap();
    let outer = arena.function_declaration(id, vec![], outer_body).unwrap();
    let mut tree = program_of(arena, vec![outer]);
    let root = tree.root_path();
    let sum = tree.get(root, "body.0.body.body.1.argument.body.body.0.argument").unwrap();
    let outer_path = tree.get(root, "body.0").unwrap();
    let outer_scope = tree.scope_of(outer_path).unwrap().unwrap();
    let a_id = tree.get_own_binding(outer_scope, "a").unwrap();

    let hoisted = tree.hoist(sum).unwrap().unwrap();
    assert_eq!(tree.location(hoisted), "program.body[0].body.body[1]");
    let outer_body = tree.get(outer_path, "body").unwrap();
    assert_eq!(
        names(&tree, tree.node(outer_body), "body"),
        vec!["VariableDeclaration", "VariableDeclaration", "ReturnStatement"]
    );
    assert_eq!(tree.binding(a_id).unwrap().references, 1);
    let root_scope = tree.scope_of(root).unwrap().unwrap();
    assert!(tree.get_own_binding(root_scope, "a").is_none());
}

#[test]
fn test_hoist_keeps_reads_of_own_params_in_place() {
    // function f(p) { return p + 1; }
    let mut arena = NodeArena::new();
    let p = arena.identifier("p").unwrap();
    let one = arena.numeric_literal(1.0).unwrap();
    let sum = arena.binary_expression("+", p, one).unwrap();
    let ret = arena.return_statement(sum).unwrap();
    let block = arena.block_statement(vec![ret]).unwrap();
    let id = arena.identifier("f").unwrap();
    let param = arena.identifier("p").unwrap();
    let function = arena.function_declaration(id, vec![param], block).unwrap();
    let mut tree = program_of(arena, vec![function]);
    let root = tree.root_path();
    let sum = tree.get(root, "body.0.body.body.0.argument").unwrap();

    assert_eq!(tree.hoist(sum).unwrap(), None);
    assert_eq!(body(&tree), vec!["FunctionDeclaration"]);
    assert_eq!(tree.node_type(sum), Some(NodeType::BinaryExpression));
}

#[test]
fn test_clear_node_drops_metadata_and_cached_paths() {
    let mut tree = statements(&["a", "b"]);
    let root = tree.root_path();
    let a = tree.get(root, "body.0").unwrap();
    let program = tree.root();
    tree.arena_mut().get_mut(program).unwrap().span = weft_common::Span::new(0, 4);
    tree.arena_mut()
        .get_mut(program)
        .unwrap()
        .set_extra("parenthesized", serde_json::Value::Bool(true));

    tree.clear_node(program);
    let node = tree.arena().get(program).unwrap();
    assert_eq!(node.span, weft_common::Span::SYNTHETIC);
    assert!(node.extra.is_none());
    let fresh = tree.get(root, "body.0").unwrap();
    assert_ne!(fresh, a);
    assert_eq!(tree.node(fresh), tree.node(a));
}
