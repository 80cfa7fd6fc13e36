//! End-to-end runs of plugins through the facade.

use serde_json::json;
use weft::{NodeArena, NodeIndex, NodeType, Plugin, TraverseError, Tree, TreeOptions, Visitor};

fn statement(arena: &mut NodeArena, name: &str) -> NodeIndex {
    let id = arena.identifier(name).unwrap();
    arena.expression_statement(id).unwrap()
}

/// Replaces every binary expression with a known numeric value by a literal.
fn constant_folding() -> Plugin<()> {
    let visitor = Visitor::new().exit("BinaryExpression", |tree, path, _| {
        let result = tree.evaluate(path)?;
        if let (true, Some(weft::EvalValue::Number(n))) = (result.confident, result.value) {
            let literal = tree.arena_mut().numeric_literal(n)?;
            tree.replace_with(path, literal)?;
        }
        Ok(())
    });
    Plugin::new("constant-folding", visitor)
}

#[test]
fn test_constant_folding_plugin() {
    // x = 1 + 2 * 3;
    let mut arena = NodeArena::new();
    let x = arena.identifier("x").unwrap();
    let one = arena.numeric_literal(1.0).unwrap();
    let two = arena.numeric_literal(2.0).unwrap();
    let three = arena.numeric_literal(3.0).unwrap();
    let product = arena.binary_expression("*", two, three).unwrap();
    let sum = arena.binary_expression("+", one, product).unwrap();
    let assignment = arena.assignment_expression("=", x, sum).unwrap();
    let statement = arena.expression_statement(assignment).unwrap();
    let program = arena.program(vec![statement]).unwrap();

    let (arena, program) = weft::transform(
        arena,
        program,
        TreeOptions::default(),
        vec![constant_folding()],
        &mut (),
    )
    .unwrap();

    let json = arena.to_json(program);
    let right = &json["body"][0]["expression"]["right"];
    assert_eq!(right["type"], "NumericLiteral");
    assert_eq!(right["value"], json!(7.0));
}

#[test]
fn test_plugins_run_in_registration_order_per_node() {
    let first = Visitor::<Vec<String>>::new().enter("Identifier", |tree, path, log| {
        log.push(format!("first:{}", tree.arena().name(tree.node(path)).unwrap()));
        Ok(())
    });
    let second = Visitor::<Vec<String>>::new().enter("Identifier", |tree, path, log| {
        log.push(format!("second:{}", tree.arena().name(tree.node(path)).unwrap()));
        Ok(())
    });

    let mut arena = NodeArena::new();
    let x = statement(&mut arena, "x");
    let y = statement(&mut arena, "y");
    let program = arena.program(vec![x, y]).unwrap();
    let mut tree = Tree::new(arena, program);

    let mut log = Vec::new();
    weft::run_plugins(
        &mut tree,
        vec![Plugin::new("first", first), Plugin::new("second", second)],
        &mut log,
    )
    .unwrap();
    assert_eq!(log, vec!["first:x", "second:x", "first:y", "second:y"]);
}

#[test]
fn test_rename_inside_a_plugin() {
    // let foo = 1; foo;
    let renamer = Visitor::<Vec<String>>::new()
        .enter("Program", |tree, path, _| {
            let scope = tree
                .scope_of(path)?
                .ok_or_else(|| tree.error_at(path, "program without a scope"))?;
            tree.rename(scope, "foo", Some("bar"))?;
            Ok(())
        })
        .enter("ReferencedIdentifier", |tree, path, seen| {
            seen.push(tree.arena().name(tree.node(path)).unwrap().to_string());
            Ok(())
        });

    let mut arena = NodeArena::new();
    let id = arena.identifier("foo").unwrap();
    let one = arena.numeric_literal(1.0).unwrap();
    let declarator = arena.variable_declarator(id, one).unwrap();
    let declaration = arena.variable_declaration("let", vec![declarator]).unwrap();
    let read = statement(&mut arena, "foo");
    let program = arena.program(vec![declaration, read]).unwrap();
    let mut tree = Tree::new(arena, program);

    let mut seen = Vec::new();
    weft::run_plugins(&mut tree, vec![Plugin::new("rename", renamer)], &mut seen).unwrap();
    assert_eq!(seen, vec!["bar"]);

    let root = tree.root_path();
    let scope = tree.scope_of(root).unwrap().unwrap();
    let snapshot = tree.snapshot(scope);
    let bar = snapshot.binding("bar").unwrap();
    assert_eq!(bar.references, 1);
    assert!(snapshot.binding("foo").is_none());
}

#[test]
fn test_bad_plugin_key_fails_before_running() {
    let visitor = Visitor::<usize>::new().enter("NotANode", |_, _, n| {
        *n += 1;
        Ok(())
    });
    let mut arena = NodeArena::new();
    let x = statement(&mut arena, "x");
    let program = arena.program(vec![x]).unwrap();

    let mut count = 0;
    let err = weft::transform(
        arena,
        program,
        TreeOptions::default(),
        vec![Plugin::new("broken", visitor)],
        &mut count,
    )
    .unwrap_err();
    assert!(matches!(err, TraverseError::UnknownVisitorKey { ref key } if key == "NotANode"));
    assert_eq!(count, 0);
}

#[test]
fn test_no_scope_trees_still_traverse() {
    let counter = Visitor::<usize>::new().enter("Identifier", |tree, path, n| {
        assert!(tree.scope_of(path)?.is_none());
        *n += 1;
        Ok(())
    });
    let mut arena = NodeArena::new();
    let x = statement(&mut arena, "x");
    let program = arena.program(vec![x]).unwrap();
    let options = TreeOptions {
        no_scope: true,
        ..TreeOptions::default()
    };

    let mut count = 0;
    let (arena, program) =
        weft::transform(arena, program, options, vec![Plugin::new("count", counter)], &mut count).unwrap();
    assert_eq!(count, 1);
    assert_eq!(arena.ty(program), Some(NodeType::Program));
}
