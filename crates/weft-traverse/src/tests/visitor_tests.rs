use std::cell::RefCell;
use std::rc::Rc;

use weft_ast::{NodeArena, NodeType};

use crate::error::TraverseError;
use crate::normalize::NormalizedVisitor;
use crate::tree::Tree;
use crate::visitor::Visitor;

/// `let a = b; a;`
fn small_tree() -> Tree {
    let mut arena = NodeArena::new();
    let a = arena.identifier("a").unwrap();
    let b = arena.identifier("b").unwrap();
    let declarator = arena.variable_declarator(a, b).unwrap();
    let declaration = arena.variable_declaration("let", vec![declarator]).unwrap();
    let a_ref = arena.identifier("a").unwrap();
    let statement = arena.expression_statement(a_ref).unwrap();
    let program = arena.program(vec![declaration, statement]).unwrap();
    Tree::new(arena, program)
}

fn names_under(key: &str) -> Vec<String> {
    let visitor = Visitor::<Vec<String>>::new().enter(key, |tree, path, names| {
        names.push(tree.arena().name(tree.node(path)).unwrap_or("?").to_string());
        Ok(())
    });
    let visitor = NormalizedVisitor::new(visitor).unwrap();
    let mut names = Vec::new();
    small_tree().traverse(&visitor, &mut names).unwrap();
    names
}

#[test]
fn test_unknown_key_is_rejected() {
    let visitor = Visitor::<()>::new().enter("Identifer", |_, _, _| Ok(()));
    let result = NormalizedVisitor::new(visitor);
    assert!(matches!(
        result,
        Err(TraverseError::UnknownVisitorKey { ref key }) if key == "Identifer"
    ));
}

#[test]
fn test_alias_and_pipe_keys_expand() {
    let visitor = Visitor::<()>::new()
        .enter("Function", |_, _, _| Ok(()))
        .exit("StringLiteral | NumericLiteral", |_, _, _| Ok(()));
    let normalized = NormalizedVisitor::new(visitor).unwrap();

    assert!(normalized.handles(NodeType::FunctionDeclaration));
    assert!(normalized.handles(NodeType::ArrowFunctionExpression));
    assert!(normalized.handles(NodeType::StringLiteral));
    assert!(normalized.handles(NodeType::NumericLiteral));
    assert!(!normalized.handles(NodeType::Identifier));
}

#[test]
fn test_denylisted_types_are_not_visited() {
    let visitor = Visitor::<usize>::new()
        .enter("Identifier", |_, _, count| {
            *count += 1;
            Ok(())
        })
        .deny(NodeType::VariableDeclaration);
    let visitor = NormalizedVisitor::new(visitor).unwrap();
    assert!(visitor.is_denylisted(NodeType::VariableDeclaration));

    let mut count = 0;
    small_tree().traverse(&visitor, &mut count).unwrap();
    // Only the `a` of the expression statement.
    assert_eq!(count, 1);
}

#[test]
fn test_virtual_identifier_keys() {
    assert_eq!(names_under("ReferencedIdentifier"), vec!["b", "a"]);
    assert_eq!(names_under("BindingIdentifier"), vec!["a"]);
    assert_eq!(names_under("Identifier"), vec!["a", "b", "a"]);
}

#[test]
fn test_handler_order_within_a_node() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    let (l1, l2, l3, l4) = (log.clone(), log.clone(), log.clone(), log.clone());
    let visitor = Visitor::<()>::new()
        .enter("Expression", move |_, _, _| {
            l1.borrow_mut().push("expression".into());
            Ok(())
        })
        .enter_any(move |tree, path, _| {
            let ty = tree.node_type(path).map_or("?", NodeType::name);
            l2.borrow_mut().push(format!("any:{ty}"));
            Ok(())
        })
        .enter("Identifier", move |_, _, _| {
            l3.borrow_mut().push("identifier".into());
            Ok(())
        })
        .exit("Identifier", move |_, _, _| {
            l4.borrow_mut().push("exit".into());
            Ok(())
        });
    let visitor = NormalizedVisitor::new(visitor).unwrap();

    let mut arena = NodeArena::new();
    let a = arena.identifier("a").unwrap();
    let statement = arena.expression_statement(a).unwrap();
    let program = arena.program(vec![statement]).unwrap();
    let mut tree = Tree::new(arena, program);
    tree.traverse(&visitor, &mut ()).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "any:Program",
            "any:ExpressionStatement",
            "any:Identifier",
            "expression",
            "identifier",
            "exit",
        ]
    );
}

#[derive(Default)]
struct Counts {
    identifiers: usize,
    declarations: usize,
}

#[test]
fn test_merged_plugins_keep_their_own_state() {
    let identifiers = Visitor::<usize>::new().enter("Identifier", |_, _, n| {
        *n += 1;
        Ok(())
    });
    let declarations = Visitor::<usize>::new().enter("VariableDeclaration", |_, _, n| {
        *n += 1;
        Ok(())
    });
    let merged = identifiers
        .map_state(|c: &mut Counts| &mut c.identifiers)
        .merge(declarations.map_state(|c: &mut Counts| &mut c.declarations));
    let visitor = NormalizedVisitor::new(merged).unwrap();

    let mut counts = Counts::default();
    small_tree().traverse(&visitor, &mut counts).unwrap();
    assert_eq!(counts.identifiers, 3);
    assert_eq!(counts.declarations, 1);
}

#[test]
fn test_handler_error_aborts_traversal() {
    let visitor = Visitor::<usize>::new().enter("Identifier", |tree, path, seen| {
        *seen += 1;
        Err(tree.error_at(path, "no identifiers allowed"))
    });
    let visitor = NormalizedVisitor::new(visitor).unwrap();

    let mut seen = 0;
    let err = small_tree().traverse(&visitor, &mut seen).unwrap_err();
    assert_eq!(seen, 1);
    assert_eq!(
        err,
        TraverseError::Custom {
            location: "program.body[0].declarations[0].id".to_string(),
            message: "no identifiers allowed".to_string(),
        }
    );
}
