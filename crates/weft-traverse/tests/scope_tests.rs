//! Scope crawling, binding bookkeeping, uid generation and renaming.

use weft_ast::{NodeArena, NodeIndex, NodeType};
use weft_traverse::{BindingKind, ScopeId, TraverseError, Tree, TreeOptions, UidRegistry};

fn declare(arena: &mut NodeArena, kind: &str, name: &str, init: NodeIndex) -> NodeIndex {
    let id = arena.identifier(name).unwrap();
    let declarator = arena.variable_declarator(id, init).unwrap();
    arena.variable_declaration(kind, vec![declarator]).unwrap()
}

fn assign(arena: &mut NodeArena, name: &str, value: f64) -> NodeIndex {
    let target = arena.identifier(name).unwrap();
    let value = arena.numeric_literal(value).unwrap();
    let assignment = arena.assignment_expression("=", target, value).unwrap();
    arena.expression_statement(assignment).unwrap()
}

fn read(arena: &mut NodeArena, name: &str) -> NodeIndex {
    let id = arena.identifier(name).unwrap();
    arena.expression_statement(id).unwrap()
}

fn program_scope(tree: &mut Tree) -> ScopeId {
    let root = tree.root_path();
    tree.scope_of(root).unwrap().unwrap()
}

/// `let x = 1; x = 2; x; { const y = x; } g;`
fn sample() -> Tree {
    let mut arena = NodeArena::new();
    let one = arena.numeric_literal(1.0).unwrap();
    let declaration = declare(&mut arena, "let", "x", one);
    let assignment = assign(&mut arena, "x", 2.0);
    let x = read(&mut arena, "x");
    let init = arena.identifier("x").unwrap();
    let inner = declare(&mut arena, "const", "y", init);
    let block = arena.block_statement(vec![inner]).unwrap();
    let g = read(&mut arena, "g");
    let program = arena
        .program(vec![declaration, assignment, x, block, g])
        .unwrap();
    Tree::new(arena, program)
}

#[test]
fn test_let_binding_tracks_references_and_violations() {
    let mut tree = sample();
    let scope = program_scope(&mut tree);
    let id = tree.get_binding(scope, "x").unwrap();
    let binding = tree.binding(id).unwrap();

    assert_eq!(binding.kind, BindingKind::Let);
    assert!(!binding.constant);
    assert_eq!(binding.constant_violations.len(), 1);
    assert_eq!(binding.references, 2);
    assert_eq!(tree.globals(scope), vec!["g"]);
    assert!(tree.has_global(scope, "g"));
    assert!(!tree.has_own_binding(scope, "y"));
}

#[test]
fn test_snapshot_shows_nested_scopes() {
    let mut tree = sample();
    let scope = program_scope(&mut tree);
    let snapshot = tree.snapshot(scope);

    assert_eq!(snapshot.block_type, "Program");
    let x = snapshot.binding("x").unwrap();
    assert_eq!((x.references, x.violations, x.constant), (2, 1, false));
    assert_eq!(snapshot.globals, vec!["g"]);

    assert_eq!(snapshot.children.len(), 1);
    let block = &snapshot.children[0];
    assert_eq!(block.block_type, "BlockStatement");
    let y = block.binding("y").unwrap();
    assert_eq!(y.kind, BindingKind::Const);
    assert!(y.constant);
    assert!(block.globals.is_empty());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["bindings"][0]["kind"], "let");
}

#[test]
fn test_crawl_is_idempotent() {
    let mut tree = sample();
    let scope = program_scope(&mut tree);
    let before = tree.snapshot(scope);
    tree.crawl(scope).unwrap();
    tree.crawl(scope).unwrap();
    assert_eq!(tree.snapshot(scope), before);
}

#[test]
fn test_duplicate_block_scoped_declarations_fail() {
    let mut arena = NodeArena::new();
    let first = declare(&mut arena, "let", "x", NodeIndex::NONE);
    let second = declare(&mut arena, "let", "x", NodeIndex::NONE);
    let program = arena.program(vec![first, second]).unwrap();
    let mut tree = Tree::new(arena, program);
    let root = tree.root_path();

    let err = tree.scope_of(root).unwrap_err();
    assert!(matches!(err, TraverseError::DuplicateDeclaration { ref name, .. } if name == "x"));

    let mut arena = NodeArena::new();
    let first = declare(&mut arena, "let", "x", NodeIndex::NONE);
    let second = declare(&mut arena, "var", "x", NodeIndex::NONE);
    let program = arena.program(vec![first, second]).unwrap();
    let mut tree = Tree::new(arena, program);
    let root = tree.root_path();
    assert!(tree.scope_of(root).is_err());
}

#[test]
fn test_let_cannot_shadow_a_parameter_in_the_same_function() {
    let mut arena = NodeArena::new();
    let param = arena.identifier("a").unwrap();
    let inner = declare(&mut arena, "let", "a", NodeIndex::NONE);
    let body = arena.block_statement(vec![inner]).unwrap();
    let name = arena.identifier("f").unwrap();
    let function = arena.function_declaration(name, vec![param], body).unwrap();
    let program = arena.program(vec![function]).unwrap();
    let mut tree = Tree::new(arena, program);
    let root = tree.root_path();

    assert!(matches!(
        tree.scope_of(root),
        Err(TraverseError::DuplicateDeclaration { .. })
    ));
}

#[test]
fn test_var_redeclaration_merges() {
    // var v = 1; v; var v = 2; v;
    let mut arena = NodeArena::new();
    let one = arena.numeric_literal(1.0).unwrap();
    let two = arena.numeric_literal(2.0).unwrap();
    let first = declare(&mut arena, "var", "v", one);
    let first_read = read(&mut arena, "v");
    let second = declare(&mut arena, "var", "v", two);
    let second_read = read(&mut arena, "v");
    let program = arena
        .program(vec![first, first_read, second, second_read])
        .unwrap();
    let mut tree = Tree::new(arena, program);
    let scope = program_scope(&mut tree);

    let snapshot = tree.snapshot(scope);
    assert_eq!(snapshot.bindings.len(), 1);
    let v = snapshot.binding("v").unwrap();
    assert_eq!(v.kind, BindingKind::Var);
    assert_eq!(v.violations, 1);
    assert_eq!(v.references, 2);
    assert!(!v.constant);

    let root = tree.root_path();
    let reads = [
        tree.get(root, "body.1.expression").unwrap(),
        tree.get(root, "body.3.expression").unwrap(),
    ];
    let id = tree.get_own_binding(scope, "v").unwrap();
    assert_eq!(tree.binding(id).unwrap().reference_paths, reads);
}

#[test]
fn test_let_in_function_scope() {
    // function f() { let x = 1; x = 2; return x; }
    let mut arena = NodeArena::new();
    let one = arena.numeric_literal(1.0).unwrap();
    let declaration = declare(&mut arena, "let", "x", one);
    let assignment = assign(&mut arena, "x", 2.0);
    let x = arena.identifier("x").unwrap();
    let ret = arena.return_statement(x).unwrap();
    let body = arena
        .block_statement(vec![declaration, assignment, ret])
        .unwrap();
    let name = arena.identifier("f").unwrap();
    let function = arena.function_declaration(name, Vec::new(), body).unwrap();
    let program = arena.program(vec![function]).unwrap();
    let mut tree = Tree::new(arena, program);

    let program = program_scope(&mut tree);
    let root = tree.root_path();
    let f = tree.get(root, "body.0").unwrap();
    let scope = tree.scope_of(f).unwrap().unwrap();
    assert_eq!(tree.scope_block(scope), tree.node(f));
    assert!(!tree.has_own_binding(program, "x"));

    let id = tree.get_own_binding(scope, "x").unwrap();
    let ret = tree.get(f, "body.body.2.argument").unwrap();
    let binding = tree.binding(id).unwrap();
    assert_eq!(binding.kind, BindingKind::Let);
    assert!(!binding.constant);
    assert_eq!(binding.constant_violations.len(), 1);
    assert_eq!(binding.references, 1);
    assert_eq!(binding.reference_paths, vec![ret]);
}

#[test]
fn test_function_scope_sees_params_and_hoists_vars() {
    // function f(p) { if (p) { var h; let b; } }
    let mut arena = NodeArena::new();
    let p = arena.identifier("p").unwrap();
    let h = declare(&mut arena, "var", "h", NodeIndex::NONE);
    let b = declare(&mut arena, "let", "b", NodeIndex::NONE);
    let block = arena.block_statement(vec![h, b]).unwrap();
    let test = arena.identifier("p").unwrap();
    let if_statement = arena.if_statement(test, block, NodeIndex::NONE).unwrap();
    let body = arena.block_statement(vec![if_statement]).unwrap();
    let name = arena.identifier("f").unwrap();
    let function = arena.function_declaration(name, vec![p], body).unwrap();
    let program = arena.program(vec![function]).unwrap();
    let mut tree = Tree::new(arena, program);

    let root = tree.root_path();
    let inner = tree.get(root, "body.0.body.body.0.consequent").unwrap();
    let block_scope = tree.scope_of(inner).unwrap().unwrap();
    let function_scope = tree.get_function_parent(block_scope);
    let program = tree.get_program_parent(block_scope);

    assert_eq!(tree.node_type(tree.scope_path(function_scope)), Some(NodeType::FunctionDeclaration));
    assert!(tree.has_own_binding(function_scope, "p"));
    assert!(tree.has_own_binding(function_scope, "h"));
    assert!(tree.has_own_binding(block_scope, "b"));
    assert!(!tree.has_own_binding(function_scope, "b"));
    assert!(tree.has_own_binding(program, "f"));

    let p = tree.get_binding(block_scope, "p").unwrap();
    let p = tree.binding(p).unwrap();
    assert_eq!(p.kind, BindingKind::Param);
    assert_eq!(p.references, 1);
}

#[test]
fn test_generated_uids_avoid_every_known_name() {
    // let temp = 1; _temp;
    let mut arena = NodeArena::new();
    let one = arena.numeric_literal(1.0).unwrap();
    let declaration = declare(&mut arena, "let", "temp", one);
    let global = read(&mut arena, "_temp");
    let program = arena.program(vec![declaration, global]).unwrap();
    let mut tree = Tree::new(arena, program);
    let scope = program_scope(&mut tree);

    assert_eq!(tree.generate_uid(scope, "temp").unwrap(), "_temp2");
    assert_eq!(tree.generate_uid(scope, "temp").unwrap(), "_temp3");
    assert_eq!(tree.generate_uid(scope, "_ref7").unwrap(), "ref");
    assert_eq!(tree.generate_uid(scope, "ref").unwrap(), "_ref");
    assert!(tree.has_uid(scope, "_temp2"));
    assert!(tree.has_binding(scope, "_temp3", true));

    let foo = arena_identifier(&mut tree, "foo");
    let bar = arena_identifier(&mut tree, "bar");
    let member = tree.arena_mut().member_expression(foo, bar, false).unwrap();
    let id = tree
        .generate_uid_identifier_based_on_node(scope, member, None)
        .unwrap();
    assert_eq!(tree.arena().name(id), Some("foo$bar"));
}

fn arena_identifier(tree: &mut Tree, name: &str) -> NodeIndex {
    tree.arena_mut().identifier(name).unwrap()
}

#[test]
fn test_shared_registry_keeps_trees_apart() {
    let registry = UidRegistry::new();
    let mut trees: Vec<Tree> = (0..2)
        .map(|_| {
            let mut arena = NodeArena::new();
            let program = arena.program(Vec::new()).unwrap();
            let options = TreeOptions {
                uid_registry: Some(registry.clone()),
                ..TreeOptions::default()
            };
            Tree::with_options(arena, program, options)
        })
        .collect();

    let mut names = Vec::new();
    for tree in &mut trees {
        let scope = program_scope(tree);
        names.push(tree.generate_uid(scope, "x").unwrap());
    }
    assert_eq!(names, vec!["x", "_x"]);
    assert!(registry.contains("x"));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_declared_uids_share_one_declaration() {
    let mut arena = NodeArena::new();
    let x = read(&mut arena, "x");
    let program = arena.program(vec![x]).unwrap();
    let mut tree = Tree::new(arena, program);
    let scope = program_scope(&mut tree);

    tree.generate_declared_uid_identifier(scope, "tmp").unwrap();
    tree.generate_declared_uid_identifier(scope, "tmp").unwrap();

    let body = tree.arena().list(tree.root(), "body").unwrap().to_vec();
    assert_eq!(body.len(), 2);
    let declaration = tree.arena().node(body[0]).unwrap();
    assert_eq!(declaration.ty, NodeType::VariableDeclaration);
    assert_eq!(declaration.str_field("kind").unwrap(), Some("var"));
    assert_eq!(declaration.list("declarations").unwrap().len(), 2);

    for name in ["tmp", "_tmp"] {
        let id = tree.get_own_binding(scope, name).unwrap();
        assert_eq!(tree.binding(id).unwrap().kind, BindingKind::Var);
    }
}

#[test]
fn test_rename_leaves_shadowed_names_alone() {
    // let a = 1; function f(a) { return a; } a;
    let mut arena = NodeArena::new();
    let one = arena.numeric_literal(1.0).unwrap();
    let declaration = declare(&mut arena, "let", "a", one);
    let param = arena.identifier("a").unwrap();
    let inner = arena.identifier("a").unwrap();
    let ret = arena.return_statement(inner).unwrap();
    let body = arena.block_statement(vec![ret]).unwrap();
    let name = arena.identifier("f").unwrap();
    let function = arena.function_declaration(name, vec![param], body).unwrap();
    let outer = read(&mut arena, "a");
    let program = arena.program(vec![declaration, function, outer]).unwrap();
    let mut tree = Tree::new(arena, program);
    let scope = program_scope(&mut tree);

    let renamed = tree.rename(scope, "a", Some("b")).unwrap();
    assert_eq!(renamed.as_deref(), Some("b"));

    let root = tree.root_path();
    let name_at = |tree: &mut Tree, key: &str| {
        let path = tree.get(root, key).unwrap();
        tree.arena().name(tree.node(path)).unwrap().to_string()
    };
    assert_eq!(name_at(&mut tree, "body.0.declarations.0.id"), "b");
    assert_eq!(name_at(&mut tree, "body.2.expression"), "b");
    assert_eq!(name_at(&mut tree, "body.1.params.0"), "a");
    assert_eq!(name_at(&mut tree, "body.1.body.body.0.argument"), "a");

    assert!(tree.get_own_binding(scope, "a").is_none());
    let b = tree.get_own_binding(scope, "b").unwrap();
    assert_eq!(tree.binding(b).unwrap().name, "b");

    // Without a target name a fresh uid is picked.
    let renamed = tree.rename(scope, "b", None).unwrap();
    assert_eq!(renamed.as_deref(), Some("_b"));
    assert_eq!(tree.rename(scope, "missing", None).unwrap(), None);
}
