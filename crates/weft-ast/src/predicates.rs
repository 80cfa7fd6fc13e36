//! Structural predicates over parent/child node pairs.
//!
//! These only look at node shapes; scope-aware questions live in the
//! traversal crate.

use indexmap::IndexMap;

use crate::alias::Alias;
use crate::arena::NodeArena;
use crate::node::{NodeIndex, Value};
use crate::node_type::NodeType;

/// Fields of each type that hold binding identifiers, searched by
/// `get_binding_identifiers` and `is_binding`.
pub fn binding_keys(ty: NodeType) -> &'static [&'static str] {
    use NodeType::*;
    match ty {
        DeclareClass | DeclareFunction | DeclareModule | DeclareVariable | InterfaceDeclaration
        | TypeAlias | ClassDeclaration | ClassExpression | VariableDeclarator => &["id"],
        CatchClause => &["param"],
        LabeledStatement => &["label"],
        UnaryExpression | UpdateExpression | RestElement | RestProperty => &["argument"],
        AssignmentExpression | AssignmentPattern => &["left"],
        ImportSpecifier | ImportNamespaceSpecifier | ImportDefaultSpecifier => &["local"],
        ImportDeclaration => &["specifiers"],
        ExportSpecifier | ExportNamespaceSpecifier | ExportDefaultSpecifier => &["exported"],
        FunctionDeclaration | FunctionExpression => &["id", "params"],
        ObjectProperty | AssignmentProperty => &["value"],
        ArrayPattern => &["elements"],
        ObjectPattern => &["properties"],
        VariableDeclaration => &["declarations"],
        _ => &[],
    }
}

fn slot_holds(arena: &NodeArena, parent: NodeIndex, field: &str, node: NodeIndex) -> bool {
    match arena.get(parent).and_then(|p| p.field(field).ok()) {
        Some(Value::Node(idx)) => *idx == node,
        Some(Value::List(items)) => items.contains(&node),
        _ => false,
    }
}

fn flag(arena: &NodeArena, node: NodeIndex, field: &str) -> bool {
    arena
        .get(node)
        .and_then(|n| n.bool_field(field).ok())
        .unwrap_or(false)
}

/// Whether `node`, sitting in `parent`, is a read of its name.
///
/// `grandparent` disambiguates object-pattern properties and re-exports;
/// pass `NONE` when unknown.
pub fn is_referenced(
    arena: &NodeArena,
    node: NodeIndex,
    parent: NodeIndex,
    grandparent: NodeIndex,
) -> bool {
    use NodeType::*;
    let Some(parent_ty) = arena.ty(parent) else {
        return true;
    };
    let holds = |field: &str| slot_holds(arena, parent, field, node);

    match parent_ty {
        // obj::NODE, NODE::callee
        BindExpression => holds("object") || holds("callee"),
        // NODE.child, parent[NODE]; never parent.NODE
        MemberExpression | JSXMemberExpression => {
            (holds("property") && flag(arena, parent, "computed")) || holds("object")
        }
        MetaProperty => false,
        ObjectProperty | AssignmentProperty => {
            if holds("key") {
                return flag(arena, parent, "computed");
            }
            // ({ a: NODE } = obj) binds rather than reads
            !arena.ty(grandparent).is_some_and(|ty| ty == ObjectPattern)
        }
        VariableDeclarator => !holds("id"),
        ArrowFunctionExpression | FunctionDeclaration | FunctionExpression => {
            !holds("params") && !holds("id")
        }
        ExportSpecifier => {
            let reexport = arena
                .get(grandparent)
                .and_then(|g| g.child("source").ok())
                .is_some_and(|s| s.is_some());
            !reexport && holds("local")
        }
        ExportNamespaceSpecifier | ExportDefaultSpecifier => false,
        JSXAttribute => !holds("name"),
        ClassProperty => {
            if holds("key") {
                flag(arena, parent, "computed")
            } else {
                holds("value")
            }
        }
        ImportDefaultSpecifier | ImportNamespaceSpecifier | ImportSpecifier => false,
        ClassDeclaration | ClassExpression => !holds("id"),
        ClassMethod | ObjectMethod => holds("key") && flag(arena, parent, "computed"),
        LabeledStatement => false,
        BreakStatement | ContinueStatement => false,
        CatchClause => !holds("param"),
        RestElement => false,
        AssignmentExpression => holds("right"),
        AssignmentPattern => holds("right"),
        ObjectPattern | ArrayPattern => false,
        _ => true,
    }
}

/// Whether `node` is one of the binding-identifier slots of `parent`.
pub fn is_binding(arena: &NodeArena, node: NodeIndex, parent: NodeIndex) -> bool {
    let Some(parent_ty) = arena.ty(parent) else {
        return false;
    };
    binding_keys(parent_ty)
        .iter()
        .any(|field| slot_holds(arena, parent, field, node))
}

/// Identifiers bound by `node`, grouped by name in discovery order.
///
/// With `outer_only`, function declarations contribute only their own name
/// and function expressions contribute nothing.
pub fn get_binding_identifiers(
    arena: &NodeArena,
    node: NodeIndex,
    outer_only: bool,
) -> IndexMap<String, Vec<NodeIndex>> {
    let mut ids: IndexMap<String, Vec<NodeIndex>> = IndexMap::new();
    let mut search = std::collections::VecDeque::from([node]);

    while let Some(id) = search.pop_front() {
        let Some(current) = arena.get(id) else {
            continue;
        };
        let ty = current.ty;
        if ty == NodeType::Identifier {
            if let Some(name) = current.name() {
                ids.entry(name.to_string()).or_default().push(id);
            }
            continue;
        }
        if ty.is_alias_of(Alias::ExportDeclaration) {
            if let Ok(decl) = current.child("declaration")
                && arena
                    .ty(decl)
                    .is_some_and(|d| d.is_alias_of(Alias::Declaration))
            {
                search.push_back(decl);
            }
            continue;
        }
        if outer_only {
            match ty {
                NodeType::FunctionDeclaration => {
                    if let Ok(fn_id) = current.child("id") {
                        search.push_back(fn_id);
                    }
                    continue;
                }
                NodeType::FunctionExpression => continue,
                _ => {}
            }
        }
        for field in binding_keys(ty) {
            match current.field(field) {
                Ok(Value::Node(child)) => search.push_back(*child),
                Ok(Value::List(items)) => search.extend(items.iter().copied()),
                _ => {}
            }
        }
    }
    ids
}

pub fn is_let(arena: &NodeArena, node: NodeIndex) -> bool {
    arena.get(node).is_some_and(|n| {
        n.ty == NodeType::VariableDeclaration
            && n.str_field("kind").ok().flatten().is_some_and(|k| k != "var")
    })
}

pub fn is_var(arena: &NodeArena, node: NodeIndex) -> bool {
    arena.get(node).is_some_and(|n| {
        n.ty == NodeType::VariableDeclaration && n.str_field("kind").ok().flatten() == Some("var")
    })
}

/// Function and class declarations plus `let`/`const`.
pub fn is_block_scoped(arena: &NodeArena, node: NodeIndex) -> bool {
    matches!(
        arena.ty(node),
        Some(NodeType::FunctionDeclaration | NodeType::ClassDeclaration)
    ) || is_let(arena, node)
}

/// Whether `node` owns a scope. A block that is the body of a function or
/// catch clause shares the scope of its owner.
pub fn is_scope(arena: &NodeArena, node: NodeIndex, parent: NodeIndex) -> bool {
    let Some(ty) = arena.ty(node) else {
        return false;
    };
    if ty == NodeType::BlockStatement
        && let Some(parent_ty) = arena.ty(parent)
        && (parent_ty.is_alias_of(Alias::Function) || parent_ty == NodeType::CatchClause)
        && slot_holds(arena, parent, "body", node)
    {
        return false;
    }
    ty.is_alias_of(Alias::Scopable)
}

/// Match a member chain against `"a.b.c"`. With `allow_partial`, a longer
/// chain whose head matches also counts.
pub fn matches_pattern(arena: &NodeArena, member: NodeIndex, pattern: &str, allow_partial: bool) -> bool {
    if !arena.is(member, NodeType::MemberExpression) {
        return false;
    }
    let parts: Vec<&str> = pattern.split('.').collect();

    let mut nodes = Vec::new();
    let mut current = member;
    while let Some(node) = arena.get(current)
        && node.ty == NodeType::MemberExpression
    {
        nodes.push(node.child("property").unwrap_or(NodeIndex::NONE));
        current = node.child("object").unwrap_or(NodeIndex::NONE);
    }
    nodes.push(current);

    if nodes.len() < parts.len() || (!allow_partial && nodes.len() > parts.len()) {
        return false;
    }
    for (part, &node) in parts.iter().zip(nodes.iter().rev()) {
        let Some(n) = arena.get(node) else {
            return false;
        };
        let value = match n.ty {
            NodeType::Identifier => n.name(),
            NodeType::StringLiteral => n.str_field("value").ok().flatten(),
            _ => None,
        };
        if value != Some(*part) {
            return false;
        }
    }
    true
}

/// Literals and other nodes whose evaluation can't be observed.
pub fn is_immutable(arena: &NodeArena, node: NodeIndex) -> bool {
    let Some(n) = arena.get(node) else {
        return false;
    };
    if n.ty.is_alias_of(Alias::Immutable) {
        return true;
    }
    if n.ty == NodeType::Identifier {
        return n.name() == Some("undefined");
    }
    false
}
