//! Visitor normalization.
//!
//! Expands alias and virtual keys into a per-type dispatch table once,
//! before any traversal starts. Unknown keys fail here.

use std::rc::Rc;

use weft_ast::identifier::is_compat_tag;
use weft_ast::{Alias, NodeArena, NodeIndex, NodeType, TypeKey, predicates};

use crate::error::{Result, TraverseError};
use crate::path::PathId;
use crate::tree::Tree;
use crate::visitor::{Handler, Phase, Visitor};

/// Keys that select nodes by a per-path check rather than by type alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualType {
    /// An identifier read (JSX host tags excluded).
    ReferencedIdentifier,
    /// An identifier in a binding position.
    BindingIdentifier,
    /// A node that owns a scope.
    Scope,
    BlockScoped,
    /// A `var` declaration.
    Var,
    /// Any node in a read position.
    Referenced,
}

impl VirtualType {
    pub fn from_name(name: &str) -> Option<VirtualType> {
        Some(match name {
            "ReferencedIdentifier" => VirtualType::ReferencedIdentifier,
            "BindingIdentifier" => VirtualType::BindingIdentifier,
            "Scope" => VirtualType::Scope,
            "BlockScoped" => VirtualType::BlockScoped,
            "Var" => VirtualType::Var,
            "Referenced" => VirtualType::Referenced,
            _ => return None,
        })
    }

    /// Types a check can possibly pass for.
    fn types(self) -> Vec<NodeType> {
        match self {
            VirtualType::ReferencedIdentifier => vec![NodeType::Identifier, NodeType::JSXIdentifier],
            VirtualType::BindingIdentifier => vec![NodeType::Identifier],
            VirtualType::Scope => Alias::Scopable.members().to_vec(),
            VirtualType::BlockScoped => vec![
                NodeType::FunctionDeclaration,
                NodeType::ClassDeclaration,
                NodeType::VariableDeclaration,
            ],
            VirtualType::Var => vec![NodeType::VariableDeclaration],
            VirtualType::Referenced => NodeType::ALL.to_vec(),
        }
    }

    pub fn matches(self, tree: &Tree, path: PathId) -> bool {
        let arena = tree.arena();
        let node = tree.node(path);
        let parent = tree.parent_node(path);
        let grandparent = tree
            .parent_path(path)
            .map_or(NodeIndex::NONE, |p| tree.parent_node(p));
        match self {
            VirtualType::ReferencedIdentifier => {
                let Some(ty) = arena.ty(node) else {
                    return false;
                };
                if ty == NodeType::JSXIdentifier
                    && !arena.is(parent, NodeType::JSXMemberExpression)
                    && arena.name(node).is_some_and(is_compat_tag)
                {
                    return false;
                }
                predicates::is_referenced(arena, node, parent, grandparent)
            }
            VirtualType::BindingIdentifier => {
                arena.is(node, NodeType::Identifier) && predicates::is_binding(arena, node, parent)
            }
            VirtualType::Scope => predicates::is_scope(arena, node, parent),
            VirtualType::BlockScoped => predicates::is_block_scoped(arena, node),
            VirtualType::Var => predicates::is_var(arena, node),
            VirtualType::Referenced => predicates::is_referenced(arena, node, parent, grandparent),
        }
    }
}

pub(crate) struct Entry<S> {
    pub(crate) handler: Handler<S>,
    pub(crate) check: Option<VirtualType>,
}

/// Dispatch table built from one or more merged visitors.
pub struct NormalizedVisitor<S> {
    enter: Vec<Vec<Entry<S>>>,
    exit: Vec<Vec<Entry<S>>>,
    any_enter: Vec<Handler<S>>,
    any_exit: Vec<Handler<S>>,
    denylist: Vec<bool>,
}

enum Key {
    Type(TypeKey),
    Virtual(VirtualType),
}

fn parse_key(key: &str) -> Result<Key> {
    if let Some(virtual_type) = VirtualType::from_name(key) {
        return Ok(Key::Virtual(virtual_type));
    }
    TypeKey::parse(key)
        .map(Key::Type)
        .ok_or_else(|| TraverseError::UnknownVisitorKey {
            key: key.to_string(),
        })
}

impl<S> NormalizedVisitor<S> {
    pub fn new(visitor: Visitor<S>) -> Result<Self> {
        let mut normalized = NormalizedVisitor {
            enter: (0..NodeType::COUNT).map(|_| Vec::new()).collect(),
            exit: (0..NodeType::COUNT).map(|_| Vec::new()).collect(),
            any_enter: Vec::new(),
            any_exit: Vec::new(),
            denylist: vec![false; NodeType::COUNT],
        };
        for ty in &visitor.options.denylist {
            normalized.denylist[ty.index()] = true;
        }

        for entry in visitor.entries {
            let Some(key) = entry.key else {
                match entry.phase {
                    Phase::Enter => normalized.any_enter.push(entry.handler),
                    Phase::Exit => normalized.any_exit.push(entry.handler),
                }
                continue;
            };
            for part in key.split('|').map(str::trim) {
                let (types, check) = match parse_key(part)? {
                    Key::Type(type_key) => (type_key.expand(), None),
                    Key::Virtual(virtual_type) => (virtual_type.types(), Some(virtual_type)),
                };
                let table = match entry.phase {
                    Phase::Enter => &mut normalized.enter,
                    Phase::Exit => &mut normalized.exit,
                };
                for ty in types {
                    table[ty.index()].push(Entry {
                        handler: Rc::clone(&entry.handler),
                        check,
                    });
                }
            }
        }
        Ok(normalized)
    }

    pub(crate) fn entries(&self, ty: NodeType, phase: Phase) -> &[Entry<S>] {
        match phase {
            Phase::Enter => &self.enter[ty.index()],
            Phase::Exit => &self.exit[ty.index()],
        }
    }

    pub(crate) fn any_handlers(&self, phase: Phase) -> &[Handler<S>] {
        match phase {
            Phase::Enter => &self.any_enter,
            Phase::Exit => &self.any_exit,
        }
    }

    pub fn is_denylisted(&self, ty: NodeType) -> bool {
        self.denylist[ty.index()]
    }

    /// Whether any handler is registered for `ty` in either phase.
    pub fn handles(&self, ty: NodeType) -> bool {
        !self.enter[ty.index()].is_empty() || !self.exit[ty.index()].is_empty()
    }

    /// Nodes with no handlers and no children are never queued.
    pub(crate) fn should_visit(&self, arena: &NodeArena, node: NodeIndex) -> bool {
        let Some(n) = arena.get(node) else {
            return false;
        };
        if !self.any_enter.is_empty() || !self.any_exit.is_empty() || self.handles(n.ty) {
            return true;
        }
        n.children().next().is_some()
    }
}
