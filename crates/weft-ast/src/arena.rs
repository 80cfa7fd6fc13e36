//! Node arena for tree storage.
//!
//! Nodes are stored contiguously and referenced by `NodeIndex`. Every
//! child-field write goes through the arena so that `Node::parent` always
//! names the single slot owner of a node.

use serde::Serialize;

use crate::error::ShapeError;
use crate::node::{Node, NodeIndex, Value};
use crate::node_type::{FieldKind, NodeType};

#[derive(Debug, Default, Clone, Serialize)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena { nodes: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node with fields in schema order, attaching its children.
    pub fn alloc(&mut self, ty: NodeType, fields: Vec<Value>) -> Result<NodeIndex, ShapeError> {
        let schema = ty.fields();
        if fields.len() != schema.len() {
            let missing = schema.get(fields.len()).map(|f| f.name).unwrap_or("");
            return Err(ShapeError::MissingField { ty, field: missing });
        }
        for (def, value) in schema.iter().zip(&fields) {
            if !value.fits(def.kind) {
                return Err(ShapeError::FieldKind {
                    ty,
                    field: def.name.to_string(),
                    expected: def.kind,
                });
            }
            if def.kind == FieldKind::Node && matches!(value, Value::Node(idx) if idx.is_none()) {
                return Err(ShapeError::MissingField { ty, field: def.name });
            }
        }
        let children: Vec<NodeIndex> = fields
            .iter()
            .flat_map(|v| match v {
                Value::Node(idx) => vec![*idx],
                Value::List(items) => items.clone(),
                _ => Vec::new(),
            })
            .filter(|idx| idx.is_some())
            .collect();
        for &child in &children {
            let node = self.node(child)?;
            if node.parent.is_some() {
                return Err(ShapeError::AlreadyAttached { index: child });
            }
        }
        // A node listed twice in the same constructor would end up owned twice.
        for (i, child) in children.iter().enumerate() {
            if children[..i].contains(child) {
                return Err(ShapeError::AlreadyAttached { index: *child });
            }
        }

        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes
            .push(Node::from_parts(ty, fields.into_boxed_slice()));
        for child in children {
            if let Some(node) = self.get_mut(child) {
                node.parent = index;
            }
        }
        Ok(index)
    }

    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    /// Like `get`, but a dangling handle is a shape error.
    pub fn node(&self, index: NodeIndex) -> Result<&Node, ShapeError> {
        self.get(index).ok_or(ShapeError::InvalidNode { index })
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> Result<&mut Node, ShapeError> {
        self.get_mut(index).ok_or(ShapeError::InvalidNode { index })
    }

    #[inline]
    pub fn ty(&self, index: NodeIndex) -> Option<NodeType> {
        self.get(index).map(|n| n.ty)
    }

    #[inline]
    pub fn is(&self, index: NodeIndex, ty: NodeType) -> bool {
        self.ty(index) == Some(ty)
    }

    pub fn parent_of(&self, index: NodeIndex) -> NodeIndex {
        self.get(index).map_or(NodeIndex::NONE, |n| n.parent)
    }

    pub fn child(&self, index: NodeIndex, field: &str) -> Result<NodeIndex, ShapeError> {
        self.node(index)?.child(field)
    }

    pub fn list(&self, index: NodeIndex, field: &str) -> Result<&[NodeIndex], ShapeError> {
        self.node(index)?.list(field)
    }

    /// Name of an `Identifier`/`JSXIdentifier`.
    pub fn name(&self, index: NodeIndex) -> Option<&str> {
        self.get(index).and_then(Node::name)
    }

    pub fn children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.get(index)
            .map(|n| n.children().collect())
            .unwrap_or_default()
    }

    /// Whether `ancestor` is `node` or one of its parents.
    pub fn is_within(&self, node: NodeIndex, ancestor: NodeIndex) -> bool {
        let mut current = node;
        while current.is_some() {
            if current == ancestor {
                return true;
            }
            current = self.parent_of(current);
        }
        false
    }

    fn check_attachable(&self, parent: NodeIndex, child: NodeIndex) -> Result<(), ShapeError> {
        if child.is_none() {
            return Ok(());
        }
        let node = self.node(child)?;
        if node.parent.is_some() || self.is_within(parent, child) {
            return Err(ShapeError::AlreadyAttached { index: child });
        }
        Ok(())
    }

    fn set_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        if let Some(node) = self.get_mut(child) {
            node.parent = parent;
        }
    }

    /// Write a single child slot and return the previous occupant, now detached.
    pub fn set_child(
        &mut self,
        parent: NodeIndex,
        field: &str,
        child: NodeIndex,
    ) -> Result<NodeIndex, ShapeError> {
        let node = self.node(parent)?;
        let ty = node.ty;
        let def = ty.field(field).ok_or_else(|| ShapeError::UnknownField {
            ty,
            field: field.to_string(),
        })?;
        match def.kind {
            FieldKind::Node if child.is_none() => {
                return Err(ShapeError::MissingField { ty, field: def.name });
            }
            FieldKind::Node | FieldKind::OptNode => {}
            expected => {
                return Err(ShapeError::FieldKind {
                    ty,
                    field: field.to_string(),
                    expected,
                });
            }
        }
        let old = node.child(field)?;
        if old == child {
            return Ok(old);
        }
        self.check_attachable(parent, child)?;
        self.write_slot(parent, field, child)?;
        self.set_parent(old, NodeIndex::NONE);
        self.set_parent(child, parent);
        Ok(old)
    }

    fn write_slot(&mut self, parent: NodeIndex, field: &str, child: NodeIndex) -> Result<(), ShapeError> {
        let node = self.node_mut(parent)?;
        let pos = node.ty.field_position(field).unwrap_or(usize::MAX);
        if let Some(Value::Node(slot)) = node.values_mut().get_mut(pos) {
            *slot = child;
        }
        Ok(())
    }

    fn list_mut(&mut self, parent: NodeIndex, field: &str) -> Result<&mut Vec<NodeIndex>, ShapeError> {
        let node = self.node_mut(parent)?;
        let ty = node.ty;
        let pos = ty.field_position(field).ok_or_else(|| ShapeError::UnknownField {
            ty,
            field: field.to_string(),
        })?;
        match node.values_mut().get_mut(pos) {
            Some(Value::List(items)) => Ok(items),
            _ => Err(ShapeError::FieldKind {
                ty,
                field: field.to_string(),
                expected: ty.fields()[pos].kind,
            }),
        }
    }

    /// Replace a whole list field. Previous items are detached and returned.
    pub fn set_list(
        &mut self,
        parent: NodeIndex,
        field: &str,
        items: Vec<NodeIndex>,
    ) -> Result<Vec<NodeIndex>, ShapeError> {
        let current = self.list(parent, field)?.to_vec();
        for (i, &item) in items.iter().enumerate() {
            if item.is_some() && (items[..i].contains(&item) || !current.contains(&item)) {
                self.check_attachable(parent, item)?;
            }
        }
        let old = std::mem::replace(self.list_mut(parent, field)?, items.clone());
        for &item in &old {
            if !items.contains(&item) {
                self.set_parent(item, NodeIndex::NONE);
            }
        }
        for item in items {
            self.set_parent(item, parent);
        }
        Ok(old)
    }

    /// Splice `items` into a list field at `at` (clamped to the length).
    pub fn list_insert(
        &mut self,
        parent: NodeIndex,
        field: &str,
        at: usize,
        items: &[NodeIndex],
    ) -> Result<usize, ShapeError> {
        for (i, &item) in items.iter().enumerate() {
            if items[..i].contains(&item) && item.is_some() {
                return Err(ShapeError::AlreadyAttached { index: item });
            }
            self.check_attachable(parent, item)?;
        }
        let list = self.list_mut(parent, field)?;
        let at = at.min(list.len());
        list.splice(at..at, items.iter().copied());
        for &item in items {
            self.set_parent(item, parent);
        }
        Ok(at)
    }

    /// Remove and detach the list entry at `at`.
    pub fn list_remove(
        &mut self,
        parent: NodeIndex,
        field: &str,
        at: usize,
    ) -> Result<Option<NodeIndex>, ShapeError> {
        let list = self.list_mut(parent, field)?;
        if at >= list.len() {
            return Ok(None);
        }
        let removed = list.remove(at);
        self.set_parent(removed, NodeIndex::NONE);
        Ok(Some(removed))
    }

    /// Overwrite the list entry at `at`, returning the detached old entry.
    pub fn list_set(
        &mut self,
        parent: NodeIndex,
        field: &str,
        at: usize,
        item: NodeIndex,
    ) -> Result<NodeIndex, ShapeError> {
        let current = self.list(parent, field)?.get(at).copied();
        let Some(old) = current else {
            return Err(ShapeError::InvalidNode { index: item });
        };
        if old == item {
            return Ok(old);
        }
        self.check_attachable(parent, item)?;
        let list = self.list_mut(parent, field)?;
        list[at] = item;
        self.set_parent(old, NodeIndex::NONE);
        self.set_parent(item, parent);
        Ok(old)
    }

    /// Pull `index` out of whatever slot holds it, leaving a hole there
    /// (even in a required slot). Used when a node moves out of a subtree
    /// that is about to be discarded.
    pub fn take(&mut self, index: NodeIndex) -> Result<(), ShapeError> {
        let parent = self.node(index)?.parent;
        if parent.is_none() {
            return Ok(());
        }
        let node = self.node_mut(parent)?;
        for value in node.values_mut() {
            match value {
                Value::Node(slot) if *slot == index => *slot = NodeIndex::NONE,
                Value::List(items) => items.retain(|&item| item != index),
                _ => {}
            }
        }
        self.set_parent(index, NodeIndex::NONE);
        Ok(())
    }

    /// Mark `index` as detached without touching its former parent.
    pub fn detach(&mut self, index: NodeIndex) {
        self.set_parent(index, NodeIndex::NONE);
    }
}
