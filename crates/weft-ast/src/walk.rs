//! Path-free tree utilities: fast preorder walk, deep clone, metadata
//! stripping and JSON snapshots.

use serde_json::{Map, Value as Json};

use crate::arena::NodeArena;
use crate::error::ShapeError;
use crate::node::{NodeIndex, Value};
use crate::node_type::NodeType;

impl NodeArena {
    /// Preorder walk without paths or scopes. `enter` returning `false`
    /// prunes that node's children.
    pub fn traverse_fast(&self, root: NodeIndex, mut enter: impl FnMut(NodeIndex) -> bool) {
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            if !enter(current) {
                continue;
            }
            let start = stack.len();
            stack.extend(node.children());
            stack[start..].reverse();
        }
    }

    /// Whether `root` or a node below it has type `ty`. Subtrees rooted at
    /// a `denylist` type are not searched.
    pub fn has_type(&self, root: NodeIndex, ty: NodeType, denylist: &[NodeType]) -> bool {
        match self.ty(root) {
            None => return false,
            Some(root_ty) if denylist.contains(&root_ty) => return false,
            Some(root_ty) if root_ty == ty => return true,
            _ => {}
        }
        let mut found = false;
        self.traverse_fast(root, |idx| {
            let Some(current) = self.ty(idx) else {
                return false;
            };
            if found || denylist.contains(&current) {
                return false;
            }
            found = current == ty;
            !found
        });
        found
    }

    /// Copy a subtree into fresh, detached nodes. Positions, comments and
    /// `extra` are kept unless `with_metadata` is false.
    pub fn clone_deep(&mut self, root: NodeIndex, with_metadata: bool) -> Result<NodeIndex, ShapeError> {
        let node = self.node(root)?.clone();
        let mut fields = Vec::with_capacity(node.values().len());
        for value in node.values() {
            fields.push(match value {
                Value::Node(child) if child.is_some() => Value::Node(self.clone_deep(*child, with_metadata)?),
                Value::List(items) => {
                    let mut cloned = Vec::with_capacity(items.len());
                    for &item in items {
                        cloned.push(if item.is_some() {
                            self.clone_deep(item, with_metadata)?
                        } else {
                            item
                        });
                    }
                    Value::List(cloned)
                }
                other => other.clone(),
            });
        }
        let index = self.alloc(node.ty, fields)?;
        if with_metadata && let Some(copy) = self.get_mut(index) {
            copy.span = node.span;
            copy.loc = node.loc;
            copy.comments = node.comments;
            copy.extra = node.extra;
        }
        Ok(index)
    }

    /// Strip positions, comments and `extra` from a subtree.
    pub fn remove_properties(&mut self, root: NodeIndex) {
        let mut all = Vec::new();
        self.traverse_fast(root, |idx| {
            all.push(idx);
            true
        });
        for idx in all {
            if let Some(node) = self.get_mut(idx) {
                node.span = weft_common::Span::SYNTHETIC;
                node.loc = None;
                node.comments = None;
                node.extra = None;
            }
        }
    }

    /// JSON rendering of a subtree in `{ "type": ..., field: ... }` form.
    pub fn to_json(&self, root: NodeIndex) -> Json {
        let Some(node) = self.get(root) else {
            return Json::Null;
        };
        let mut map = Map::new();
        map.insert("type".into(), Json::from(node.ty.name()));
        for (def, value) in node.ty.fields().iter().zip(node.values()) {
            let rendered = match value {
                Value::Node(child) => self.to_json(*child),
                Value::List(items) => Json::Array(items.iter().map(|&i| self.to_json(i)).collect()),
                Value::Str(s) => Json::from(s.as_str()),
                Value::Num(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
                Value::Bool(b) => Json::Bool(*b),
                Value::Null => Json::Null,
            };
            map.insert(def.name.into(), rendered);
        }
        if let Some(extra) = &node.extra {
            map.insert("extra".into(), Json::Object((**extra).clone()));
        }
        Json::Object(map)
    }
}
