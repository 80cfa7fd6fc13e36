//! Paths: cursors onto one slot of the tree.
//!
//! A path remembers `(parent_path, parent, slot)` plus the node last seen
//! there. Slots shift under list edits, so every operation resyncs the
//! path against the live arena before trusting it.

mod ancestry;
mod comments;
mod family;
mod hoisting;
mod inference;
mod introspection;
mod modification;
mod removal;
mod replacement;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::trace;
use weft_ast::{NodeIndex, NodeType, Value};

pub use comments::CommentPosition;
pub use introspection::ExecutionStatus;

use crate::context::ContextId;
use crate::scope::ScopeId;
use crate::tree::Tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PathId(pub u32);

impl PathId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Position of a node inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Root,
    /// A single-child field.
    Field(&'static str),
    /// Entry `index` of a list field.
    Index { list: &'static str, index: usize },
}

impl Slot {
    /// Field name holding the node (`None` for the root).
    pub fn key(self) -> Option<&'static str> {
        match self {
            Slot::Root => None,
            Slot::Field(field) => Some(field),
            Slot::Index { list, .. } => Some(list),
        }
    }

    pub fn list_key(self) -> Option<&'static str> {
        match self {
            Slot::Index { list, .. } => Some(list),
            _ => None,
        }
    }

    pub fn index(self) -> Option<usize> {
        match self {
            Slot::Index { index, .. } => Some(index),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PathData {
    pub(crate) node: NodeIndex,
    pub(crate) parent_path: Option<PathId>,
    pub(crate) parent: NodeIndex,
    pub(crate) slot: Slot,
    pub(crate) scope: Option<ScopeId>,
    pub(crate) removed: bool,
    /// The node could not be found in its parent during the last resync.
    pub(crate) stale: bool,
    pub(crate) should_skip: bool,
    pub(crate) should_stop: bool,
    /// Set once the children of this path finished visiting in the
    /// current pass.
    pub(crate) children_done: bool,
    /// Child keys left out of the rest of the current visit.
    pub(crate) skip_keys: FxHashSet<String>,
    /// Cached `get_type_annotation` result, keyed by the node it was
    /// inferred for.
    pub(crate) type_annotation: Option<(NodeIndex, NodeIndex)>,
    pub(crate) data: FxHashMap<String, serde_json::Value>,
    pub(crate) contexts: Vec<ContextId>,
}

impl PathData {
    pub(crate) fn new(
        parent_path: Option<PathId>,
        parent: NodeIndex,
        slot: Slot,
        node: NodeIndex,
    ) -> PathData {
        PathData {
            node,
            parent_path,
            parent,
            slot,
            scope: None,
            removed: false,
            stale: false,
            should_skip: false,
            should_stop: false,
            children_done: false,
            skip_keys: FxHashSet::default(),
            type_annotation: None,
            data: FxHashMap::default(),
            contexts: Vec::new(),
        }
    }
}

impl Tree {
    pub fn node(&self, path: PathId) -> NodeIndex {
        self.paths[path.index()].node
    }

    pub fn node_type(&self, path: PathId) -> Option<NodeType> {
        self.arena.ty(self.node(path))
    }

    pub fn parent_path(&self, path: PathId) -> Option<PathId> {
        self.paths[path.index()].parent_path
    }

    pub fn parent_node(&self, path: PathId) -> NodeIndex {
        self.paths[path.index()].parent
    }

    pub fn slot(&self, path: PathId) -> Slot {
        self.paths[path.index()].slot
    }

    pub fn is_removed(&self, path: PathId) -> bool {
        self.paths[path.index()].removed
    }

    pub fn should_skip(&self, path: PathId) -> bool {
        self.paths[path.index()].should_skip
    }

    pub fn should_stop(&self, path: PathId) -> bool {
        self.paths[path.index()].should_stop
    }

    /// Cached scope of the path. Use `scope_of` to compute it on demand.
    pub fn path_scope(&self, path: PathId) -> Option<ScopeId> {
        self.paths[path.index()].scope
    }

    /// Don't descend into this path's children (or run its exit handlers)
    /// for the rest of the current pass.
    pub fn skip(&mut self, path: PathId) {
        self.paths[path.index()].should_skip = true;
    }

    /// Don't walk child key `key` of this path in the current visit.
    pub fn skip_key(&mut self, path: PathId, key: impl Into<String>) {
        self.paths[path.index()].skip_keys.insert(key.into());
    }

    /// Abort the whole pass.
    pub fn stop(&mut self, path: PathId) {
        let data = &mut self.paths[path.index()];
        data.should_stop = true;
        data.should_skip = true;
    }

    pub fn set_data(&mut self, path: PathId, key: impl Into<String>, value: serde_json::Value) {
        self.paths[path.index()].data.insert(key.into(), value);
    }

    pub fn get_data(&self, path: PathId, key: &str) -> Option<&serde_json::Value> {
        self.paths[path.index()].data.get(key)
    }

    /// Bring the path's parent and slot in line with the live tree.
    ///
    /// The parent is re-read from the node's owner; a list index that no
    /// longer holds the node is searched for. A node that left its parent
    /// marks the path stale.
    pub fn resync(&mut self, path: PathId) {
        let data = &self.paths[path.index()];
        if data.removed || data.slot == Slot::Root {
            return;
        }
        let node = data.node;
        if node.is_none() {
            return;
        }
        let parent = self.arena.parent_of(node);
        if parent.is_none() {
            self.paths[path.index()].stale = true;
            return;
        }
        if parent != data.parent {
            trace!(path = path.0, "resync: parent moved");
            let parent_path = self.path_for(parent);
            let data = &mut self.paths[path.index()];
            data.parent = parent;
            if parent_path.is_some() {
                data.parent_path = parent_path;
            }
        } else if let Some(parent_path) = data.parent_path
            && self.paths[parent_path.index()].node != parent
        {
            let parent_path = self.path_for(parent);
            if parent_path.is_some() {
                self.paths[path.index()].parent_path = parent_path;
            }
        }

        let data = &self.paths[path.index()];
        if self.read_slot(data.parent, data.slot) == node {
            self.paths[path.index()].stale = false;
            return;
        }
        match self.find_slot(parent, node) {
            Some(slot) => {
                trace!(path = path.0, ?slot, "resync: slot moved");
                let data = &mut self.paths[path.index()];
                data.slot = slot;
                data.stale = false;
            }
            None => self.paths[path.index()].stale = true,
        }
    }

    /// Shift the index of every cached path in `list` of `parent` at or
    /// after `from` by `delta`.
    pub(crate) fn update_sibling_keys(
        &mut self,
        parent: NodeIndex,
        list_key: &str,
        from: usize,
        delta: isize,
        except: Option<PathId>,
    ) {
        let Some(cached) = self.path_cache.get(&parent) else {
            return;
        };
        for &id in cached.iter() {
            if Some(id) == except {
                continue;
            }
            let data = &mut self.paths[id.index()];
            if data.removed {
                continue;
            }
            if let Slot::Index { list, index } = &mut data.slot
                && *list == list_key
                && *index >= from
            {
                *index = index.saturating_add_signed(delta);
            }
        }
    }

    /// Write `node` into the slot of `path`, returning the detached previous
    /// occupant.
    pub(crate) fn write_slot(&mut self, path: PathId, node: NodeIndex) -> crate::Result<NodeIndex> {
        let data = &self.paths[path.index()];
        let parent = data.parent;
        match data.slot {
            Slot::Root => {
                let old = self.root;
                if node.is_none() {
                    return Err(self.error_at(path, "cannot clear the root slot"));
                }
                self.root = node;
                Ok(old)
            }
            Slot::Field(field) => Ok(self.arena.set_child(parent, field, node)?),
            Slot::Index { list, index } => Ok(self.arena.list_set(parent, list, index, node)?),
        }
    }

    /// Value of a scalar or child field of the path's node.
    pub fn field(&self, path: PathId, field: &str) -> crate::Result<Value> {
        Ok(self.arena.node(self.node(path))?.field(field)?.clone())
    }
}
