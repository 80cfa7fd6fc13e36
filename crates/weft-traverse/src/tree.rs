//! Per-run traversal state.
//!
//! A `Tree` owns the node arena together with every path, scope, binding
//! and traversal frame created while working on it. Nothing is cached in
//! process-wide state: dropping the tree drops all of it.

use std::sync::Arc;

use dashmap::DashSet;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use weft_ast::{NodeArena, NodeIndex, NodeType};

use crate::context::Frame;
use crate::error::{Result, TraverseError};
use crate::path::{PathData, PathId, Slot};
use crate::scope::{Binding, BindingId, ScopeData};

/// Shared uid avoidance set. Trees built with clones of one registry never
/// generate the same uid.
#[derive(Debug, Clone, Default)]
pub struct UidRegistry(Arc<DashSet<String>>);

impl UidRegistry {
    pub fn new() -> Self {
        UidRegistry::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Claim `name`. Returns false if another tree already holds it.
    pub fn claim(&self, name: &str) -> bool {
        self.0.insert(name.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Never create scopes; `Tree::scope_of` then always yields `None`.
    pub no_scope: bool,
    pub uid_registry: Option<UidRegistry>,
}

pub struct Tree {
    pub(crate) arena: NodeArena,
    pub(crate) root: NodeIndex,
    pub(crate) root_path: Option<PathId>,
    pub(crate) paths: Vec<PathData>,
    /// Child paths keyed by the parent node they hang off.
    pub(crate) path_cache: FxHashMap<NodeIndex, SmallVec<[PathId; 4]>>,
    pub(crate) scopes: Vec<ScopeData>,
    pub(crate) scope_cache: FxHashMap<NodeIndex, crate::scope::ScopeId>,
    /// `None` once a binding is destroyed by a re-crawl or a removal.
    pub(crate) bindings: Vec<Option<Binding>>,
    pub(crate) frames: Vec<Frame>,
    pub(crate) next_context: u32,
    pub(crate) crawling: bool,
    pub(crate) options: TreeOptions,
    pub(crate) depth: usize,
}

impl Tree {
    pub fn new(arena: NodeArena, root: NodeIndex) -> Tree {
        Tree::with_options(arena, root, TreeOptions::default())
    }

    pub fn with_options(arena: NodeArena, root: NodeIndex, options: TreeOptions) -> Tree {
        Tree {
            arena,
            root,
            root_path: None,
            paths: Vec::new(),
            path_cache: FxHashMap::default(),
            scopes: Vec::new(),
            scope_cache: FxHashMap::default(),
            bindings: Vec::new(),
            frames: Vec::new(),
            next_context: 0,
            crawling: false,
            options,
            depth: 0,
        }
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Direct arena access. Structural edits made here bypass scope and
    /// queue bookkeeping; prefer the path operations for those.
    pub fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Hand the arena back, e.g. to a code generator.
    pub fn into_arena(self) -> (NodeArena, NodeIndex) {
        (self.arena, self.root)
    }

    pub fn root_path(&mut self) -> PathId {
        if let Some(path) = self.root_path {
            return path;
        }
        let path = self.alloc_path(PathData::new(None, NodeIndex::NONE, Slot::Root, self.root));
        self.root_path = Some(path);
        path
    }

    pub(crate) fn alloc_path(&mut self, data: PathData) -> PathId {
        let id = PathId(self.paths.len() as u32);
        self.paths.push(data);
        id
    }

    /// Read the node currently stored at `slot` of `parent`.
    pub(crate) fn read_slot(&self, parent: NodeIndex, slot: Slot) -> NodeIndex {
        match slot {
            Slot::Root => self.root,
            Slot::Field(field) => self.arena.child(parent, field).unwrap_or(NodeIndex::NONE),
            Slot::Index { list, index } => self
                .arena
                .list(parent, list)
                .ok()
                .and_then(|items| items.get(index).copied())
                .unwrap_or(NodeIndex::NONE),
        }
    }

    /// Where `node` sits inside `parent`, if it is a child of it.
    pub(crate) fn find_slot(&self, parent: NodeIndex, node: NodeIndex) -> Option<Slot> {
        let parent_node = self.arena.get(parent)?;
        for def in parent_node.ty.fields() {
            match parent_node.field(def.name) {
                Ok(weft_ast::Value::Node(child)) if *child == node => {
                    return Some(Slot::Field(def.name));
                }
                Ok(weft_ast::Value::List(items)) => {
                    if let Some(index) = items.iter().position(|&item| item == node) {
                        return Some(Slot::Index {
                            list: def.name,
                            index,
                        });
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Return the cached path for `slot` of `parent`, creating it on first
    /// request. A hit is refreshed to the slot's current state.
    pub(crate) fn get_or_create_path(
        &mut self,
        parent_path: Option<PathId>,
        parent: NodeIndex,
        slot: Slot,
    ) -> PathId {
        if parent_path.is_none() {
            return self.root_path();
        }
        let node = self.read_slot(parent, slot);
        let hit = self.path_cache.get(&parent).and_then(|cached| {
            cached.iter().copied().find(|&id| {
                let data = &self.paths[id.index()];
                !data.removed
                    && if node.is_some() {
                        data.node == node
                    } else {
                        data.node.is_none() && data.slot == slot
                    }
            })
        });
        if let Some(id) = hit {
            let data = &mut self.paths[id.index()];
            data.parent_path = parent_path;
            data.parent = parent;
            data.slot = slot;
            data.node = node;
            data.stale = false;
            return id;
        }
        let id = self.alloc_path(PathData::new(parent_path, parent, slot, node));
        self.path_cache.entry(parent).or_default().push(id);
        id
    }

    /// Path for a node that is attached somewhere under the root.
    pub fn path_for(&mut self, node: NodeIndex) -> Option<PathId> {
        let mut chain = vec![node];
        let mut current = node;
        while current != self.root {
            current = self.arena.parent_of(current);
            if current.is_none() || chain.len() > weft_common::limits::MAX_SCOPE_WALK_ITERATIONS {
                return None;
            }
            chain.push(current);
        }
        let mut path = self.root_path();
        let mut parent = self.root;
        for &child in chain.iter().rev().skip(1) {
            let slot = self.find_slot(parent, child)?;
            path = self.get_or_create_path(Some(path), parent, slot);
            parent = child;
        }
        Some(path)
    }

    /// Strip `node`'s positions, comments and `extra`, and forget the
    /// child paths cached under it. Later lookups build fresh paths.
    pub fn clear_node(&mut self, node: NodeIndex) {
        if let Some(data) = self.arena.get_mut(node) {
            data.span = weft_common::Span::SYNTHETIC;
            data.loc = None;
            data.comments = None;
            data.extra = None;
        }
        self.path_cache.remove(&node);
    }

    /// Dotted location of a path, e.g. `program.body[2].expression`.
    pub fn location(&self, path: PathId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(path);
        while let Some(id) = current {
            let Some(data) = self.paths.get(id.index()) else {
                break;
            };
            match data.slot {
                Slot::Root => {
                    let name = self
                        .arena
                        .ty(self.root)
                        .map_or("root", NodeType::name)
                        .to_string();
                    let mut chars = name.chars();
                    let head = chars
                        .next()
                        .map(|c| c.to_ascii_lowercase().to_string() + chars.as_str())
                        .unwrap_or_default();
                    segments.push(head);
                }
                Slot::Field(field) => segments.push(format!(".{field}")),
                Slot::Index { list, index } => segments.push(format!(".{list}[{index}]")),
            }
            current = data.parent_path;
        }
        segments.reverse();
        segments.concat()
    }

    /// A `Custom` error pointing at `path`.
    pub fn error_at(&self, path: PathId, message: impl Into<String>) -> TraverseError {
        TraverseError::Custom {
            location: self.location(path),
            message: message.into(),
        }
    }

    pub(crate) fn detached(&self, path: PathId) -> TraverseError {
        TraverseError::DetachedPath {
            location: self.location(path),
        }
    }

    /// Fail unless `path` still denotes a live slot.
    pub(crate) fn assert_live(&mut self, path: PathId) -> Result<()> {
        self.resync(path);
        let data = &self.paths[path.index()];
        if data.removed || data.stale {
            return Err(self.detached(path));
        }
        Ok(())
    }

    pub fn binding(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(id.index()).and_then(Option::as_ref)
    }

    pub fn binding_mut(&mut self, id: BindingId) -> Option<&mut Binding> {
        self.bindings.get_mut(id.index()).and_then(Option::as_mut)
    }
}
