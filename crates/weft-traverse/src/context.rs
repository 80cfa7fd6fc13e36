//! Traversal contexts.
//!
//! One frame is pushed for every child key being walked. A frame owns the
//! work queue for that container; paths inserted or replaced while the
//! queue is running are appended to it (or to its priority queue) so they
//! are visited in the same pass.

use rustc_hash::FxHashSet;
use tracing::{debug, trace};
use weft_ast::{NodeIndex, Value};
use weft_common::limits::MAX_TRAVERSAL_DEPTH;

use crate::error::{Result, TraverseError};
use crate::normalize::NormalizedVisitor;
use crate::path::{PathId, Slot};
use crate::tree::Tree;
use crate::visitor::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u32);

#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) id: ContextId,
    /// Node whose child key this frame walks (`NONE` for a root frame).
    pub(crate) parent_node: NodeIndex,
    pub(crate) key: &'static str,
    pub(crate) queue: Vec<PathId>,
    /// Next queue position to visit.
    pub(crate) position: usize,
    pub(crate) priority: Vec<PathId>,
}

impl Tree {
    pub(crate) fn push_frame(&mut self, parent_node: NodeIndex, key: &'static str) -> ContextId {
        let id = ContextId(self.next_context);
        self.next_context += 1;
        self.frames.push(Frame {
            id,
            parent_node,
            key,
            queue: Vec::new(),
            position: 0,
            priority: Vec::new(),
        });
        id
    }

    pub(crate) fn pop_frame(&mut self, id: ContextId) {
        if let Some(pos) = self.frame_pos(id) {
            self.frames.remove(pos);
        }
    }

    fn frame_pos(&self, id: ContextId) -> Option<usize> {
        self.frames.iter().rposition(|f| f.id == id)
    }

    fn frame_mut(&mut self, id: ContextId) -> Option<&mut Frame> {
        self.frames.iter_mut().rev().find(|f| f.id == id)
    }

    fn push_context(&mut self, path: PathId, ctx: ContextId) -> Result<()> {
        let data = &mut self.paths[path.index()];
        data.contexts.push(ctx);
        data.should_skip = false;
        data.should_stop = false;
        data.skip_keys.clear();
        self.set_scope(path)
    }

    fn pop_context(&mut self, path: PathId) {
        self.paths[path.index()].contexts.pop();
    }

    /// Queue `path` on frame `ctx`. Priority entries run right after the
    /// path currently being visited.
    fn maybe_queue(&mut self, ctx: ContextId, path: PathId, priority: bool) {
        let Some(frame) = self.frame_mut(ctx) else {
            return;
        };
        if priority {
            if !frame.priority.contains(&path) {
                frame.priority.push(path);
            }
        } else if !frame.queue[frame.position.min(frame.queue.len())..].contains(&path) {
            frame.queue.push(path);
        }
    }

    /// Put a new or replaced path onto whichever active frame will reach it.
    pub(crate) fn queue_new_path(&mut self, path: PathId, priority: bool) {
        let contexts = self.paths[path.index()].contexts.clone();
        if !contexts.is_empty() {
            for ctx in contexts {
                self.maybe_queue(ctx, path, priority);
            }
            return;
        }

        let data = &self.paths[path.index()];
        let (parent, key, parent_path) = (data.parent, data.slot.key(), data.parent_path);
        if let Some(key) = key
            && let Some(frame) = self
                .frames
                .iter()
                .rev()
                .find(|f| f.parent_node == parent && f.key == key)
        {
            let ctx = frame.id;
            self.maybe_queue(ctx, path, priority);
            return;
        }

        // The parent's children were already walked in this pass: hand the
        // path to the nearest ancestor still sitting in a queue.
        let Some(parent_path) = parent_path else {
            return;
        };
        if !self.paths[parent_path.index()].children_done {
            return;
        }
        let mut current = Some(parent_path);
        while let Some(id) = current {
            let contexts = self.paths[id.index()].contexts.clone();
            if !contexts.is_empty() {
                for ctx in contexts {
                    self.maybe_queue(ctx, path, false);
                }
                return;
            }
            current = self.paths[id.index()].parent_path;
        }
    }

    /// Visit `path` again in the pass(es) it currently belongs to.
    pub fn requeue(&mut self, path: PathId) {
        self.paths[path.index()].should_skip = false;
        self.queue_new_path(path, true);
    }

    /// Run `queue` on frame `ctx`. Returns true if the pass was stopped.
    pub(crate) fn visit_queue<S>(
        &mut self,
        ctx: ContextId,
        queue: Vec<PathId>,
        visitor: &NormalizedVisitor<S>,
        state: &mut S,
    ) -> Result<bool> {
        let Some(frame) = self.frame_mut(ctx) else {
            return Ok(false);
        };
        let saved_queue = std::mem::replace(&mut frame.queue, queue);
        let saved_position = std::mem::replace(&mut frame.position, 0);
        let saved_priority = std::mem::take(&mut frame.priority);

        let mut pushed = Vec::new();
        let result = self.run_queue(ctx, visitor, state, &mut pushed);

        for path in pushed {
            self.pop_context(path);
        }
        if let Some(frame) = self.frame_mut(ctx) {
            frame.queue = saved_queue;
            frame.position = saved_position;
            frame.priority = saved_priority;
        }
        result
    }

    fn run_queue<S>(
        &mut self,
        ctx: ContextId,
        visitor: &NormalizedVisitor<S>,
        state: &mut S,
        pushed: &mut Vec<PathId>,
    ) -> Result<bool> {
        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        loop {
            let Some(frame) = self.frame_mut(ctx) else {
                return Ok(false);
            };
            let Some(&path) = frame.queue.get(frame.position) else {
                return Ok(false);
            };
            frame.position += 1;

            self.resync(path);
            let data = &self.paths[path.index()];
            if data.removed || data.stale {
                continue;
            }
            if data.contexts.last() != Some(&ctx) {
                self.push_context(path, ctx)?;
                pushed.push(path);
            }
            let node = self.paths[path.index()].node;
            if node.is_none() || !visited.insert(node) {
                continue;
            }

            if self.visit_path(path, visitor, state)? {
                return Ok(true);
            }

            let priority = self
                .frame_mut(ctx)
                .map(|f| std::mem::take(&mut f.priority))
                .unwrap_or_default();
            if !priority.is_empty() && self.visit_queue(ctx, priority, visitor, state)? {
                return Ok(true);
            }
        }
    }

    /// Enter, children, exit. Returns true if the pass was stopped.
    pub(crate) fn visit_path<S>(
        &mut self,
        path: PathId,
        visitor: &NormalizedVisitor<S>,
        state: &mut S,
    ) -> Result<bool> {
        let node = self.node(path);
        let Some(ty) = self.arena.ty(node) else {
            return Ok(false);
        };
        if visitor.is_denylisted(ty) {
            return Ok(false);
        }
        trace!(path = path.0, ty = ty.name(), "visit");

        if self.call(path, Phase::Enter, visitor, state)? || self.should_skip(path) {
            return Ok(self.should_stop(path));
        }

        self.paths[path.index()].children_done = false;
        let children = self.traverse_node(path, node, visitor, state);
        self.paths[path.index()].children_done = true;
        if children? {
            self.paths[path.index()].should_stop = true;
            return Ok(true);
        }

        // A replacement gets its own visit from the priority queue.
        let data = &self.paths[path.index()];
        if data.removed || data.node != node {
            return Ok(data.should_stop);
        }
        self.call(path, Phase::Exit, visitor, state)?;
        Ok(self.should_stop(path))
    }

    /// Run the handlers of one phase. Returns true once a handler changed
    /// the path's node or flagged it.
    fn call<S>(
        &mut self,
        path: PathId,
        phase: Phase,
        visitor: &NormalizedVisitor<S>,
        state: &mut S,
    ) -> Result<bool> {
        let node = self.node(path);
        let Some(ty) = self.arena.ty(node) else {
            return Ok(false);
        };
        let changed = |tree: &Tree| {
            let data = &tree.paths[path.index()];
            data.node != node || data.should_skip || data.should_stop || data.removed
        };

        for handler in visitor.any_handlers(phase) {
            handler(self, path, state)?;
            if changed(self) {
                return Ok(true);
            }
        }
        for entry in visitor.entries(ty, phase) {
            if let Some(check) = entry.check
                && !check.matches(self, path)
            {
                continue;
            }
            (entry.handler)(self, path, state)?;
            if changed(self) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Walk the child keys of `node` (held by `path`) in schema order.
    pub(crate) fn traverse_node<S>(
        &mut self,
        path: PathId,
        node: NodeIndex,
        visitor: &NormalizedVisitor<S>,
        state: &mut S,
    ) -> Result<bool> {
        if self.depth >= MAX_TRAVERSAL_DEPTH {
            return Err(TraverseError::DepthLimit {
                limit: MAX_TRAVERSAL_DEPTH,
            });
        }
        self.depth += 1;
        let result = self.traverse_keys(path, node, visitor, state);
        self.depth -= 1;
        result
    }

    fn traverse_keys<S>(
        &mut self,
        path: PathId,
        node: NodeIndex,
        visitor: &NormalizedVisitor<S>,
        state: &mut S,
    ) -> Result<bool> {
        let Some(ty) = self.arena.ty(node) else {
            return Ok(false);
        };
        for def in ty.visitor_keys() {
            let data = &self.paths[path.index()];
            if data.removed || data.node != node {
                break;
            }
            if data.skip_keys.contains(def.name) {
                continue;
            }
            let mut queue = Vec::new();
            match self.arena.node(node)?.field(def.name)? {
                Value::Node(child) => {
                    let child = *child;
                    if child.is_some() && visitor.should_visit(&self.arena, child) {
                        queue.push(self.get_or_create_path(Some(path), node, Slot::Field(def.name)));
                    }
                }
                Value::List(items) => {
                    let items: Vec<(usize, NodeIndex)> = items
                        .iter()
                        .copied()
                        .enumerate()
                        .filter(|&(_, item)| item.is_some() && visitor.should_visit(&self.arena, item))
                        .collect();
                    for (index, _) in items {
                        queue.push(self.get_or_create_path(
                            Some(path),
                            node,
                            Slot::Index {
                                list: def.name,
                                index,
                            },
                        ));
                    }
                }
                _ => {}
            }
            if queue.is_empty() {
                continue;
            }

            let ctx = self.push_frame(node, def.name);
            let result = self.visit_queue(ctx, queue, visitor, state);
            self.pop_frame(ctx);
            if result? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Visit the root node itself and everything below it.
    #[tracing::instrument(level = "debug", skip(self, visitor, state))]
    pub fn traverse<S>(&mut self, visitor: &NormalizedVisitor<S>, state: &mut S) -> Result<()> {
        let root = self.root_path();
        let ctx = self.push_frame(NodeIndex::NONE, "");
        let result = self.visit_queue(ctx, vec![root], visitor, state);
        self.pop_frame(ctx);
        let stopped = result?;
        debug!(stopped, "traverse done");
        Ok(())
    }

    /// Visit the descendants of `path` as a separate pass. Stopping it does
    /// not stop any enclosing pass.
    #[tracing::instrument(level = "debug", skip(self, visitor, state), fields(path = path.0))]
    pub fn traverse_path<S>(
        &mut self,
        path: PathId,
        visitor: &NormalizedVisitor<S>,
        state: &mut S,
    ) -> Result<()> {
        self.assert_live(path)?;
        self.scope_of(path)?;
        let node = self.node(path);
        let stopped = self.traverse_node(path, node, visitor, state)?;
        debug!(stopped, "traverse_path done");
        Ok(())
    }

    /// Visit `path` itself (enter, children, exit) under `visitor`.
    /// Returns true if the visit asked to stop.
    pub fn visit<S>(&mut self, path: PathId, visitor: &NormalizedVisitor<S>, state: &mut S) -> Result<bool> {
        self.assert_live(path)?;
        self.scope_of(path)?;
        self.visit_path(path, visitor, state)
    }
}
