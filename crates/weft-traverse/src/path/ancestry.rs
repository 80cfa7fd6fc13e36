//! Walking up from a path.

use weft_ast::{Alias, NodeType, is_node_type};

use super::PathId;
use crate::error::Result;
use crate::tree::Tree;

impl Tree {
    /// Nearest strict ancestor accepted by `pred`.
    pub fn find_parent(&self, path: PathId, pred: impl Fn(&Tree, PathId) -> bool) -> Option<PathId> {
        let mut current = self.parent_path(path);
        while let Some(id) = current {
            if pred(self, id) {
                return Some(id);
            }
            current = self.parent_path(id);
        }
        None
    }

    /// Like `find_parent`, but `path` itself is tried first.
    pub fn find(&self, path: PathId, pred: impl Fn(&Tree, PathId) -> bool) -> Option<PathId> {
        if pred(self, path) {
            return Some(path);
        }
        self.find_parent(path, pred)
    }

    /// Nearest enclosing function path.
    pub fn get_function_parent_path(&self, path: PathId) -> Option<PathId> {
        self.find_parent(path, |tree, id| {
            tree.node_type(id)
                .is_some_and(|ty| ty.is_alias_of(Alias::Function))
        })
    }

    /// The statement containing `path`, or `path` itself if it is one.
    /// Anything sitting directly in a list counts as a statement here.
    pub fn get_statement_parent(&self, path: PathId) -> Result<PathId> {
        let mut current = path;
        loop {
            let Some(parent) = self.parent_path(current) else {
                break;
            };
            let in_list = self.slot(current).list_key().is_some();
            let is_statement = self
                .node_type(current)
                .is_some_and(|ty| ty.is_alias_of(Alias::Statement));
            if in_list || is_statement {
                break;
            }
            current = parent;
        }
        if matches!(
            self.node_type(current),
            Some(NodeType::Program | NodeType::File)
        ) {
            return Err(self.error_at(path, "file/program node has no statement parent"));
        }
        Ok(current)
    }

    /// `path` followed by every ancestor up to the root.
    pub fn get_ancestry(&self, path: PathId) -> Vec<PathId> {
        let mut out = vec![path];
        let mut current = self.parent_path(path);
        while let Some(id) = current {
            out.push(id);
            current = self.parent_path(id);
        }
        out
    }

    /// Whether `path` is a strict ancestor of `other`.
    pub fn is_ancestor(&self, path: PathId, other: PathId) -> bool {
        self.is_descendant(other, path)
    }

    /// Whether `path` is a strict descendant of `other`.
    pub fn is_descendant(&self, path: PathId, other: PathId) -> bool {
        self.find_parent(path, |_, id| id == other).is_some()
    }

    /// Whether `path` or an ancestor has one of the given types or aliases.
    pub fn in_type(&self, path: PathId, keys: &[&str]) -> bool {
        self.get_ancestry(path).into_iter().any(|id| {
            self.node_type(id)
                .is_some_and(|ty| keys.iter().any(|key| is_node_type(ty, key)))
        })
    }

    /// Deepest path that is `path` or an ancestor of every entry.
    pub fn get_deepest_common_ancestor_from(&self, paths: &[PathId]) -> Option<PathId> {
        let ancestries = self.root_first_ancestries(paths);
        let depth = common_depth(&ancestries)?;
        Some(ancestries[0][depth])
    }

    /// Child of the deepest common ancestor that comes first in source
    /// order among the branches leading to `paths`. If one of `paths` is
    /// the common ancestor itself, that is the answer.
    pub fn get_earliest_common_ancestor_from(&self, paths: &[PathId]) -> Option<PathId> {
        let ancestries = self.root_first_ancestries(paths);
        let depth = common_depth(&ancestries)?;
        let deepest = ancestries[0][depth];
        let mut earliest: Option<PathId> = None;
        for ancestry in &ancestries {
            let Some(&branch) = ancestry.get(depth + 1) else {
                return Some(deepest);
            };
            earliest = match earliest {
                Some(current) if !self.comes_before(branch, current) => Some(current),
                _ => Some(branch),
            };
        }
        earliest
    }

    fn root_first_ancestries(&self, paths: &[PathId]) -> Vec<Vec<PathId>> {
        paths
            .iter()
            .map(|&path| {
                let mut ancestry = self.get_ancestry(path);
                ancestry.reverse();
                ancestry
            })
            .collect()
    }

    /// Source order of two siblings under the same parent node.
    pub(crate) fn comes_before(&self, a: PathId, b: PathId) -> bool {
        let (slot_a, slot_b) = (self.slot(a), self.slot(b));
        let Some(ty) = self.arena.ty(self.parent_node(a)) else {
            return false;
        };
        let position = |key: Option<&str>| key.and_then(|k| ty.field_position(k));
        let (pa, pb) = (position(slot_a.key()), position(slot_b.key()));
        if pa == pb {
            return slot_a.index() < slot_b.index();
        }
        pa < pb
    }
}

/// Last index at which every ancestry agrees.
fn common_depth(ancestries: &[Vec<PathId>]) -> Option<usize> {
    let first = ancestries.first()?;
    let mut depth = None;
    for (i, &id) in first.iter().enumerate() {
        if ancestries.iter().all(|a| a.get(i) == Some(&id)) {
            depth = Some(i);
        } else {
            break;
        }
    }
    depth
}
