//! Scopes.
//!
//! Scopes are created lazily when a path owning a scope is first given
//! one, and crawled on creation. The program scope additionally tracks
//! globals, generated uids and every name seen, which uid generation
//! avoids.

mod binding;
mod crawl;
mod declare;
mod globals;
mod lookup;
mod rename;
mod snapshot;
mod uid;

pub use binding::{Binding, BindingId, BindingKind};
pub use globals::{CONTEXT_VARIABLES, is_builtin_global};
pub use snapshot::{BindingSnapshot, ScopeSnapshot};

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::trace;
use weft_ast::{NodeIndex, predicates};

use crate::error::Result;
use crate::path::PathId;
use crate::tree::Tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ScopeData {
    pub(crate) block: NodeIndex,
    pub(crate) path: PathId,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) bindings: IndexMap<String, BindingId>,
    pub(crate) labels: IndexMap<String, PathId>,
    pub(crate) data: FxHashMap<String, serde_json::Value>,
    pub(crate) inited: bool,
    /// The block left the tree.
    pub(crate) detached: bool,
    // Program scope only.
    pub(crate) globals: IndexMap<String, NodeIndex>,
    pub(crate) uids: FxHashSet<String>,
    pub(crate) references: FxHashSet<String>,
    pub(crate) uid_counters: FxHashMap<String, u32>,
    /// Declarations created by `push`, per declaration kind.
    pub(crate) pushed: FxHashMap<String, PathId>,
}

impl ScopeData {
    fn new(block: NodeIndex, path: PathId, parent: Option<ScopeId>) -> ScopeData {
        ScopeData {
            block,
            path,
            parent,
            bindings: IndexMap::new(),
            labels: IndexMap::new(),
            data: FxHashMap::default(),
            inited: false,
            detached: false,
            globals: IndexMap::new(),
            uids: FxHashSet::default(),
            references: FxHashSet::default(),
            uid_counters: FxHashMap::default(),
            pushed: FxHashMap::default(),
        }
    }
}

impl Tree {
    pub(crate) fn scope_data(&self, scope: ScopeId) -> &ScopeData {
        &self.scopes[scope.index()]
    }

    pub(crate) fn scope_data_mut(&mut self, scope: ScopeId) -> &mut ScopeData {
        &mut self.scopes[scope.index()]
    }

    pub fn scope_block(&self, scope: ScopeId) -> NodeIndex {
        self.scope_data(scope).block
    }

    pub fn scope_path(&self, scope: ScopeId) -> PathId {
        self.scope_data(scope).path
    }

    pub fn scope_parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scope_data(scope).parent
    }

    /// Scope of `path`, creating (and crawling) scopes on the way if the
    /// path never had one assigned.
    pub fn scope_of(&mut self, path: PathId) -> Result<Option<ScopeId>> {
        if let Some(scope) = self.paths[path.index()].scope
            && !self.scope_data(scope).detached
        {
            return Ok(Some(scope));
        }
        self.set_scope(path)?;
        Ok(self.paths[path.index()].scope)
    }

    /// Assign `path` the scope it lives in: its own if its node owns one,
    /// else its parent's.
    pub(crate) fn set_scope(&mut self, path: PathId) -> Result<()> {
        if self.options.no_scope {
            return Ok(());
        }
        let parent_scope = match self.paths[path.index()].parent_path {
            Some(parent_path) => self.scope_of(parent_path)?,
            None => None,
        };
        let scope = self.get_scope_for(path, parent_scope);
        self.paths[path.index()].scope = scope;
        if let Some(scope) = scope
            && !self.scope_data(scope).inited
        {
            self.scope_data_mut(scope).inited = true;
            self.crawl(scope)?;
        }
        Ok(())
    }

    /// Nearest scope already created for `path` or one of its ancestors.
    /// Unlike `scope_of` this never creates or crawls a scope.
    pub(crate) fn existing_scope(&self, path: PathId) -> Option<ScopeId> {
        let live = |scope: &ScopeId| !self.scope_data(*scope).detached;
        let mut current = Some(path);
        while let Some(id) = current {
            let data = &self.paths[id.index()];
            if let Some(scope) = data.scope.filter(live) {
                return Some(scope);
            }
            if let Some(scope) = self.scope_cache.get(&data.node).copied().filter(live) {
                return Some(scope);
            }
            current = data.parent_path;
        }
        None
    }

    fn get_scope_for(&mut self, path: PathId, parent_scope: Option<ScopeId>) -> Option<ScopeId> {
        let data = &self.paths[path.index()];
        let (node, parent) = (data.node, data.parent);
        if !predicates::is_scope(&self.arena, node, parent) {
            return parent_scope;
        }
        if let Some(&scope) = self.scope_cache.get(&node) {
            self.scope_data_mut(scope).path = path;
            return Some(scope);
        }
        let scope = ScopeId(self.scopes.len() as u32);
        trace!(scope = scope.0, node = node.0, "new scope");
        self.scopes.push(ScopeData::new(node, path, parent_scope));
        self.scope_cache.insert(node, scope);
        Some(scope)
    }

    /// Live scopes whose parent chain reaches `scope`, in creation order.
    pub(crate) fn descendant_scopes(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut out = Vec::new();
        for (i, data) in self.scopes.iter().enumerate() {
            if data.detached || i == scope.index() {
                continue;
            }
            let mut current = data.parent;
            let mut steps = 0;
            while let Some(id) = current {
                if id == scope {
                    out.push(ScopeId(i as u32));
                    break;
                }
                steps += 1;
                if steps > weft_common::limits::MAX_SCOPE_WALK_ITERATIONS {
                    break;
                }
                current = self.scope_data(id).parent;
            }
        }
        out
    }

    /// Direct child scopes, in creation order.
    pub fn child_scopes(&self, scope: ScopeId) -> Vec<ScopeId> {
        self.scopes
            .iter()
            .enumerate()
            .filter(|(_, data)| !data.detached && data.parent == Some(scope))
            .map(|(i, _)| ScopeId(i as u32))
            .collect()
    }

    pub fn set_scope_data(&mut self, scope: ScopeId, key: impl Into<String>, value: serde_json::Value) {
        self.scope_data_mut(scope).data.insert(key.into(), value);
    }

    /// Look `key` up in this scope, then its parents.
    pub fn get_scope_data(&self, scope: ScopeId, key: &str) -> Option<&serde_json::Value> {
        self.scope_chain(scope)
            .find_map(|id| self.scope_data(id).data.get(key))
    }

    /// Remove the nearest entry for `key` along the parent chain.
    pub fn remove_scope_data(&mut self, scope: ScopeId, key: &str) -> Option<serde_json::Value> {
        let owner = self
            .scope_chain(scope)
            .find(|&id| self.scope_data(id).data.contains_key(key))?;
        self.scope_data_mut(owner).data.remove(key)
    }

    /// `scope` followed by its ancestors.
    pub fn scope_chain(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        let mut current = Some(scope);
        let mut steps = 0;
        std::iter::from_fn(move || {
            let id = current?;
            steps += 1;
            current = if steps > weft_common::limits::MAX_SCOPE_WALK_ITERATIONS {
                None
            } else {
                self.scope_data(id).parent
            };
            Some(id)
        })
    }
}
