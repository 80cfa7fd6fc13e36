//! Raw visitors.
//!
//! A `Visitor<S>` is an ordered list of `(key, phase, handler)` entries.
//! Keys are node type names, alias names, virtual type names, or several of
//! those joined with `|`. Keys are checked when the visitor is normalized,
//! not here.

use std::rc::Rc;

use weft_ast::NodeType;

use crate::error::Result;
use crate::path::PathId;
use crate::tree::Tree;

pub type Handler<S> = Rc<dyn Fn(&mut Tree, PathId, &mut S) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Enter,
    Exit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraverseOptions {
    /// Node types that are never visited, nor their subtrees.
    pub denylist: Vec<NodeType>,
}

pub(crate) struct RawEntry<S> {
    /// `None` for handlers that run on every node.
    pub(crate) key: Option<String>,
    pub(crate) phase: Phase,
    pub(crate) handler: Handler<S>,
}

impl<S> Clone for RawEntry<S> {
    fn clone(&self) -> Self {
        RawEntry {
            key: self.key.clone(),
            phase: self.phase,
            handler: Rc::clone(&self.handler),
        }
    }
}

pub struct Visitor<S> {
    pub(crate) entries: Vec<RawEntry<S>>,
    pub(crate) options: TraverseOptions,
}

impl<S> Default for Visitor<S> {
    fn default() -> Self {
        Visitor {
            entries: Vec::new(),
            options: TraverseOptions::default(),
        }
    }
}

impl<S> Clone for Visitor<S> {
    fn clone(&self) -> Self {
        Visitor {
            entries: self.entries.clone(),
            options: self.options.clone(),
        }
    }
}

impl<S> std::fmt::Debug for Visitor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e.key.as_deref().unwrap_or("*"), e.phase))
            .collect();
        f.debug_struct("Visitor")
            .field("entries", &keys)
            .field("options", &self.options)
            .finish()
    }
}

impl<S: 'static> Visitor<S> {
    pub fn new() -> Self {
        Visitor::default()
    }

    fn push<F>(mut self, key: Option<&str>, phase: Phase, handler: F) -> Self
    where
        F: Fn(&mut Tree, PathId, &mut S) -> Result<()> + 'static,
    {
        self.entries.push(RawEntry {
            key: key.map(str::to_string),
            phase,
            handler: Rc::new(handler),
        });
        self
    }

    pub fn enter<F>(self, key: &str, handler: F) -> Self
    where
        F: Fn(&mut Tree, PathId, &mut S) -> Result<()> + 'static,
    {
        self.push(Some(key), Phase::Enter, handler)
    }

    pub fn exit<F>(self, key: &str, handler: F) -> Self
    where
        F: Fn(&mut Tree, PathId, &mut S) -> Result<()> + 'static,
    {
        self.push(Some(key), Phase::Exit, handler)
    }

    /// Register an enter and an exit handler for the same key.
    pub fn on<E, X>(self, key: &str, enter: E, exit: X) -> Self
    where
        E: Fn(&mut Tree, PathId, &mut S) -> Result<()> + 'static,
        X: Fn(&mut Tree, PathId, &mut S) -> Result<()> + 'static,
    {
        self.enter(key, enter).exit(key, exit)
    }

    /// Runs on every visited node, before the type-specific handlers.
    pub fn enter_any<F>(self, handler: F) -> Self
    where
        F: Fn(&mut Tree, PathId, &mut S) -> Result<()> + 'static,
    {
        self.push(None, Phase::Enter, handler)
    }

    pub fn exit_any<F>(self, handler: F) -> Self
    where
        F: Fn(&mut Tree, PathId, &mut S) -> Result<()> + 'static,
    {
        self.push(None, Phase::Exit, handler)
    }

    pub fn deny(mut self, ty: NodeType) -> Self {
        if !self.options.denylist.contains(&ty) {
            self.options.denylist.push(ty);
        }
        self
    }

    pub fn with_options(mut self, options: TraverseOptions) -> Self {
        self.options = options;
        self
    }

    /// Append `other`'s handlers after ours. Denylists are unioned.
    pub fn merge(mut self, other: Visitor<S>) -> Self {
        self.entries.extend(other.entries);
        for ty in other.options.denylist {
            if !self.options.denylist.contains(&ty) {
                self.options.denylist.push(ty);
            }
        }
        self
    }

    /// Adapt this visitor to a larger state `T` that contains our `S`, so
    /// several plugins with their own state can be merged into one pass.
    pub fn map_state<T: 'static, L>(self, lens: L) -> Visitor<T>
    where
        L: Fn(&mut T) -> &mut S + 'static,
    {
        let lens = Rc::new(lens);
        let entries = self
            .entries
            .into_iter()
            .map(|entry| {
                let lens = Rc::clone(&lens);
                let inner = entry.handler;
                let handler: Handler<T> =
                    Rc::new(move |tree: &mut Tree, path: PathId, outer: &mut T| {
                        inner(tree, path, lens(outer))
                    });
                RawEntry {
                    key: entry.key,
                    phase: entry.phase,
                    handler,
                }
            })
            .collect();
        Visitor {
            entries,
            options: self.options,
        }
    }
}
