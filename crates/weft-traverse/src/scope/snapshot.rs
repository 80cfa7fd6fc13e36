//! Serializable views of scopes for diagnostics and test assertions.

use serde::Serialize;

use super::{BindingKind, ScopeId};
use crate::tree::Tree;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingSnapshot {
    pub name: String,
    pub kind: BindingKind,
    pub constant: bool,
    pub references: usize,
    pub violations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeSnapshot {
    pub block_type: String,
    /// In declaration order.
    pub bindings: Vec<BindingSnapshot>,
    pub globals: Vec<String>,
    /// Sorted.
    pub labels: Vec<String>,
    pub children: Vec<ScopeSnapshot>,
}

impl ScopeSnapshot {
    pub fn binding(&self, name: &str) -> Option<&BindingSnapshot> {
        self.bindings.iter().find(|b| b.name == name)
    }
}

impl Tree {
    /// Snapshot `scope` and every live scope below it. Globals are only
    /// filled in for the program scope.
    pub fn snapshot(&self, scope: ScopeId) -> ScopeSnapshot {
        let data = self.scope_data(scope);
        let block_type = self
            .arena
            .ty(data.block)
            .map_or_else(String::new, |ty| ty.to_string());
        let bindings = data
            .bindings
            .values()
            .filter_map(|&id| self.binding(id))
            .map(|binding| BindingSnapshot {
                name: binding.name.clone(),
                kind: binding.kind,
                constant: binding.constant,
                references: binding.references,
                violations: binding.constant_violations.len(),
            })
            .collect();
        let mut labels: Vec<String> = data.labels.keys().cloned().collect();
        labels.sort();
        let globals = data.globals.keys().cloned().collect();
        let children = self
            .child_scopes(scope)
            .into_iter()
            .map(|child| self.snapshot(child))
            .collect();
        ScopeSnapshot {
            block_type,
            bindings,
            globals,
            labels,
            children,
        }
    }
}
