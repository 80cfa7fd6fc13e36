//! Name resolution along scope chains.

use indexmap::IndexMap;
use weft_ast::{Alias, NodeIndex, NodeType, Value};

use super::globals::{CONTEXT_VARIABLES, is_builtin_global};
use super::{BindingId, BindingKind, ScopeId};
use crate::path::PathId;
use crate::tree::Tree;

impl Tree {
    pub fn get_own_binding(&self, scope: ScopeId, name: &str) -> Option<BindingId> {
        let id = *self.scope_data(scope).bindings.get(name)?;
        self.binding(id).map(|_| id)
    }

    /// Nearest binding of `name`, or `None` if it is unresolved.
    pub fn get_binding(&self, scope: ScopeId, name: &str) -> Option<BindingId> {
        self.scope_chain(scope)
            .find_map(|id| self.get_own_binding(id, name))
    }

    pub fn has_own_binding(&self, scope: ScopeId, name: &str) -> bool {
        self.get_own_binding(scope, name).is_some()
    }

    /// Declared anywhere up the chain, generated as a uid, or (unless
    /// `no_globals`) a builtin global.
    pub fn has_binding(&self, scope: ScopeId, name: &str, no_globals: bool) -> bool {
        if name.is_empty() {
            return false;
        }
        if self.get_binding(scope, name).is_some() || self.has_uid(scope, name) {
            return true;
        }
        !no_globals && (is_builtin_global(name) || CONTEXT_VARIABLES.contains(&name))
    }

    pub fn parent_has_binding(&self, scope: ScopeId, name: &str, no_globals: bool) -> bool {
        self.scope_parent(scope)
            .is_some_and(|parent| self.has_binding(parent, name, no_globals))
    }

    pub fn get_binding_identifier(&self, scope: ScopeId, name: &str) -> Option<NodeIndex> {
        self.get_binding(scope, name)
            .and_then(|id| self.binding(id))
            .map(|b| b.identifier)
    }

    pub fn get_own_binding_identifier(&self, scope: ScopeId, name: &str) -> Option<NodeIndex> {
        self.get_own_binding(scope, name)
            .and_then(|id| self.binding(id))
            .map(|b| b.identifier)
    }

    pub fn binding_identifier_equals(&self, scope: ScopeId, name: &str, node: NodeIndex) -> bool {
        self.get_binding_identifier(scope, name) == Some(node)
    }

    pub fn get_label(&self, scope: ScopeId, name: &str) -> Option<PathId> {
        self.scope_chain(scope)
            .find_map(|id| self.scope_data(id).labels.get(name).copied())
    }

    pub fn has_label(&self, scope: ScopeId, name: &str) -> bool {
        self.get_label(scope, name).is_some()
    }

    /// Record the `LabeledStatement` at `path` under its label name.
    pub fn register_label(&mut self, scope: ScopeId, path: PathId) {
        let node = self.node(path);
        let Some(name) = self
            .arena
            .child(node, "label")
            .ok()
            .and_then(|label| self.arena.name(label))
            .map(str::to_string)
        else {
            return;
        };
        self.scope_data_mut(scope).labels.insert(name, path);
    }

    pub fn has_global(&self, scope: ScopeId, name: &str) -> bool {
        self.scope_chain(scope)
            .any(|id| self.scope_data(id).globals.contains_key(name))
    }

    pub fn has_reference(&self, scope: ScopeId, name: &str) -> bool {
        self.scope_chain(scope)
            .any(|id| self.scope_data(id).references.contains(name))
    }

    pub fn has_uid(&self, scope: ScopeId, name: &str) -> bool {
        self.scope_chain(scope)
            .any(|id| self.scope_data(id).uids.contains(name))
    }

    /// Unresolved names seen in the program, in discovery order.
    pub fn globals(&self, scope: ScopeId) -> Vec<String> {
        let program = self.get_program_parent(scope);
        self.scope_data(program).globals.keys().cloned().collect()
    }

    /// Record an unresolved identifier on the program scope.
    pub(crate) fn add_global(&mut self, scope: ScopeId, node: NodeIndex) {
        let Some(name) = self.arena.name(node).map(str::to_string) else {
            return;
        };
        let program = self.get_program_parent(scope);
        let data = self.scope_data_mut(program);
        data.references.insert(name.clone());
        data.globals.entry(name).or_insert(node);
    }

    pub fn get_program_parent(&self, scope: ScopeId) -> ScopeId {
        self.scope_chain(scope).last().unwrap_or(scope)
    }

    /// Nearest function or program scope.
    pub fn get_function_parent(&self, scope: ScopeId) -> ScopeId {
        self.scope_chain(scope)
            .find(|&id| {
                self.arena
                    .ty(self.scope_block(id))
                    .is_some_and(|ty| ty.is_alias_of(Alias::FunctionParent))
            })
            .unwrap_or_else(|| self.get_program_parent(scope))
    }

    /// Nearest scope whose block can hold block-scoped declarations.
    pub fn get_block_parent(&self, scope: ScopeId) -> ScopeId {
        self.scope_chain(scope)
            .find(|&id| {
                self.arena.ty(self.scope_block(id)).is_some_and(|ty| {
                    ty.is_alias_of(Alias::BlockParent) || ty == NodeType::CatchClause
                })
            })
            .unwrap_or_else(|| self.get_program_parent(scope))
    }

    /// Every binding visible from `scope`; the nearest declaration of a
    /// name wins.
    pub fn get_all_bindings(&self, scope: ScopeId) -> IndexMap<String, BindingId> {
        let mut all = IndexMap::new();
        for id in self.scope_chain(scope) {
            for (name, &binding) in &self.scope_data(id).bindings {
                if self.binding(binding).is_some() && !all.contains_key(name) {
                    all.insert(name.clone(), binding);
                }
            }
        }
        all
    }

    pub fn get_all_bindings_of_kind(
        &self,
        scope: ScopeId,
        kinds: &[BindingKind],
    ) -> IndexMap<String, BindingId> {
        let mut all = IndexMap::new();
        for id in self.scope_chain(scope) {
            for (name, &binding) in &self.scope_data(id).bindings {
                if let Some(b) = self.binding(binding)
                    && kinds.contains(&b.kind)
                    && !all.contains_key(name)
                {
                    all.insert(name.clone(), binding);
                }
            }
        }
        all
    }

    /// Own bindings of `scope` in declaration order.
    pub fn own_bindings(&self, scope: ScopeId) -> Vec<(String, BindingId)> {
        self.scope_data(scope)
            .bindings
            .iter()
            .filter(|&(_, &id)| self.binding(id).is_some())
            .map(|(name, &id)| (name.clone(), id))
            .collect()
    }

    /// Forget `name` in `scope` and destroy its binding.
    pub fn remove_own_binding(&mut self, scope: ScopeId, name: &str) {
        if let Some(id) = self.scope_data_mut(scope).bindings.shift_remove(name)
            && let Some(slot) = self.bindings.get_mut(id.index())
        {
            *slot = None;
        }
    }

    /// Remove the nearest binding of `name` and any uid claim on it.
    pub fn remove_binding(&mut self, scope: ScopeId, name: &str) {
        if let Some(owner) = self
            .get_binding(scope, name)
            .and_then(|id| self.binding(id))
            .map(|b| b.scope)
        {
            self.remove_own_binding(owner, name);
        }
        let chain: Vec<ScopeId> = self.scope_chain(scope).collect();
        for id in chain {
            self.scope_data_mut(id).uids.remove(name);
        }
    }

    /// Re-home the binding of `name` into `target`.
    pub fn move_binding_to(&mut self, scope: ScopeId, name: &str, target: ScopeId) {
        let Some(id) = self.get_binding(scope, name) else {
            return;
        };
        let Some(owner) = self.binding(id).map(|b| b.scope) else {
            return;
        };
        self.scope_data_mut(owner).bindings.shift_remove(name);
        if let Some(binding) = self.binding_mut(id) {
            binding.scope = target;
        }
        self.scope_data_mut(target).bindings.insert(name.to_string(), id);
    }

    /// `this`, `super`, or an identifier that cannot change under us.
    pub fn is_static_node(&self, scope: ScopeId, node: NodeIndex) -> bool {
        match self.arena.ty(node) {
            Some(NodeType::ThisExpression | NodeType::Super) => true,
            Some(NodeType::Identifier) => {
                let Some(name) = self.arena.name(node) else {
                    return false;
                };
                match self.get_binding(scope, name).and_then(|id| self.binding(id)) {
                    Some(binding) => binding.constant,
                    None => self.has_binding(scope, name, false),
                }
            }
            _ => false,
        }
    }

    /// Whether evaluating `node` can have no side effects. With
    /// `constants_only`, identifiers must also be constant bindings.
    pub fn is_pure(&self, scope: ScopeId, node: NodeIndex, constants_only: bool) -> bool {
        let Some(n) = self.arena.get(node) else {
            return true;
        };
        let child = |field: &str| n.child(field).unwrap_or(NodeIndex::NONE);
        let flag = |field: &str| n.bool_field(field).unwrap_or(false);
        let all = |field: &str| {
            n.list(field).is_ok_and(|items| {
                items
                    .iter()
                    .all(|&item| self.is_pure(scope, item, constants_only))
            })
        };

        match n.ty {
            NodeType::Identifier => {
                let Some(name) = n.name() else {
                    return false;
                };
                match self.get_binding(scope, name).and_then(|id| self.binding(id)) {
                    Some(binding) => !constants_only || binding.constant,
                    None => false,
                }
            }
            ty if ty.is_alias_of(Alias::Class) => {
                let super_class = child("super_class");
                (super_class.is_none() || self.is_pure(scope, super_class, constants_only))
                    && self.is_pure(scope, child("body"), constants_only)
            }
            NodeType::ClassBody => all("body"),
            ty if ty.is_alias_of(Alias::Binary) => {
                self.is_pure(scope, child("left"), constants_only)
                    && self.is_pure(scope, child("right"), constants_only)
            }
            NodeType::ArrayExpression => all("elements"),
            NodeType::ObjectExpression => all("properties"),
            NodeType::ClassMethod => {
                if flag("computed") && !self.is_pure(scope, child("key"), constants_only) {
                    return false;
                }
                !matches!(n.str_field("kind"), Ok(Some("get" | "set")))
            }
            NodeType::ClassProperty | NodeType::ObjectProperty => {
                if flag("computed") && !self.is_pure(scope, child("key"), constants_only) {
                    return false;
                }
                self.is_pure(scope, child("value"), constants_only)
            }
            NodeType::UnaryExpression => self.is_pure(scope, child("argument"), constants_only),
            NodeType::TemplateLiteral => all("expressions"),
            ty => ty.is_alias_of(Alias::Pureish),
        }
    }

    /// Name carried by an identifier-like field value.
    pub(crate) fn field_name(&self, node: NodeIndex, field: &str) -> Option<String> {
        match self.arena.get(node)?.field(field).ok()? {
            Value::Node(child) => self.arena.name(*child).map(str::to_string),
            _ => None,
        }
    }
}
