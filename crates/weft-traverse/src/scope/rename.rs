//! Renaming a binding and all of its references.

use std::rc::Rc;

use tracing::debug;
use weft_ast::{NodeIndex, NodeType, Value, get_binding_identifiers};

use super::{BindingId, ScopeId};
use crate::error::Result;
use crate::normalize::NormalizedVisitor;
use crate::path::PathId;
use crate::tree::Tree;
use crate::visitor::Visitor;

struct RenameState {
    old_name: String,
    new_name: String,
    identifier: NodeIndex,
}

thread_local! {
    static RENAMER: Result<Rc<NormalizedVisitor<RenameState>>> = renamer().map(Rc::new);
}

fn set_name(tree: &mut Tree, node: NodeIndex, name: &str) -> Result<()> {
    tree.arena_mut()
        .node_mut(node)?
        .set_scalar("name", Value::Str(name.to_string()))?;
    Ok(())
}

fn renamer() -> Result<NormalizedVisitor<RenameState>> {
    let visitor = Visitor::<RenameState>::new()
        .enter("AssignmentExpression|Declaration|VariableDeclarator", |tree, path, state| {
            if tree.node_type(path) == Some(NodeType::VariableDeclaration) {
                return Ok(());
            }
            let node = tree.node(path);
            let ids = get_binding_identifiers(tree.arena(), node, true);
            if let Some(nodes) = ids.get(&state.old_name) {
                for &id in nodes {
                    set_name(tree, id, &state.new_name)?;
                }
            }
            Ok(())
        })
        .enter("Scope", |tree, path, state| {
            let Some(scope) = tree.scope_of(path)? else {
                return Ok(());
            };
            if !tree.binding_identifier_equals(scope, &state.old_name, state.identifier) {
                tree.skip(path);
            }
            Ok(())
        })
        .enter("ReferencedIdentifier", |tree, path, state| {
            let node = tree.node(path);
            if tree.arena().name(node) == Some(state.old_name.as_str()) {
                set_name(tree, node, &state.new_name)?;
            }
            Ok(())
        });
    NormalizedVisitor::new(visitor)
}

impl Tree {
    /// Rename the binding `old` visible from `scope` to `new`, or to a
    /// fresh uid based on `old`. Declarations and references in nested
    /// scopes that shadow `old` keep their name.
    ///
    /// Returns the new name, or `None` when no such binding exists.
    #[tracing::instrument(level = "debug", skip(self), fields(scope = scope.0))]
    pub fn rename(&mut self, scope: ScopeId, old: &str, new: Option<&str>) -> Result<Option<String>> {
        let Some(id) = self.get_binding(scope, old) else {
            return Ok(None);
        };
        let Some(binding) = self.binding(id) else {
            return Ok(None);
        };
        let (owner, identifier) = (binding.scope, binding.identifier);
        let new_name = match new {
            Some(name) => name.to_string(),
            None => self.generate_uid(scope, old)?,
        };

        let renamer = RENAMER.with(Clone::clone)?;
        let mut state = RenameState {
            old_name: old.to_string(),
            new_name: new_name.clone(),
            identifier,
        };
        let block_path: PathId = self.scope_path(owner);
        self.traverse_path(block_path, &renamer, &mut state)?;

        set_name(self, identifier, &new_name)?;
        self.rebind(owner, id, old, &new_name);
        debug!(old, new = %new_name, "renamed binding");
        Ok(Some(new_name))
    }

    fn rebind(&mut self, owner: ScopeId, id: BindingId, old: &str, new: &str) {
        let data = self.scope_data_mut(owner);
        if data.bindings.get(old) == Some(&id) {
            data.bindings.shift_remove(old);
        }
        data.bindings.insert(new.to_string(), id);
        if let Some(binding) = self.binding_mut(id) {
            binding.name = new.to_string();
        }
        let program = self.get_program_parent(owner);
        self.scope_data_mut(program).references.insert(new.to_string());
    }
}
