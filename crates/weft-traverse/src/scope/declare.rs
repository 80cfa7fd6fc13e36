//! Adding declarations to a scope.

use weft_ast::{Alias, NodeIndex, NodeType};

use super::{BindingKind, ScopeId};
use crate::error::Result;
use crate::path::PathId;
use crate::tree::Tree;

impl Tree {
    /// Declare `id` (optionally initialized to `init`) at the top of the
    /// scope's block and register the binding.
    ///
    /// Repeated pushes of the same `kind` share one declaration unless
    /// `unique` is set. Returns the declarator path.
    #[tracing::instrument(level = "debug", skip(self, id, init), fields(scope = scope.0))]
    pub fn push(
        &mut self,
        scope: ScopeId,
        id: NodeIndex,
        init: NodeIndex,
        kind: &str,
        unique: bool,
    ) -> Result<PathId> {
        let block = self.declaration_block(scope)?;
        let memo_key = kind.to_string();

        let existing = if unique {
            None
        } else {
            self.scope_data(scope)
                .pushed
                .get(&memo_key)
                .copied()
                .filter(|&path| {
                    !self.is_removed(path)
                        && self.node_type(path) == Some(NodeType::VariableDeclaration)
                })
        };
        let declaration = match existing {
            Some(path) => path,
            None => {
                let node = self.arena.variable_declaration(kind, Vec::new())?;
                let path = self
                    .unshift_container(block, "body", &[node])?
                    .first()
                    .copied()
                    .ok_or_else(|| self.error_at(block, "declaration was not inserted"))?;
                if !unique {
                    self.scope_data_mut(scope).pushed.insert(memo_key, path);
                }
                path
            }
        };

        let declarator = self.arena.variable_declarator(id, init)?;
        let declarator_path = self
            .push_container(declaration, "declarations", &[declarator])?
            .first()
            .copied()
            .ok_or_else(|| self.error_at(declaration, "declarator was not inserted"))?;
        self.register_binding(scope, BindingKind::from_declaration_kind(kind), declarator_path)?;
        Ok(declarator_path)
    }

    /// Block whose body receives declarations pushed to `scope`.
    fn declaration_block(&mut self, scope: ScopeId) -> Result<PathId> {
        let mut target = scope;
        let is_block = |tree: &Tree, id: ScopeId| {
            matches!(
                tree.arena.ty(tree.scope_block(id)),
                Some(NodeType::BlockStatement | NodeType::Program)
            )
        };
        if !is_block(self, target) {
            target = self.get_block_parent(target);
        }
        if self.arena.is(self.scope_block(target), NodeType::SwitchStatement) {
            target = self.get_function_parent(target);
        }

        let path = self.scope_path(target);
        let needs_body = self.node_type(path).is_some_and(|ty| {
            ty.is_alias_of(Alias::Loop) || ty.is_alias_of(Alias::Function) || ty == NodeType::CatchClause
        });
        if needs_body {
            return self.ensure_block(path);
        }
        Ok(path)
    }
}
