//! Moving an expression out to the outermost scope that still sees the
//! same bindings.

use indexmap::IndexMap;
use tracing::debug;
use weft_ast::{Alias, NodeType};

use super::PathId;
use crate::error::Result;
use crate::scope::{BindingId, BindingKind, ScopeId};
use crate::tree::Tree;

#[derive(Debug, Default)]
struct Hoister {
    /// Outer bindings read by the expression.
    bindings: IndexMap<String, BindingId>,
    /// Scopes the expression can't be moved past (the owner of a `this`).
    barriers: Vec<ScopeId>,
    /// Scopes that resolve every name in `bindings` the same way, innermost
    /// first.
    scopes: Vec<ScopeId>,
    attach_after: bool,
}

impl Tree {
    /// Move the expression at `path` into a `var _ref = ...` declaration
    /// as far out as every binding it reads allows, leaving `_ref` behind.
    ///
    /// Returns the new declaration's path, or `None` when the expression
    /// can't leave its function.
    #[tracing::instrument(level = "debug", skip(self), fields(path = path.0))]
    pub fn hoist(&mut self, path: PathId) -> Result<Option<PathId>> {
        self.assert_live(path)?;
        let Some(scope) = self.scope_of(path)? else {
            return Ok(None);
        };
        let mut hoister = Hoister::default();
        self.collect_hoisted_reads(path, scope, &mut hoister)?;
        self.collect_compatible_scopes(scope, &mut hoister);
        let Some(attach) = self.attachment_path(scope, &mut hoister)? else {
            return Ok(None);
        };
        if self.get_function_parent_path(attach) == self.get_function_parent_path(path) {
            return Ok(None);
        }
        let Some(attach_scope) = self.scope_of(attach)? else {
            return Ok(None);
        };

        let uid = self.generate_uid(attach_scope, "ref")?;
        let expression = self.detach_for_wrap(path)?;
        let id = self.arena.identifier(uid.clone())?;
        let declarator = self.arena.variable_declarator(id, expression)?;
        let declaration = if self.node_type(attach) == Some(NodeType::VariableDeclarator) {
            declarator
        } else {
            self.arena.variable_declaration("var", vec![declarator])?
        };
        let inserted = if hoister.attach_after {
            self.insert_after(attach, &[declaration])?
        } else {
            self.insert_before(attach, &[declaration])?
        };
        let reference = self.arena.identifier(uid.as_str())?;
        self.replace_with(path, reference)?;
        debug!(uid = %uid, after = hoister.attach_after, "hoisted");
        Ok(inserted.first().copied())
    }

    fn collect_hoisted_reads(&mut self, path: PathId, scope: ScopeId, hoister: &mut Hoister) -> Result<()> {
        let mut candidates = Vec::new();
        self.arena.traverse_fast(self.node(path), |node| {
            if matches!(
                self.arena.ty(node),
                Some(NodeType::Identifier | NodeType::ThisExpression)
            ) {
                candidates.push(node);
            }
            true
        });

        for node in candidates {
            let Some(read) = self.path_for(node) else {
                continue;
            };
            let Some(read_scope) = self.scope_of(read)? else {
                continue;
            };
            if self.arena.is(node, NodeType::ThisExpression) {
                let owner = self.scope_chain(read_scope).find(|&id| {
                    self.arena.ty(self.scope_block(id)).is_some_and(|ty| {
                        ty.is_alias_of(Alias::Function) && ty != NodeType::ArrowFunctionExpression
                    })
                });
                hoister.barriers.extend(owner);
                continue;
            }
            if !self.is_referenced_identifier(read) {
                continue;
            }
            let name = self.arena.name(node).unwrap_or_default().to_string();
            let Some(binding) = self.get_binding(read_scope, &name) else {
                continue;
            };
            // Declared inside the expression itself.
            if self.get_binding(scope, &name) != Some(binding) {
                continue;
            }
            hoister.bindings.insert(name, binding);
        }
        Ok(())
    }

    fn collect_compatible_scopes(&self, scope: ScopeId, hoister: &mut Hoister) {
        for candidate in self.scope_chain(scope) {
            let compatible = hoister.bindings.iter().all(|(name, &id)| {
                self.binding(id)
                    .is_some_and(|binding| self.binding_identifier_equals(candidate, name, binding.identifier))
            });
            if !compatible {
                break;
            }
            hoister.scopes.push(candidate);
            if hoister.barriers.contains(&candidate) {
                break;
            }
        }
    }

    /// Statement to insert the declaration next to. Moved after the last
    /// declaration or assignment of a binding the expression reads when
    /// that comes later in the target scope.
    fn attachment_path(&mut self, scope: ScopeId, hoister: &mut Hoister) -> Result<Option<PathId>> {
        let Some(mut attach) = self.outermost_attachment(scope, hoister)? else {
            return Ok(None);
        };
        let mut target = self.scope_of(attach)?;
        if let Some(id) = target
            && self.scope_path(id) == attach
        {
            target = self.scope_parent(id);
        }
        let function_or_program = target.is_some_and(|id| {
            self.arena
                .ty(self.scope_block(id))
                .is_some_and(|ty| ty == NodeType::Program || ty.is_alias_of(Alias::Function))
        });
        if let Some(target) = target.filter(|_| function_or_program) {
            for (name, id) in hoister.bindings.clone() {
                if !self.has_own_binding(target, &name) {
                    continue;
                }
                let Some(binding) = self.binding(id) else {
                    continue;
                };
                if binding.kind == BindingKind::Param {
                    continue;
                }
                let (declaration, violations) = (binding.path, binding.constant_violations.clone());
                if self.later_in_list(self.attachment_parent(declaration), attach) {
                    hoister.attach_after = true;
                    attach = declaration;
                    for violation in violations {
                        if self.later_in_list(self.attachment_parent(violation), attach) {
                            attach = violation;
                        }
                    }
                }
            }
        }
        if let Some(parent) = self.parent_path(attach)
            && self
                .node_type(parent)
                .is_some_and(|ty| ty.is_alias_of(Alias::ExportDeclaration))
        {
            attach = parent;
        }
        Ok(Some(attach))
    }

    fn outermost_attachment(&mut self, scope: ScopeId, hoister: &mut Hoister) -> Result<Option<PathId>> {
        let Some(outermost) = hoister.scopes.pop() else {
            return Ok(None);
        };
        let block_ty = self.arena.ty(self.scope_block(outermost));
        if block_ty.is_some_and(|ty| ty.is_alias_of(Alias::Function)) {
            if !self.has_own_param_bindings(outermost, hoister) {
                return Ok(self.next_scope_attachment(hoister));
            }
            if outermost == scope {
                return Ok(None);
            }
            let function = self.scope_path(outermost);
            let body = self.get(function, "body")?;
            if self.node_type(body) != Some(NodeType::BlockStatement) || !self.has(body, "body") {
                return Ok(None);
            }
            return self.get(body, "body.0").map(Some);
        }
        if block_ty == Some(NodeType::Program) {
            return Ok(self.next_scope_attachment(hoister));
        }
        Ok(None)
    }

    fn next_scope_attachment(&mut self, hoister: &mut Hoister) -> Option<PathId> {
        let scope = hoister.scopes.pop()?;
        Some(self.attachment_parent(self.scope_path(scope)))
    }

    fn has_own_param_bindings(&self, scope: ScopeId, hoister: &Hoister) -> bool {
        hoister.bindings.iter().any(|(name, &id)| {
            self.has_own_binding(scope, name)
                && self
                    .binding(id)
                    .is_some_and(|binding| binding.kind == BindingKind::Param && binding.constant)
        })
    }

    /// Nearest path at or above `path` that is a statement in a list, a
    /// declarator with siblings, or the root.
    fn attachment_parent(&self, path: PathId) -> PathId {
        let mut current = path;
        loop {
            let Some(parent) = self.parent_path(current) else {
                return current;
            };
            let ty = self.node_type(current);
            let listed_statement = self.slot(current).list_key().is_some()
                && ty.is_some_and(|ty| ty.is_alias_of(Alias::Statement));
            let shared_declarator = ty == Some(NodeType::VariableDeclarator)
                && self
                    .arena
                    .list(self.node(parent), "declarations")
                    .is_ok_and(|declarations| declarations.len() > 1);
            if listed_statement || shared_declarator {
                return current;
            }
            current = parent;
        }
    }

    fn later_in_list(&self, path: PathId, than: PathId) -> bool {
        match (self.slot(path).index(), self.slot(than).index()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        }
    }
}
