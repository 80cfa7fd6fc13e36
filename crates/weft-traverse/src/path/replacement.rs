//! Replacing the node at a path.

use rustc_hash::FxHashSet;
use tracing::debug;
use weft_ast::{Alias, NodeIndex, NodeType, ShapeError, get_binding_identifiers};

use super::PathId;
use crate::error::Result;
use crate::scope::{BindingId, ScopeId};
use crate::tree::Tree;

const RETURN_UID_KEY: &str = "expression_replacement_return_uid";

impl Tree {
    /// Put `replacement` into the slot of `path`.
    ///
    /// An expression put into a statement slot is wrapped in an
    /// `ExpressionStatement`; a statement put into an expression slot goes
    /// through `replace_expression_with_statements`. The replacement may be
    /// taken from inside the node it replaces.
    ///
    /// Bindings declared by the old subtree are dropped, the new subtree is
    /// registered with its scope, and the path is queued so that an active
    /// pass visits the new node.
    #[tracing::instrument(level = "debug", skip(self), fields(path = path.0))]
    pub fn replace_with(&mut self, path: PathId, replacement: NodeIndex) -> Result<()> {
        self.assert_live(path)?;
        let old = self.node(path);
        if old == replacement {
            return Ok(());
        }
        if replacement.is_none() {
            return self.remove(path);
        }
        let replacement_ty = self
            .arena
            .ty(replacement)
            .ok_or(ShapeError::InvalidNode { index: replacement })?;
        let current_ty = self.node_type(path);
        if current_ty == Some(NodeType::Program) && replacement_ty != NodeType::Program {
            return Err(self.error_at(path, "a Program can only be replaced by another Program"));
        }

        let swappable = self.can_have_variable_declaration_or_expression(path)
            || self.can_swap_between_expression_and_statement(path, replacement);
        let in_default_export = self
            .arena
            .is(self.parent_node(path), NodeType::ExportDefaultDeclaration);
        let is = |ty: Option<NodeType>, alias: Alias| ty.is_some_and(|ty| ty.is_alias_of(alias));

        if !swappable
            && !in_default_export
            && is(current_ty, Alias::Statement)
            && replacement_ty.is_alias_of(Alias::Expression)
        {
            if self.arena.is_within(replacement, old) {
                self.arena.take(replacement)?;
            }
            let statement = self.arena.expression_statement(replacement)?;
            return self.replace_node(path, statement);
        }
        if !swappable
            && is(current_ty, Alias::Expression)
            && replacement_ty.is_alias_of(Alias::Statement)
        {
            return self.replace_expression_with_statements(path, &[replacement]);
        }
        self.replace_node(path, replacement)
    }

    /// Slot write shared by every replacement route.
    pub(crate) fn replace_node(&mut self, path: PathId, replacement: NodeIndex) -> Result<()> {
        let old = self.node(path);
        if replacement != old && self.arena.is_within(replacement, old) {
            self.arena.take(replacement)?;
        }
        let reparent = match self.parent_path(path) {
            Some(parent) if !self.options.no_scope => self.scope_of(parent)?,
            _ => None,
        };

        self.write_slot(path, replacement)?;
        if let Some(comments) = self.arena.get_mut(old).and_then(|n| n.comments.take())
            && let Some(target) = self.arena.get_mut(replacement)
        {
            target.comments_mut().absorb(*comments);
        }

        let data = &mut self.paths[path.index()];
        data.node = replacement;
        data.scope = None;
        data.stale = false;
        self.invalidate_subtree(old, replacement, Some(path), reparent);
        self.register_subtree(path)?;
        self.requeue(path);
        debug!(path = path.0, old = old.0, new = replacement.0, "replaced");
        Ok(())
    }

    /// Swap a `Noop` placeholder into the slot and return the node that was
    /// there, detached, so it can be nested inside a wrapper. Finish with
    /// `replace_with(path, wrapper)`.
    pub fn detach_for_wrap(&mut self, path: PathId) -> Result<NodeIndex> {
        self.assert_live(path)?;
        let old = self.node(path);
        let placeholder = self.arena.noop()?;
        self.write_slot(path, placeholder)?;
        self.paths[path.index()].node = placeholder;
        Ok(old)
    }

    /// Replace with several nodes: the first takes this slot, the rest are
    /// inserted after it. Leading comments go to the first node and
    /// trailing comments to the last.
    pub fn replace_with_multiple(&mut self, path: PathId, nodes: &[NodeIndex]) -> Result<Vec<PathId>> {
        self.assert_live(path)?;
        let Some((&first, rest)) = nodes.split_first() else {
            self.remove(path)?;
            return Ok(Vec::new());
        };
        let old = self.node(path);
        if let Some(mut comments) = self.arena.get_mut(old).and_then(|n| n.comments.take()) {
            let trailing = std::mem::take(&mut comments.trailing);
            let last = rest.last().copied().unwrap_or(first);
            if let Some(node) = self.arena.get_mut(first) {
                node.comments_mut().absorb(*comments);
            }
            if let Some(node) = self.arena.get_mut(last) {
                node.comments_mut().trailing.extend(trailing);
            }
        }

        self.replace_with(path, first)?;
        let mut paths = vec![path];
        if !rest.is_empty() {
            paths.extend(self.insert_after(path, rest)?);
        }
        Ok(paths)
    }

    /// Replace with `nodes` in whatever way the slot allows. A single node
    /// goes through `replace_with`; several nodes in a list slot are
    /// inserted after the path, which is then removed.
    pub fn replace_inline(&mut self, path: PathId, nodes: &[NodeIndex]) -> Result<Vec<PathId>> {
        self.assert_live(path)?;
        if let [node] = nodes {
            self.replace_with(path, *node)?;
            return Ok(vec![path]);
        }
        if self.slot(path).list_key().is_none() {
            return self.replace_with_multiple(path, nodes);
        }
        let inserted = if nodes.is_empty() {
            Vec::new()
        } else {
            self.insert_after(path, nodes)?
        };
        self.remove(path)?;
        Ok(inserted)
    }

    /// The key of a member expression, property or method as it would be
    /// written computed: a plain identifier key becomes a string literal.
    /// Other keys are returned as they are.
    pub fn to_computed_key(&mut self, path: PathId) -> Result<NodeIndex> {
        self.resync(path);
        let node = self.node(path);
        let ty = self.arena.ty(node).ok_or_else(|| self.detached(path))?;
        let field = if ty == NodeType::MemberExpression {
            "property"
        } else if ty.is_alias_of(Alias::Property) || ty.is_alias_of(Alias::Method) {
            "key"
        } else {
            return Err(self.error_at(path, format!("{} has no computable key", ty.name())));
        };
        let key = self.arena.child(node, field)?;
        if !self.has(path, "computed")
            && self.arena.is(key, NodeType::Identifier)
            && let Some(name) = self.arena.name(key).map(str::to_string)
        {
            return Ok(self.arena.string_literal(name)?);
        }
        Ok(key)
    }

    /// Replace an expression with statements.
    ///
    /// Expression statements collapse into a sequence expression. Anything
    /// else runs inside an immediately invoked arrow function whose
    /// completion records return their value.
    pub fn replace_expression_with_statements(&mut self, path: PathId, nodes: &[NodeIndex]) -> Result<()> {
        self.assert_live(path)?;
        if nodes.is_empty() {
            let zero = self.arena.numeric_literal(0.0)?;
            let undefined = self.arena.unary_expression("void", zero)?;
            return self.replace_node(path, undefined);
        }

        let all_expressions = nodes.iter().all(|&node| {
            self.arena.ty(node).is_some_and(|ty| {
                ty == NodeType::ExpressionStatement || ty.is_alias_of(Alias::Expression)
            })
        });
        if all_expressions {
            let mut expressions = Vec::with_capacity(nodes.len());
            for &node in nodes {
                if self.arena.is(node, NodeType::ExpressionStatement) {
                    let expression = self.arena.child(node, "expression")?;
                    self.arena.take(expression)?;
                    expressions.push(expression);
                } else {
                    expressions.push(node);
                }
            }
            let replacement = match expressions.as_slice() {
                [single] => *single,
                _ => self.arena.sequence_expression(expressions)?,
            };
            return self.replace_node(path, replacement);
        }

        let body = self.arena.block_statement(nodes.to_vec())?;
        let arrow = self.arena.arrow_function_expression(Vec::new(), body)?;
        let call = self.arena.call_expression(arrow, Vec::new())?;
        self.replace_node(path, call)?;

        let callee = self.get(path, "callee")?;
        let body = self.get(callee, "body")?;
        for record in self.get_completion_records(body)? {
            if self.node_type(record) != Some(NodeType::ExpressionStatement) {
                continue;
            }
            let expression = self.arena.child(self.node(record), "expression")?;
            let in_loop = self
                .find_parent(record, |tree, id| {
                    tree.node_type(id)
                        .is_some_and(|ty| ty.is_alias_of(Alias::Loop))
                })
                .filter(|&found| self.is_descendant(found, body));
            match in_loop {
                Some(loop_path) => self.assign_loop_completion(callee, body, loop_path, record)?,
                None => {
                    self.arena.take(expression)?;
                    let ret = self.arena.return_statement(expression)?;
                    self.replace_node(record, ret)?;
                }
            }
        }
        Ok(())
    }

    /// A completion record inside a loop can't return early: assign it to a
    /// shared variable that the function returns once after the loop.
    fn assign_loop_completion(
        &mut self,
        callee: PathId,
        body: PathId,
        loop_path: PathId,
        record: PathId,
    ) -> Result<()> {
        let name = match self.get_data(loop_path, RETURN_UID_KEY) {
            Some(serde_json::Value::String(name)) => name.clone(),
            _ => {
                let scope = self
                    .scope_of(callee)?
                    .ok_or_else(|| self.error_at(callee, "no scope to declare a return value in"))?;
                let id = self.generate_declared_uid_identifier(scope, "ret")?;
                let name = self.arena.name(id).unwrap_or("ret").to_string();
                let ret = self.arena.return_statement(id)?;
                self.push_container(body, "body", &[ret])?;
                self.set_data(loop_path, RETURN_UID_KEY, serde_json::Value::String(name.clone()));
                name
            }
        };
        let expression_path = self.get(record, "expression")?;
        let expression = self.detach_for_wrap(expression_path)?;
        let target = self.arena.identifier(name)?;
        let assignment = self.arena.assignment_expression("=", target, expression)?;
        self.replace_node(expression_path, assignment)
    }

    /// Forget everything the detached subtree `old` declared or used.
    ///
    /// Paths below it are marked removed, scopes it owned are detached and
    /// their bindings destroyed. References and reassignments recorded
    /// inside `old`, inside `keep`, or at `holder` are unregistered; the
    /// latter two are registered again by the caller. Scopes inside `keep`
    /// whose parent went away are re-attached to `enclosing`, the scope the
    /// edited slot lives in.
    ///
    /// A binding whose declaration was removed falls back to a surviving
    /// redeclaration; without one it is destroyed and its remaining reads
    /// resolve again from its scope, ending up as globals if nothing else
    /// declares the name. Only the two subtrees and the bindings their names
    /// can reach are looked at.
    pub(crate) fn invalidate_subtree(
        &mut self,
        old: NodeIndex,
        keep: NodeIndex,
        holder: Option<PathId>,
        enclosing: Option<ScopeId>,
    ) {
        if old.is_none() {
            return;
        }
        let mut old_nodes = Vec::new();
        self.arena.traverse_fast(old, |node| {
            old_nodes.push(node);
            true
        });
        let mut keep_nodes = Vec::new();
        if keep.is_some() {
            self.arena.traverse_fast(keep, |node| {
                keep_nodes.push(node);
                true
            });
        }

        let mut removed_paths = 0usize;
        for node in &old_nodes {
            let Some(cached) = self.path_cache.get(node) else {
                continue;
            };
            for &id in cached.iter() {
                let data = &mut self.paths[id.index()];
                if Some(id) == holder || data.removed {
                    continue;
                }
                if data.node.is_some() && self.arena.is_within(data.node, old) {
                    data.removed = true;
                    data.should_skip = true;
                    removed_paths += 1;
                }
            }
        }

        let mut detached: FxHashSet<ScopeId> = FxHashSet::default();
        for node in &old_nodes {
            if let Some(&scope) = self.scope_cache.get(node) {
                let data = &mut self.scopes[scope.index()];
                if !data.detached {
                    data.detached = true;
                    detached.insert(scope);
                }
            }
        }
        let mut kept_scopes = Vec::new();
        for node in &keep_nodes {
            if let Some(&scope) = self.scope_cache.get(node) {
                let data = &mut self.scopes[scope.index()];
                if data.detached {
                    continue;
                }
                if data.parent.is_some_and(|p| detached.contains(&p)) {
                    data.parent = enclosing;
                }
                kept_scopes.push(scope);
            }
        }

        let names: FxHashSet<&str> = old_nodes
            .iter()
            .chain(&keep_nodes)
            .filter_map(|&node| self.arena.name(node))
            .collect();
        let mut candidates: Vec<BindingId> = Vec::new();
        for &scope in &detached {
            candidates.extend(self.scope_data(scope).bindings.values().copied());
        }
        let searched = enclosing
            .into_iter()
            .flat_map(|scope| self.scope_chain(scope))
            .chain(kept_scopes.iter().copied());
        for scope in searched {
            let bindings = &self.scope_data(scope).bindings;
            candidates.extend(names.iter().filter_map(|&name| bindings.get(name).copied()));
        }
        candidates.sort_unstable_by_key(|id| id.0);
        candidates.dedup();

        let arena = &self.arena;
        let paths = &self.paths;
        let inside_old = |node: NodeIndex| node.is_some() && arena.is_within(node, old);
        let inside_keep = |node: NodeIndex| keep.is_some() && node.is_some() && arena.is_within(node, keep);
        let dropped = |path: PathId| {
            Some(path) == holder || paths[path.index()].removed || inside_keep(paths[path.index()].node)
        };

        let mut destroyed: Vec<(ScopeId, String, BindingId, Vec<PathId>)> = Vec::new();
        let mut promoted = 0usize;
        for id in candidates {
            let Some(binding) = self.bindings.get_mut(id.index()).and_then(Option::as_mut) else {
                continue;
            };
            if detached.contains(&binding.scope) {
                destroyed.push((binding.scope, binding.name.clone(), id, Vec::new()));
                continue;
            }
            let before = binding.reference_paths.len();
            binding.reference_paths.retain(|&p| !dropped(p));
            if binding.reference_paths.len() != before {
                binding.references = binding.reference_paths.len();
                binding.referenced = binding.references > 0;
            }
            let before = binding.constant_violations.len();
            binding.constant_violations.retain(|&p| !dropped(p));
            if binding.constant_violations.len() != before {
                binding.constant = binding.constant_violations.is_empty();
            }
            binding.redeclarations.retain(|&(p, _)| !dropped(p));
            if !inside_old(binding.identifier) {
                continue;
            }

            let successor = binding.redeclarations.iter().find_map(|&(path, kind)| {
                get_binding_identifiers(arena, paths[path.index()].node, true)
                    .get(&binding.name)
                    .and_then(|ids| ids.first().copied())
                    .map(|identifier| (path, kind, identifier))
            });
            match successor {
                Some((path, kind, identifier)) => {
                    binding.identifier = identifier;
                    binding.path = path;
                    binding.kind = kind;
                    binding.redeclarations.retain(|&(p, _)| p != path);
                    binding.constant_violations.retain(|&p| p != path);
                    binding.constant = binding.constant_violations.is_empty();
                    if binding.constant {
                        binding.clear_value();
                    }
                    promoted += 1;
                }
                None => destroyed.push((
                    binding.scope,
                    binding.name.clone(),
                    id,
                    binding.reference_paths.clone(),
                )),
            }
        }

        let destroyed_bindings = destroyed.len();
        for (scope, name, id, reads) in destroyed {
            let data = self.scope_data_mut(scope);
            if data.bindings.get(&name) == Some(&id) {
                data.bindings.shift_remove(&name);
            }
            self.bindings[id.index()] = None;
            for read in reads {
                match self.get_binding(scope, &name) {
                    Some(outer) => {
                        if let Some(binding) = self.binding_mut(outer) {
                            binding.reference(read);
                        }
                    }
                    None => self.add_global(scope, self.node(read)),
                }
            }
        }
        self.scope_cache.retain(|_, scope| !detached.contains(scope));
        debug!(
            removed_paths,
            detached_scopes = detached.len(),
            destroyed_bindings,
            promoted,
            "invalidated subtree"
        );
    }
}
