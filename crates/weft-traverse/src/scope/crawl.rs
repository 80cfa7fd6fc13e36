//! Scope crawling: rebuild the bindings of a scope from its subtree.

use std::rc::Rc;

use tracing::debug;
use weft_ast::{Alias, NodeIndex, NodeType, get_binding_identifiers, predicates};

use super::{Binding, BindingId, BindingKind, ScopeId};
use crate::error::{Result, TraverseError};
use crate::normalize::NormalizedVisitor;
use crate::path::PathId;
use crate::tree::Tree;
use crate::visitor::Visitor;

#[derive(Debug, Default)]
pub(crate) struct CrawlState {
    references: Vec<PathId>,
    constant_violations: Vec<PathId>,
    assignments: Vec<PathId>,
}

thread_local! {
    static COLLECTOR: Result<Rc<NormalizedVisitor<CrawlState>>> = collector().map(Rc::new);
}

/// Scope a declaration at `path` lives in. A declaration that owns a
/// scope itself (functions, classes) belongs to the enclosing one.
fn declaring_scope(tree: &mut Tree, path: PathId) -> Result<Option<ScopeId>> {
    let Some(scope) = tree.scope_of(path)? else {
        return Ok(None);
    };
    if tree.scope_block(scope) == tree.node(path) {
        return Ok(tree.scope_parent(scope));
    }
    Ok(Some(scope))
}

fn collector() -> Result<NormalizedVisitor<CrawlState>> {
    let visitor = Visitor::<CrawlState>::new()
        .enter("For", |tree, path, _| {
            for key in ["init", "left"] {
                let node = tree.node(path);
                let Ok(head) = tree.arena().child(node, key) else {
                    continue;
                };
                if !predicates::is_var(tree.arena(), head) {
                    continue;
                }
                let head_path = tree.get(path, key)?;
                if let Some(scope) = tree.scope_of(head_path)? {
                    let target = tree.get_function_parent(scope);
                    tree.register_binding(target, BindingKind::LoopVar, head_path)?;
                }
            }
            Ok(())
        })
        .enter("Declaration", |tree, path, _| {
            let node = tree.node(path);
            let Some(ty) = tree.arena().ty(node) else {
                return Ok(());
            };
            if predicates::is_block_scoped(tree.arena(), node) && ty != NodeType::FunctionDeclaration {
                return Ok(());
            }
            if ty.is_alias_of(Alias::ExportDeclaration)
                && let Ok(declaration) = tree.arena().child(node, "declaration")
                && tree
                    .arena()
                    .ty(declaration)
                    .is_some_and(|d| d.is_alias_of(Alias::Declaration))
            {
                return Ok(());
            }
            if let Some(scope) = declaring_scope(tree, path)? {
                let target = tree.get_function_parent(scope);
                tree.register_declaration(target, path)?;
            }
            Ok(())
        })
        .enter("BlockScoped", |tree, path, _| {
            if tree.node_type(path) == Some(NodeType::FunctionDeclaration) {
                return Ok(());
            }
            if let Some(scope) = declaring_scope(tree, path)? {
                let target = tree.get_block_parent(scope);
                tree.register_declaration(target, path)?;
            }
            Ok(())
        })
        .enter("ReferencedIdentifier", |_, path, state| {
            state.references.push(path);
            Ok(())
        })
        .enter("ForXStatement", |tree, path, state| {
            let left = tree.get(path, "left")?;
            if tree
                .node_type(left)
                .is_some_and(|ty| ty == NodeType::Identifier || ty.is_alias_of(Alias::Pattern))
            {
                state.constant_violations.push(left);
            }
            Ok(())
        })
        .exit("ExportDeclaration", |tree, path, _| {
            let node = tree.node(path);
            let Ok(declaration) = tree.arena().child(node, "declaration") else {
                return Ok(());
            };
            let Some(scope) = tree.scope_of(path)? else {
                return Ok(());
            };
            let names: Vec<String> = match tree.arena().ty(declaration) {
                Some(NodeType::ClassDeclaration | NodeType::FunctionDeclaration) => tree
                    .field_name(declaration, "id")
                    .into_iter()
                    .collect(),
                Some(NodeType::VariableDeclaration) => {
                    get_binding_identifiers(tree.arena(), declaration, false)
                        .into_keys()
                        .collect()
                }
                _ => Vec::new(),
            };
            for name in names {
                if let Some(id) = tree.get_binding(scope, &name)
                    && let Some(binding) = tree.binding_mut(id)
                {
                    binding.reference(path);
                }
            }
            Ok(())
        })
        .enter("LabeledStatement", |tree, path, _| {
            let Some(scope) = tree.scope_of(path)? else {
                return Ok(());
            };
            let node = tree.node(path);
            if let Some(label) = tree.field_name(node, "label") {
                let program = tree.get_program_parent(scope);
                tree.scope_data_mut(program).references.insert(label);
            }
            let target = tree.get_block_parent(scope);
            tree.register_declaration(target, path)
        })
        .enter("AssignmentExpression", |_, path, state| {
            state.assignments.push(path);
            Ok(())
        })
        .enter("UpdateExpression", |tree, path, state| {
            state.constant_violations.push(tree.get(path, "argument")?);
            Ok(())
        })
        .enter("UnaryExpression", |tree, path, state| {
            if matches!(tree.field(path, "operator")?, weft_ast::Value::Str(ref op) if op == "delete") {
                state.constant_violations.push(tree.get(path, "argument")?);
            }
            Ok(())
        });
    NormalizedVisitor::new(visitor)
}

impl Tree {
    /// Drop every binding, label and piece of data this scope and the
    /// scopes below it hold, then rebuild them from the subtree.
    #[tracing::instrument(level = "debug", skip(self), fields(scope = scope.0))]
    pub fn crawl(&mut self, scope: ScopeId) -> Result<()> {
        let mut targets = vec![scope];
        targets.extend(self.descendant_scopes(scope));
        for &target in &targets {
            self.reset_scope(target);
        }
        for &target in &targets {
            self.register_heads(target)?;
        }
        if self.crawling {
            return Ok(());
        }

        let collector = COLLECTOR.with(Clone::clone)?;
        let path = self.scope_path(scope);
        let mut state = CrawlState::default();
        self.crawling = true;
        let result = self.traverse_path(path, &collector, &mut state);
        self.crawling = false;
        result?;

        debug!(
            references = state.references.len(),
            assignments = state.assignments.len(),
            violations = state.constant_violations.len(),
            "crawl collected"
        );
        self.link_crawl(state)
    }

    /// Register what a subtree newly placed at `path` declares, reads and
    /// reassigns, without re-crawling the surrounding scopes.
    pub(crate) fn register_subtree(&mut self, path: PathId) -> Result<()> {
        if self.options.no_scope || self.crawling {
            return Ok(());
        }
        // Enclosing scopes that don't exist yet get a full crawl, which
        // already sees the new subtree.
        match self.parent_path(path) {
            Some(parent) => {
                self.scope_of(parent)?;
            }
            None => return self.scope_of(path).map(|_| ()),
        }
        let collector = COLLECTOR.with(Clone::clone)?;
        let mut state = CrawlState::default();
        let data = &mut self.paths[path.index()];
        let flags = (data.should_skip, data.should_stop);
        data.should_skip = false;
        data.should_stop = false;

        self.crawling = true;
        let result = self
            .scope_of(path)
            .and_then(|_| self.visit_path(path, &collector, &mut state));
        self.crawling = false;

        let data = &mut self.paths[path.index()];
        (data.should_skip, data.should_stop) = flags;
        data.children_done = false;
        result?;
        self.link_crawl(state)
    }

    fn reset_scope(&mut self, scope: ScopeId) {
        let is_program = self.scope_parent(scope).is_none();
        let data = self.scope_data_mut(scope);
        let bindings: Vec<BindingId> = data.bindings.drain(..).map(|(_, id)| id).collect();
        data.labels.clear();
        data.data.clear();
        if is_program {
            data.globals.clear();
            data.uids.clear();
            data.references.clear();
        }
        for id in bindings {
            if let Some(slot) = self.bindings.get_mut(id.index()) {
                *slot = None;
            }
        }
    }

    /// Bindings introduced by the scope block itself rather than by
    /// statements inside it.
    fn register_heads(&mut self, scope: ScopeId) -> Result<()> {
        let path = self.scope_path(scope);
        let node = self.scope_block(scope);
        let Some(ty) = self.arena.ty(node) else {
            return Ok(());
        };

        if ty.is_alias_of(Alias::Loop) {
            for key in ["init", "left"] {
                let Ok(head) = self.arena.child(node, key) else {
                    continue;
                };
                if !predicates::is_let(&self.arena, head) {
                    continue;
                }
                let kind = self
                    .arena
                    .node(head)?
                    .str_field("kind")?
                    .map_or(BindingKind::Unknown, BindingKind::for_loop_head);
                let head_path = self.get(path, key)?;
                self.register_binding(scope, kind, head_path)?;
            }
        }

        if matches!(ty, NodeType::FunctionExpression | NodeType::ClassExpression)
            && let Ok(id) = self.arena.child(node, "id")
            && id.is_some()
        {
            self.register_binding_ids(scope, BindingKind::Local, path, id)?;
        }

        if ty.is_alias_of(Alias::Function) {
            for param in self.get_list(path, "params")? {
                self.register_binding(scope, BindingKind::Param, param)?;
            }
        }

        if ty == NodeType::CatchClause {
            self.register_binding(scope, BindingKind::CatchParam, path)?;
        }
        Ok(())
    }

    fn link_crawl(&mut self, state: CrawlState) -> Result<()> {
        for path in state.assignments {
            let Some(scope) = self.scope_of(path)? else {
                continue;
            };
            let ids = get_binding_identifiers(&self.arena, self.node(path), false);
            for (name, nodes) in ids {
                if self.get_binding(scope, &name).is_none()
                    && let Some(&first) = nodes.first()
                {
                    self.add_global(scope, first);
                }
            }
            self.register_constant_violation(scope, path);
        }

        for path in state.references {
            let Some(scope) = self.scope_of(path)? else {
                continue;
            };
            let node = self.node(path);
            let Some(name) = self.arena.name(node).map(str::to_string) else {
                continue;
            };
            match self.get_binding(scope, &name) {
                Some(id) => {
                    if let Some(binding) = self.binding_mut(id) {
                        binding.reference(path);
                    }
                }
                None => self.add_global(scope, node),
            }
        }

        for path in state.constant_violations {
            if let Some(scope) = self.scope_of(path)? {
                self.register_constant_violation(scope, path);
            }
        }
        Ok(())
    }

    /// Register whatever `path` declares into `scope`.
    pub fn register_declaration(&mut self, scope: ScopeId, path: PathId) -> Result<()> {
        let node = self.node(path);
        let Some(ty) = self.arena.ty(node) else {
            return Ok(());
        };
        match ty {
            NodeType::LabeledStatement => self.register_label(scope, path),
            NodeType::FunctionDeclaration => {
                self.register_binding(scope, BindingKind::Hoisted, path)?;
            }
            NodeType::VariableDeclaration => {
                let kind = self
                    .arena
                    .node(node)?
                    .str_field("kind")?
                    .map_or(BindingKind::Unknown, BindingKind::from_declaration_kind);
                for declarator in self.get_list(path, "declarations")? {
                    self.register_binding(scope, kind, declarator)?;
                }
            }
            NodeType::ClassDeclaration => self.register_binding(scope, BindingKind::Let, path)?,
            NodeType::ImportDeclaration => {
                for specifier in self.get_list(path, "specifiers")? {
                    self.register_binding(scope, BindingKind::Module, specifier)?;
                }
            }
            ty if ty.is_alias_of(Alias::ExportDeclaration) => {
                if let Ok(declaration) = self.arena.child(node, "declaration")
                    && declaration.is_some()
                {
                    let declaration = self.get(path, "declaration")?;
                    self.register_declaration(scope, declaration)?;
                }
            }
            _ => self.register_binding(scope, BindingKind::Unknown, path)?,
        }
        Ok(())
    }

    /// Mark every binding written by `path` as reassigned.
    pub fn register_constant_violation(&mut self, scope: ScopeId, path: PathId) {
        let ids = get_binding_identifiers(&self.arena, self.node(path), false);
        for name in ids.keys() {
            if let Some(id) = self.get_binding(scope, name)
                && let Some(binding) = self.binding_mut(id)
            {
                binding.reassign(path);
            }
        }
    }

    /// Register the names `path` binds in `scope`.
    ///
    /// Redeclaring a name is a `DuplicateDeclaration` when either side is
    /// block scoped, an import or a catch parameter. Other redeclarations
    /// merge into the existing binding and count as a reassignment.
    #[tracing::instrument(level = "debug", skip(self), fields(scope = scope.0, path = path.0))]
    pub fn register_binding(&mut self, scope: ScopeId, kind: BindingKind, path: PathId) -> Result<()> {
        let node = self.node(path);
        if self.arena.is(node, NodeType::VariableDeclaration) {
            for declarator in self.get_list(path, "declarations")? {
                self.register_binding(scope, kind, declarator)?;
            }
            return Ok(());
        }
        self.register_binding_ids(scope, kind, path, node)
    }

    fn register_binding_ids(
        &mut self,
        scope: ScopeId,
        kind: BindingKind,
        path: PathId,
        target: NodeIndex,
    ) -> Result<()> {
        let ids = get_binding_identifiers(&self.arena, target, true);
        let program = self.get_program_parent(scope);
        for (name, nodes) in ids {
            for identifier in nodes {
                if let Some(existing) = self.get_own_binding(scope, &name)
                    && let Some(local) = self.binding(existing)
                {
                    if local.identifier == identifier {
                        continue;
                    }
                    let existing_kind = local.kind;
                    let replaceable = matches!(existing_kind, BindingKind::Local | BindingKind::Unknown);
                    if kind != BindingKind::Param
                        && !replaceable
                        && (kind.is_exclusive() || existing_kind.is_exclusive())
                    {
                        return Err(TraverseError::DuplicateDeclaration {
                            name,
                            location: self.location(path),
                        });
                    }
                    if let Some(binding) = self.binding_mut(existing) {
                        if replaceable {
                            let previous = binding.path;
                            binding.kind = kind;
                            binding.identifier = identifier;
                            binding.path = path;
                            binding.reassign(previous);
                        } else {
                            binding.reassign(path);
                            if !binding.redeclarations.iter().any(|&(p, _)| p == path) {
                                binding.redeclarations.push((path, kind));
                            }
                        }
                    }
                    debug!(name = %name, kind = %kind, "merged redeclaration");
                    self.scope_data_mut(program).references.insert(name.clone());
                    continue;
                }

                let id = BindingId(self.bindings.len() as u32);
                self.bindings
                    .push(Some(Binding::new(identifier, name.clone(), scope, path, kind)));
                self.scope_data_mut(scope).bindings.insert(name.clone(), id);
                self.scope_data_mut(program).references.insert(name.clone());
            }
        }
        Ok(())
    }
}
