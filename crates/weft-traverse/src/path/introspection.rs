//! Questions about a path and its node. None of these mutate the path.

use serde::Serialize;
use weft_ast::{Alias, NodeIndex, NodeType, Value, is_node_type, predicates};
use weft_common::limits::MAX_INFERENCE_DEPTH;

use super::{PathId, Slot};
use crate::error::Result;
use crate::normalize::VirtualType;
use crate::scope::BindingKind;
use crate::tree::Tree;

/// Whether one path runs before or after another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionStatus {
    Before,
    After,
}

impl Tree {
    /// Whether field `key` of the node is present and non-empty.
    pub fn has(&self, path: PathId, key: &str) -> bool {
        let Some(node) = self.arena.get(self.node(path)) else {
            return false;
        };
        match node.field(key) {
            Ok(Value::Node(child)) => child.is_some(),
            Ok(Value::List(items)) => !items.is_empty(),
            Ok(Value::Str(s)) => !s.is_empty(),
            Ok(Value::Num(n)) => *n != 0.0 && !n.is_nan(),
            Ok(Value::Bool(b)) => *b,
            Ok(Value::Null) | Err(_) => false,
        }
    }

    /// Same as `has`.
    pub fn is(&self, path: PathId, key: &str) -> bool {
        self.has(path, key)
    }

    pub fn isnt(&self, path: PathId, key: &str) -> bool {
        !self.has(path, key)
    }

    /// Whether the node's type is `key` or belongs to alias `key`.
    pub fn is_node_type(&self, path: PathId, key: &str) -> bool {
        self.node_type(path).is_some_and(|ty| is_node_type(ty, key))
    }

    /// `is_node_type` extended with the virtual keys visitors accept
    /// (`ReferencedIdentifier`, `BlockScoped`, ...).
    pub fn is_type(&self, path: PathId, key: &str) -> bool {
        match VirtualType::from_name(key) {
            Some(virtual_type) => virtual_type.matches(self, path),
            None => self.is_node_type(path, key),
        }
    }

    /// Whether field `key` currently holds `value`.
    pub fn equals(&self, path: PathId, key: &str, value: &Value) -> bool {
        self.arena
            .get(self.node(path))
            .and_then(|node| node.field(key).ok())
            .is_some_and(|current| current == value)
    }

    fn grandparent_node(&self, path: PathId) -> NodeIndex {
        self.parent_path(path)
            .map_or(NodeIndex::NONE, |parent| self.parent_node(parent))
    }

    pub fn is_referenced(&self, path: PathId) -> bool {
        predicates::is_referenced(
            &self.arena,
            self.node(path),
            self.parent_node(path),
            self.grandparent_node(path),
        )
    }

    pub fn is_referenced_identifier(&self, path: PathId) -> bool {
        VirtualType::ReferencedIdentifier.matches(self, path)
    }

    pub fn is_binding_identifier(&self, path: PathId) -> bool {
        VirtualType::BindingIdentifier.matches(self, path)
    }

    pub fn is_binding(&self, path: PathId) -> bool {
        predicates::is_binding(&self.arena, self.node(path), self.parent_node(path))
    }

    pub fn is_scope(&self, path: PathId) -> bool {
        predicates::is_scope(&self.arena, self.node(path), self.parent_node(path))
    }

    pub fn is_block_scoped(&self, path: PathId) -> bool {
        predicates::is_block_scoped(&self.arena, self.node(path))
    }

    pub fn matches_pattern(&self, path: PathId, pattern: &str, allow_partial: bool) -> bool {
        predicates::matches_pattern(&self.arena, self.node(path), pattern, allow_partial)
    }

    /// Whether the path is a single-statement body slot (`consequent`,
    /// `alternate`, `body`) that could hold a block instead.
    pub fn is_statement_or_block(&self, path: PathId) -> bool {
        let parent = self.parent_node(path);
        if self.arena.is(parent, NodeType::LabeledStatement) {
            return false;
        }
        match self.slot(path) {
            Slot::Field(_) if self.arena.is(parent, NodeType::BlockStatement) => false,
            Slot::Field(key) => matches!(key, "consequent" | "body" | "alternate"),
            _ => false,
        }
    }

    /// Whether the path is the `init` or `left` slot of a for-loop head.
    pub fn can_have_variable_declaration_or_expression(&self, path: PathId) -> bool {
        matches!(self.slot(path), Slot::Field("init" | "left"))
            && self
                .arena
                .ty(self.parent_node(path))
                .is_some_and(|ty| ty.is_alias_of(Alias::For))
    }

    /// Whether an arrow body could trade this node for `replacement`: an
    /// expression body for a block, or a block body for an expression.
    pub fn can_swap_between_expression_and_statement(&self, path: PathId, replacement: NodeIndex) -> bool {
        if self.slot(path) != Slot::Field("body")
            || !self
                .arena
                .is(self.parent_node(path), NodeType::ArrowFunctionExpression)
        {
            return false;
        }
        let Some(replacement_ty) = self.arena.ty(replacement) else {
            return false;
        };
        match self.node_type(path) {
            Some(ty) if ty.is_alias_of(Alias::Expression) => replacement_ty == NodeType::BlockStatement,
            Some(NodeType::BlockStatement) => replacement_ty.is_alias_of(Alias::Expression),
            _ => false,
        }
    }

    /// Whether the node's value can end up as the completion value of the
    /// enclosing program (or function, with `allow_inside_function`).
    pub fn is_completion_record(&self, path: PathId, allow_inside_function: bool) -> bool {
        let mut current = Some(path);
        let mut first = true;
        while let Some(id) = current {
            if self.node_type(id) == Some(NodeType::Program) {
                break;
            }
            if !first
                && self
                    .node_type(id)
                    .is_some_and(|ty| ty.is_alias_of(Alias::Function))
            {
                return allow_inside_function;
            }
            first = false;
            if let Slot::Index { list, index } = self.slot(id) {
                let len = self
                    .arena
                    .list(self.parent_node(id), list)
                    .map_or(0, <[NodeIndex]>::len);
                if index + 1 != len {
                    return false;
                }
            }
            current = self.parent_path(id);
        }
        true
    }

    /// Whether this identifier reads `import_name` imported from
    /// `module_source`. `"default"` and `"*"` name default and namespace
    /// imports; `None` accepts any import from the module.
    pub fn references_import(
        &mut self,
        path: PathId,
        module_source: &str,
        import_name: Option<&str>,
    ) -> Result<bool> {
        if !self.is_referenced_identifier(path) {
            return Ok(false);
        }
        let Some(scope) = self.scope_of(path)? else {
            return Ok(false);
        };
        let Some(name) = self.arena.name(self.node(path)) else {
            return Ok(false);
        };
        let Some(binding) = self.get_binding(scope, name).and_then(|id| self.binding(id)) else {
            return Ok(false);
        };
        if binding.kind != BindingKind::Module {
            return Ok(false);
        }
        let specifier = binding.path;
        let declaration = self.parent_node(specifier);
        if !self.arena.is(declaration, NodeType::ImportDeclaration) {
            return Ok(false);
        }
        let source = self.arena.child(declaration, "source")?;
        if self.arena.node(source)?.str_field("value")? != Some(module_source) {
            return Ok(false);
        }
        let Some(import_name) = import_name else {
            return Ok(true);
        };
        let specifier_node = self.node(specifier);
        Ok(match self.arena.ty(specifier_node) {
            Some(NodeType::ImportDefaultSpecifier) => import_name == "default",
            Some(NodeType::ImportNamespaceSpecifier) => import_name == "*",
            Some(NodeType::ImportSpecifier) => self
                .field_name(specifier_node, "imported")
                .is_some_and(|imported| imported == import_name),
            _ => false,
        })
    }

    /// Whether the node is `this`, `super` or a constant identifier.
    pub fn is_static(&mut self, path: PathId) -> Result<bool> {
        let node = self.node(path);
        Ok(match self.scope_of(path)? {
            Some(scope) => self.is_static_node(scope, node),
            None => false,
        })
    }

    /// True unless `path` certainly runs after `target`.
    pub fn will_i_maybe_execute_before(&mut self, path: PathId, target: PathId) -> Result<bool> {
        Ok(self.guess_execution_status_relative_to(path, target)? != ExecutionStatus::After)
    }

    /// Best guess at whether `path` runs before or after `target`.
    ///
    /// Within one function this is source order of the branches below the
    /// common ancestor; an ancestor of `target` runs after it. When
    /// `target` sits in a function declaration that is only ever called,
    /// the call sites decide; otherwise the function itself stands in for
    /// `target`.
    pub fn guess_execution_status_relative_to(&mut self, path: PathId, target: PathId) -> Result<ExecutionStatus> {
        self.execution_status(path, target, 0)
    }

    fn execution_status(&mut self, path: PathId, target: PathId, depth: u32) -> Result<ExecutionStatus> {
        self.resync(path);
        self.resync(target);
        let mut target = target;
        let target_fn = self.function_or_root(target);
        if self.function_or_root(path) != target_fn {
            match self.status_across_functions(path, target_fn, depth)? {
                Some(status) => return Ok(status),
                None => target = target_fn,
            }
        }

        let target_paths = self.get_ancestry(target);
        if target_paths.contains(&path) {
            return Ok(ExecutionStatus::After);
        }
        let self_paths = self.get_ancestry(path);
        let common = self_paths.iter().enumerate().find_map(|(self_index, id)| {
            target_paths
                .iter()
                .position(|t| t == id)
                .map(|target_index| (self_index, target_index))
        });
        let Some((self_index, target_index)) = common else {
            return Ok(ExecutionStatus::Before);
        };
        if self_index == 0 || target_index == 0 {
            return Ok(ExecutionStatus::Before);
        }
        let (own_branch, target_branch) = (self_paths[self_index - 1], target_paths[target_index - 1]);
        Ok(if self.comes_before(own_branch, target_branch) {
            ExecutionStatus::Before
        } else {
            ExecutionStatus::After
        })
    }

    /// `path` if it is a function, else the nearest function above it, else
    /// the root.
    fn function_or_root(&mut self, path: PathId) -> PathId {
        let is_function = |tree: &Tree, id: PathId| tree.node_type(id).is_some_and(|ty| ty.is_alias_of(Alias::Function));
        match self.find(path, is_function) {
            Some(function) => function,
            None => self.root_path(),
        }
    }

    fn status_across_functions(
        &mut self,
        path: PathId,
        function: PathId,
        depth: u32,
    ) -> Result<Option<ExecutionStatus>> {
        if depth >= MAX_INFERENCE_DEPTH || self.node_type(function) != Some(NodeType::FunctionDeclaration) {
            return Ok(None);
        }
        let function_node = self.node(function);
        let Some(name) = self.field_name(function_node, "id") else {
            return Ok(None);
        };
        let Some(scope) = self.scope_of(function)? else {
            return Ok(None);
        };
        let Some(binding) = self.get_binding(scope, &name).and_then(|id| self.binding(id)) else {
            return Ok(None);
        };
        if binding.references == 0 {
            return Ok(Some(ExecutionStatus::Before));
        }
        let references = binding.reference_paths.clone();
        for &reference in &references {
            let called = self.slot(reference) == Slot::Field("callee")
                && self.arena.is(self.parent_node(reference), NodeType::CallExpression);
            if !called {
                return Ok(None);
            }
        }

        let mut all = None;
        for reference in references {
            if self.find(reference, |tree, id| tree.node(id) == function_node).is_some() {
                continue;
            }
            let status = self.execution_status(path, reference, depth + 1)?;
            match all {
                Some(seen) if seen != status => return Ok(None),
                _ => all = Some(status),
            }
        }
        Ok(all)
    }

    /// Follow constant bindings, declarator inits and type casts to the
    /// expression `path` stands for. With `dangerous`, member accesses on
    /// object and array literals are followed too, even though the literal
    /// may be mutated elsewhere. Returns `path` when nothing resolves.
    pub fn resolve(&mut self, path: PathId, dangerous: bool) -> Result<PathId> {
        let mut seen = Vec::new();
        Ok(self.resolve_inner(path, dangerous, &mut seen)?.unwrap_or(path))
    }

    fn resolve_inner(&mut self, path: PathId, dangerous: bool, seen: &mut Vec<PathId>) -> Result<Option<PathId>> {
        if seen.contains(&path) || seen.len() as u32 >= MAX_INFERENCE_DEPTH {
            return Ok(None);
        }
        seen.push(path);
        self.resync(path);
        let node = self.node(path);
        match self.node_type(path) {
            Some(NodeType::VariableDeclarator) => {
                if !self.arena.is(self.arena.child(node, "id")?, NodeType::Identifier) {
                    return Ok(None);
                }
                let init = self.get(path, "init")?;
                if self.node(init).is_none() {
                    return Ok(None);
                }
                Ok(Some(self.resolve_or_self(init, dangerous, seen)?))
            }
            Some(NodeType::TypeCastExpression) => {
                let expression = self.get(path, "expression")?;
                Ok(Some(self.resolve_or_self(expression, dangerous, seen)?))
            }
            Some(NodeType::Identifier) if self.is_referenced_identifier(path) => {
                let name = self.arena.name(node).unwrap_or_default().to_string();
                let Some(scope) = self.scope_of(path)? else {
                    return Ok(None);
                };
                let Some(binding) = self.get_binding(scope, &name).and_then(|id| self.binding(id)) else {
                    return Ok(None);
                };
                if !binding.constant || binding.kind == BindingKind::Module || binding.path == path {
                    return Ok(None);
                }
                let declaration = binding.path;
                let resolved = self.resolve_or_self(declaration, dangerous, seen)?;
                let resolved_node = self.node(resolved);
                if self.find(path, |tree, id| tree.node(id) == resolved_node).is_some() {
                    return Ok(None);
                }
                Ok(Some(resolved))
            }
            Some(NodeType::MemberExpression) if dangerous => self.resolve_member(path, seen),
            _ => Ok(None),
        }
    }

    fn resolve_or_self(&mut self, path: PathId, dangerous: bool, seen: &mut Vec<PathId>) -> Result<PathId> {
        Ok(self.resolve_inner(path, dangerous, seen)?.unwrap_or(path))
    }

    fn resolve_member(&mut self, path: PathId, seen: &mut Vec<PathId>) -> Result<Option<PathId>> {
        let key = self.to_computed_key(path)?;
        let Some(target_name) = self.literal_key(key) else {
            return Ok(None);
        };
        let object = self.get(path, "object")?;
        let target = self.resolve_or_self(object, true, seen)?;
        match self.node_type(target) {
            Some(NodeType::ObjectExpression) => {
                for property in self.get_list(target, "properties")? {
                    let property_node = self.node(property);
                    if !self.arena.ty(property_node).is_some_and(|ty| ty.is_alias_of(Alias::Property)) {
                        continue;
                    }
                    let key = self.arena.child(property_node, "key")?;
                    let named = !self.has(property, "computed") && self.arena.name(key) == Some(target_name.as_str());
                    if named || self.literal_key(key).as_deref() == Some(target_name.as_str()) {
                        let value = self.get(property, "value")?;
                        return Ok(Some(self.resolve_or_self(value, true, seen)?));
                    }
                }
                Ok(None)
            }
            Some(NodeType::ArrayExpression) => {
                let Ok(index) = target_name.parse::<usize>() else {
                    return Ok(None);
                };
                let in_bounds = self.arena.list(self.node(target), "elements")?.get(index).is_some_and(|e| e.is_some());
                if !in_bounds {
                    return Ok(None);
                }
                let element = self.get(target, &format!("elements.{index}"))?;
                Ok(Some(self.resolve_or_self(element, true, seen)?))
            }
            _ => Ok(None),
        }
    }

    /// String form of a string or numeric literal key.
    fn literal_key(&self, key: NodeIndex) -> Option<String> {
        let node = self.arena.get(key)?;
        match node.ty {
            NodeType::StringLiteral => node.str_field("value").ok().flatten().map(str::to_string),
            NodeType::NumericLiteral => node.num_field("value").ok().map(crate::evaluation::number_to_string),
            _ => None,
        }
    }
}
