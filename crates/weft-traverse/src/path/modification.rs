//! Inserting nodes next to a path or into a list field.

use weft_ast::{Alias, FieldKind, NodeIndex, NodeType, ShapeError};

use super::{PathId, Slot};
use crate::error::Result;
use crate::tree::Tree;

impl Tree {
    /// Insert `nodes` before `path`.
    ///
    /// In a list the nodes are spliced in and later siblings shift. Before
    /// an expression the nodes and the expression become one sequence. A
    /// single-statement body is first turned into a block.
    #[tracing::instrument(level = "debug", skip(self, nodes), fields(path = path.0, count = nodes.len()))]
    pub fn insert_before(&mut self, path: PathId, nodes: &[NodeIndex]) -> Result<Vec<PathId>> {
        self.assert_live(path)?;
        if nodes.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(parent) = self.statement_wrapper(path) {
            return self.insert_before(parent, nodes);
        }
        if self.is_expression_slot(path) {
            let current = self.detach_for_wrap(path)?;
            let mut statements = nodes.to_vec();
            statements.push(current);
            self.replace_expression_with_statements(path, &statements)?;
            return Ok(vec![path]);
        }
        if let Slot::Index { list, index } = self.slot(path) {
            let (parent_path, parent) = (self.parent_path(path), self.parent_node(path));
            let parent_path = parent_path.ok_or_else(|| self.detached(path))?;
            return self.container_insert(parent_path, parent, list, index, nodes);
        }
        if self.is_statement_or_block(path) {
            let current = self.detach_for_wrap(path)?;
            let mut body = nodes.to_vec();
            if !self.arena.is(current, NodeType::EmptyStatement) {
                body.push(current);
            }
            let block = self.arena.block_statement(body)?;
            self.replace_node(path, block)?;
            return Ok(vec![path]);
        }
        Err(self.error_at(path, "cannot insert statements next to this node"))
    }

    /// Insert `nodes` after `path`.
    ///
    /// After an expression, its value is saved in a declared temporary so
    /// the resulting sequence still evaluates to it.
    #[tracing::instrument(level = "debug", skip(self, nodes), fields(path = path.0, count = nodes.len()))]
    pub fn insert_after(&mut self, path: PathId, nodes: &[NodeIndex]) -> Result<Vec<PathId>> {
        self.assert_live(path)?;
        if nodes.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(parent) = self.statement_wrapper(path) {
            return self.insert_after(parent, nodes);
        }
        if self.is_expression_slot(path) {
            let scope = self
                .scope_of(path)?
                .ok_or_else(|| self.error_at(path, "no scope to declare a temporary in"))?;
            let temp = self.generate_declared_uid_identifier(scope, "temp")?;
            let name = self.arena.name(temp).unwrap_or("temp").to_string();
            let current = self.detach_for_wrap(path)?;

            let assign = self.arena.assignment_expression("=", temp, current)?;
            let mut statements = vec![self.arena.expression_statement(assign)?];
            statements.extend_from_slice(nodes);
            let result = self.arena.identifier(name)?;
            statements.push(self.arena.expression_statement(result)?);
            self.replace_expression_with_statements(path, &statements)?;
            return Ok(vec![path]);
        }
        if let Slot::Index { list, index } = self.slot(path) {
            let (parent_path, parent) = (self.parent_path(path), self.parent_node(path));
            let parent_path = parent_path.ok_or_else(|| self.detached(path))?;
            return self.container_insert(parent_path, parent, list, index + 1, nodes);
        }
        if self.is_statement_or_block(path) {
            let current = self.detach_for_wrap(path)?;
            let mut body = Vec::with_capacity(nodes.len() + 1);
            if !self.arena.is(current, NodeType::EmptyStatement) {
                body.push(current);
            }
            body.extend_from_slice(nodes);
            let block = self.arena.block_statement(body)?;
            self.replace_node(path, block)?;
            return Ok(vec![path]);
        }
        Err(self.error_at(path, "cannot insert statements next to this node"))
    }

    /// Insert at the front of list field `key` of the path's node.
    pub fn unshift_container(&mut self, path: PathId, key: &str, nodes: &[NodeIndex]) -> Result<Vec<PathId>> {
        self.assert_live(path)?;
        let list = self.list_field(path, key)?;
        self.container_insert(path, self.node(path), list, 0, nodes)
    }

    /// Append to list field `key` of the path's node.
    pub fn push_container(&mut self, path: PathId, key: &str, nodes: &[NodeIndex]) -> Result<Vec<PathId>> {
        self.assert_live(path)?;
        let list = self.list_field(path, key)?;
        let node = self.node(path);
        let len = self.arena.list(node, list)?.len();
        self.container_insert(path, node, list, len, nodes)
    }

    /// Splice `nodes` into `list` of `parent` at `at`, renumber the paths
    /// after them, register what they declare and queue them on the
    /// active pass.
    pub(crate) fn container_insert(
        &mut self,
        parent_path: PathId,
        parent: NodeIndex,
        list: &'static str,
        at: usize,
        nodes: &[NodeIndex],
    ) -> Result<Vec<PathId>> {
        let at = self.arena.list_insert(parent, list, at, nodes)?;
        self.update_sibling_keys(parent, list, at, nodes.len() as isize, None);

        let mut paths = Vec::with_capacity(nodes.len());
        for i in 0..nodes.len() {
            let path = self.get_or_create_path(
                Some(parent_path),
                parent,
                Slot::Index {
                    list,
                    index: at + i,
                },
            );
            paths.push(path);
        }
        for &path in &paths {
            self.register_subtree(path)?;
            self.queue_new_path(path, true);
        }
        Ok(paths)
    }

    /// Wrap a single-statement body (`if (a) b;`, `() => x`, ...) of
    /// `path`'s node in a block and return the path of the block.
    pub fn ensure_block(&mut self, path: PathId) -> Result<PathId> {
        self.assert_live(path)?;
        let node = self.node(path);
        let body_path = self.get(path, "body")?;
        let body = self.node(body_path);
        if self.arena.is(body, NodeType::BlockStatement) {
            return Ok(body_path);
        }

        let current = self.detach_for_wrap(body_path)?;
        let is_function = self
            .arena
            .ty(node)
            .is_some_and(|ty| ty.is_alias_of(Alias::Function));
        let statements = match self.arena.ty(current) {
            Some(NodeType::EmptyStatement) => Vec::new(),
            Some(ty) if ty.is_alias_of(Alias::Statement) => vec![current],
            _ if is_function => vec![self.arena.return_statement(current)?],
            _ => vec![self.arena.expression_statement(current)?],
        };
        let block = self.arena.block_statement(statements)?;
        if self.arena.is(node, NodeType::ArrowFunctionExpression) {
            self.arena
                .node_mut(node)?
                .set_scalar("expression", weft_ast::Value::Bool(false))?;
        }
        self.replace_node(body_path, block)?;
        Ok(body_path)
    }

    /// The `ExpressionStatement` or label wrapping `path`, which insertions
    /// next to `path` really target.
    fn statement_wrapper(&self, path: PathId) -> Option<PathId> {
        let parent = self.parent_path(path)?;
        matches!(
            self.node_type(parent),
            Some(NodeType::ExpressionStatement | NodeType::LabeledStatement)
        )
        .then_some(parent)
    }

    fn is_expression_slot(&self, path: PathId) -> bool {
        self.node_type(path)
            .is_some_and(|ty| ty.is_alias_of(Alias::Expression))
    }

    fn list_field(&self, path: PathId, key: &str) -> Result<&'static str> {
        let node = self.node(path);
        let ty = self.arena.ty(node).ok_or_else(|| self.detached(path))?;
        let def = ty.field(key).ok_or_else(|| ShapeError::UnknownField {
            ty,
            field: key.to_string(),
        })?;
        if def.kind != FieldKind::List {
            return Err(ShapeError::FieldKind {
                ty,
                field: key.to_string(),
                expected: def.kind,
            }
            .into());
        }
        Ok(def.name)
    }
}
