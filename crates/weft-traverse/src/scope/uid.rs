//! Hygienic identifier generation.

use tracing::trace;
use weft_ast::identifier::to_identifier;
use weft_ast::{Alias, NodeIndex, NodeType};
use weft_common::limits::MAX_UID_PROBES;

use super::ScopeId;
use crate::error::Result;
use crate::tree::Tree;

/// Longest base name derived from a node.
const MAX_NODE_BASED_NAME: usize = 20;

fn candidate(base: &str, attempt: u32) -> String {
    match attempt {
        0 => base.to_string(),
        1 => format!("_{base}"),
        n => format!("_{base}{n}"),
    }
}

/// Strip leading underscores and trailing digits so `_ref2` and `ref`
/// share a probe sequence.
fn uid_base(name: &str) -> String {
    let identifier = to_identifier(name);
    let trimmed = identifier
        .trim_start_matches('_')
        .trim_end_matches(|c: char| c.is_ascii_digit());
    if trimmed.is_empty() {
        "temp".to_string()
    } else {
        trimmed.to_string()
    }
}

impl Tree {
    /// A name unused by any binding, label, global or earlier uid visible
    /// from `scope`. Candidates are `name`, `_name`, `_name2`, `_name3`, ...
    /// The result is reserved on the program scope, and on the shared
    /// registry when the tree has one.
    pub fn generate_uid(&mut self, scope: ScopeId, name: &str) -> Result<String> {
        let base = uid_base(name);
        let program = self.get_program_parent(scope);
        let mut attempt = self
            .scope_data(program)
            .uid_counters
            .get(&base)
            .copied()
            .unwrap_or(0);

        loop {
            if attempt > MAX_UID_PROBES {
                let path = self.scope_path(scope);
                return Err(self.error_at(path, format!("no free identifier based on `{base}`")));
            }
            let uid = candidate(&base, attempt);
            attempt += 1;
            if self.has_label(scope, &uid)
                || self.has_binding(scope, &uid, false)
                || self.has_global(scope, &uid)
                || self.has_reference(scope, &uid)
            {
                continue;
            }
            if let Some(registry) = &self.options.uid_registry
                && !registry.claim(&uid)
            {
                continue;
            }

            let data = self.scope_data_mut(program);
            data.uid_counters.insert(base, attempt);
            data.references.insert(uid.clone());
            data.uids.insert(uid.clone());
            trace!(uid = %uid, "generated uid");
            return Ok(uid);
        }
    }

    pub fn generate_uid_identifier(&mut self, scope: ScopeId, name: &str) -> Result<NodeIndex> {
        let uid = self.generate_uid(scope, name)?;
        Ok(self.arena.identifier(uid)?)
    }

    /// A uid named after what `node` is or refers to, e.g. `foo$bar` for
    /// `foo.bar`. Falls back to `default_name`, then `ref`.
    pub fn generate_uid_identifier_based_on_node(
        &mut self,
        scope: ScopeId,
        node: NodeIndex,
        default_name: Option<&str>,
    ) -> Result<NodeIndex> {
        let target = match self.arena.ty(node) {
            Some(NodeType::AssignmentExpression) => self.arena.child(node, "left")?,
            Some(NodeType::VariableDeclarator) => self.arena.child(node, "id")?,
            Some(NodeType::ObjectProperty | NodeType::ObjectMethod) => self.arena.child(node, "key")?,
            _ => node,
        };
        let mut parts = Vec::new();
        self.gather_node_parts(target, &mut parts);
        let joined = parts.join("$");
        let joined = joined.strip_prefix('_').unwrap_or(&joined);
        let name = if joined.is_empty() {
            default_name.unwrap_or("ref")
        } else {
            joined
        };
        let name: String = name.chars().take(MAX_NODE_BASED_NAME).collect();
        self.generate_uid_identifier(scope, &name)
    }

    fn gather_node_parts(&self, node: NodeIndex, parts: &mut Vec<String>) {
        let Some(n) = self.arena.get(node) else {
            return;
        };
        let child = |field: &str| n.child(field).unwrap_or(NodeIndex::NONE);
        match n.ty {
            ty if ty.is_alias_of(Alias::ModuleDeclaration) => {
                if child("source").is_some() {
                    self.gather_node_parts(child("source"), parts);
                } else if let Ok(specifiers) = n.list("specifiers")
                    && !specifiers.is_empty()
                {
                    for &specifier in specifiers {
                        self.gather_node_parts(specifier, parts);
                    }
                } else {
                    self.gather_node_parts(child("declaration"), parts);
                }
            }
            ty if ty.is_alias_of(Alias::ModuleSpecifier) => self.gather_node_parts(child("local"), parts),
            NodeType::MemberExpression => {
                self.gather_node_parts(child("object"), parts);
                self.gather_node_parts(child("property"), parts);
            }
            NodeType::Identifier => parts.extend(n.name().map(str::to_string)),
            NodeType::StringLiteral => {
                parts.extend(n.str_field("value").ok().flatten().map(str::to_string));
            }
            NodeType::NumericLiteral => {
                if let Ok(value) = n.num_field("value") {
                    parts.push(crate::evaluation::EvalValue::Number(value).to_js_string());
                }
            }
            NodeType::BooleanLiteral => {
                parts.push(n.bool_field("value").unwrap_or(false).to_string());
            }
            NodeType::NullLiteral => parts.push("null".to_string()),
            NodeType::CallExpression => self.gather_node_parts(child("callee"), parts),
            NodeType::ObjectExpression | NodeType::ObjectPattern => {
                for &property in n.list("properties").unwrap_or_default() {
                    let Some(p) = self.arena.get(property) else {
                        continue;
                    };
                    let key = p
                        .child("key")
                        .or_else(|_| p.child("argument"))
                        .unwrap_or(NodeIndex::NONE);
                    self.gather_node_parts(key, parts);
                }
            }
            _ => {}
        }
    }

    /// Declare a fresh `var` named after `name` in `scope`. Returns a new
    /// identifier referring to it.
    pub fn generate_declared_uid_identifier(&mut self, scope: ScopeId, name: &str) -> Result<NodeIndex> {
        let uid = self.generate_uid(scope, name)?;
        let declared = self.arena.identifier(uid.clone())?;
        self.push(scope, declared, NodeIndex::NONE, "var", false)?;
        Ok(self.arena.identifier(uid)?)
    }

    /// A temporary to hold `node`'s value, or `None` if `node` is static
    /// and can simply be repeated. Unless `dont_push`, the temporary is
    /// declared in `scope`.
    pub fn maybe_generate_memoised(
        &mut self,
        scope: ScopeId,
        node: NodeIndex,
        dont_push: bool,
    ) -> Result<Option<NodeIndex>> {
        if self.is_static_node(scope, node) {
            return Ok(None);
        }
        let id = self.generate_uid_identifier_based_on_node(scope, node, None)?;
        if dont_push {
            return Ok(Some(id));
        }
        let name = self.arena.name(id).unwrap_or("ref").to_string();
        self.push(scope, id, NodeIndex::NONE, "var", false)?;
        Ok(Some(self.arena.identifier(name)?))
    }
}
