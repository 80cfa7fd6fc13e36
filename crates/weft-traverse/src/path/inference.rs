//! Flow type inference for expressions.
//!
//! `get_type_annotation` builds a detached Flow annotation for what the
//! path's node evaluates to and falls back to `any`. The result is cached
//! on the path until a different node sits there.

use weft_ast::{Alias, NodeIndex, NodeType};
use weft_common::limits::MAX_INFERENCE_DEPTH;

use super::{ExecutionStatus, PathId, Slot};
use crate::error::Result;
use crate::tree::Tree;

const NUMBER_BINARY_OPERATORS: &[&str] = &["-", "/", "%", "*", "**", "&", "|", ">>", ">>>", "<<", "^"];
const BOOLEAN_BINARY_OPERATORS: &[&str] = &[
    "==", "!=", "===", "!==", "in", "instanceof", ">", "<", ">=", "<=",
];

impl Tree {
    /// Inferred type of the node at `path` as a Flow annotation node. A
    /// `TypeAnnotation` wrapper is unwrapped.
    pub fn get_type_annotation(&mut self, path: PathId) -> Result<NodeIndex> {
        self.type_annotation_at(path, 0)
    }

    fn type_annotation_at(&mut self, path: PathId, depth: u32) -> Result<NodeIndex> {
        self.resync(path);
        let node = self.node(path);
        if let Some((seen, annotation)) = self.paths[path.index()].type_annotation
            && seen == node
        {
            return Ok(annotation);
        }
        let inferred = if depth < MAX_INFERENCE_DEPTH {
            self.infer(path, depth + 1)?
        } else {
            None
        };
        let mut annotation = match inferred {
            Some(annotation) => annotation,
            None => self.base_annotation(NodeType::AnyTypeAnnotation)?,
        };
        if self.arena.is(annotation, NodeType::TypeAnnotation) {
            annotation = self.arena.child(annotation, "type_annotation")?;
        }
        self.paths[path.index()].type_annotation = Some((node, annotation));
        Ok(annotation)
    }

    fn infer(&mut self, path: PathId, depth: u32) -> Result<Option<NodeIndex>> {
        let node = self.node(path);
        let Some(ty) = self.arena.ty(node) else {
            return self.infer_missing_init(path).map(Some);
        };
        if !ty.is_alias_of(Alias::FlowTypeAnnotation)
            && let Ok(annotation) = self.arena.child(node, "type_annotation")
            && annotation.is_some()
        {
            return Ok(Some(annotation));
        }

        let annotation = match ty {
            NodeType::VariableDeclarator => {
                if !self.arena.is(self.arena.child(node, "id")?, NodeType::Identifier) {
                    return Ok(None);
                }
                let init = self.get(path, "init")?;
                self.type_annotation_at(init, depth)?
            }
            NodeType::Identifier => return self.infer_reference(path, depth),
            NodeType::NewExpression => {
                let callee = self.arena.child(node, "callee")?;
                let Some(name) = self.arena.name(callee).map(str::to_string) else {
                    return Ok(None);
                };
                if !self.arena.is(callee, NodeType::Identifier) {
                    return Ok(None);
                }
                self.generic_annotation(&name)?
            }
            NodeType::StringLiteral | NodeType::TemplateLiteral => {
                self.base_annotation(NodeType::StringTypeAnnotation)?
            }
            NodeType::NumericLiteral => self.base_annotation(NodeType::NumberTypeAnnotation)?,
            NodeType::BooleanLiteral => self.base_annotation(NodeType::BooleanTypeAnnotation)?,
            NodeType::NullLiteral => self.base_annotation(NodeType::NullLiteralTypeAnnotation)?,
            NodeType::RegExpLiteral => self.generic_annotation("RegExp")?,
            NodeType::ObjectExpression => self.generic_annotation("Object")?,
            NodeType::ArrayExpression | NodeType::RestElement => self.generic_annotation("Array")?,
            NodeType::UnaryExpression => {
                let operator = self.operator(node);
                let annotation = match operator.as_str() {
                    "void" => NodeType::VoidTypeAnnotation,
                    "+" | "-" | "~" => NodeType::NumberTypeAnnotation,
                    "typeof" => NodeType::StringTypeAnnotation,
                    "delete" | "!" => NodeType::BooleanTypeAnnotation,
                    _ => return Ok(None),
                };
                self.base_annotation(annotation)?
            }
            NodeType::UpdateExpression => match self.operator(node).as_str() {
                "++" | "--" => self.base_annotation(NodeType::NumberTypeAnnotation)?,
                _ => return Ok(None),
            },
            NodeType::BinaryExpression => return self.infer_binary(path, depth),
            NodeType::LogicalExpression => {
                let members = self.child_annotations(path, &["left", "right"], depth)?;
                self.union_annotation(members)?
            }
            NodeType::ConditionalExpression => {
                let members = self.child_annotations(path, &["consequent", "alternate"], depth)?;
                self.union_annotation(members)?
            }
            NodeType::SequenceExpression => {
                let count = self.arena.list(node, "expressions")?.len();
                let Some(last) = count.checked_sub(1) else {
                    return Ok(None);
                };
                let last = self.get(path, &format!("expressions.{last}"))?;
                self.type_annotation_at(last, depth)?
            }
            NodeType::AssignmentExpression => {
                let right = self.get(path, "right")?;
                self.type_annotation_at(right, depth)?
            }
            NodeType::CallExpression => return self.infer_call(path, "callee"),
            NodeType::TaggedTemplateExpression => return self.infer_call(path, "tag"),
            ty if ty.is_alias_of(Alias::Function) || ty.is_alias_of(Alias::Class) => {
                self.generic_annotation("Function")?
            }
            _ => return Ok(None),
        };
        Ok(Some(annotation))
    }

    /// An empty `init` slot: `void`, or the loop variable type of a
    /// `for (var x in/of ...)` head.
    fn infer_missing_init(&mut self, path: PathId) -> Result<NodeIndex> {
        let declaration = self
            .parent_path(path)
            .filter(|_| self.slot(path) == Slot::Field("init"))
            .filter(|&declarator| self.node_type(declarator) == Some(NodeType::VariableDeclarator))
            .and_then(|declarator| self.parent_path(declarator));
        let loop_ty = declaration
            .filter(|&declaration| self.slot(declaration) == Slot::Field("left"))
            .and_then(|declaration| self.arena.ty(self.parent_node(declaration)));
        let annotation = match loop_ty {
            Some(NodeType::ForInStatement) => NodeType::StringTypeAnnotation,
            Some(NodeType::ForOfStatement) => NodeType::AnyTypeAnnotation,
            _ if declaration.is_some() => NodeType::VoidTypeAnnotation,
            _ => NodeType::AnyTypeAnnotation,
        };
        self.base_annotation(annotation)
    }

    /// A referenced identifier: its binding's declared annotation, else the
    /// union of every assignment that may run before this read.
    fn infer_reference(&mut self, path: PathId, depth: u32) -> Result<Option<NodeIndex>> {
        if !self.is_referenced(path) {
            return Ok(None);
        }
        let name = self.arena.name(self.node(path)).unwrap_or_default().to_string();
        let binding = match self.scope_of(path)? {
            Some(scope) => self.get_binding(scope, &name).and_then(|id| self.binding(id)),
            None => None,
        };
        let Some(binding) = binding else {
            let annotation = match name.as_str() {
                "undefined" => NodeType::VoidTypeAnnotation,
                "NaN" | "Infinity" => NodeType::NumberTypeAnnotation,
                _ => return Ok(None),
            };
            return self.base_annotation(annotation).map(Some);
        };

        let declared = self.arena.child(binding.identifier, "type_annotation").unwrap_or(NodeIndex::NONE);
        if declared.is_some() {
            return Ok(Some(declared));
        }
        let mut writes = vec![binding.path];
        writes.extend(binding.constant_violations.iter().copied());

        let mut members = Vec::new();
        for write in writes {
            let resolved = self.resolve(write, false)?;
            if self.guess_execution_status_relative_to(resolved, path)? != ExecutionStatus::Before {
                continue;
            }
            members.push(self.type_annotation_at(write, depth)?);
        }
        if members.is_empty() {
            return Ok(None);
        }
        self.union_annotation(members).map(Some)
    }

    fn infer_binary(&mut self, path: PathId, depth: u32) -> Result<Option<NodeIndex>> {
        let operator = self.operator(self.node(path));
        if NUMBER_BINARY_OPERATORS.contains(&operator.as_str()) {
            return self.base_annotation(NodeType::NumberTypeAnnotation).map(Some);
        }
        if BOOLEAN_BINARY_OPERATORS.contains(&operator.as_str()) {
            return self.base_annotation(NodeType::BooleanTypeAnnotation).map(Some);
        }
        if operator != "+" {
            return Ok(None);
        }
        let operands = self.child_annotations(path, &["left", "right"], depth)?;
        let [left, right] = operands[..] else {
            return Ok(None);
        };
        let is = |ty: NodeType| (self.arena.is(left, ty), self.arena.is(right, ty));
        let (numbers, strings) = (is(NodeType::NumberTypeAnnotation), is(NodeType::StringTypeAnnotation));
        let annotation = if numbers.0 && numbers.1 {
            self.base_annotation(NodeType::NumberTypeAnnotation)?
        } else if strings.0 || strings.1 {
            self.base_annotation(NodeType::StringTypeAnnotation)?
        } else {
            let string = self.base_annotation(NodeType::StringTypeAnnotation)?;
            let number = self.base_annotation(NodeType::NumberTypeAnnotation)?;
            self.union_annotation(vec![string, number])?
        };
        Ok(Some(annotation))
    }

    /// Calls of a function we can see: its declared return type, or
    /// `Promise` / `AsyncIterator` for async functions.
    fn infer_call(&mut self, path: PathId, callee_key: &str) -> Result<Option<NodeIndex>> {
        let callee = self.get(path, callee_key)?;
        let callee = self.resolve(callee, false)?;
        let function = self.node(callee);
        if !self.arena.ty(function).is_some_and(|ty| ty.is_alias_of(Alias::Function)) {
            return Ok(None);
        }
        if self.has(callee, "async") {
            let name = if self.has(callee, "generator") {
                "AsyncIterator"
            } else {
                "Promise"
            };
            return self.generic_annotation(name).map(Some);
        }
        let returns = self.arena.child(function, "return_type").unwrap_or(NodeIndex::NONE);
        Ok(returns.is_some().then_some(returns))
    }

    fn child_annotations(&mut self, path: PathId, keys: &[&str], depth: u32) -> Result<Vec<NodeIndex>> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let child = self.get(path, key)?;
            out.push(self.type_annotation_at(child, depth)?);
        }
        Ok(out)
    }

    fn operator(&self, node: NodeIndex) -> String {
        self.arena
            .get(node)
            .and_then(|n| n.str_field("operator").ok().flatten())
            .unwrap_or_default()
            .to_string()
    }

    fn base_annotation(&mut self, ty: NodeType) -> Result<NodeIndex> {
        Ok(self.arena.build(ty).finish()?)
    }

    fn generic_annotation(&mut self, name: &str) -> Result<NodeIndex> {
        let id = self.arena.identifier(name)?;
        Ok(self.arena.build(NodeType::GenericTypeAnnotation).node("id", id).finish()?)
    }

    /// Union of `members` with nested unions flattened and duplicates of a
    /// base type or generic name dropped. `any` absorbs everything and a
    /// single survivor is returned as is.
    fn union_annotation(&mut self, members: Vec<NodeIndex>) -> Result<NodeIndex> {
        let mut queue = members;
        let mut others: Vec<NodeIndex> = Vec::new();
        let mut bases: Vec<(NodeType, NodeIndex)> = Vec::new();
        let mut generics: Vec<(String, NodeIndex)> = Vec::new();
        let mut next = 0;
        while let Some(&member) = queue.get(next) {
            next += 1;
            let Some(ty) = self.arena.ty(member) else {
                continue;
            };
            match ty {
                NodeType::AnyTypeAnnotation => return Ok(member),
                NodeType::UnionTypeAnnotation => queue.extend_from_slice(self.arena.list(member, "types")?),
                NodeType::GenericTypeAnnotation => {
                    let name = self.field_name(member, "id").unwrap_or_default();
                    if !generics.iter().any(|(seen, _)| *seen == name) {
                        generics.push((name, member));
                    }
                }
                ty if ty.is_alias_of(Alias::FlowBaseAnnotation) => match bases.iter_mut().find(|(seen, _)| *seen == ty) {
                    Some(entry) => entry.1 = member,
                    None => bases.push((ty, member)),
                },
                _ if others.contains(&member) => {}
                _ => others.push(member),
            }
        }

        let mut types = others;
        types.extend(bases.into_iter().map(|(_, member)| member));
        types.extend(generics.into_iter().map(|(_, member)| member));
        match types.as_slice() {
            [] => return self.base_annotation(NodeType::AnyTypeAnnotation),
            [single] => return Ok(*single),
            _ => {}
        }
        let mut owned = Vec::with_capacity(types.len());
        for member in types {
            owned.push(if self.arena.parent_of(member).is_some() {
                self.arena.clone_deep(member, false)?
            } else {
                member
            });
        }
        Ok(self
            .arena
            .build(NodeType::UnionTypeAnnotation)
            .list("types", owned)
            .finish()?)
    }

    /// Whether the inferred type is the named base type (`string`,
    /// `number`, `boolean`, `any`, `mixed` or `void`). An unknown name is
    /// an error unless `soft`.
    pub fn is_base_type(&mut self, path: PathId, base_name: &str, soft: bool) -> Result<bool> {
        let annotation = self.get_type_annotation(path)?;
        self.annotation_is_base(path, annotation, base_name, soft)
    }

    fn annotation_is_base(&self, path: PathId, annotation: NodeIndex, base_name: &str, soft: bool) -> Result<bool> {
        let expected = match base_name {
            "string" => NodeType::StringTypeAnnotation,
            "number" => NodeType::NumberTypeAnnotation,
            "boolean" => NodeType::BooleanTypeAnnotation,
            "any" => NodeType::AnyTypeAnnotation,
            "mixed" => NodeType::MixedTypeAnnotation,
            "void" => NodeType::VoidTypeAnnotation,
            _ if soft => return Ok(false),
            _ => return Err(self.error_at(path, format!("unknown base type `{base_name}`"))),
        };
        Ok(self.arena.is(annotation, expected))
    }

    /// Like `is_base_type`, but `any` and unions containing the base type
    /// also count.
    pub fn could_be_base_type(&mut self, path: PathId, base_name: &str) -> Result<bool> {
        let annotation = self.get_type_annotation(path)?;
        match self.arena.ty(annotation) {
            Some(NodeType::AnyTypeAnnotation) => Ok(true),
            Some(NodeType::UnionTypeAnnotation) => {
                for &member in self.arena.list(annotation, "types")? {
                    if self.annotation_is_base(path, member, base_name, true)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            _ => self.annotation_is_base(path, annotation, base_name, true),
        }
    }

    /// Both paths infer to the same base type, `any` excluded.
    pub fn base_type_strictly_matches(&mut self, path: PathId, other: PathId) -> Result<bool> {
        let left = self.get_type_annotation(path)?;
        let right = self.get_type_annotation(other)?;
        let Some(left_ty) = self.arena.ty(left) else {
            return Ok(false);
        };
        Ok(left_ty != NodeType::AnyTypeAnnotation
            && left_ty.is_alias_of(Alias::FlowBaseAnnotation)
            && self.arena.ty(right) == Some(left_ty))
    }

    /// Whether the inferred type is the generic `name`, e.g. `Array`.
    pub fn is_generic_type(&mut self, path: PathId, name: &str) -> Result<bool> {
        let annotation = self.get_type_annotation(path)?;
        if !self.arena.is(annotation, NodeType::GenericTypeAnnotation) {
            return Ok(false);
        }
        let id = self.arena.child(annotation, "id")?;
        Ok(self.arena.is(id, NodeType::Identifier) && self.arena.name(id) == Some(name))
    }
}
