//! Node storage.
//!
//! A node is a type tag plus a boxed slice of field values laid out in the
//! order of its schema. Children are stored as `NodeIndex` handles into the
//! owning `NodeArena`.

use serde::{Deserialize, Serialize};
use weft_common::{NodeComments, SourceLocation, Span};

use crate::error::ShapeError;
use crate::node_type::{FieldKind, NodeType};

/// Handle to a node stored in a `NodeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Absent child or no parent.
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }
}

/// One field value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Node(NodeIndex),
    List(Vec<NodeIndex>),
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
}

impl Value {
    /// Default for a field that was not supplied, or `None` for required
    /// fields that have no sensible default.
    pub fn default_for(kind: FieldKind) -> Option<Value> {
        match kind {
            FieldKind::Node | FieldKind::Str | FieldKind::Num => None,
            FieldKind::OptNode => Some(Value::Node(NodeIndex::NONE)),
            FieldKind::List => Some(Value::List(Vec::new())),
            FieldKind::OptStr => Some(Value::Null),
            FieldKind::Bool => Some(Value::Bool(false)),
        }
    }

    pub fn fits(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (Value::Node(_), FieldKind::Node | FieldKind::OptNode)
                | (Value::List(_), FieldKind::List)
                | (Value::Str(_), FieldKind::Str | FieldKind::OptStr)
                | (Value::Null, FieldKind::OptStr)
                | (Value::Num(_), FieldKind::Num)
                | (Value::Bool(_), FieldKind::Bool)
        )
    }
}

/// A node. Fields are private so every access goes through the schema.
#[derive(Clone, Debug, Serialize)]
pub struct Node {
    pub ty: NodeType,
    pub span: Span,
    pub loc: Option<SourceLocation>,
    pub comments: Option<Box<NodeComments>>,
    /// Free-form parser metadata (`parenthesized`, `raw`, ...).
    pub extra: Option<Box<serde_json::Map<String, serde_json::Value>>>,
    /// Owning node, or `NONE` for roots and detached nodes.
    pub parent: NodeIndex,
    fields: Box<[Value]>,
}

impl Node {
    pub(crate) fn from_parts(ty: NodeType, fields: Box<[Value]>) -> Node {
        Node {
            ty,
            span: Span::SYNTHETIC,
            loc: None,
            comments: None,
            extra: None,
            parent: NodeIndex::NONE,
            fields,
        }
    }

    fn slot(&self, field: &str) -> Result<usize, ShapeError> {
        self.ty
            .field_position(field)
            .ok_or_else(|| ShapeError::UnknownField {
                ty: self.ty,
                field: field.to_string(),
            })
    }

    fn kind_error(&self, field: &str) -> ShapeError {
        ShapeError::FieldKind {
            ty: self.ty,
            field: field.to_string(),
            expected: self
                .ty
                .field(field)
                .map(|f| f.kind)
                .unwrap_or(FieldKind::Node),
        }
    }

    pub fn field(&self, field: &str) -> Result<&Value, ShapeError> {
        let slot = self.slot(field)?;
        Ok(&self.fields[slot])
    }

    /// All field values in schema order.
    pub fn values(&self) -> &[Value] {
        &self.fields
    }

    pub(crate) fn values_mut(&mut self) -> &mut [Value] {
        &mut self.fields
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.ty.field_position(field).is_some()
    }

    /// Single child slot; `NONE` when an optional child is absent.
    pub fn child(&self, field: &str) -> Result<NodeIndex, ShapeError> {
        match self.field(field)? {
            Value::Node(idx) => Ok(*idx),
            _ => Err(self.kind_error(field)),
        }
    }

    pub fn list(&self, field: &str) -> Result<&[NodeIndex], ShapeError> {
        match self.field(field)? {
            Value::List(items) => Ok(items),
            _ => Err(self.kind_error(field)),
        }
    }

    /// String field; `None` for a null optional string.
    pub fn str_field(&self, field: &str) -> Result<Option<&str>, ShapeError> {
        match self.field(field)? {
            Value::Str(s) => Ok(Some(s)),
            Value::Null => Ok(None),
            _ => Err(self.kind_error(field)),
        }
    }

    pub fn num_field(&self, field: &str) -> Result<f64, ShapeError> {
        match self.field(field)? {
            Value::Num(n) => Ok(*n),
            _ => Err(self.kind_error(field)),
        }
    }

    pub fn bool_field(&self, field: &str) -> Result<bool, ShapeError> {
        match self.field(field)? {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.kind_error(field)),
        }
    }

    /// Overwrite a scalar field. Child fields must go through the arena so
    /// parent links stay consistent.
    pub fn set_scalar(&mut self, field: &str, value: Value) -> Result<(), ShapeError> {
        let slot = self.slot(field)?;
        let kind = self.ty.fields()[slot].kind;
        if kind.is_child() || !value.fits(kind) {
            return Err(self.kind_error(field));
        }
        self.fields[slot] = value;
        Ok(())
    }

    /// Identifier-like name: `Identifier.name` or `JSXIdentifier.name`.
    pub fn name(&self) -> Option<&str> {
        match self.ty {
            NodeType::Identifier | NodeType::JSXIdentifier => {
                self.str_field("name").ok().flatten()
            }
            _ => None,
        }
    }

    /// Child handles in visiting order, skipping holes.
    pub fn children(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.fields
            .iter()
            .flat_map(|value| match value {
                Value::Node(idx) => std::slice::from_ref(idx).iter(),
                Value::List(items) => items.iter(),
                _ => [].iter(),
            })
            .copied()
            .filter(|idx| idx.is_some())
    }

    pub fn extra_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.as_ref().and_then(|extra| extra.get(key))
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.extra
            .get_or_insert_with(Default::default)
            .insert(key.into(), value);
    }

    pub fn comments_mut(&mut self) -> &mut NodeComments {
        self.comments.get_or_insert_with(Default::default)
    }
}
