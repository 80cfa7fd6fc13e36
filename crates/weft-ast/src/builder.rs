//! Schema-checked node construction.
//!
//! ```ignore
//! let id = arena.build(NodeType::Identifier).str("name", "x").finish()?;
//! ```
//!
//! Omitted optional fields take their defaults: absent child, empty list,
//! `false`, or null string. Omitting a required field is a shape error.

use crate::arena::NodeArena;
use crate::error::ShapeError;
use crate::node::{NodeIndex, Value};
use crate::node_type::NodeType;

pub struct NodeBuilder<'a> {
    arena: &'a mut NodeArena,
    ty: NodeType,
    values: Vec<Option<Value>>,
    error: Option<ShapeError>,
}

impl NodeArena {
    pub fn build(&mut self, ty: NodeType) -> NodeBuilder<'_> {
        NodeBuilder {
            arena: self,
            ty,
            values: vec![None; ty.fields().len()],
            error: None,
        }
    }
}

impl NodeBuilder<'_> {
    /// Set any field; the value kind is checked against the schema.
    pub fn set(mut self, field: &str, value: Value) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.ty.field_position(field) {
            Some(pos) => {
                let kind = self.ty.fields()[pos].kind;
                if value.fits(kind) {
                    self.values[pos] = Some(value);
                } else {
                    self.error = Some(ShapeError::FieldKind {
                        ty: self.ty,
                        field: field.to_string(),
                        expected: kind,
                    });
                }
            }
            None => {
                self.error = Some(ShapeError::UnknownField {
                    ty: self.ty,
                    field: field.to_string(),
                });
            }
        }
        self
    }

    pub fn node(self, field: &str, child: NodeIndex) -> Self {
        self.set(field, Value::Node(child))
    }

    pub fn list(self, field: &str, items: Vec<NodeIndex>) -> Self {
        self.set(field, Value::List(items))
    }

    pub fn str(self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, Value::Str(value.into()))
    }

    pub fn num(self, field: &str, value: f64) -> Self {
        self.set(field, Value::Num(value))
    }

    pub fn bool(self, field: &str, value: bool) -> Self {
        self.set(field, Value::Bool(value))
    }

    pub fn finish(self) -> Result<NodeIndex, ShapeError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let ty = self.ty;
        let mut fields = Vec::with_capacity(self.values.len());
        for (def, value) in ty.fields().iter().zip(self.values) {
            match value.or_else(|| Value::default_for(def.kind)) {
                Some(value) => fields.push(value),
                None => return Err(ShapeError::MissingField { ty, field: def.name }),
            }
        }
        self.arena.alloc(ty, fields)
    }
}
