//! Shape errors raised by schema-validated node access.

use thiserror::Error;

use crate::node::NodeIndex;
use crate::node_type::{FieldKind, NodeType};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("`{ty}` has no field `{field}`")]
    UnknownField { ty: NodeType, field: String },

    #[error("field `{ty}.{field}` is {expected:?}, not the requested kind")]
    FieldKind {
        ty: NodeType,
        field: String,
        expected: FieldKind,
    },

    #[error("required field `{ty}.{field}` was not provided")]
    MissingField { ty: NodeType, field: &'static str },

    #[error("node {index:?} already belongs to another parent slot")]
    AlreadyAttached { index: NodeIndex },

    #[error("node index {index:?} does not refer to a node")]
    InvalidNode { index: NodeIndex },
}
