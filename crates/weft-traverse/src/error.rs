//! Traversal errors.
//!
//! Structural and validation errors abort the traversal that raised them.
//! Query misses (no such binding, no such label) are `Option`s, not errors.

use thiserror::Error;
use weft_ast::ShapeError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraverseError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("path at `{location}` has been removed or no longer matches the tree")]
    DetachedPath { location: String },

    #[error("duplicate declaration \"{name}\" at `{location}`")]
    DuplicateDeclaration { name: String, location: String },

    #[error("unknown visitor key `{key}`")]
    UnknownVisitorKey { key: String },

    #[error("path at `{location}` is not inside a list container")]
    NotAList { location: String },

    #[error("traversals nested deeper than {limit} levels")]
    DepthLimit { limit: usize },

    #[error("{message} (at `{location}`)")]
    Custom { location: String, message: String },
}

pub type Result<T> = std::result::Result<T, TraverseError>;
