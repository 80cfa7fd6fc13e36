//! weft: the path, scope and binding engine of a JavaScript
//! source-to-source transformer.
//!
//! - `ast`: node schema, arena, builders and structural predicates
//! - `traverse`: paths, scopes, bindings, visitors and evaluation
//! - `common`: spans, comments, limits and tracing set-up
//!
//! Plugins are plain [`Visitor`]s. [`run_plugins`] merges them into a single
//! pass the way a transformer runs the plugins of one preset.

pub use weft_ast as ast;
pub use weft_common as common;
pub use weft_traverse as traverse;

pub use weft_ast::{NodeArena, NodeIndex, NodeType};
pub use weft_common::init_tracing;
pub use weft_traverse::{
    Binding, BindingKind, EvalResult, EvalValue, NormalizedVisitor, PathId, Result, ScopeId,
    ScopeSnapshot, TraverseError, TraverseOptions, Tree, TreeOptions, UidRegistry, Visitor,
};

pub mod pipeline;
pub use pipeline::{Plugin, run_plugins, transform};
