//! Node model for the weft transformer core.
//!
//! - `NodeType` / `Alias`: the static per-type schema table and alias groups
//! - `Node` / `Value` / `NodeIndex`: schema-validated node storage
//! - `NodeArena`: owning storage with parent links and checked child writes
//! - builders, structural predicates, and path-free tree utilities

pub mod node_type;
pub use node_type::{FieldDef, FieldKind, NodeType};

pub mod alias;
pub use alias::{Alias, TypeKey, is_node_type};

pub mod error;
pub use error::ShapeError;

pub mod node;
pub use node::{Node, NodeIndex, Value};

pub mod arena;
pub use arena::NodeArena;

pub mod builder;
pub use builder::NodeBuilder;

mod builders;

pub mod predicates;
pub use predicates::{
    binding_keys, get_binding_identifiers, is_binding, is_block_scoped, is_immutable, is_let,
    is_referenced, is_scope, is_var, matches_pattern,
};

pub mod identifier;

mod walk;

#[cfg(test)]
#[path = "tests/schema_tests.rs"]
mod schema_tests;

#[cfg(test)]
#[path = "tests/arena_tests.rs"]
mod arena_tests;

#[cfg(test)]
#[path = "tests/predicates_tests.rs"]
mod predicates_tests;
