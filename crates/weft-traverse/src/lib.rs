//! Traversal and scope engine.
//!
//! All mutable state for one tree lives in [`Tree`]: the node arena, the
//! path and scope arenas, the binding registry and the stack of active
//! traversal contexts. Paths, scopes and bindings are plain index handles
//! into it, so handlers receive `&mut Tree` plus a `PathId`.
//!
//! ```ignore
//! let visitor = Visitor::<Counter>::new().enter("Identifier", |tree, path, state| {
//!     state.count += 1;
//!     Ok(())
//! });
//! tree.traverse(&NormalizedVisitor::new(visitor)?, &mut Counter::default())?;
//! ```

pub mod error;
pub use error::{Result, TraverseError};

pub mod tree;
pub use tree::{Tree, TreeOptions, UidRegistry};

pub mod path;
pub use path::{CommentPosition, ExecutionStatus, PathId, Slot};

pub mod visitor;
pub use visitor::{Handler, Phase, TraverseOptions, Visitor};

pub mod normalize;
pub use normalize::{NormalizedVisitor, VirtualType};

mod context;
pub use context::ContextId;

pub mod scope;
pub use scope::{Binding, BindingId, BindingKind, ScopeId, ScopeSnapshot};

pub mod evaluation;
pub use evaluation::{EvalResult, EvalValue};

#[cfg(test)]
#[path = "tests/visitor_tests.rs"]
mod visitor_tests;

#[cfg(test)]
#[path = "tests/path_tests.rs"]
mod path_tests;

#[cfg(test)]
#[path = "tests/binding_tests.rs"]
mod binding_tests;

#[cfg(test)]
#[path = "tests/evaluation_tests.rs"]
mod evaluation_tests;

#[cfg(test)]
#[path = "tests/inference_tests.rs"]
mod inference_tests;
