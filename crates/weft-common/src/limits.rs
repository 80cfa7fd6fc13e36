//! Centralized limits for traversal and scope bookkeeping.

/// Maximum number of parent links followed when walking scope chains.
///
/// Scope trees mirror lexical nesting, so a longer walk means the parent
/// links form a cycle.
pub const MAX_SCOPE_WALK_ITERATIONS: usize = 10_000;

/// Maximum node nesting walked by traversals, nested passes included.
pub const MAX_TRAVERSAL_DEPTH: usize = 512;

/// Upper bound on `_name2`, `_name3`, ... probes in uid generation.
pub const MAX_UID_PROBES: u32 = 1_000_000;

/// Maximum recursion depth of constant evaluation.
pub const MAX_EVALUATION_DEPTH: u32 = 256;

/// Maximum recursion depth of type inference, `resolve` and execution
/// order guesses that follow bindings across functions.
pub const MAX_INFERENCE_DEPTH: u32 = 64;
