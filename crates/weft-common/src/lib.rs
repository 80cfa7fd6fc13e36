//! Common types shared by the weft crates.
//!
//! This crate provides foundational types used across the workspace:
//! - Byte spans and line/column locations (`Span`, `Position`, `SourceLocation`)
//! - Comment records attached to nodes (`Comment`, `CommentKind`, `NodeComments`)
//! - Traversal and scope limits
//! - Tracing subscriber set-up

// Span - byte offsets plus line/column locations
pub mod position;
pub use position::{Position, SourceLocation, Span};

// Comments carried on nodes
pub mod comments;
pub use comments::{Comment, CommentKind, NodeComments};

// Centralized limits and thresholds
pub mod limits;

// Tracing subscriber configuration
pub mod tracing_config;
pub use tracing_config::init_tracing;

#[cfg(test)]
#[path = "tests/position_tests.rs"]
mod position_tests;
