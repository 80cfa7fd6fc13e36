//! Comments attached to nodes.
//!
//! Comments are not part of the node schema. A parser attaches them as
//! leading, trailing or inner lists; transforms move them around when
//! replacing nodes.

use serde::{Deserialize, Serialize};

use crate::position::{SourceLocation, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentKind {
    /// `/* ... */`
    Block,
    /// `// ...`
    Line,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub value: String,
    pub span: Span,
    pub loc: Option<SourceLocation>,
}

impl Comment {
    pub fn block(value: impl Into<String>) -> Self {
        Comment {
            kind: CommentKind::Block,
            value: value.into(),
            span: Span::SYNTHETIC,
            loc: None,
        }
    }

    pub fn line(value: impl Into<String>) -> Self {
        Comment {
            kind: CommentKind::Line,
            value: value.into(),
            span: Span::SYNTHETIC,
            loc: None,
        }
    }

    /// Source text of the comment including delimiters.
    pub fn to_source(&self) -> String {
        match self.kind {
            CommentKind::Block => format!("/*{}*/", self.value),
            CommentKind::Line => format!("//{}", self.value),
        }
    }
}

/// Leading, trailing and inner comment lists of one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeComments {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub leading: Vec<Comment>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub trailing: Vec<Comment>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub inner: Vec<Comment>,
}

impl NodeComments {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty() && self.inner.is_empty()
    }

    /// Append `other`'s comments after ours, list by list.
    pub fn absorb(&mut self, other: NodeComments) {
        self.leading.extend(other.leading);
        self.trailing.extend(other.trailing);
        self.inner.extend(other.inner);
    }
}
