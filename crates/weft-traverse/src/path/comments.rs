//! Attaching comments to a path's node.

use serde::Serialize;
use weft_common::comments::Comment;

use super::PathId;
use crate::error::Result;
use crate::tree::Tree;

/// Which comment list of a node to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentPosition {
    Leading,
    Trailing,
    Inner,
}

impl Tree {
    /// Append one comment; `line` selects `//` over `/* */`.
    pub fn add_comment(
        &mut self,
        path: PathId,
        position: CommentPosition,
        content: impl Into<String>,
        line: bool,
    ) -> Result<()> {
        let comment = if line {
            Comment::line(content)
        } else {
            Comment::block(content)
        };
        self.add_comments(path, position, vec![comment])
    }

    /// Append `comments` after any the node already has in that list.
    pub fn add_comments(&mut self, path: PathId, position: CommentPosition, comments: Vec<Comment>) -> Result<()> {
        self.assert_live(path)?;
        if comments.is_empty() {
            return Ok(());
        }
        let node = self.node(path);
        let lists = self.arena.node_mut(node)?.comments_mut();
        match position {
            CommentPosition::Leading => lists.leading.extend(comments),
            CommentPosition::Trailing => lists.trailing.extend(comments),
            CommentPosition::Inner => lists.inner.extend(comments),
        }
        Ok(())
    }
}
