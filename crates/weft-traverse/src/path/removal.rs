//! Removing a path's node.

use tracing::debug;
use weft_ast::{Alias, FieldKind, NodeIndex, NodeType};

use super::{PathId, Slot};
use crate::error::Result;
use crate::tree::Tree;

impl Tree {
    /// Remove the node at `path`.
    ///
    /// A list entry is spliced out and later siblings shift down. A single
    /// slot is cleared, or filled with a `Noop` when the field is required.
    /// Some parents can't survive losing the node and are removed or
    /// simplified instead. The path is marked removed either way.
    #[tracing::instrument(level = "debug", skip(self), fields(path = path.0))]
    pub fn remove(&mut self, path: PathId) -> Result<()> {
        self.assert_live(path)?;
        let old = self.node(path);
        if self.run_removal_hooks(path)? {
            // A hook that put an empty block here leaves the path alive.
            if self.node(path) == old {
                self.mark_removed(path);
            }
            return Ok(());
        }
        self.share_comments_with_siblings(path)?;
        let enclosing = self.parent_path(path).and_then(|parent| self.existing_scope(parent));
        self.remove_from_parent(path)?;
        self.invalidate_subtree(old, NodeIndex::NONE, None, enclosing);
        self.mark_removed(path);
        Ok(())
    }

    fn remove_from_parent(&mut self, path: PathId) -> Result<()> {
        let data = &self.paths[path.index()];
        let (parent, slot) = (data.parent, data.slot);
        match slot {
            Slot::Index { list, index } => {
                self.arena.list_remove(parent, list, index)?;
                self.update_sibling_keys(parent, list, index + 1, -1, Some(path));
            }
            Slot::Field(field) => {
                let required = self
                    .arena
                    .ty(parent)
                    .and_then(|ty| ty.field(field))
                    .is_some_and(|def| def.kind == FieldKind::Node);
                let filler = if required { self.arena.noop()? } else { NodeIndex::NONE };
                self.arena.set_child(parent, field, filler)?;
            }
            Slot::Root => return Err(self.error_at(path, "cannot remove the root node")),
        }
        Ok(())
    }

    fn mark_removed(&mut self, path: PathId) {
        let data = &mut self.paths[path.index()];
        data.removed = true;
        data.should_skip = true;
        debug!(path = path.0, "removed");
    }

    /// Parent-specific fixups. Returns true when a hook took care of the
    /// removal.
    fn run_removal_hooks(&mut self, path: PathId) -> Result<bool> {
        let Some(parent) = self.parent_path(path) else {
            return Ok(false);
        };
        let parent_node = self.node(parent);
        let Some(parent_ty) = self.arena.ty(parent_node) else {
            return Ok(false);
        };
        let slot = self.slot(path);
        let key = slot.key().unwrap_or_default();

        let remove_parent = (key == "test"
            && (parent_ty.is_alias_of(Alias::While) || parent_ty == NodeType::SwitchCase))
            || (key == "declaration" && parent_ty.is_alias_of(Alias::ExportDeclaration))
            || (key == "body" && parent_ty == NodeType::LabeledStatement)
            || (key == "expression" && parent_ty == NodeType::ExpressionStatement)
            || (key == "declarations"
                && parent_ty == NodeType::VariableDeclaration
                && self.arena.list(parent_node, "declarations")?.len() == 1);
        if remove_parent {
            self.remove(parent)?;
            return Ok(true);
        }

        if parent_ty == NodeType::SequenceExpression {
            let expressions = self.arena.list(parent_node, "expressions")?;
            if expressions.len() == 2 {
                let Some(other) = expressions.iter().copied().find(|&e| e != self.node(path)) else {
                    return Ok(false);
                };
                self.replace_with(parent, other)?;
                return Ok(true);
            }
        }

        if parent_ty.is_alias_of(Alias::Binary) && matches!(key, "left" | "right") {
            let other = self
                .arena
                .child(parent_node, if key == "left" { "right" } else { "left" })?;
            self.replace_with(parent, other)?;
            return Ok(true);
        }

        let empty_block = (parent_ty == NodeType::IfStatement && key == "consequent")
            || (key == "body"
                && (parent_ty.is_alias_of(Alias::Loop)
                    || parent_ty == NodeType::ArrowFunctionExpression));
        if empty_block {
            let block = self.arena.block_statement(Vec::new())?;
            self.replace_with(path, block)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Hand a removed list entry's comments to its neighbours: leading
    /// comments trail the previous sibling, trailing comments lead the next.
    fn share_comments_with_siblings(&mut self, path: PathId) -> Result<()> {
        let Slot::Index { list, index } = self.slot(path) else {
            return Ok(());
        };
        let node = self.node(path);
        let Some(comments) = self.arena.get_mut(node).and_then(|n| n.comments.take()) else {
            return Ok(());
        };
        let siblings = self.arena.list(self.parent_node(path), list)?;
        let prev = index.checked_sub(1).and_then(|i| siblings.get(i).copied());
        let next = siblings.get(index + 1).copied();
        let (Some(prev), Some(next)) = (prev.or(next), next.or(prev)) else {
            return Ok(());
        };
        if let Some(target) = self.arena.get_mut(prev) {
            target.comments_mut().trailing.extend(comments.leading);
        }
        if let Some(target) = self.arena.get_mut(next) {
            target.comments_mut().leading.extend(comments.trailing);
        }
        Ok(())
    }
}
