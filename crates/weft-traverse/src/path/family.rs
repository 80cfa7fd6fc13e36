//! Reaching related paths: children, siblings, completion records.

use indexmap::IndexMap;
use weft_ast::{Alias, FieldKind, NodeType, ShapeError, get_binding_identifiers};

use super::{PathId, Slot};
use crate::error::{Result, TraverseError};
use crate::tree::Tree;

impl Tree {
    /// Path of a child slot. Dotted keys walk several levels and numeric
    /// segments index into the list named before them, as in
    /// `"body.0.expression"`.
    pub fn get(&mut self, path: PathId, key: &str) -> Result<PathId> {
        self.resync(path);
        let mut current = path;
        let mut parts = key.split('.');
        while let Some(part) = parts.next() {
            let node = self.node(current);
            let ty = self.arena.ty(node).ok_or_else(|| self.detached(current))?;
            let def = ty.field(part).ok_or_else(|| ShapeError::UnknownField {
                ty,
                field: part.to_string(),
            })?;
            let slot = match def.kind {
                FieldKind::List => {
                    let index = parts
                        .next()
                        .and_then(|segment| segment.parse::<usize>().ok())
                        .ok_or_else(|| ShapeError::FieldKind {
                            ty,
                            field: def.name.to_string(),
                            expected: FieldKind::List,
                        })?;
                    Slot::Index {
                        list: def.name,
                        index,
                    }
                }
                FieldKind::Node | FieldKind::OptNode => Slot::Field(def.name),
                kind => {
                    return Err(ShapeError::FieldKind {
                        ty,
                        field: def.name.to_string(),
                        expected: kind,
                    }
                    .into());
                }
            };
            current = self.get_or_create_path(Some(current), node, slot);
        }
        Ok(current)
    }

    /// Paths of every entry of a list field. The key may be dotted; its
    /// last segment names the list.
    pub fn get_list(&mut self, path: PathId, key: &str) -> Result<Vec<PathId>> {
        self.resync(path);
        let (owner, field) = match key.rsplit_once('.') {
            Some((head, field)) => (self.get(path, head)?, field),
            None => (path, key),
        };
        let node = self.node(owner);
        let ty = self.arena.ty(node).ok_or_else(|| self.detached(owner))?;
        let def = ty.field(field).ok_or_else(|| ShapeError::UnknownField {
            ty,
            field: field.to_string(),
        })?;
        if def.kind != FieldKind::List {
            return Err(ShapeError::FieldKind {
                ty,
                field: def.name.to_string(),
                expected: def.kind,
            }
            .into());
        }
        let len = self.arena.list(node, def.name)?.len();
        Ok((0..len)
            .map(|index| {
                self.get_or_create_path(
                    Some(owner),
                    node,
                    Slot::Index {
                        list: def.name,
                        index,
                    },
                )
            })
            .collect())
    }

    /// Sibling at `index` of the list holding `path`. Past the end the
    /// returned path is empty.
    pub fn get_sibling(&mut self, path: PathId, index: usize) -> Result<PathId> {
        self.resync(path);
        let data = &self.paths[path.index()];
        let (parent_path, parent, slot) = (data.parent_path, data.parent, data.slot);
        let Slot::Index { list, .. } = slot else {
            return Err(TraverseError::NotAList {
                location: self.location(path),
            });
        };
        Ok(self.get_or_create_path(parent_path, parent, Slot::Index { list, index }))
    }

    pub fn get_prev_sibling(&mut self, path: PathId) -> Result<Option<PathId>> {
        self.resync(path);
        match self.slot(path).index() {
            Some(0) => Ok(None),
            Some(index) => self.get_sibling(path, index - 1).map(Some),
            None => Err(TraverseError::NotAList {
                location: self.location(path),
            }),
        }
    }

    pub fn get_next_sibling(&mut self, path: PathId) -> Result<PathId> {
        self.resync(path);
        let index = self.slot(path).index().ok_or_else(|| TraverseError::NotAList {
            location: self.location(path),
        })?;
        self.get_sibling(path, index + 1)
    }

    /// Earlier siblings, nearest first.
    pub fn get_all_prev_siblings(&mut self, path: PathId) -> Result<Vec<PathId>> {
        self.resync(path);
        let Some(index) = self.slot(path).index() else {
            return Ok(Vec::new());
        };
        (0..index)
            .rev()
            .map(|i| self.get_sibling(path, i))
            .collect()
    }

    /// Later siblings, nearest first.
    pub fn get_all_next_siblings(&mut self, path: PathId) -> Result<Vec<PathId>> {
        self.resync(path);
        let (Some(index), Some(list)) = (self.slot(path).index(), self.slot(path).list_key()) else {
            return Ok(Vec::new());
        };
        let len = self.arena.list(self.parent_node(path), list)?.len();
        (index + 1..len).map(|i| self.get_sibling(path, i)).collect()
    }

    /// Paths whose value can become the completion value of `path`.
    pub fn get_completion_records(&mut self, path: PathId) -> Result<Vec<PathId>> {
        let mut records = Vec::new();
        self.collect_completion_records(path, &mut records)?;
        Ok(records)
    }

    fn collect_completion_records(&mut self, path: PathId, records: &mut Vec<PathId>) -> Result<()> {
        let node = self.node(path);
        let Some(ty) = self.arena.ty(node) else {
            return Ok(());
        };
        let optional = |tree: &mut Tree, key: &str, records: &mut Vec<PathId>| -> Result<()> {
            if tree.arena.child(node, key)?.is_some() {
                let child = tree.get(path, key)?;
                tree.collect_completion_records(child, records)?;
            }
            Ok(())
        };
        match ty {
            NodeType::IfStatement => {
                optional(self, "consequent", records)?;
                optional(self, "alternate", records)?;
            }
            NodeType::DoExpression => optional(self, "body", records)?,
            ty if ty.is_alias_of(Alias::For) || ty.is_alias_of(Alias::While) => {
                optional(self, "body", records)?;
            }
            NodeType::Program | NodeType::BlockStatement => {
                if let Some(&last) = self.get_list(path, "body")?.last() {
                    self.collect_completion_records(last, records)?;
                }
            }
            ty if ty.is_alias_of(Alias::Function) => optional(self, "body", records)?,
            NodeType::TryStatement => {
                optional(self, "block", records)?;
                optional(self, "handler", records)?;
                optional(self, "finalizer", records)?;
            }
            NodeType::CatchClause => optional(self, "body", records)?,
            _ => records.push(path),
        }
        Ok(())
    }

    /// Paths of the identifiers `path` binds, by name. Later duplicates of
    /// a name replace earlier ones.
    pub fn get_binding_identifier_paths(
        &mut self,
        path: PathId,
        outer_only: bool,
    ) -> Result<IndexMap<String, PathId>> {
        self.resync(path);
        let ids = get_binding_identifiers(&self.arena, self.node(path), outer_only);
        let mut out = IndexMap::new();
        for (name, nodes) in ids {
            for node in nodes {
                if let Some(id) = self.path_for(node) {
                    out.insert(name.clone(), id);
                }
            }
        }
        Ok(out)
    }

    /// `get_binding_identifier_paths` limited to the names `path` itself
    /// declares, e.g. a function's id but not its params.
    pub fn get_outer_binding_identifier_paths(&mut self, path: PathId) -> Result<IndexMap<String, PathId>> {
        self.get_binding_identifier_paths(path, true)
    }

    /// The other operand of a `left`/`right` pair.
    pub fn get_opposite(&mut self, path: PathId) -> Result<Option<PathId>> {
        self.resync(path);
        let opposite = match self.slot(path) {
            Slot::Field("left") => "right",
            Slot::Field("right") => "left",
            _ => return Ok(None),
        };
        let Some(parent) = self.parent_path(path) else {
            return Ok(None);
        };
        self.get(parent, opposite).map(Some)
    }
}

