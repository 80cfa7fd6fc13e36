//! Bindings: one declared name and how it is used.

use serde::Serialize;
use weft_ast::NodeIndex;

use crate::evaluation::EvalValue;
use crate::path::PathId;
use crate::scope::ScopeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BindingId(pub u32);

impl BindingId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Var,
    Let,
    Const,
    /// A function declaration.
    Hoisted,
    /// An import specifier.
    Module,
    Param,
    CatchParam,
    /// `var` in a for-loop head.
    LoopVar,
    LoopLet,
    LoopConst,
    /// The self-name of a function or class expression.
    Local,
    Unknown,
}

impl BindingKind {
    pub fn from_declaration_kind(kind: &str) -> BindingKind {
        match kind {
            "var" => BindingKind::Var,
            "let" => BindingKind::Let,
            "const" => BindingKind::Const,
            _ => BindingKind::Unknown,
        }
    }

    pub fn for_loop_head(kind: &str) -> BindingKind {
        match kind {
            "var" => BindingKind::LoopVar,
            "let" => BindingKind::LoopLet,
            "const" => BindingKind::LoopConst,
            _ => BindingKind::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BindingKind::Var => "var",
            BindingKind::Let => "let",
            BindingKind::Const => "const",
            BindingKind::Hoisted => "hoisted",
            BindingKind::Module => "module",
            BindingKind::Param => "param",
            BindingKind::CatchParam => "catch_param",
            BindingKind::LoopVar => "loop_var",
            BindingKind::LoopLet => "loop_let",
            BindingKind::LoopConst => "loop_const",
            BindingKind::Local => "local",
            BindingKind::Unknown => "unknown",
        }
    }

    /// Kinds that may not share a scope with another declaration of the
    /// same name.
    pub(crate) fn is_exclusive(self) -> bool {
        matches!(
            self,
            BindingKind::Let
                | BindingKind::Const
                | BindingKind::LoopLet
                | BindingKind::LoopConst
                | BindingKind::Module
                | BindingKind::CatchParam
        )
    }
}

impl std::fmt::Display for BindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct Binding {
    /// The binding identifier node.
    pub identifier: NodeIndex,
    pub name: String,
    pub scope: ScopeId,
    /// Path of the declaring construct (declarator, function, param, ...).
    pub path: PathId,
    pub kind: BindingKind,
    pub constant_violations: Vec<PathId>,
    /// Later declarations merged into this binding, e.g. a repeated `var`.
    /// One of them takes over when the original declaration is removed.
    pub redeclarations: Vec<(PathId, BindingKind)>,
    pub reference_paths: Vec<PathId>,
    pub constant: bool,
    pub referenced: bool,
    pub references: usize,
    pub value: Option<EvalValue>,
    pub has_value: bool,
    pub has_deopted_value: bool,
}

impl Binding {
    pub fn new(
        identifier: NodeIndex,
        name: impl Into<String>,
        scope: ScopeId,
        path: PathId,
        kind: BindingKind,
    ) -> Binding {
        Binding {
            identifier,
            name: name.into(),
            scope,
            path,
            kind,
            constant_violations: Vec::new(),
            redeclarations: Vec::new(),
            reference_paths: Vec::new(),
            constant: true,
            referenced: false,
            references: 0,
            value: None,
            has_value: false,
            has_deopted_value: false,
        }
    }

    pub fn reference(&mut self, path: PathId) {
        if self.reference_paths.contains(&path) {
            return;
        }
        self.referenced = true;
        self.references += 1;
        self.reference_paths.push(path);
    }

    pub fn dereference(&mut self, path: PathId) {
        if let Some(pos) = self.reference_paths.iter().position(|&p| p == path) {
            self.reference_paths.remove(pos);
            self.references = self.references.saturating_sub(1);
        }
        self.referenced = self.references > 0;
    }

    pub fn reassign(&mut self, path: PathId) {
        self.constant = false;
        if !self.constant_violations.contains(&path) {
            self.constant_violations.push(path);
        }
        self.deopt_value();
    }

    /// Cache an evaluated value. Ignored once the value was deopted.
    pub fn set_value(&mut self, value: EvalValue) {
        if self.has_deopted_value {
            return;
        }
        self.has_value = true;
        self.value = Some(value);
    }

    pub fn clear_value(&mut self) {
        self.has_deopted_value = false;
        self.has_value = false;
        self.value = None;
    }

    pub fn deopt_value(&mut self) {
        self.clear_value();
        self.has_deopted_value = true;
    }
}
