//! Static evaluation of expressions.
//!
//! `Tree::evaluate` folds an expression to a primitive value when it can
//! prove the result. The outcome is an [`EvalResult`]: when `confident` is
//! false the value is unknown and `deopt` names the path that defeated the
//! evaluation.

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::trace;
use weft_ast::{Alias, NodeIndex, NodeType, Value};
use weft_common::Span;
use weft_common::limits::MAX_EVALUATION_DEPTH;

use crate::error::Result;
use crate::path::PathId;
use crate::scope::BindingKind;
use crate::tree::Tree;

/// A JavaScript primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EvalValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl EvalValue {
    pub fn to_boolean(&self) -> bool {
        match self {
            EvalValue::Undefined | EvalValue::Null => false,
            EvalValue::Bool(b) => *b,
            EvalValue::Number(n) => *n != 0.0 && !n.is_nan(),
            EvalValue::String(s) => !s.is_empty(),
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            EvalValue::Undefined => f64::NAN,
            EvalValue::Null => 0.0,
            EvalValue::Bool(b) => f64::from(u8::from(*b)),
            EvalValue::Number(n) => *n,
            EvalValue::String(s) => string_to_number(s),
        }
    }

    pub fn to_js_string(&self) -> String {
        match self {
            EvalValue::Undefined => "undefined".to_string(),
            EvalValue::Null => "null".to_string(),
            EvalValue::Bool(b) => b.to_string(),
            EvalValue::Number(n) => number_to_string(*n),
            EvalValue::String(s) => s.clone(),
        }
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            EvalValue::Undefined => "undefined",
            EvalValue::Null => "object",
            EvalValue::Bool(_) => "boolean",
            EvalValue::Number(_) => "number",
            EvalValue::String(_) => "string",
        }
    }

    fn is_nullish(&self) -> bool {
        matches!(self, EvalValue::Undefined | EvalValue::Null)
    }

    pub fn strict_equals(&self, other: &EvalValue) -> bool {
        match (self, other) {
            (EvalValue::Number(a), EvalValue::Number(b)) => a == b,
            _ => self == other,
        }
    }

    pub fn loose_equals(&self, other: &EvalValue) -> bool {
        match (self, other) {
            (a, b) if std::mem::discriminant(a) == std::mem::discriminant(b) => a.strict_equals(b),
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (EvalValue::Bool(_), _) => EvalValue::Number(self.to_number()).loose_equals(other),
            (_, EvalValue::Bool(_)) => self.loose_equals(&EvalValue::Number(other.to_number())),
            _ => self.to_number() == other.to_number(),
        }
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust also accepts `inf` and `nan`, JavaScript doesn't.
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return format!("{n}");
    }
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

fn less_than(a: &EvalValue, b: &EvalValue) -> Option<bool> {
    if let (EvalValue::String(a), EvalValue::String(b)) = (a, b) {
        return Some(a.encode_utf16().lt(b.encode_utf16()));
    }
    let (a, b) = (a.to_number(), b.to_number());
    if a.is_nan() || b.is_nan() {
        return None;
    }
    Some(a < b)
}

fn binary(operator: &str, left: &EvalValue, right: &EvalValue) -> Option<EvalValue> {
    use EvalValue::{Bool, Number};
    let num = |f: fn(f64, f64) -> f64| Some(Number(f(left.to_number(), right.to_number())));
    let int = |f: fn(i32, u32) -> i32| {
        Some(Number(f64::from(f(to_int32(left.to_number()), to_uint32(right.to_number())))))
    };
    match operator {
        "+" => match (left, right) {
            (EvalValue::String(_), _) | (_, EvalValue::String(_)) => Some(EvalValue::String(
                left.to_js_string() + &right.to_js_string(),
            )),
            _ => num(|a, b| a + b),
        },
        "-" => num(|a, b| a - b),
        "*" => num(|a, b| a * b),
        "/" => num(|a, b| a / b),
        "%" => num(|a, b| a % b),
        "**" => num(|a, b| {
            if a.abs() == 1.0 && b.is_infinite() {
                f64::NAN
            } else {
                a.powf(b)
            }
        }),
        "<" => Some(Bool(less_than(left, right).unwrap_or(false))),
        ">" => Some(Bool(less_than(right, left).unwrap_or(false))),
        "<=" => Some(Bool(less_than(right, left).is_some_and(|gt| !gt))),
        ">=" => Some(Bool(less_than(left, right).is_some_and(|lt| !lt))),
        "==" => Some(Bool(left.loose_equals(right))),
        "!=" => Some(Bool(!left.loose_equals(right))),
        "===" => Some(Bool(left.strict_equals(right))),
        "!==" => Some(Bool(!left.strict_equals(right))),
        "|" => int(|a, b| a | b as i32),
        "&" => int(|a, b| a & b as i32),
        "^" => int(|a, b| a ^ b as i32),
        "<<" => int(|a, b| a.wrapping_shl(b & 31)),
        ">>" => int(|a, b| a.wrapping_shr(b & 31)),
        ">>>" => Some(Number(f64::from(
            to_uint32(left.to_number()).wrapping_shr(to_uint32(right.to_number()) & 31),
        ))),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalResult {
    pub confident: bool,
    /// `None` unless `confident`.
    pub value: Option<EvalValue>,
    #[serde(skip)]
    pub deopt: Option<PathId>,
}

struct Evaluator<'t> {
    tree: &'t mut Tree,
    confident: bool,
    deopt: Option<PathId>,
    /// `None` while the node is being evaluated, so cycles deopt.
    seen: FxHashMap<NodeIndex, Option<EvalValue>>,
    depth: u32,
}

impl Evaluator<'_> {
    fn deopt(&mut self, path: PathId) -> Option<EvalValue> {
        if self.confident {
            trace!(path = path.0, "evaluation deopted");
            self.deopt = Some(path);
        }
        self.confident = false;
        None
    }

    fn evaluate_cached(&mut self, path: PathId) -> Result<Option<EvalValue>> {
        let node = self.tree.node(path);
        if let Some(entry) = self.seen.get(&node) {
            return Ok(match entry.clone() {
                Some(value) => Some(value),
                None => self.deopt(path),
            });
        }
        if self.depth >= MAX_EVALUATION_DEPTH {
            return Ok(self.deopt(path));
        }
        self.seen.insert(node, None);
        self.depth += 1;
        let value = self.evaluate_path(path);
        self.depth -= 1;
        let value = value?;
        if self.confident
            && let Some(value) = &value
        {
            self.seen.insert(node, Some(value.clone()));
        }
        Ok(value)
    }

    fn evaluate_path(&mut self, path: PathId) -> Result<Option<EvalValue>> {
        if !self.confident {
            return Ok(None);
        }
        let node = self.tree.node(path);
        let Some(ty) = self.tree.arena.ty(node) else {
            return Ok(self.deopt(path));
        };

        match ty {
            NodeType::SequenceExpression => {
                let expressions = self.tree.get_list(path, "expressions")?;
                match expressions.last() {
                    Some(&last) => self.evaluate_cached(last),
                    None => Ok(self.deopt(path)),
                }
            }
            NodeType::StringLiteral => {
                let value = self.tree.arena.node(node)?.str_field("value")?.unwrap_or_default();
                Ok(Some(EvalValue::String(value.to_string())))
            }
            NodeType::NumericLiteral => Ok(Some(EvalValue::Number(
                self.tree.arena.node(node)?.num_field("value")?,
            ))),
            NodeType::BooleanLiteral => Ok(Some(EvalValue::Bool(
                self.tree.arena.node(node)?.bool_field("value")?,
            ))),
            NodeType::NullLiteral => Ok(Some(EvalValue::Null)),
            NodeType::TemplateLiteral => self.evaluate_template(path),
            NodeType::ConditionalExpression => {
                let test = self.tree.get(path, "test")?;
                let Some(test) = self.evaluate_cached(test)? else {
                    return Ok(None);
                };
                let branch = if test.to_boolean() { "consequent" } else { "alternate" };
                let branch = self.tree.get(path, branch)?;
                self.evaluate_cached(branch)
            }
            ty if ty.is_alias_of(Alias::ExpressionWrapper) => {
                let inner = self.tree.get(path, "expression")?;
                self.evaluate_cached(inner)
            }
            NodeType::MemberExpression => self.evaluate_member(path),
            NodeType::Identifier => self.evaluate_identifier(path),
            NodeType::UnaryExpression => self.evaluate_unary(path),
            NodeType::LogicalExpression => self.evaluate_logical(path),
            NodeType::BinaryExpression => {
                let operator = self.operator(path)?;
                let left = self.tree.get(path, "left")?;
                let Some(left) = self.evaluate_cached(left)? else {
                    return Ok(None);
                };
                let right = self.tree.get(path, "right")?;
                let Some(right) = self.evaluate_cached(right)? else {
                    return Ok(None);
                };
                Ok(binary(&operator, &left, &right).or_else(|| self.deopt(path)))
            }
            _ => Ok(self.deopt(path)),
        }
    }

    fn operator(&self, path: PathId) -> Result<String> {
        match self.tree.field(path, "operator")? {
            Value::Str(op) => Ok(op),
            _ => Err(self.tree.error_at(path, "operator is not a string")),
        }
    }

    fn evaluate_template(&mut self, path: PathId) -> Result<Option<EvalValue>> {
        let quasis = self.tree.get_list(path, "quasis")?;
        let expressions = self.tree.get_list(path, "expressions")?;
        let mut out = String::new();
        for (i, &quasi) in quasis.iter().enumerate() {
            let cooked = self.tree.arena.node(self.tree.node(quasi))?.str_field("cooked")?;
            let Some(cooked) = cooked else {
                return Ok(self.deopt(quasi));
            };
            out.push_str(cooked);
            if let Some(&expression) = expressions.get(i) {
                let Some(value) = self.evaluate_cached(expression)? else {
                    return Ok(None);
                };
                out.push_str(&value.to_js_string());
            }
        }
        Ok(Some(EvalValue::String(out)))
    }

    /// `"abc".length` and friends on literal strings.
    fn evaluate_member(&mut self, path: PathId) -> Result<Option<EvalValue>> {
        let object = self.tree.get(path, "object")?;
        let property = self.tree.get(path, "property")?;
        let computed = matches!(self.tree.field(path, "computed")?, Value::Bool(true));
        let is_length = !computed
            && self.tree.node_type(property) == Some(NodeType::Identifier)
            && self.tree.arena.name(self.tree.node(property)) == Some("length");
        if !is_length || self.tree.node_type(object) != Some(NodeType::StringLiteral) {
            return Ok(self.deopt(path));
        }
        let Some(EvalValue::String(s)) = self.evaluate_cached(object)? else {
            return Ok(None);
        };
        Ok(Some(EvalValue::Number(s.encode_utf16().count() as f64)))
    }

    fn evaluate_identifier(&mut self, path: PathId) -> Result<Option<EvalValue>> {
        if !self.tree.is_referenced_identifier(path) {
            return Ok(self.deopt(path));
        }
        let node = self.tree.node(path);
        let name = self.tree.arena.name(node).unwrap_or_default().to_string();
        let binding_id = match self.tree.scope_of(path)? {
            Some(scope) => self.tree.get_binding(scope, &name),
            None => None,
        };
        let Some((declaration, violated, kind, cached)) = binding_id
            .and_then(|id| self.tree.binding(id))
            .map(|b| {
                let cached = b.has_value.then(|| b.value.clone());
                (b.path, !b.constant_violations.is_empty(), b.kind, cached)
            })
        else {
            return Ok(match name.as_str() {
                "undefined" => Some(EvalValue::Undefined),
                "Infinity" => Some(EvalValue::Number(f64::INFINITY)),
                "NaN" => Some(EvalValue::Number(f64::NAN)),
                _ => self.deopt(path),
            });
        };

        if violated {
            return Ok(self.deopt(declaration));
        }
        let use_span = self.span(node);
        let declaration_span = self.span(self.tree.node(declaration));
        if use_span != Span::SYNTHETIC
            && declaration_span != Span::SYNTHETIC
            && use_span.start < declaration_span.end
        {
            return Ok(self.deopt(declaration));
        }
        if let Some(value) = cached {
            return Ok(value);
        }
        let resolvable = kind != BindingKind::Module
            && self.tree.node_type(declaration) == Some(NodeType::VariableDeclarator);
        if !resolvable {
            return Ok(self.deopt(declaration));
        }
        let id = self.tree.get(declaration, "id")?;
        let init = self.tree.get(declaration, "init")?;
        if self.tree.node_type(id) != Some(NodeType::Identifier) || self.tree.node(init).is_none() {
            return Ok(self.deopt(declaration));
        }

        let value = self.evaluate_cached(init)?;
        if let (Some(value), Some(id)) = (&value, binding_id)
            && let Some(binding) = self.tree.binding_mut(id)
        {
            binding.set_value(value.clone());
        }
        Ok(value)
    }

    fn span(&self, node: NodeIndex) -> Span {
        self.tree
            .arena
            .get(node)
            .map_or(Span::SYNTHETIC, |n| n.span)
    }

    fn evaluate_unary(&mut self, path: PathId) -> Result<Option<EvalValue>> {
        let operator = self.operator(path)?;
        if operator == "void" {
            return Ok(Some(EvalValue::Undefined));
        }
        let argument = self.tree.get(path, "argument")?;
        let is_callable = self
            .tree
            .node_type(argument)
            .is_some_and(|ty| ty.is_alias_of(Alias::Function) || ty.is_alias_of(Alias::Class));
        if operator == "typeof" && is_callable {
            return Ok(Some(EvalValue::String("function".to_string())));
        }
        let Some(value) = self.evaluate_cached(argument)? else {
            return Ok(None);
        };
        Ok(match operator.as_str() {
            "!" => Some(EvalValue::Bool(!value.to_boolean())),
            "+" => Some(EvalValue::Number(value.to_number())),
            "-" => Some(EvalValue::Number(-value.to_number())),
            "~" => Some(EvalValue::Number(f64::from(!to_int32(value.to_number())))),
            "typeof" => Some(EvalValue::String(value.type_of().to_string())),
            _ => self.deopt(path),
        })
    }

    /// A logical expression stays confident when the side that decides the
    /// result was confident, even if the other side wasn't.
    fn evaluate_logical(&mut self, path: PathId) -> Result<Option<EvalValue>> {
        let operator = self.operator(path)?;
        let was_confident = self.confident;
        let left_path = self.tree.get(path, "left")?;
        let left = self.evaluate_cached(left_path)?;
        let left_confident = self.confident;
        self.confident = was_confident;
        let right_path = self.tree.get(path, "right")?;
        let right = self.evaluate_cached(right_path)?;
        let right_confident = self.confident;

        let Some(left) = left.filter(|_| left_confident) else {
            self.confident = false;
            return Ok(None);
        };
        let (decided_by_left, picks_left) = match operator.as_str() {
            "||" => (left.to_boolean(), left.to_boolean()),
            "&&" => (!left.to_boolean(), !left.to_boolean()),
            "??" => (!left.is_nullish(), !left.is_nullish()),
            _ => return Ok(self.deopt(path)),
        };
        self.confident = decided_by_left || right_confident;
        if !self.confident {
            return Ok(None);
        }
        if picks_left {
            return Ok(Some(left));
        }
        Ok(right)
    }
}

impl Tree {
    /// Statically evaluate the expression at `path`.
    pub fn evaluate(&mut self, path: PathId) -> Result<EvalResult> {
        self.assert_live(path)?;
        let mut evaluator = Evaluator {
            tree: self,
            confident: true,
            deopt: None,
            seen: FxHashMap::default(),
            depth: 0,
        };
        let value = evaluator.evaluate_cached(path)?;
        let confident = evaluator.confident;
        Ok(EvalResult {
            confident,
            value: if confident { value } else { None },
            deopt: if confident { None } else { evaluator.deopt },
        })
    }

    /// Truthiness of the expression at `path`, when it can be proven.
    pub fn evaluate_truthy(&mut self, path: PathId) -> Result<Option<bool>> {
        let result = self.evaluate(path)?;
        Ok(result.value.filter(|_| result.confident).map(|v| v.to_boolean()))
    }
}
