//! Named constructors for the node types transforms build most often.
//!
//! Optional children are passed as `NodeIndex::NONE`.

use crate::arena::NodeArena;
use crate::error::ShapeError;
use crate::node::NodeIndex;
use crate::node_type::NodeType;

type Built = Result<NodeIndex, ShapeError>;

impl NodeArena {
    pub fn identifier(&mut self, name: impl Into<String>) -> Built {
        self.build(NodeType::Identifier).str("name", name).finish()
    }

    pub fn string_literal(&mut self, value: impl Into<String>) -> Built {
        self.build(NodeType::StringLiteral).str("value", value).finish()
    }

    pub fn numeric_literal(&mut self, value: f64) -> Built {
        self.build(NodeType::NumericLiteral).num("value", value).finish()
    }

    pub fn boolean_literal(&mut self, value: bool) -> Built {
        self.build(NodeType::BooleanLiteral).bool("value", value).finish()
    }

    pub fn null_literal(&mut self) -> Built {
        self.build(NodeType::NullLiteral).finish()
    }

    pub fn this_expression(&mut self) -> Built {
        self.build(NodeType::ThisExpression).finish()
    }

    pub fn noop(&mut self) -> Built {
        self.build(NodeType::Noop).finish()
    }

    pub fn program(&mut self, body: Vec<NodeIndex>) -> Built {
        self.build(NodeType::Program)
            .str("source_type", "module")
            .list("body", body)
            .finish()
    }

    pub fn file(&mut self, program: NodeIndex) -> Built {
        self.build(NodeType::File).node("program", program).finish()
    }

    pub fn block_statement(&mut self, body: Vec<NodeIndex>) -> Built {
        self.build(NodeType::BlockStatement).list("body", body).finish()
    }

    pub fn empty_statement(&mut self) -> Built {
        self.build(NodeType::EmptyStatement).finish()
    }

    pub fn expression_statement(&mut self, expression: NodeIndex) -> Built {
        self.build(NodeType::ExpressionStatement)
            .node("expression", expression)
            .finish()
    }

    pub fn variable_declaration(&mut self, kind: &str, declarations: Vec<NodeIndex>) -> Built {
        self.build(NodeType::VariableDeclaration)
            .str("kind", kind)
            .list("declarations", declarations)
            .finish()
    }

    pub fn variable_declarator(&mut self, id: NodeIndex, init: NodeIndex) -> Built {
        self.build(NodeType::VariableDeclarator)
            .node("id", id)
            .node("init", init)
            .finish()
    }

    pub fn function_declaration(
        &mut self,
        id: NodeIndex,
        params: Vec<NodeIndex>,
        body: NodeIndex,
    ) -> Built {
        self.build(NodeType::FunctionDeclaration)
            .node("id", id)
            .list("params", params)
            .node("body", body)
            .finish()
    }

    pub fn function_expression(
        &mut self,
        id: NodeIndex,
        params: Vec<NodeIndex>,
        body: NodeIndex,
    ) -> Built {
        self.build(NodeType::FunctionExpression)
            .node("id", id)
            .list("params", params)
            .node("body", body)
            .finish()
    }

    pub fn arrow_function_expression(&mut self, params: Vec<NodeIndex>, body: NodeIndex) -> Built {
        let expression = !self.is(body, NodeType::BlockStatement);
        self.build(NodeType::ArrowFunctionExpression)
            .list("params", params)
            .node("body", body)
            .bool("expression", expression)
            .finish()
    }

    pub fn return_statement(&mut self, argument: NodeIndex) -> Built {
        self.build(NodeType::ReturnStatement)
            .node("argument", argument)
            .finish()
    }

    pub fn throw_statement(&mut self, argument: NodeIndex) -> Built {
        self.build(NodeType::ThrowStatement)
            .node("argument", argument)
            .finish()
    }

    pub fn if_statement(&mut self, test: NodeIndex, consequent: NodeIndex, alternate: NodeIndex) -> Built {
        self.build(NodeType::IfStatement)
            .node("test", test)
            .node("consequent", consequent)
            .node("alternate", alternate)
            .finish()
    }

    pub fn labeled_statement(&mut self, label: NodeIndex, body: NodeIndex) -> Built {
        self.build(NodeType::LabeledStatement)
            .node("label", label)
            .node("body", body)
            .finish()
    }

    pub fn break_statement(&mut self, label: NodeIndex) -> Built {
        self.build(NodeType::BreakStatement).node("label", label).finish()
    }

    pub fn continue_statement(&mut self, label: NodeIndex) -> Built {
        self.build(NodeType::ContinueStatement).node("label", label).finish()
    }

    pub fn while_statement(&mut self, test: NodeIndex, body: NodeIndex) -> Built {
        self.build(NodeType::WhileStatement)
            .node("test", test)
            .node("body", body)
            .finish()
    }

    pub fn for_statement(
        &mut self,
        init: NodeIndex,
        test: NodeIndex,
        update: NodeIndex,
        body: NodeIndex,
    ) -> Built {
        self.build(NodeType::ForStatement)
            .node("init", init)
            .node("test", test)
            .node("update", update)
            .node("body", body)
            .finish()
    }

    pub fn for_in_statement(&mut self, left: NodeIndex, right: NodeIndex, body: NodeIndex) -> Built {
        self.build(NodeType::ForInStatement)
            .node("left", left)
            .node("right", right)
            .node("body", body)
            .finish()
    }

    pub fn for_of_statement(&mut self, left: NodeIndex, right: NodeIndex, body: NodeIndex) -> Built {
        self.build(NodeType::ForOfStatement)
            .node("left", left)
            .node("right", right)
            .node("body", body)
            .finish()
    }

    pub fn switch_statement(&mut self, discriminant: NodeIndex, cases: Vec<NodeIndex>) -> Built {
        self.build(NodeType::SwitchStatement)
            .node("discriminant", discriminant)
            .list("cases", cases)
            .finish()
    }

    pub fn switch_case(&mut self, test: NodeIndex, consequent: Vec<NodeIndex>) -> Built {
        self.build(NodeType::SwitchCase)
            .node("test", test)
            .list("consequent", consequent)
            .finish()
    }

    pub fn catch_clause(&mut self, param: NodeIndex, body: NodeIndex) -> Built {
        self.build(NodeType::CatchClause)
            .node("param", param)
            .node("body", body)
            .finish()
    }

    pub fn try_statement(&mut self, block: NodeIndex, handler: NodeIndex, finalizer: NodeIndex) -> Built {
        self.build(NodeType::TryStatement)
            .node("block", block)
            .node("handler", handler)
            .node("finalizer", finalizer)
            .finish()
    }

    pub fn assignment_expression(&mut self, operator: &str, left: NodeIndex, right: NodeIndex) -> Built {
        self.build(NodeType::AssignmentExpression)
            .str("operator", operator)
            .node("left", left)
            .node("right", right)
            .finish()
    }

    pub fn binary_expression(&mut self, operator: &str, left: NodeIndex, right: NodeIndex) -> Built {
        self.build(NodeType::BinaryExpression)
            .str("operator", operator)
            .node("left", left)
            .node("right", right)
            .finish()
    }

    pub fn logical_expression(&mut self, operator: &str, left: NodeIndex, right: NodeIndex) -> Built {
        self.build(NodeType::LogicalExpression)
            .str("operator", operator)
            .node("left", left)
            .node("right", right)
            .finish()
    }

    pub fn unary_expression(&mut self, operator: &str, argument: NodeIndex) -> Built {
        self.build(NodeType::UnaryExpression)
            .str("operator", operator)
            .node("argument", argument)
            .bool("prefix", true)
            .finish()
    }

    pub fn update_expression(&mut self, operator: &str, argument: NodeIndex, prefix: bool) -> Built {
        self.build(NodeType::UpdateExpression)
            .str("operator", operator)
            .node("argument", argument)
            .bool("prefix", prefix)
            .finish()
    }

    pub fn conditional_expression(
        &mut self,
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: NodeIndex,
    ) -> Built {
        self.build(NodeType::ConditionalExpression)
            .node("test", test)
            .node("consequent", consequent)
            .node("alternate", alternate)
            .finish()
    }

    pub fn sequence_expression(&mut self, expressions: Vec<NodeIndex>) -> Built {
        self.build(NodeType::SequenceExpression)
            .list("expressions", expressions)
            .finish()
    }

    pub fn call_expression(&mut self, callee: NodeIndex, arguments: Vec<NodeIndex>) -> Built {
        self.build(NodeType::CallExpression)
            .node("callee", callee)
            .list("arguments", arguments)
            .finish()
    }

    pub fn new_expression(&mut self, callee: NodeIndex, arguments: Vec<NodeIndex>) -> Built {
        self.build(NodeType::NewExpression)
            .node("callee", callee)
            .list("arguments", arguments)
            .finish()
    }

    pub fn member_expression(&mut self, object: NodeIndex, property: NodeIndex, computed: bool) -> Built {
        self.build(NodeType::MemberExpression)
            .node("object", object)
            .node("property", property)
            .bool("computed", computed)
            .finish()
    }

    pub fn array_expression(&mut self, elements: Vec<NodeIndex>) -> Built {
        self.build(NodeType::ArrayExpression)
            .list("elements", elements)
            .finish()
    }

    pub fn object_expression(&mut self, properties: Vec<NodeIndex>) -> Built {
        self.build(NodeType::ObjectExpression)
            .list("properties", properties)
            .finish()
    }

    pub fn object_property(&mut self, key: NodeIndex, value: NodeIndex) -> Built {
        self.build(NodeType::ObjectProperty)
            .node("key", key)
            .node("value", value)
            .finish()
    }

    pub fn spread_element(&mut self, argument: NodeIndex) -> Built {
        self.build(NodeType::SpreadElement)
            .node("argument", argument)
            .finish()
    }

    pub fn template_literal(&mut self, quasis: Vec<NodeIndex>, expressions: Vec<NodeIndex>) -> Built {
        self.build(NodeType::TemplateLiteral)
            .list("quasis", quasis)
            .list("expressions", expressions)
            .finish()
    }

    pub fn template_element(&mut self, raw: &str, tail: bool) -> Built {
        self.build(NodeType::TemplateElement)
            .str("raw", raw)
            .str("cooked", raw)
            .bool("tail", tail)
            .finish()
    }

    pub fn rest_element(&mut self, argument: NodeIndex) -> Built {
        self.build(NodeType::RestElement)
            .node("argument", argument)
            .finish()
    }

    pub fn assignment_pattern(&mut self, left: NodeIndex, right: NodeIndex) -> Built {
        self.build(NodeType::AssignmentPattern)
            .node("left", left)
            .node("right", right)
            .finish()
    }

    pub fn array_pattern(&mut self, elements: Vec<NodeIndex>) -> Built {
        self.build(NodeType::ArrayPattern)
            .list("elements", elements)
            .finish()
    }

    pub fn object_pattern(&mut self, properties: Vec<NodeIndex>) -> Built {
        self.build(NodeType::ObjectPattern)
            .list("properties", properties)
            .finish()
    }

    pub fn class_declaration(&mut self, id: NodeIndex, super_class: NodeIndex, body: NodeIndex) -> Built {
        self.build(NodeType::ClassDeclaration)
            .node("id", id)
            .node("super_class", super_class)
            .node("body", body)
            .finish()
    }

    pub fn class_expression(&mut self, id: NodeIndex, super_class: NodeIndex, body: NodeIndex) -> Built {
        self.build(NodeType::ClassExpression)
            .node("id", id)
            .node("super_class", super_class)
            .node("body", body)
            .finish()
    }

    pub fn class_body(&mut self, body: Vec<NodeIndex>) -> Built {
        self.build(NodeType::ClassBody).list("body", body).finish()
    }

    pub fn class_method(
        &mut self,
        kind: &str,
        key: NodeIndex,
        params: Vec<NodeIndex>,
        body: NodeIndex,
    ) -> Built {
        self.build(NodeType::ClassMethod)
            .str("kind", kind)
            .node("key", key)
            .list("params", params)
            .node("body", body)
            .finish()
    }

    pub fn import_declaration(&mut self, specifiers: Vec<NodeIndex>, source: NodeIndex) -> Built {
        self.build(NodeType::ImportDeclaration)
            .list("specifiers", specifiers)
            .node("source", source)
            .finish()
    }

    pub fn import_specifier(&mut self, local: NodeIndex, imported: NodeIndex) -> Built {
        self.build(NodeType::ImportSpecifier)
            .node("local", local)
            .node("imported", imported)
            .finish()
    }

    pub fn import_default_specifier(&mut self, local: NodeIndex) -> Built {
        self.build(NodeType::ImportDefaultSpecifier)
            .node("local", local)
            .finish()
    }

    pub fn import_namespace_specifier(&mut self, local: NodeIndex) -> Built {
        self.build(NodeType::ImportNamespaceSpecifier)
            .node("local", local)
            .finish()
    }

    pub fn export_named_declaration(
        &mut self,
        declaration: NodeIndex,
        specifiers: Vec<NodeIndex>,
        source: NodeIndex,
    ) -> Built {
        self.build(NodeType::ExportNamedDeclaration)
            .node("declaration", declaration)
            .list("specifiers", specifiers)
            .node("source", source)
            .finish()
    }

    pub fn export_default_declaration(&mut self, declaration: NodeIndex) -> Built {
        self.build(NodeType::ExportDefaultDeclaration)
            .node("declaration", declaration)
            .finish()
    }

    pub fn export_specifier(&mut self, local: NodeIndex, exported: NodeIndex) -> Built {
        self.build(NodeType::ExportSpecifier)
            .node("local", local)
            .node("exported", exported)
            .finish()
    }
}
