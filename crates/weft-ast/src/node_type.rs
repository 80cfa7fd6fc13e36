//! Node type schema table.
//!
//! Every node type is declared once below with its ordered fields and the
//! aliases it belongs to. Field order is the child-visiting order. Scalar
//! fields (strings, numbers, booleans) are listed alongside but are never
//! visited.

use serde::{Deserialize, Serialize};

use crate::alias::Alias;

/// Storage class of one schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Required child node.
    Node,
    /// Child node that may be absent.
    OptNode,
    /// Ordered list of child nodes; entries may be holes (`NodeIndex::NONE`).
    List,
    Str,
    OptStr,
    Num,
    Bool,
}

impl FieldKind {
    /// Whether the field holds child nodes.
    #[inline]
    pub const fn is_child(self) -> bool {
        matches!(self, FieldKind::Node | FieldKind::OptNode | FieldKind::List)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

macro_rules! define_node_types {
    ($( $ty:ident { $( $field:literal : $kind:ident ),* } => [ $( $alias:ident ),* ] ),* $(,)?) => {
        /// Discriminant of every node.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum NodeType {
            $( $ty, )*
        }

        impl NodeType {
            /// Every node type in declaration order.
            pub const ALL: &'static [NodeType] = &[ $( NodeType::$ty, )* ];

            pub const fn name(self) -> &'static str {
                match self {
                    $( NodeType::$ty => stringify!($ty), )*
                }
            }

            pub fn from_name(name: &str) -> Option<NodeType> {
                match name {
                    $( stringify!($ty) => Some(NodeType::$ty), )*
                    _ => None,
                }
            }

            /// Schema fields in visiting order.
            pub const fn fields(self) -> &'static [FieldDef] {
                match self {
                    $( NodeType::$ty => &[ $( FieldDef { name: $field, kind: FieldKind::$kind }, )* ], )*
                }
            }

            pub const fn aliases(self) -> &'static [Alias] {
                match self {
                    $( NodeType::$ty => &[ $( Alias::$alias, )* ], )*
                }
            }
        }
    };
}

define_node_types! {
    ArrayExpression { "elements": List } => [Expression],
    AssignmentExpression { "operator": Str, "left": Node, "right": Node } => [Expression],
    BinaryExpression { "operator": Str, "left": Node, "right": Node } => [Expression, Binary],
    Directive { "value": Node } => [],
    DirectiveLiteral { "value": Str } => [],
    BlockStatement { "directives": List, "body": List } => [Scopable, BlockParent, Block, Statement],
    BreakStatement { "label": OptNode } => [Statement, Terminatorless, CompletionStatement],
    CallExpression { "callee": Node, "arguments": List } => [Expression],
    CatchClause { "param": OptNode, "body": Node } => [Scopable],
    ConditionalExpression { "test": Node, "consequent": Node, "alternate": Node } => [Expression, Conditional],
    ContinueStatement { "label": OptNode } => [Statement, Terminatorless, CompletionStatement],
    DebuggerStatement {  } => [Statement],
    DoWhileStatement { "test": Node, "body": Node } => [Scopable, BlockParent, Statement, Loop, While],
    EmptyStatement {  } => [Statement],
    ExpressionStatement { "expression": Node } => [Statement, ExpressionWrapper],
    File { "program": Node } => [],
    ForInStatement { "left": Node, "right": Node, "body": Node } => [Scopable, BlockParent, Statement, Loop, For, ForXStatement],
    ForStatement { "init": OptNode, "test": OptNode, "update": OptNode, "body": Node } => [Scopable, BlockParent, Statement, Loop, For],
    FunctionDeclaration { "id": OptNode, "params": List, "body": Node, "return_type": OptNode, "type_parameters": OptNode, "generator": Bool, "async": Bool } => [Scopable, BlockParent, Statement, Function, FunctionParent, Pureish, Declaration],
    FunctionExpression { "id": OptNode, "params": List, "body": Node, "return_type": OptNode, "type_parameters": OptNode, "generator": Bool, "async": Bool } => [Expression, Scopable, BlockParent, Function, FunctionParent, Pureish],
    Identifier { "name": Str, "type_annotation": OptNode } => [Expression, LVal],
    IfStatement { "test": Node, "consequent": Node, "alternate": OptNode } => [Statement, Conditional],
    LabeledStatement { "label": Node, "body": Node } => [Statement],
    StringLiteral { "value": Str } => [Expression, Pureish, Literal, Immutable],
    NumericLiteral { "value": Num } => [Expression, Pureish, Literal, Immutable],
    NullLiteral {  } => [Expression, Pureish, Literal, Immutable],
    BooleanLiteral { "value": Bool } => [Expression, Pureish, Literal, Immutable],
    RegExpLiteral { "pattern": Str, "flags": Str } => [Expression, Literal],
    LogicalExpression { "operator": Str, "left": Node, "right": Node } => [Expression, Binary],
    MemberExpression { "object": Node, "property": Node, "computed": Bool } => [Expression, LVal],
    NewExpression { "callee": Node, "arguments": List } => [Expression],
    Program { "source_type": Str, "directives": List, "body": List } => [Scopable, BlockParent, Block, FunctionParent],
    ObjectExpression { "properties": List } => [Expression],
    ObjectMethod { "kind": Str, "key": Node, "params": List, "body": Node, "decorators": List, "return_type": OptNode, "type_parameters": OptNode, "computed": Bool, "generator": Bool, "async": Bool } => [Scopable, BlockParent, Function, FunctionParent, UserWhitespacable, Method, ObjectMember],
    ObjectProperty { "key": Node, "value": Node, "decorators": List, "computed": Bool, "shorthand": Bool } => [UserWhitespacable, ObjectMember, Property],
    RestElement { "argument": Node, "type_annotation": OptNode } => [LVal],
    ReturnStatement { "argument": OptNode } => [Statement, Terminatorless, CompletionStatement],
    SequenceExpression { "expressions": List } => [Expression],
    SwitchCase { "test": OptNode, "consequent": List } => [],
    SwitchStatement { "discriminant": Node, "cases": List } => [Scopable, BlockParent, Statement],
    ThisExpression {  } => [Expression],
    ThrowStatement { "argument": Node } => [Statement, Terminatorless, CompletionStatement],
    TryStatement { "block": Node, "handler": OptNode, "finalizer": OptNode } => [Statement],
    UnaryExpression { "operator": Str, "argument": Node, "prefix": Bool } => [Expression, UnaryLike],
    UpdateExpression { "operator": Str, "argument": Node, "prefix": Bool } => [Expression],
    VariableDeclaration { "kind": Str, "declarations": List } => [Statement, Declaration],
    VariableDeclarator { "id": Node, "init": OptNode } => [],
    WhileStatement { "test": Node, "body": Node } => [Scopable, BlockParent, Statement, Loop, While],
    WithStatement { "object": Node, "body": Node } => [Statement],
    AssignmentPattern { "left": Node, "right": Node } => [LVal, Pattern],
    ArrayPattern { "elements": List, "type_annotation": OptNode } => [LVal, Pattern],
    ArrowFunctionExpression { "params": List, "body": Node, "return_type": OptNode, "type_parameters": OptNode, "async": Bool, "expression": Bool } => [Expression, Scopable, BlockParent, Function, FunctionParent, Pureish],
    ClassBody { "body": List } => [],
    ClassDeclaration { "id": OptNode, "body": Node, "super_class": OptNode, "mixins": List, "type_parameters": OptNode, "super_type_parameters": OptNode, "implements": List, "decorators": List } => [Scopable, Statement, Pureish, Declaration, Class],
    ClassExpression { "id": OptNode, "body": Node, "super_class": OptNode, "mixins": List, "type_parameters": OptNode, "super_type_parameters": OptNode, "implements": List, "decorators": List } => [Expression, Scopable, Pureish, Class],
    ExportAllDeclaration { "source": Node } => [Statement, Declaration, ModuleDeclaration, ExportDeclaration],
    ExportDefaultDeclaration { "declaration": Node } => [Statement, Declaration, ModuleDeclaration, ExportDeclaration],
    ExportNamedDeclaration { "declaration": OptNode, "specifiers": List, "source": OptNode } => [Statement, Declaration, ModuleDeclaration, ExportDeclaration],
    ExportSpecifier { "local": Node, "exported": Node } => [ModuleSpecifier],
    ForOfStatement { "left": Node, "right": Node, "body": Node } => [Scopable, BlockParent, Statement, Loop, For, ForXStatement],
    ImportDeclaration { "specifiers": List, "source": Node, "import_kind": OptStr } => [Statement, Declaration, ModuleDeclaration],
    ImportDefaultSpecifier { "local": Node } => [ModuleSpecifier],
    ImportNamespaceSpecifier { "local": Node } => [ModuleSpecifier],
    ImportSpecifier { "local": Node, "imported": Node, "import_kind": OptStr } => [ModuleSpecifier],
    MetaProperty { "meta": Node, "property": Node } => [Expression],
    ClassMethod { "kind": Str, "key": Node, "params": List, "body": Node, "decorators": List, "return_type": OptNode, "type_parameters": OptNode, "computed": Bool, "static": Bool, "generator": Bool, "async": Bool } => [Scopable, BlockParent, Function, FunctionParent, Method],
    AssignmentProperty { "key": Node, "value": Node, "decorators": List, "computed": Bool, "shorthand": Bool } => [],
    ObjectPattern { "properties": List, "type_annotation": OptNode } => [LVal, Pattern],
    SpreadElement { "argument": Node } => [UnaryLike],
    Super {  } => [Expression],
    TaggedTemplateExpression { "tag": Node, "quasi": Node } => [Expression],
    TemplateElement { "raw": Str, "cooked": OptStr, "tail": Bool } => [],
    TemplateLiteral { "quasis": List, "expressions": List } => [Expression, Literal],
    YieldExpression { "argument": OptNode, "delegate": Bool } => [Expression, Terminatorless],
    AnyTypeAnnotation {  } => [Flow, FlowTypeAnnotation, FlowBaseAnnotation],
    ArrayTypeAnnotation { "element_type": Node } => [Flow, FlowTypeAnnotation],
    BooleanTypeAnnotation {  } => [Flow, FlowTypeAnnotation, FlowBaseAnnotation],
    BooleanLiteralTypeAnnotation { "value": Bool } => [Flow, FlowTypeAnnotation],
    NullLiteralTypeAnnotation {  } => [],
    ClassImplements { "id": Node, "type_parameters": OptNode } => [Flow],
    ClassProperty { "key": Node, "value": OptNode, "type_annotation": OptNode, "decorators": List, "computed": Bool, "static": Bool } => [Property, Flow],
    DeclareClass { "id": Node, "type_parameters": OptNode, "extends": List, "body": Node } => [Statement, Declaration, Flow, FlowDeclaration],
    DeclareFunction { "id": Node } => [Statement, Declaration, Flow, FlowDeclaration],
    DeclareInterface { "id": Node, "type_parameters": OptNode, "extends": List, "body": Node } => [Statement, Declaration, Flow, FlowDeclaration],
    DeclareModule { "id": Node, "body": Node } => [Statement, Declaration, Flow, FlowDeclaration],
    DeclareTypeAlias { "id": Node, "type_parameters": OptNode, "right": Node } => [Statement, Declaration, Flow, FlowDeclaration],
    DeclareVariable { "id": Node } => [Statement, Declaration, Flow, FlowDeclaration],
    ExistentialTypeParam {  } => [Flow],
    FunctionTypeAnnotation { "type_parameters": OptNode, "params": List, "rest": OptNode, "return_type": Node } => [Flow, FlowTypeAnnotation],
    FunctionTypeParam { "name": Node, "type_annotation": Node, "optional": Bool } => [Flow],
    GenericTypeAnnotation { "id": Node, "type_parameters": OptNode } => [Flow, FlowTypeAnnotation],
    InterfaceExtends { "id": Node, "type_parameters": OptNode } => [Flow],
    InterfaceDeclaration { "id": Node, "type_parameters": OptNode, "extends": List, "mixins": List, "body": Node } => [Statement, Declaration, Flow, FlowDeclaration],
    IntersectionTypeAnnotation { "types": List } => [Flow, FlowTypeAnnotation],
    MixedTypeAnnotation {  } => [Flow, FlowTypeAnnotation, FlowBaseAnnotation],
    NullableTypeAnnotation { "type_annotation": Node } => [Flow, FlowTypeAnnotation],
    NumericLiteralTypeAnnotation { "value": Num } => [Flow, FlowTypeAnnotation],
    NumberTypeAnnotation {  } => [Flow, FlowTypeAnnotation, FlowBaseAnnotation],
    StringLiteralTypeAnnotation { "value": Str } => [Flow, FlowTypeAnnotation],
    StringTypeAnnotation {  } => [Flow, FlowTypeAnnotation, FlowBaseAnnotation],
    ThisTypeAnnotation {  } => [Flow, FlowTypeAnnotation, FlowBaseAnnotation],
    TupleTypeAnnotation { "types": List } => [Flow, FlowTypeAnnotation],
    TypeofTypeAnnotation { "argument": Node } => [Flow, FlowTypeAnnotation],
    TypeAlias { "id": Node, "type_parameters": OptNode, "right": Node } => [Statement, Declaration, Flow, FlowDeclaration],
    TypeAnnotation { "type_annotation": Node } => [Flow, FlowTypeAnnotation],
    TypeCastExpression { "expression": Node, "type_annotation": Node } => [Expression, ExpressionWrapper, Flow],
    TypeParameterDeclaration { "params": List } => [Flow],
    TypeParameterInstantiation { "params": List } => [Flow],
    ObjectTypeAnnotation { "properties": List, "indexers": List, "call_properties": List } => [Flow, FlowTypeAnnotation],
    ObjectTypeCallProperty { "value": Node, "static": Bool } => [UserWhitespacable, Flow],
    ObjectTypeIndexer { "id": Node, "key": Node, "value": Node, "static": Bool } => [UserWhitespacable, Flow],
    ObjectTypeProperty { "key": Node, "value": Node, "optional": Bool, "static": Bool } => [UserWhitespacable, Flow],
    QualifiedTypeIdentifier { "id": Node, "qualification": Node } => [Flow],
    UnionTypeAnnotation { "types": List } => [Flow, FlowTypeAnnotation],
    VoidTypeAnnotation {  } => [Flow, FlowTypeAnnotation, FlowBaseAnnotation],
    JSXAttribute { "name": Node, "value": OptNode } => [Immutable, Jsx],
    JSXClosingElement { "name": Node } => [Immutable, Jsx],
    JSXElement { "opening_element": Node, "children": List, "closing_element": OptNode, "self_closing": Bool } => [Expression, Immutable, Jsx],
    JSXEmptyExpression {  } => [Expression, Jsx],
    JSXExpressionContainer { "expression": Node } => [Immutable, Jsx],
    JSXIdentifier { "name": Str } => [Expression, Jsx],
    JSXMemberExpression { "object": Node, "property": Node } => [Expression, Jsx],
    JSXNamespacedName { "namespace": Node, "name": Node } => [Jsx],
    JSXOpeningElement { "name": Node, "attributes": List, "self_closing": Bool } => [Immutable, Jsx],
    JSXSpreadAttribute { "argument": Node } => [Jsx],
    JSXText { "value": Str } => [Jsx],
    Noop {  } => [],
    ParenthesizedExpression { "expression": Node } => [Expression, ExpressionWrapper],
    AwaitExpression { "argument": Node } => [Expression, Terminatorless],
    BindExpression { "object": OptNode, "callee": Node } => [Expression],
    Decorator { "expression": Node } => [],
    DoExpression { "body": Node } => [Expression],
    ExportDefaultSpecifier { "exported": Node } => [ModuleSpecifier],
    ExportNamespaceSpecifier { "exported": Node } => [ModuleSpecifier],
    RestProperty { "argument": Node } => [UnaryLike],
    SpreadProperty { "argument": Node } => [UnaryLike],
}

impl NodeType {
    /// Number of node types.
    pub const COUNT: usize = NodeType::ALL.len();

    /// Dense index, usable for per-type dispatch tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Position of `name` in this type's schema.
    pub fn field_position(self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| f.name == name)
    }

    pub fn field(self, name: &str) -> Option<&'static FieldDef> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Child-bearing fields in visiting order.
    pub fn visitor_keys(self) -> impl Iterator<Item = &'static FieldDef> {
        self.fields().iter().filter(|f| f.kind.is_child())
    }

    pub fn has_visitor_keys(self) -> bool {
        self.fields().iter().any(|f| f.kind.is_child())
    }

    #[inline]
    pub fn is_alias_of(self, alias: Alias) -> bool {
        self.aliases().contains(&alias)
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
