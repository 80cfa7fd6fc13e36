//! Aliases: named groups of node types.
//!
//! Membership is declared per type in the schema table; the reverse
//! mapping (alias -> members) is computed once on first use.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::node_type::NodeType;

macro_rules! define_aliases {
    ($( $variant:ident => $name:literal ),* $(,)?) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Alias {
            $( $variant, )*
        }

        impl Alias {
            pub const ALL: &'static [Alias] = &[ $( Alias::$variant, )* ];

            pub const fn name(self) -> &'static str {
                match self {
                    $( Alias::$variant => $name, )*
                }
            }

            pub fn from_name(name: &str) -> Option<Alias> {
                match name {
                    $( $name => Some(Alias::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

define_aliases! {
    Expression => "Expression",
    Binary => "Binary",
    Scopable => "Scopable",
    BlockParent => "BlockParent",
    Block => "Block",
    Statement => "Statement",
    Terminatorless => "Terminatorless",
    CompletionStatement => "CompletionStatement",
    Conditional => "Conditional",
    Loop => "Loop",
    While => "While",
    ExpressionWrapper => "ExpressionWrapper",
    For => "For",
    ForXStatement => "ForXStatement",
    Function => "Function",
    FunctionParent => "FunctionParent",
    Pureish => "Pureish",
    Declaration => "Declaration",
    LVal => "LVal",
    Literal => "Literal",
    Immutable => "Immutable",
    UserWhitespacable => "UserWhitespacable",
    Method => "Method",
    ObjectMember => "ObjectMember",
    Property => "Property",
    UnaryLike => "UnaryLike",
    Pattern => "Pattern",
    Class => "Class",
    ModuleDeclaration => "ModuleDeclaration",
    ExportDeclaration => "ExportDeclaration",
    ModuleSpecifier => "ModuleSpecifier",
    Flow => "Flow",
    FlowTypeAnnotation => "FlowTypeAnnotation",
    FlowBaseAnnotation => "FlowBaseAnnotation",
    FlowDeclaration => "FlowDeclaration",
    Jsx => "JSX",
}

static MEMBERS: Lazy<Vec<Vec<NodeType>>> = Lazy::new(|| {
    let mut members = vec![Vec::new(); Alias::ALL.len()];
    for &ty in NodeType::ALL {
        for &alias in ty.aliases() {
            members[alias as usize].push(ty);
        }
    }
    members
});

impl Alias {
    /// Concrete node types in this group, in schema order.
    pub fn members(self) -> &'static [NodeType] {
        &MEMBERS[self as usize]
    }

    pub fn contains(self, ty: NodeType) -> bool {
        ty.is_alias_of(self)
    }
}

impl std::fmt::Display for Alias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A visitor or `is` key: either one concrete type or an alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Type(NodeType),
    Alias(Alias),
}

impl TypeKey {
    pub fn parse(name: &str) -> Option<TypeKey> {
        NodeType::from_name(name)
            .map(TypeKey::Type)
            .or_else(|| Alias::from_name(name).map(TypeKey::Alias))
    }

    pub fn matches(self, ty: NodeType) -> bool {
        match self {
            TypeKey::Type(t) => t == ty,
            TypeKey::Alias(a) => ty.is_alias_of(a),
        }
    }

    /// Concrete types this key expands to.
    pub fn expand(self) -> Vec<NodeType> {
        match self {
            TypeKey::Type(t) => vec![t],
            TypeKey::Alias(a) => a.members().to_vec(),
        }
    }
}

/// `is_node_type(ty, "Expression")`: true when `key` names `ty` itself or
/// an alias containing it. Unknown keys never match.
pub fn is_node_type(ty: NodeType, key: &str) -> bool {
    TypeKey::parse(key).is_some_and(|k| k.matches(ty))
}
