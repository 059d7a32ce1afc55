//! The JSON-family AST node universe.
//!
//! Nodes live in a flat arena ([`Arena`]) owned by [`crate::Ast`]; parent
//! links are [`NodeId`] indices rather than pointers (per the design notes:
//! non-owning back-references, the arena is the sole owner), so there is
//! nothing to traverse a cycle in besides following `parent` on purpose.

use crate::span::{Loc, Span};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberIdentKind {
    Infinity,
    Nan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordValue {
    True,
    False,
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdentifierName {
    /// `Infinity` | `NaN`, used bare (requires `infinities`/`nans`).
    Number(NumberIdentKind),
    /// `undefined`, used bare (requires `undefined_keywords`).
    Undefined,
    /// `true` | `false` | `null` reached via an identifier-shaped property
    /// key rather than the keyword-literal production.
    Keyword(KeywordValue),
    /// An ordinary bare identifier, legal only as a property key.
    Plain(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

/// The payload of a single arena slot. Every variant corresponds to one
/// member of the node universe in the data model; children are referenced
/// by [`NodeId`], never owned directly, so the arena is a flat `Vec`.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program {
        body: NodeId,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    /// `is_expression` is false when this identifier is used only as an
    /// object-property key.
    Identifier {
        name: IdentifierName,
        is_expression: bool,
    },
    StringLiteral {
        value: String,
        single_quoted: bool,
    },
    NumberLiteral {
        value: f64,
    },
    KeywordLiteral {
        value: KeywordValue,
    },
    RegExpLiteral {
        pattern: String,
        flags: String,
    },
    BigIntLiteral {
        /// Digits only, trailing `n` suffix stripped.
        text: String,
    },
    /// `key` is always an `Identifier` (non-expression), `StringLiteral`, or
    /// `NumberLiteral` node, enforced by the parser.
    Property {
        key: NodeId,
        value: NodeId,
    },
    ObjectExpression {
        properties: Vec<NodeId>,
    },
    /// `None` entries are elisions (sparse-array holes).
    ArrayExpression {
        elements: Vec<Option<NodeId>>,
    },
    UnaryExpression {
        operator: UnaryOperator,
        argument: NodeId,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: NodeId,
        right: NodeId,
    },
    TemplateElement {
        tail: bool,
        cooked: String,
        raw: String,
    },
    TemplateLiteral {
        quasi: NodeId,
    },
}

impl NodeKind {
    /// The node-kind name used by [`visitor_keys`] and in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::NumberLiteral { .. } => "NumberLiteral",
            NodeKind::KeywordLiteral { .. } => "KeywordLiteral",
            NodeKind::RegExpLiteral { .. } => "RegExpLiteral",
            NodeKind::BigIntLiteral { .. } => "BigIntLiteral",
            NodeKind::Property { .. } => "Property",
            NodeKind::ObjectExpression { .. } => "ObjectExpression",
            NodeKind::ArrayExpression { .. } => "ArrayExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::TemplateElement { .. } => "TemplateElement",
            NodeKind::TemplateLiteral { .. } => "TemplateLiteral",
        }
    }

    /// Whether this node is usable where an `Expression` is expected.
    /// Only a property-key identifier is excluded.
    pub fn is_expression(&self) -> bool {
        !matches!(
            self,
            NodeKind::Identifier {
                is_expression: false,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub span: Span,
    pub loc: Loc,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

/// The flat, append-only node arena. Owned exclusively by [`crate::Ast`].
#[derive(Debug, Clone, Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn push(&mut self, span: Span, loc: Loc, kind: NodeKind) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("arena overflow"));
        self.nodes.push(Node {
            span,
            loc,
            parent: None,
            kind,
        });
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    /// Record `parent` as the owner of `child`: every child's parent link
    /// points back to the node that contains it.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        self.nodes[child.0 as usize].parent = Some(parent);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(u32::try_from(i).expect("arena overflow")), n))
    }
}

/// Static map from non-leaf node-kind name to its ordered child-bearing
/// field names, for external tree walkers.
pub fn visitor_keys() -> &'static std::collections::HashMap<&'static str, &'static [&'static str]>
{
    static KEYS: std::sync::OnceLock<
        std::collections::HashMap<&'static str, &'static [&'static str]>,
    > = std::sync::OnceLock::new();
    KEYS.get_or_init(|| {
        let mut m = std::collections::HashMap::new();
        m.insert("Program", &["body"][..]);
        m.insert("ExpressionStatement", &["expression"][..]);
        m.insert("ObjectExpression", &["properties"][..]);
        m.insert("Property", &["key", "value"][..]);
        m.insert("ArrayExpression", &["elements"][..]);
        m.insert("UnaryExpression", &["argument"][..]);
        m.insert("BinaryExpression", &["left", "right"][..]);
        m.insert("TemplateLiteral", &["quasi"][..]);
        m
    })
}
