//! The abstract syntax tree produced by the parser.
//!
//! Every node carries a source span. The node set is closed: adding a new
//! construct to the language is a compile-time event here and in the
//! evaluator's match.

use std::rc::Rc;

use crate::intern::StringId;

/// 0-based line and column position within a script.
///
/// Positions are 0-based in the AST and converted to 1-based when they
/// surface in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CodeLoc {
    pub line: u32,
    pub column: u32,
}

impl CodeLoc {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Source span of a node: start and end positions, end inclusive of the last
/// consumed token. `end >= start` always holds for parser output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: CodeLoc,
    pub end: CodeLoc,
}

impl Span {
    pub(crate) const fn new(start: CodeLoc, end: CodeLoc) -> Self {
        Self { start, end }
    }

    /// Joins two spans into one covering both.
    pub(crate) const fn to(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }
}

/// An identifier occurrence: interned name plus where it appeared.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Identifier {
    pub name: StringId,
    pub span: Span,
}

/// A comment attached to the statement that follows it.
///
/// Annotations are ignored by evaluation; they exist for tooling.
#[derive(Debug, Clone)]
pub(crate) struct Annotation {
    pub text: String,
    pub span: Span,
}

/// A node plus its source span and optional leading annotation.
#[derive(Debug, Clone)]
pub(crate) struct NodeLoc {
    pub node: Node,
    pub span: Span,
    pub annotation: Option<Annotation>,
}

impl NodeLoc {
    pub fn new(node: Node, span: Span) -> Self {
        Self {
            node,
            span,
            annotation: None,
        }
    }
}

/// The closed set of AST node kinds.
///
/// Statements and expressions are unified: every node evaluates to a boxed
/// value, which is what makes blocks, `if`, and function bodies yield the
/// value of their last statement.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Id(Identifier),
    /// `var x` — binds `x` to void in the top frame.
    VarDecl(Identifier),
    /// `target op value` for `=` and the compound assignment operators.
    /// Right-associative; `op` is the interned operator text.
    Assign {
        target: Box<NodeLoc>,
        op: StringId,
        value: Box<NodeLoc>,
    },
    /// One step of a left-folded binary chain; `op` is the interned operator
    /// text dispatched through the registry.
    Binary {
        left: Box<NodeLoc>,
        op: StringId,
        right: Box<NodeLoc>,
    },
    /// Prefix `!`, `-`, or `+`.
    Unary {
        op: StringId,
        operand: Box<NodeLoc>,
    },
    /// `name(args...)` — `name` is looked up as a bound function value first,
    /// then as a registry overload set.
    Call {
        name: Identifier,
        args: Vec<NodeLoc>,
    },
    /// `object.name(args...)`, sugar for `name(object, args...)`.
    MethodCall {
        object: Box<NodeLoc>,
        name: Identifier,
        args: Vec<NodeLoc>,
    },
    /// `object.name`, sugar for `name(object)`.
    FieldAccess {
        object: Box<NodeLoc>,
        name: Identifier,
    },
    /// `object[index]`, dispatched as `[](object, index)`.
    Index {
        object: Box<NodeLoc>,
        index: Box<NodeLoc>,
    },
    /// `[a, b, c]` — built by dispatching the `Vector` constructor and then
    /// `push_back` per element.
    Array(Vec<NodeLoc>),
    /// `[k: v, ...]` — built by dispatching the `Map` constructor and then
    /// `insert` per pair.
    MapLit(Vec<(NodeLoc, NodeLoc)>),
    /// `lo..hi` — dispatches the `Range` constructor.
    Range {
        lo: Box<NodeLoc>,
        hi: Box<NodeLoc>,
    },
    /// `fun(params) { ... }` — evaluates to an anonymous boxed callable.
    ///
    /// The body is reference-counted because the resulting function value can
    /// outlive the AST it was parsed from.
    Lambda {
        params: Vec<Identifier>,
        body: Rc<NodeLoc>,
    },
    /// `def name(params) { ... }` — registers a script callable.
    Def {
        name: Identifier,
        params: Vec<Identifier>,
        body: Rc<NodeLoc>,
    },
    /// `{ ... }` — runs statements in a fresh scope frame; yields the value
    /// of the last statement.
    Block(Vec<NodeLoc>),
    If {
        cond: Box<NodeLoc>,
        then_block: Box<NodeLoc>,
        else_block: Option<Box<NodeLoc>>,
    },
    While {
        cond: Box<NodeLoc>,
        body: Box<NodeLoc>,
    },
    For {
        init: Option<Box<NodeLoc>>,
        cond: Option<Box<NodeLoc>>,
        step: Option<Box<NodeLoc>>,
        body: Box<NodeLoc>,
    },
    Return(Option<Box<NodeLoc>>),
    Break,
}

/// Result of parsing one script: its interned name and top-level statements.
#[derive(Debug)]
pub(crate) struct Ast {
    pub file: StringId,
    pub body: Vec<NodeLoc>,
}
