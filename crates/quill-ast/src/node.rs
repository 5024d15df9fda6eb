//! AST node definitions.
//!
//! [`Node`] is a closed sum type with one variant per language construct.
//! Small nodes are stored inline; nodes with several children are
//! arena-allocated and stored by reference so `Node` stays `Copy`.

use quill_core::{NodeKind, Span};

use crate::ops::{BinaryOp, LogicalOp, UnaryOp};

/// A node of the Quill AST.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'ast> {
    /// `null`, `true`, `42`, `1.5`, `"text"`
    Literal(Literal<'ast>),
    /// `[a, b, c]`
    List(ListNode<'ast>),
    /// `{"key": value}`
    Object(ObjectNode<'ast>),
    /// A name: a local variable, or a global provided by the host.
    Ident(Ident<'ast>),
    /// `${name}`: a parameter supplied by the host for this execution.
    Param(ParamNode<'ast>),
    /// `#`: the element currently being transformed.
    Current(CurrentNode),
    /// `object.name`
    Member(&'ast MemberNode<'ast>),
    /// `object[index]`
    Index(&'ast IndexNode<'ast>),
    /// `callee(args...)`
    Call(&'ast CallNode<'ast>),
    /// Prefix operation.
    Unary(&'ast UnaryNode<'ast>),
    /// Strict binary operation.
    Binary(&'ast BinaryNode<'ast>),
    /// Short-circuiting `&&` / `||`.
    Logical(&'ast LogicalNode<'ast>),
    /// `condition ? then : otherwise`
    Ternary(&'ast TernaryNode<'ast>),
    /// `(expr)`
    Group(&'ast GroupNode<'ast>),
    /// `(params) -> body`
    Lambda(&'ast LambdaNode<'ast>),
    /// `source => shape`
    Transform(&'ast TransformNode<'ast>),
    /// `{ statements }`
    Block(BlockNode<'ast>),
    /// `var name = init`
    Var(&'ast VarNode<'ast>),
    /// `name = value`
    Assign(&'ast AssignNode<'ast>),
    /// `run expr`
    Run(&'ast RunNode<'ast>),
    /// `hint NAME = literal`
    Hint(HintNode<'ast>),
    /// `import "path" as alias`
    Import(ImportNode<'ast>),
    /// `if (..) .. else if (..) .. else ..`
    If(&'ast IfNode<'ast>),
    /// `while (condition) body`
    While(&'ast WhileNode<'ast>),
    /// `for (binding in iterable) body`
    ForEach(&'ast ForEachNode<'ast>),
    /// `break`
    Break(BreakNode),
    /// `continue`
    Continue(ContinueNode),
    /// `try body catch (binding) handler`
    Try(&'ast TryNode<'ast>),
    /// `return code, data`
    Return(&'ast OutcomeNode<'ast>),
    /// `exit code, data`
    Exit(&'ast OutcomeNode<'ast>),
    /// `throw code, data`
    Throw(&'ast ThrowNode<'ast>),
}

impl<'ast> Node<'ast> {
    /// The kind discriminator of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Literal(_) => NodeKind::Literal,
            Node::List(_) => NodeKind::List,
            Node::Object(_) => NodeKind::Object,
            Node::Ident(_) => NodeKind::Ident,
            Node::Param(_) => NodeKind::Param,
            Node::Current(_) => NodeKind::Current,
            Node::Member(_) => NodeKind::Member,
            Node::Index(_) => NodeKind::Index,
            Node::Call(_) => NodeKind::Call,
            Node::Unary(_) => NodeKind::Unary,
            Node::Binary(_) => NodeKind::Binary,
            Node::Logical(_) => NodeKind::Logical,
            Node::Ternary(_) => NodeKind::Ternary,
            Node::Group(_) => NodeKind::Group,
            Node::Lambda(_) => NodeKind::Lambda,
            Node::Transform(_) => NodeKind::Transform,
            Node::Block(_) => NodeKind::Block,
            Node::Var(_) => NodeKind::Var,
            Node::Assign(_) => NodeKind::Assign,
            Node::Run(_) => NodeKind::Run,
            Node::Hint(_) => NodeKind::Hint,
            Node::Import(_) => NodeKind::Import,
            Node::If(_) => NodeKind::If,
            Node::While(_) => NodeKind::While,
            Node::ForEach(_) => NodeKind::ForEach,
            Node::Break(_) => NodeKind::Break,
            Node::Continue(_) => NodeKind::Continue,
            Node::Try(_) => NodeKind::Try,
            Node::Return(_) => NodeKind::Return,
            Node::Exit(_) => NodeKind::Exit,
            Node::Throw(_) => NodeKind::Throw,
        }
    }

    /// Get the span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Literal(n) => n.span,
            Node::List(n) => n.span,
            Node::Object(n) => n.span,
            Node::Ident(n) => n.span,
            Node::Param(n) => n.span,
            Node::Current(n) => n.span,
            Node::Member(n) => n.span,
            Node::Index(n) => n.span,
            Node::Call(n) => n.span,
            Node::Unary(n) => n.span,
            Node::Binary(n) => n.span,
            Node::Logical(n) => n.span,
            Node::Ternary(n) => n.span,
            Node::Group(n) => n.span,
            Node::Lambda(n) => n.span,
            Node::Transform(n) => n.span,
            Node::Block(n) => n.span,
            Node::Var(n) => n.span,
            Node::Assign(n) => n.span,
            Node::Run(n) => n.span,
            Node::Hint(n) => n.span,
            Node::Import(n) => n.span,
            Node::If(n) => n.span,
            Node::While(n) => n.span,
            Node::ForEach(n) => n.span,
            Node::Break(n) => n.span,
            Node::Continue(n) => n.span,
            Node::Try(n) => n.span,
            Node::Return(n) => n.span,
            Node::Exit(n) => n.span,
            Node::Throw(n) => n.span,
        }
    }
}

/// An identifier with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Literal<'ast> {
    pub value: LiteralValue<'ast>,
    pub span: Span,
}

/// The value of a literal. Opaque to the compiler beyond its constant form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue<'ast> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(&'ast str),
}

/// A list constructor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListNode<'ast> {
    pub items: &'ast [Node<'ast>],
    pub span: Span,
}

/// An object constructor. Field order is preserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectNode<'ast> {
    pub fields: &'ast [Field<'ast>],
    pub span: Span,
}

/// One `key: value` entry of an object constructor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field<'ast> {
    pub key: &'ast str,
    pub value: &'ast Node<'ast>,
    pub span: Span,
}

/// A host parameter reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamNode<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

/// The `#` element reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentNode {
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberNode<'ast> {
    pub object: &'ast Node<'ast>,
    pub name: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexNode<'ast> {
    pub object: &'ast Node<'ast>,
    pub index: &'ast Node<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallNode<'ast> {
    pub callee: &'ast Node<'ast>,
    pub args: &'ast [Node<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryNode<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Node<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryNode<'ast> {
    pub op: BinaryOp,
    pub left: &'ast Node<'ast>,
    pub right: &'ast Node<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalNode<'ast> {
    pub op: LogicalOp,
    pub left: &'ast Node<'ast>,
    pub right: &'ast Node<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TernaryNode<'ast> {
    pub condition: &'ast Node<'ast>,
    pub then_value: &'ast Node<'ast>,
    pub else_value: &'ast Node<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupNode<'ast> {
    pub inner: &'ast Node<'ast>,
    pub span: Span,
}

/// An anonymous function. The body is compiled into its own function code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambdaNode<'ast> {
    pub params: &'ast [Ident<'ast>],
    pub body: &'ast Node<'ast>,
    pub span: Span,
}

/// How a transform applies its shape to the source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMode {
    /// `source => [shape]`: evaluate `shape` once per element, collecting a list.
    Each,
    /// `source => {shape}`: evaluate `shape` once with `#` bound to `source`.
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformNode<'ast> {
    pub source: &'ast Node<'ast>,
    pub shape: &'ast Node<'ast>,
    pub mode: TransformMode,
    pub span: Span,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockNode<'ast> {
    pub stmts: &'ast [Node<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarNode<'ast> {
    pub name: Ident<'ast>,
    pub init: &'ast Node<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignNode<'ast> {
    pub name: Ident<'ast>,
    pub value: &'ast Node<'ast>,
    pub span: Span,
}

/// Evaluate an expression for its side effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunNode<'ast> {
    pub expr: &'ast Node<'ast>,
    pub span: Span,
}

/// An execution option for the VM, such as a numeric precision setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HintNode<'ast> {
    pub name: Ident<'ast>,
    pub value: LiteralValue<'ast>,
    pub span: Span,
}

/// What an import statement loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import "name" as x`: a host-provided function library.
    Module,
    /// `import @"/path" as x`: another query resource, loaded as a function.
    Resource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportNode<'ast> {
    pub kind: ImportKind,
    pub path: &'ast str,
    pub alias: Ident<'ast>,
    pub span: Span,
}

/// One `if`/`else if` arm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfBranch<'ast> {
    pub condition: &'ast Node<'ast>,
    pub body: &'ast Node<'ast>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfNode<'ast> {
    /// The `if` arm followed by every `else if` arm. Never empty.
    pub branches: &'ast [IfBranch<'ast>],
    pub else_body: Option<&'ast Node<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileNode<'ast> {
    pub condition: &'ast Node<'ast>,
    pub body: &'ast Node<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForEachNode<'ast> {
    pub binding: Ident<'ast>,
    pub iterable: &'ast Node<'ast>,
    pub body: &'ast Node<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakNode {
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinueNode {
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TryNode<'ast> {
    pub body: &'ast Node<'ast>,
    /// Name bound to the caught error inside `handler`, if any.
    pub binding: Option<Ident<'ast>>,
    pub handler: &'ast Node<'ast>,
    pub span: Span,
}

/// `return` / `exit`: finish with a result code and optional data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeNode<'ast> {
    pub code: i64,
    pub data: Option<&'ast Node<'ast>>,
    pub span: Span,
}

/// `throw`: raise an error code with a data value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowNode<'ast> {
    pub code: i64,
    pub data: &'ast Node<'ast>,
    pub span: Span,
}
