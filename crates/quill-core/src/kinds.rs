//! Discriminators for AST node kinds and compile-time scope kinds.

use std::fmt;

/// The kind of an AST node.
///
/// One variant per language construct. The compiler registry is keyed by
/// this type, and [`NodeKind::ALL`] is the fixed enumeration the standard
/// registry is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum NodeKind {
    // Expressions
    Literal,
    List,
    Object,
    Ident,
    Param,
    Current,
    Member,
    Index,
    Call,
    Unary,
    Binary,
    Logical,
    Ternary,
    Group,
    Lambda,
    Transform,

    // Statements
    Block,
    Var,
    Assign,
    Run,
    Hint,
    Import,
    If,
    While,
    ForEach,
    Break,
    Continue,
    Try,
    Return,
    Exit,
    Throw,
}

/// Net operand-stack contribution of a node once its instructions have run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEffect {
    /// Leaves exactly one value on the operand stack.
    Value,
    /// Leaves the operand stack as it found it.
    Effect,
    /// Never falls through to the next instruction.
    Diverges,
}

impl NodeKind {
    /// Number of node kinds.
    pub const COUNT: usize = 31;

    /// Every node kind, in declaration order.
    pub const ALL: [NodeKind; Self::COUNT] = [
        NodeKind::Literal,
        NodeKind::List,
        NodeKind::Object,
        NodeKind::Ident,
        NodeKind::Param,
        NodeKind::Current,
        NodeKind::Member,
        NodeKind::Index,
        NodeKind::Call,
        NodeKind::Unary,
        NodeKind::Binary,
        NodeKind::Logical,
        NodeKind::Ternary,
        NodeKind::Group,
        NodeKind::Lambda,
        NodeKind::Transform,
        NodeKind::Block,
        NodeKind::Var,
        NodeKind::Assign,
        NodeKind::Run,
        NodeKind::Hint,
        NodeKind::Import,
        NodeKind::If,
        NodeKind::While,
        NodeKind::ForEach,
        NodeKind::Break,
        NodeKind::Continue,
        NodeKind::Try,
        NodeKind::Return,
        NodeKind::Exit,
        NodeKind::Throw,
    ];

    /// Dense index of this kind, suitable for table lookups.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable name of the construct.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Literal => "literal",
            NodeKind::List => "list",
            NodeKind::Object => "object",
            NodeKind::Ident => "identifier",
            NodeKind::Param => "parameter",
            NodeKind::Current => "current element",
            NodeKind::Member => "member access",
            NodeKind::Index => "index",
            NodeKind::Call => "call",
            NodeKind::Unary => "unary operation",
            NodeKind::Binary => "binary operation",
            NodeKind::Logical => "logical operation",
            NodeKind::Ternary => "ternary",
            NodeKind::Group => "group",
            NodeKind::Lambda => "lambda",
            NodeKind::Transform => "transform",
            NodeKind::Block => "block",
            NodeKind::Var => "var",
            NodeKind::Assign => "assignment",
            NodeKind::Run => "run",
            NodeKind::Hint => "hint",
            NodeKind::Import => "import",
            NodeKind::If => "if",
            NodeKind::While => "while",
            NodeKind::ForEach => "for-each",
            NodeKind::Break => "break",
            NodeKind::Continue => "continue",
            NodeKind::Try => "try",
            NodeKind::Return => "return",
            NodeKind::Exit => "exit",
            NodeKind::Throw => "throw",
        }
    }

    /// The stack contract every compiler for this kind must honor.
    pub fn stack_effect(self) -> StackEffect {
        match self {
            NodeKind::Literal
            | NodeKind::List
            | NodeKind::Object
            | NodeKind::Ident
            | NodeKind::Param
            | NodeKind::Current
            | NodeKind::Member
            | NodeKind::Index
            | NodeKind::Call
            | NodeKind::Unary
            | NodeKind::Binary
            | NodeKind::Logical
            | NodeKind::Ternary
            | NodeKind::Group
            | NodeKind::Lambda
            | NodeKind::Transform => StackEffect::Value,

            NodeKind::Block
            | NodeKind::Var
            | NodeKind::Assign
            | NodeKind::Run
            | NodeKind::Hint
            | NodeKind::Import
            | NodeKind::If
            | NodeKind::While
            | NodeKind::ForEach
            | NodeKind::Try => StackEffect::Effect,

            NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Return
            | NodeKind::Exit
            | NodeKind::Throw => StackEffect::Diverges,
        }
    }

    /// The scope this kind opens on the compiler stack, if any.
    pub fn scope(self) -> Option<ScopeKind> {
        match self {
            NodeKind::Lambda => Some(ScopeKind::Function),
            NodeKind::While | NodeKind::ForEach => Some(ScopeKind::Loop),
            NodeKind::Try => Some(ScopeKind::Handler),
            NodeKind::If | NodeKind::Ternary => Some(ScopeKind::Branch),
            NodeKind::Block => Some(ScopeKind::Block),
            NodeKind::Transform => Some(ScopeKind::Transform),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kind of a compile-time scope frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// A function body: the program root or a lambda. Owns local slots.
    Function,
    /// A loop: target of `break` and `continue`.
    Loop,
    /// A `try` construct and its guarded region.
    Handler,
    /// A conditional with branches (`if`, ternary).
    Branch,
    /// A lexical block.
    Block,
    /// A transform, binding the current element `#`.
    Transform,
}

impl ScopeKind {
    pub fn name(self) -> &'static str {
        match self {
            ScopeKind::Function => "function",
            ScopeKind::Loop => "loop",
            ScopeKind::Handler => "handler",
            ScopeKind::Branch => "branch",
            ScopeKind::Block => "block",
            ScopeKind::Transform => "transform",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
