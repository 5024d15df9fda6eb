//! Arena-backed AST construction.
//!
//! [`AstBuilder`] is the convenience API a parser (or a test) uses to build
//! nodes without spelling out every struct. Every node it creates carries the
//! builder's current span; use [`AstBuilder::at`] to place nodes on a line.

use bumpalo::Bump;
use quill_core::Span;

use crate::node::*;
use crate::ops::{BinaryOp, LogicalOp, UnaryOp};

/// Builds [`Node`]s in an arena.
#[derive(Clone, Copy)]
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    span: Span,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            span: Span::default(),
        }
    }

    /// A builder whose nodes start at `line:col`.
    pub fn at(self, line: u32, col: u32) -> Self {
        Self {
            span: Span::point(line, col),
            ..self
        }
    }

    /// The arena nodes are allocated in.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    fn alloc<T>(&self, value: T) -> &'ast T {
        self.arena.alloc(value)
    }

    fn nodes(&self, nodes: &[Node<'ast>]) -> &'ast [Node<'ast>] {
        self.arena.alloc_slice_copy(nodes)
    }

    fn str(&self, s: &str) -> &'ast str {
        self.arena.alloc_str(s)
    }

    fn name(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.str(name), self.span)
    }

    // ==========================================================================
    // Literals
    // ==========================================================================

    pub fn literal(&self, value: LiteralValue<'ast>) -> Node<'ast> {
        Node::Literal(Literal {
            value,
            span: self.span,
        })
    }

    pub fn null(&self) -> Node<'ast> {
        self.literal(LiteralValue::Null)
    }

    pub fn bool(&self, value: bool) -> Node<'ast> {
        self.literal(LiteralValue::Bool(value))
    }

    pub fn int(&self, value: i64) -> Node<'ast> {
        self.literal(LiteralValue::Int(value))
    }

    pub fn float(&self, value: f64) -> Node<'ast> {
        self.literal(LiteralValue::Float(value))
    }

    pub fn string(&self, value: &str) -> Node<'ast> {
        self.literal(LiteralValue::String(self.str(value)))
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    pub fn list(&self, items: &[Node<'ast>]) -> Node<'ast> {
        Node::List(ListNode {
            items: self.nodes(items),
            span: self.span,
        })
    }

    pub fn object(&self, fields: &[(&str, Node<'ast>)]) -> Node<'ast> {
        let fields = self
            .arena
            .alloc_slice_fill_iter(fields.iter().map(|(key, value)| Field {
                key: self.str(key),
                value: self.alloc(*value),
                span: self.span,
            }));
        Node::Object(ObjectNode {
            fields,
            span: self.span,
        })
    }

    pub fn ident(&self, name: &str) -> Node<'ast> {
        Node::Ident(self.name(name))
    }

    pub fn param(&self, name: &str) -> Node<'ast> {
        Node::Param(ParamNode {
            name: self.str(name),
            span: self.span,
        })
    }

    pub fn current(&self) -> Node<'ast> {
        Node::Current(CurrentNode { span: self.span })
    }

    pub fn member(&self, object: Node<'ast>, name: &str) -> Node<'ast> {
        Node::Member(self.alloc(MemberNode {
            object: self.alloc(object),
            name: self.name(name),
            span: self.span,
        }))
    }

    pub fn index(&self, object: Node<'ast>, index: Node<'ast>) -> Node<'ast> {
        Node::Index(self.alloc(IndexNode {
            object: self.alloc(object),
            index: self.alloc(index),
            span: self.span,
        }))
    }

    pub fn call(&self, callee: Node<'ast>, args: &[Node<'ast>]) -> Node<'ast> {
        Node::Call(self.alloc(CallNode {
            callee: self.alloc(callee),
            args: self.nodes(args),
            span: self.span,
        }))
    }

    pub fn unary(&self, op: UnaryOp, operand: Node<'ast>) -> Node<'ast> {
        Node::Unary(self.alloc(UnaryNode {
            op,
            operand: self.alloc(operand),
            span: self.span,
        }))
    }

    pub fn binary(&self, op: BinaryOp, left: Node<'ast>, right: Node<'ast>) -> Node<'ast> {
        Node::Binary(self.alloc(BinaryNode {
            op,
            left: self.alloc(left),
            right: self.alloc(right),
            span: self.span,
        }))
    }

    pub fn logical(&self, op: LogicalOp, left: Node<'ast>, right: Node<'ast>) -> Node<'ast> {
        Node::Logical(self.alloc(LogicalNode {
            op,
            left: self.alloc(left),
            right: self.alloc(right),
            span: self.span,
        }))
    }

    pub fn ternary(
        &self,
        condition: Node<'ast>,
        then_value: Node<'ast>,
        else_value: Node<'ast>,
    ) -> Node<'ast> {
        Node::Ternary(self.alloc(TernaryNode {
            condition: self.alloc(condition),
            then_value: self.alloc(then_value),
            else_value: self.alloc(else_value),
            span: self.span,
        }))
    }

    pub fn group(&self, inner: Node<'ast>) -> Node<'ast> {
        Node::Group(self.alloc(GroupNode {
            inner: self.alloc(inner),
            span: self.span,
        }))
    }

    pub fn lambda(&self, params: &[&str], body: Node<'ast>) -> Node<'ast> {
        let params = self
            .arena
            .alloc_slice_fill_iter(params.iter().map(|p| self.name(p)));
        Node::Lambda(self.alloc(LambdaNode {
            params,
            body: self.alloc(body),
            span: self.span,
        }))
    }

    pub fn transform(
        &self,
        source: Node<'ast>,
        shape: Node<'ast>,
        mode: TransformMode,
    ) -> Node<'ast> {
        Node::Transform(self.alloc(TransformNode {
            source: self.alloc(source),
            shape: self.alloc(shape),
            mode,
            span: self.span,
        }))
    }

    /// `source => [shape]`
    pub fn each(&self, source: Node<'ast>, shape: Node<'ast>) -> Node<'ast> {
        self.transform(source, shape, TransformMode::Each)
    }

    /// `source => {shape}`
    pub fn single(&self, source: Node<'ast>, shape: Node<'ast>) -> Node<'ast> {
        self.transform(source, shape, TransformMode::Single)
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    pub fn block(&self, stmts: &[Node<'ast>]) -> Node<'ast> {
        Node::Block(BlockNode {
            stmts: self.nodes(stmts),
            span: self.span,
        })
    }

    pub fn var(&self, name: &str, init: Node<'ast>) -> Node<'ast> {
        Node::Var(self.alloc(VarNode {
            name: self.name(name),
            init: self.alloc(init),
            span: self.span,
        }))
    }

    pub fn assign(&self, name: &str, value: Node<'ast>) -> Node<'ast> {
        Node::Assign(self.alloc(AssignNode {
            name: self.name(name),
            value: self.alloc(value),
            span: self.span,
        }))
    }

    pub fn run(&self, expr: Node<'ast>) -> Node<'ast> {
        Node::Run(self.alloc(RunNode {
            expr: self.alloc(expr),
            span: self.span,
        }))
    }

    pub fn hint(&self, name: &str, value: LiteralValue<'ast>) -> Node<'ast> {
        Node::Hint(HintNode {
            name: self.name(name),
            value,
            span: self.span,
        })
    }

    pub fn import(&self, kind: ImportKind, path: &str, alias: &str) -> Node<'ast> {
        Node::Import(ImportNode {
            kind,
            path: self.str(path),
            alias: self.name(alias),
            span: self.span,
        })
    }

    /// `if (condition) then_body else else_body`
    pub fn if_else(
        &self,
        condition: Node<'ast>,
        then_body: Node<'ast>,
        else_body: Option<Node<'ast>>,
    ) -> Node<'ast> {
        self.if_chain(&[(condition, then_body)], else_body)
    }

    /// `if (c0) b0 else if (c1) b1 ... else else_body`
    pub fn if_chain(
        &self,
        arms: &[(Node<'ast>, Node<'ast>)],
        else_body: Option<Node<'ast>>,
    ) -> Node<'ast> {
        let branches = self
            .arena
            .alloc_slice_fill_iter(arms.iter().map(|(condition, body)| IfBranch {
                condition: self.alloc(*condition),
                body: self.alloc(*body),
            }));
        Node::If(self.alloc(IfNode {
            branches,
            else_body: else_body.map(|body| self.alloc(body)),
            span: self.span,
        }))
    }

    pub fn while_loop(&self, condition: Node<'ast>, body: Node<'ast>) -> Node<'ast> {
        Node::While(self.alloc(WhileNode {
            condition: self.alloc(condition),
            body: self.alloc(body),
            span: self.span,
        }))
    }

    pub fn for_each(&self, binding: &str, iterable: Node<'ast>, body: Node<'ast>) -> Node<'ast> {
        Node::ForEach(self.alloc(ForEachNode {
            binding: self.name(binding),
            iterable: self.alloc(iterable),
            body: self.alloc(body),
            span: self.span,
        }))
    }

    pub fn break_stmt(&self) -> Node<'ast> {
        Node::Break(BreakNode { span: self.span })
    }

    pub fn continue_stmt(&self) -> Node<'ast> {
        Node::Continue(ContinueNode { span: self.span })
    }

    pub fn try_catch(
        &self,
        body: Node<'ast>,
        binding: Option<&str>,
        handler: Node<'ast>,
    ) -> Node<'ast> {
        Node::Try(self.alloc(TryNode {
            body: self.alloc(body),
            binding: binding.map(|name| self.name(name)),
            handler: self.alloc(handler),
            span: self.span,
        }))
    }

    fn outcome(&self, code: i64, data: Option<Node<'ast>>) -> &'ast OutcomeNode<'ast> {
        self.alloc(OutcomeNode {
            code,
            data: data.map(|d| self.alloc(d)),
            span: self.span,
        })
    }

    pub fn return_with(&self, code: i64, data: Option<Node<'ast>>) -> Node<'ast> {
        Node::Return(self.outcome(code, data))
    }

    pub fn exit_with(&self, code: i64, data: Option<Node<'ast>>) -> Node<'ast> {
        Node::Exit(self.outcome(code, data))
    }

    pub fn throw(&self, code: i64, data: Node<'ast>) -> Node<'ast> {
        Node::Throw(self.alloc(ThrowNode {
            code,
            data: self.alloc(data),
            span: self.span,
        }))
    }
}
