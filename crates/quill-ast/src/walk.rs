//! Structural traversal of the AST.
//!
//! [`Walk`] visits a tree depth-first with an explicit worklist instead of
//! recursion, so arbitrarily deep trees can be inspected without growing the
//! native call stack.

use crate::node::Node;

/// The direct children of a node, in source order.
pub struct Children<'ast> {
    inner: std::vec::IntoIter<&'ast Node<'ast>>,
}

impl<'ast> Iterator for Children<'ast> {
    type Item = &'ast Node<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}

impl<'ast> Node<'ast> {
    /// Iterate over the direct children of this node.
    pub fn children(&self) -> Children<'ast> {
        let mut out: Vec<&'ast Node<'ast>> = Vec::new();
        match *self {
            Node::Literal(_)
            | Node::Ident(_)
            | Node::Param(_)
            | Node::Current(_)
            | Node::Hint(_)
            | Node::Import(_)
            | Node::Break(_)
            | Node::Continue(_) => {}
            Node::List(n) => out.extend(n.items.iter()),
            Node::Object(n) => out.extend(n.fields.iter().map(|f| f.value)),
            Node::Member(n) => out.push(n.object),
            Node::Index(n) => {
                out.push(n.object);
                out.push(n.index);
            }
            Node::Call(n) => {
                out.push(n.callee);
                out.extend(n.args.iter());
            }
            Node::Unary(n) => out.push(n.operand),
            Node::Binary(n) => {
                out.push(n.left);
                out.push(n.right);
            }
            Node::Logical(n) => {
                out.push(n.left);
                out.push(n.right);
            }
            Node::Ternary(n) => {
                out.push(n.condition);
                out.push(n.then_value);
                out.push(n.else_value);
            }
            Node::Group(n) => out.push(n.inner),
            Node::Lambda(n) => out.push(n.body),
            Node::Transform(n) => {
                out.push(n.source);
                out.push(n.shape);
            }
            Node::Block(n) => out.extend(n.stmts.iter()),
            Node::Var(n) => out.push(n.init),
            Node::Assign(n) => out.push(n.value),
            Node::Run(n) => out.push(n.expr),
            Node::If(n) => {
                for branch in n.branches {
                    out.push(branch.condition);
                    out.push(branch.body);
                }
                out.extend(n.else_body);
            }
            Node::While(n) => {
                out.push(n.condition);
                out.push(n.body);
            }
            Node::ForEach(n) => {
                out.push(n.iterable);
                out.push(n.body);
            }
            Node::Try(n) => {
                out.push(n.body);
                out.push(n.handler);
            }
            Node::Return(n) | Node::Exit(n) => out.extend(n.data),
            Node::Throw(n) => out.push(n.data),
        }
        Children {
            inner: out.into_iter(),
        }
    }
}

/// Depth-first pre-order walk yielding each node with its nesting depth.
///
/// The root has depth 1.
pub struct Walk<'n, 'ast> {
    pending: Vec<(&'n Node<'ast>, usize)>,
}

impl<'n, 'ast> Walk<'n, 'ast> {
    pub fn new(root: &'n Node<'ast>) -> Self {
        Self {
            pending: vec![(root, 1)],
        }
    }
}

impl<'n, 'ast: 'n> Iterator for Walk<'n, 'ast> {
    type Item = (&'n Node<'ast>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.pending.pop()?;
        let start = self.pending.len();
        self.pending.extend(node.children().map(|child| (child, depth + 1)));
        // Children were pushed in source order; reverse so the first is popped first.
        self.pending[start..].reverse();
        Some((node, depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AstBuilder, BinaryOp, NodeKind};
    use bumpalo::Bump;

    #[test]
    fn leaf_has_no_children() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        assert_eq!(ast.int(1).children().len(), 0);
    }

    #[test]
    fn throw_child_is_its_data() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let node = ast.throw(1, ast.string("x"));
        let kids: Vec<_> = node.children().map(|n| n.kind()).collect();
        assert_eq!(kids, vec![NodeKind::Literal]);
    }

    #[test]
    fn walk_is_preorder_with_depth() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.block(&[
            ast.var("a", ast.binary(BinaryOp::Add, ast.int(1), ast.int(2))),
            ast.run(ast.ident("a")),
        ]);

        let visited: Vec<_> = Walk::new(&root).map(|(n, d)| (n.kind(), d)).collect();
        assert_eq!(
            visited,
            vec![
                (NodeKind::Block, 1),
                (NodeKind::Var, 2),
                (NodeKind::Binary, 3),
                (NodeKind::Literal, 4),
                (NodeKind::Literal, 4),
                (NodeKind::Run, 2),
                (NodeKind::Ident, 3),
            ]
        );
    }

    #[test]
    fn walk_handles_deep_trees_without_recursion() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut node = ast.int(0);
        for _ in 0..100_000 {
            node = ast.group(node);
        }
        let max = Walk::new(&node).map(|(_, d)| d).max();
        assert_eq!(max, Some(100_001));
    }
}
