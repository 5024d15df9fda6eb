//! Routes nodes to their compilers.
//!
//! The [`Dispatcher`] is the single entry point for lowering a node. Node
//! compilers never call each other directly; to lower a child they hand it
//! back to the dispatcher, which resolves the child's compiler from the
//! registry, attaches its source line, and checks its stack contract.

use quill_ast::Node;
use quill_core::{CompilationError, NodeKind, StackEffect};
use tracing::trace;

use crate::bytecode::OpCode;
use crate::emit::InstructionQueue;
use crate::options::CompileOptions;
use crate::registry::CompilerRegistry;
use crate::stack::CompilerStack;

type Result<T> = std::result::Result<T, CompilationError>;

/// Resolves and invokes node compilers.
#[derive(Debug)]
pub struct Dispatcher<'r> {
    registry: &'r CompilerRegistry,
    options: CompileOptions,
    depth: usize,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r CompilerRegistry, options: CompileOptions) -> Self {
        Self {
            registry,
            options,
            depth: 0,
        }
    }

    pub fn registry(&self) -> &'r CompilerRegistry {
        self.registry
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Nesting depth of the node currently being lowered.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Lower `node` with the compiler registered for its kind.
    ///
    /// Fails before emitting anything if no compiler is registered or the
    /// nesting limit is reached. On success the operand stack has moved as
    /// the kind's [`StackEffect`] requires.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(
        &mut self,
        node: &Node<'_>,
        queue: &mut InstructionQueue,
        stack: &mut CompilerStack,
    ) -> Result<()> {
        let kind = node.kind();
        let span = node.span();
        let lower = self.registry.resolve(kind, span)?;

        if self.depth >= self.options.max_depth {
            return Err(CompilationError::DepthExceeded {
                limit: self.options.max_depth,
                span,
            });
        }

        trace!(%kind, line = span.line, depth = self.depth, "lower");

        let saved_line = queue.line();
        if self.options.line_info() && !span.is_synthetic() {
            queue.set_line(span.line);
        }
        let start = queue.depth();
        let (height, pushes) = (stack.height(), stack.stats().pushes);

        self.depth += 1;
        let result = lower(node, self, queue, stack);
        self.depth -= 1;
        queue.set_line(saved_line);
        result?;

        debug_assert_eq!(stack.height(), height, "{kind} left scope frames open");
        if let Some(scope) = kind.scope() {
            debug_assert!(
                stack.stats().pushes > pushes,
                "{kind} opened no {scope} scope"
            );
        }

        self.settle(node, start, queue)
    }

    /// Check the stack contract of `node` after its compiler ran.
    fn settle(&self, node: &Node<'_>, start: u32, queue: &mut InstructionQueue) -> Result<()> {
        let kind = node.kind();
        let expected = match kind.stack_effect() {
            StackEffect::Diverges => {
                // Nothing after a diverging node runs, so the code that
                // follows inherits the depth the node started at.
                queue.assume_depth(start);
                return Ok(());
            }
            StackEffect::Value => start + 1,
            StackEffect::Effect => start,
        };

        let found = queue.depth();
        if self.options.verify_stack() && found != expected {
            return Err(CompilationError::StackMismatch {
                kind,
                expected,
                found,
                span: node.span(),
            });
        }
        Ok(())
    }

    /// Lower `node` where a value is required.
    ///
    /// A diverging node is accepted: it never completes, so the code after it
    /// may assume the value it would have produced. A statement is rejected.
    pub fn compile_value(
        &mut self,
        node: &Node<'_>,
        queue: &mut InstructionQueue,
        stack: &mut CompilerStack,
    ) -> Result<()> {
        let start = queue.depth();
        match node.kind().stack_effect() {
            StackEffect::Value => self.compile(node, queue, stack),
            StackEffect::Diverges => {
                self.compile(node, queue, stack)?;
                queue.assume_depth(start + 1);
                Ok(())
            }
            StackEffect::Effect => Err(CompilationError::StackMismatch {
                kind: node.kind(),
                expected: start + 1,
                found: start,
                span: node.span(),
            }),
        }
    }

    /// Lower `node` in statement position, dropping any value it produces.
    pub fn compile_discard(
        &mut self,
        node: &Node<'_>,
        queue: &mut InstructionQueue,
        stack: &mut CompilerStack,
    ) -> Result<()> {
        self.compile(node, queue, stack)?;
        if node.kind().stack_effect() == StackEffect::Value {
            queue.emit_op(OpCode::Pop);
        }
        Ok(())
    }

    /// Lower each of `nodes` in value position, in order.
    pub fn compile_values(
        &mut self,
        nodes: &[Node<'_>],
        queue: &mut InstructionQueue,
        stack: &mut CompilerStack,
    ) -> Result<()> {
        nodes
            .iter()
            .try_for_each(|node| self.compile_value(node, queue, stack))
    }
}

/// Error for a compiler handed a node of a kind it does not lower.
pub(crate) fn unexpected(expected: NodeKind, node: &Node<'_>) -> CompilationError {
    CompilationError::internal(format!(
        "{expected} compiler invoked on a {} node at {}",
        node.kind(),
        node.span()
    ))
}
