//! Throw statement compilation.
//!
//! A `throw` carries an integer error code and a data expression. It lowers
//! to
//!
//! ```text
//! LDC code
//! <data>
//! THROW
//! ```
//!
//! The order is fixed: the VM's `THROW` pops the data value first and the
//! code second, so the code must be pushed before the data is evaluated.
//! Immediately before `THROW` the operand stack holds exactly two more values
//! than when the statement started. `THROW` never falls through; what happens
//! next is the VM's business, not the compiler's.
//!
//! A throw is not a scope and pushes no frame. When it appears inside the
//! guarded body of a `try`, the handler frame is already on the
//! [`CompilerStack`], and the throw is counted against it so the emitted
//! [`HandlerRegion`](crate::bytecode::HandlerRegion) reflects every throw
//! site it covers. A throw in a catch path belongs to the next handler out.

use quill_ast::Node;
use quill_core::NodeKind;
use tracing::trace;

use super::Result;
use crate::bytecode::{Constant, OpCode};
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::CompilerStack;

/// Compile `throw code, data`.
///
/// The data expression is compiled in value position through the
/// dispatcher, so any expression kind works, including another `throw`:
/// the inner one never completes and the outer `THROW` is unreachable but
/// still emitted in order.
///
/// # Errors
///
/// Propagates any error from compiling the data expression, and fails with
/// [`CompilationError::StackMismatch`](quill_core::CompilationError::StackMismatch)
/// if the data is a statement rather than an expression. Nothing after the
/// failing point is emitted.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn lower_throw(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Throw(throw) = *node else {
        return Err(unexpected(NodeKind::Throw, node));
    };

    queue.emit_constant(Constant::Int(throw.code))?;
    dx.compile_value(throw.data, queue, stack)?;

    if let Some(handler) = stack.innermost_guarded_handler_mut() {
        handler.throws += 1;
        trace!(code = throw.code, begin = handler.begin.index, "throw inside handler");
    }
    queue.emit_op(OpCode::Throw);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompileOptions;
    use crate::registry::CompilerRegistry;
    use crate::stack::{FrameData, FunctionFrame};
    use crate::test_utils::{compile, init_test_logging, main_listing};
    use crate::{CompilationError, Compiler, FunctionId};
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;
    use quill_ast::{AstBuilder, BinaryOp};

    #[test]
    fn throw_code_then_data() {
        init_test_logging();
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.throw(404, ast.string("not found"));
        assert_eq!(
            main_listing(&root),
            vec!["LDC 404", "LDC \"not found\"", "THROW"]
        );
    }

    #[test]
    fn nested_throw_keeps_order_at_each_level() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.throw(1, ast.throw(2, ast.int(0)));
        assert_eq!(
            main_listing(&root),
            vec!["LDC 1", "LDC 2", "LDC 0", "THROW", "THROW"]
        );
    }

    #[test]
    fn data_expression_is_compiled_in_place() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.throw(
            500,
            ast.binary(BinaryOp::Add, ast.string("bad: "), ast.param("id")),
        );
        assert_eq!(
            main_listing(&root),
            vec![
                "LDC 500",
                "LDC \"bad: \"",
                "LOAD_PARAM \"id\"",
                "ADD",
                "THROW",
            ]
        );
    }

    #[test]
    fn two_values_above_the_starting_depth() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut dx = Dispatcher::new(CompilerRegistry::standard(), CompileOptions::default());
        let mut queue = InstructionQueue::new();
        let mut stack = CompilerStack::new();
        let _ = stack.push_frame(FrameData::Function(FunctionFrame {
            function: FunctionId::MAIN,
            next_slot: 0,
        }));

        // Something already on the operand stack from the context.
        queue.emit_op(OpCode::PushNull);
        dx.compile(&ast.throw(7, ast.list(&[])), &mut queue, &mut stack)
            .unwrap();

        assert_eq!(queue.max_depth(), 3);
        assert_eq!(queue.depth(), 1);
        assert!(!queue.is_reachable());
        // No frame of its own.
        assert_eq!(stack.height(), 1);
    }

    #[test]
    fn statement_as_data_is_rejected() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.throw(1, ast.block(&[]));
        let err = Compiler::new().compile(&root).unwrap_err();
        assert!(matches!(
            err,
            CompilationError::StackMismatch {
                kind: NodeKind::Block,
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn counts_against_innermost_guarded_handler() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.try_catch(
            ast.block(&[
                ast.if_else(ast.ident("a"), ast.throw(1, ast.null()), None),
                ast.try_catch(ast.throw(2, ast.null()), None, ast.throw(3, ast.null())),
            ]),
            None,
            ast.block(&[]),
        );
        let program = compile(&root);
        let throws: Vec<u32> = program.handlers().iter().map(|h| h.throws).collect();
        // Inner region closes first. Its catch-path throw counts outward.
        assert_eq!(throws, vec![1, 2]);
    }
}
