//! `return` and `exit`.
//!
//! Both end execution with a `(code, data)` pair. `return` leaves the current
//! function, closing any handlers it is inside first. `exit` ends the whole
//! query, so open handlers are irrelevant to it.

use quill_ast::{Node, OutcomeNode};
use quill_core::{NodeKind, ScopeKind};

use super::Result;
use crate::bytecode::{Constant, OpCode};
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::CompilerStack;

/// Compile `return code, data`.
pub fn lower_return(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Return(outcome) = *node else {
        return Err(unexpected(NodeKind::Return, node));
    };
    lower_outcome(OpCode::Return, outcome, dx, queue, stack)
}

/// Compile `exit code, data`.
pub fn lower_exit(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Exit(outcome) = *node else {
        return Err(unexpected(NodeKind::Exit, node));
    };
    lower_outcome(OpCode::Exit, outcome, dx, queue, stack)
}

fn lower_outcome(
    op: OpCode,
    outcome: &OutcomeNode<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    queue.emit_constant(Constant::Int(outcome.code))?;
    match outcome.data {
        Some(data) => dx.compile_value(data, queue, stack)?,
        None => {
            queue.emit_op(OpCode::PushNull);
        }
    }

    if op == OpCode::Return {
        for _ in 0..stack.guarded_handlers_until(ScopeKind::Function) {
            queue.emit_op(OpCode::TryEnd);
        }
    }
    queue.emit_op(op);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::FunctionId;
    use crate::test_utils::{compile, main_listing};
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;
    use quill_ast::AstBuilder;

    #[test]
    fn return_with_data() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.return_with(0, Some(ast.object(&[("ok", ast.bool(true))])));
        assert_eq!(
            main_listing(&root),
            vec!["LDC 0", "NEW_OBJECT", "PUSH_TRUE", "PUT \"ok\"", "RETURN"]
        );
    }

    #[test]
    fn exit_without_data_pushes_null() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.exit_with(3, None);
        assert_eq!(main_listing(&root), vec!["LDC 3", "PUSH_NULL", "EXIT"]);
    }

    #[test]
    fn return_closes_open_handlers() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.try_catch(
            ast.try_catch(ast.return_with(1, None), None, ast.block(&[])),
            None,
            ast.block(&[]),
        );
        assert_eq!(
            &main_listing(&root)[..6],
            &[
                "TRY_BEGIN @10",
                "TRY_BEGIN @7",
                "LDC 1",
                "PUSH_NULL",
                "TRY_END",
                "TRY_END",
            ]
        );
    }

    #[test]
    fn exit_leaves_handlers_open() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.try_catch(ast.exit_with(2, None), None, ast.block(&[]));
        assert_eq!(
            &main_listing(&root)[..4],
            &["TRY_BEGIN @4", "LDC 2", "PUSH_NULL", "EXIT"]
        );
    }

    #[test]
    fn return_in_lambda_ignores_outer_handlers() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.try_catch(
            ast.run(ast.lambda(&[], ast.block(&[ast.return_with(0, None)]))),
            None,
            ast.block(&[]),
        );
        let program = compile(&root);
        assert_eq!(
            program.listing(FunctionId(1)),
            vec!["LDC 0", "PUSH_NULL", "RETURN"]
        );
    }
}
