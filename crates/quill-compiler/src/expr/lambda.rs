//! Lambda compilation.
//!
//! A lambda body is compiled into its own function in the program's
//! function table. Parameters occupy slots `0..n` of that function, and the
//! body ends with an implicit return exactly like the query root. The
//! enclosing function receives a single `MAKE_LAMBDA`.

use quill_ast::{LambdaNode, Node};
use quill_core::{CompilationError, NodeKind};

use super::Result;
use crate::bytecode::{OpCode, Operand};
use crate::compiler::lower_body;
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::{CompilerStack, FrameData, FunctionFrame, MAX_LOCALS};

/// Compile a lambda expression.
pub fn lower_lambda(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Lambda(lambda) = *node else {
        return Err(unexpected(NodeKind::Lambda, node));
    };

    let params = u16::try_from(lambda.params.len()).map_err(|_| CompilationError::TooManyLocals {
        limit: MAX_LOCALS,
        span: lambda.span,
    })?;

    let function = queue.begin_function(params);
    let handle = stack.push_frame(FrameData::Function(FunctionFrame {
        function,
        next_slot: 0,
    }));
    let body = lower_function(lambda, dx, queue, stack);
    let frame = stack.pop_frame(handle);
    body?;

    let locals = frame?.into_function().map_or(params, |f| f.next_slot);
    let id = queue.end_function(locals)?;
    queue.emit(OpCode::MakeLambda, Operand::Function(id));
    Ok(())
}

fn lower_function(
    lambda: &LambdaNode<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    for param in lambda.params {
        stack.declare(param.name, param.span)?;
    }
    lower_body(lambda.body, dx, queue, stack)
}

#[cfg(test)]
mod tests {
    use crate::FunctionId;
    use crate::test_utils::compile;
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;
    use quill_ast::{AstBuilder, BinaryOp};

    #[test]
    fn lambda_gets_its_own_function() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.lambda(
            &["a", "b"],
            ast.binary(BinaryOp::Add, ast.ident("a"), ast.ident("b")),
        );
        let program = compile(&root);

        assert_eq!(
            program.listing(FunctionId::MAIN),
            vec!["LDC 0", "MAKE_LAMBDA fn1", "RETURN"]
        );
        assert_eq!(
            program.listing(FunctionId(1)),
            vec!["LDC 0", "LOAD 0:0", "LOAD 0:1", "ADD", "RETURN"]
        );
        let lambda = program.function(FunctionId(1)).unwrap();
        assert_eq!((lambda.params, lambda.locals), (2, 2));
    }

    #[test]
    fn lambda_reads_enclosing_locals() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.block(&[
            ast.var("base", ast.int(10)),
            ast.var(
                "add",
                ast.lambda(&["x"], ast.binary(BinaryOp::Add, ast.ident("x"), ast.ident("base"))),
            ),
        ]);
        let program = compile(&root);
        assert_eq!(
            program.listing(FunctionId(1)),
            vec!["LDC 0", "LOAD 0:0", "LOAD 1:0", "ADD", "RETURN"]
        );
        assert_eq!(program.main().locals, 2);
    }

    #[test]
    fn statement_body_returns_null() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.lambda(&[], ast.block(&[]));
        let program = compile(&root);
        assert_eq!(
            program.listing(FunctionId(1)),
            vec!["LDC 0", "PUSH_NULL", "RETURN"]
        );
    }
}
