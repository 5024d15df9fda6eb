//! Function call compilation.
//!
//! ```text
//! f(a, b)      f, a, b, CALL 2
//! ```

use quill_ast::Node;
use quill_core::{CompilationError, NodeKind};

use super::Result;
use crate::bytecode::{OpCode, Operand};
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::CompilerStack;

/// Compile a call. The callee is evaluated before the arguments.
pub fn lower_call(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Call(call) = *node else {
        return Err(unexpected(NodeKind::Call, node));
    };

    let argc = u16::try_from(call.args.len()).map_err(|_| {
        CompilationError::internal(format!(
            "call at {} has {} arguments, more than an instruction can encode",
            call.span,
            call.args.len()
        ))
    })?;

    dx.compile_value(call.callee, queue, stack)?;
    dx.compile_values(call.args, queue, stack)?;
    queue.emit(OpCode::Call, Operand::Count(argc));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{compile, main_listing};
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;
    use quill_ast::AstBuilder;

    #[test]
    fn callee_then_args() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.call(ast.ident("max"), &[ast.int(1), ast.int(2)]);
        assert_eq!(
            main_listing(&root),
            vec![
                "LDC 0",
                "LOAD_GLOBAL \"max\"",
                "LDC 1",
                "LDC 2",
                "CALL 2",
                "RETURN"
            ]
        );
    }

    #[test]
    fn call_collapses_to_one_value() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.call(ast.ident("now"), &[]);
        let program = compile(&root);
        assert_eq!(
            program.listing(crate::FunctionId::MAIN),
            vec!["LDC 0", "LOAD_GLOBAL \"now\"", "CALL 0", "RETURN"]
        );
        assert_eq!(program.main().max_stack, 2);
    }
}
