//! Transform compilation (`source => [shape]` and `source => {shape}`).
//!
//! A transform evaluates `shape` with `#` bound to an element of `source`.
//! Each-mode maps every element and collects the results into a new list;
//! single-mode shapes the source as a whole.
//!
//! Each-mode layout, with two hidden local slots `acc` and `cur`:
//! ```text
//!       NEW_LIST, STORE acc
//!       source, ITER_START
//! next: ITER_NEXT exit
//!       STORE cur
//!       LOAD acc, shape, PUSH, POP
//!       JUMP next
//! exit: POP, LOAD acc
//! ```
//!
//! Single-mode layout:
//! ```text
//!       source, STORE cur, shape
//! ```

use quill_ast::{Node, TransformMode, TransformNode};
use quill_core::NodeKind;

use super::Result;
use crate::bytecode::{LocalRef, OpCode, Operand};
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::{CompilerStack, FrameData, TransformFrame};

/// Compile a transform.
pub fn lower_transform(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Transform(transform) = *node else {
        return Err(unexpected(NodeKind::Transform, node));
    };

    match transform.mode {
        TransformMode::Each => lower_each(transform, dx, queue, stack),
        TransformMode::Single => lower_single(transform, dx, queue, stack),
    }
}

fn lower_each(
    transform: &TransformNode<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let acc = Operand::Local(LocalRef::new(0, stack.allocate_slot(transform.span)?));
    let cur = stack.allocate_slot(transform.span)?;

    queue.emit_op(OpCode::NewList);
    queue.emit(OpCode::Store, acc);
    dx.compile_value(transform.source, queue, stack)?;
    queue.emit_op(OpCode::IterStart);

    let next = queue.position();
    let depth = queue.depth();
    let exit = queue.emit_jump(OpCode::IterNext);
    queue.emit(OpCode::Store, Operand::Local(LocalRef::new(0, cur)));
    queue.emit(OpCode::Load, acc);
    shape(transform, cur, dx, queue, stack)?;
    queue.emit_op(OpCode::Push);
    queue.emit_op(OpCode::Pop);
    queue.emit_loop(next, depth)?;

    queue.bind(exit)?;
    queue.emit_op(OpCode::Pop);
    queue.emit(OpCode::Load, acc);
    Ok(())
}

fn lower_single(
    transform: &TransformNode<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let cur = stack.allocate_slot(transform.span)?;
    dx.compile_value(transform.source, queue, stack)?;
    queue.emit(OpCode::Store, Operand::Local(LocalRef::new(0, cur)));
    shape(transform, cur, dx, queue, stack)
}

/// Lower the shape with `#` bound to slot `element`.
fn shape(
    transform: &TransformNode<'_>,
    element: u16,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let handle = stack.push_frame(FrameData::Transform(TransformFrame { element }));
    let result = dx.compile_value(transform.shape, queue, stack);
    stack.pop_frame(handle)?;
    result
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{compile, main_listing};
    use crate::FunctionId;
    use bumpalo::Bump;
    use pretty_assertions::assert_eq;
    use quill_ast::AstBuilder;

    #[test]
    fn each_collects_shapes() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.each(ast.ident("users"), ast.member(ast.current(), "name"));
        assert_eq!(
            main_listing(&root),
            vec![
                "LDC 0",
                "NEW_LIST",
                "STORE 0:0",
                "LOAD_GLOBAL \"users\"",
                "ITER_START",
                "ITER_NEXT @13",
                "STORE 0:1",
                "LOAD 0:0",
                "LOAD 0:1",
                "GET_MEMBER \"name\"",
                "PUSH",
                "POP",
                "JUMP @5",
                "POP",
                "LOAD 0:0",
                "RETURN",
            ]
        );
    }

    #[test]
    fn single_shapes_the_source() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let root = ast.single(
            ast.ident("user"),
            ast.object(&[("id", ast.member(ast.current(), "id"))]),
        );
        let program = compile(&root);
        assert_eq!(
            program.listing(FunctionId::MAIN),
            vec![
                "LDC 0",
                "LOAD_GLOBAL \"user\"",
                "STORE 0:0",
                "NEW_OBJECT",
                "LOAD 0:0",
                "GET_MEMBER \"id\"",
                "PUT \"id\"",
                "RETURN",
            ]
        );
        assert_eq!(program.main().locals, 1);
    }

    #[test]
    fn nested_transforms_bind_innermost_element() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let inner = ast.single(
            ast.member(ast.current(), "address"),
            ast.member(ast.current(), "city"),
        );
        let root = ast.single(ast.ident("user"), inner);
        let listing = main_listing(&root);
        // outer # in slot 0, inner # in slot 1
        assert_eq!(
            listing,
            vec![
                "LDC 0",
                "LOAD_GLOBAL \"user\"",
                "STORE 0:0",
                "LOAD 0:0",
                "GET_MEMBER \"address\"",
                "STORE 0:1",
                "LOAD 0:1",
                "GET_MEMBER \"city\"",
                "RETURN",
            ]
        );
    }
}
