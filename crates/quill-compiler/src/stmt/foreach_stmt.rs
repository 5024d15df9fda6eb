//! For-each loop compilation.
//!
//! ```text
//!   iterable
//!   ITER_START
//! next:
//!   ITER_NEXT end
//!   STORE binding
//!   body
//!   JUMP next
//! end:
//!   POP
//! ```
//!
//! The iterator stays on the operand stack for the whole loop, so `break`
//! lands before the `POP` that discards it.

use quill_ast::{ForEachNode, Node};
use quill_core::{CompilationError, NodeKind};

use super::Result;
use crate::bytecode::{LocalRef, OpCode, Operand, Position};
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::{CompilerStack, FrameData, LoopFrame};

/// Compile `for (binding in iterable) body`.
pub fn lower_foreach(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::ForEach(for_each) = *node else {
        return Err(unexpected(NodeKind::ForEach, node));
    };

    dx.compile_value(for_each.iterable, queue, stack)?;
    queue.emit_op(OpCode::IterStart);

    let next = queue.position();
    let depth = queue.depth();
    let handle = stack.push_frame(FrameData::Loop(LoopFrame::new(next, depth)));
    let body = lower_loop(for_each, next, depth, dx, queue, stack);
    let frame = stack.pop_frame(handle);
    body?;

    let looped = frame?
        .into_loop()
        .ok_or_else(|| CompilationError::internal("for-each closed a non-loop frame"))?;
    queue.bind_all(looped.breaks)?;
    queue.emit_op(OpCode::Pop);
    Ok(())
}

fn lower_loop(
    for_each: &ForEachNode<'_>,
    next: Position,
    depth: u32,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let exit = queue.emit_jump(OpCode::IterNext);

    // The binding lives in the loop frame, one slot reused per iteration.
    let slot = stack.declare(for_each.binding.name, for_each.binding.span)?;
    queue.emit(OpCode::Store, Operand::Local(LocalRef::new(0, slot)));

    dx.compile_discard(for_each.body, queue, stack)?;
    queue.emit_loop(next, depth)?;

    queue.bind(exit)
}
