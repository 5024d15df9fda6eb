//! `try` / `catch` compilation.
//!
//! ```text
//!   TRY_BEGIN catch
//!   body
//!   TRY_END
//!   JUMP end
//! catch:            error value on the stack
//!   STORE binding   (or POP without a binding)
//!   handler
//! end:
//! ```
//!
//! Every region is recorded as a [`HandlerRegion`] in the program so the VM
//! and tooling can map a throw site to its handler.

use quill_ast::{Node, TryNode};
use quill_core::{CompilationError, NodeKind};

use super::Result;
use crate::bytecode::{HandlerRegion, LocalRef, OpCode, Operand};
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::{InstructionQueue, JumpLabel};
use crate::stack::{CompilerStack, FrameData, FrameHandle, HandlerFrame};

/// Compile a `try` statement inside a handler frame.
pub fn lower_try(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Try(try_node) = *node else {
        return Err(unexpected(NodeKind::Try, node));
    };

    let begin = queue.emit_jump(OpCode::TryBegin);
    let handle = stack.push_frame(FrameData::Handler(HandlerFrame::new(begin.position())));
    let paths = lower_paths(try_node, begin, handle, dx, queue, stack);
    let frame = stack.pop_frame(handle);
    let (mut region, exit) = paths?;

    let handler = frame?
        .into_handler()
        .ok_or_else(|| CompilationError::internal("try closed a non-handler frame"))?;
    region.throws = handler.throws;

    if let Some(exit) = exit {
        queue.bind(exit)?;
    }
    queue.add_handler(region);
    Ok(())
}

fn lower_paths(
    try_node: &TryNode<'_>,
    begin: JumpLabel,
    handle: FrameHandle,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<(HandlerRegion, Option<JumpLabel>)> {
    dx.compile_discard(try_node.body, queue, stack)?;

    let end = queue.position().index;
    let exit = if queue.is_reachable() {
        queue.emit_op(OpCode::TryEnd);
        Some(queue.emit_jump(OpCode::Jump))
    } else {
        None
    };

    stack
        .frame_mut(handle)?
        .as_handler_mut()
        .ok_or_else(|| CompilationError::internal("handler handle refers to another frame kind"))?
        .guarded = false;

    let catch = queue.position().index;
    queue.bind(begin)?;
    match try_node.binding {
        Some(binding) => {
            let slot = stack.declare(binding.name, binding.span)?;
            queue.emit(OpCode::Store, Operand::Local(LocalRef::new(0, slot)));
        }
        None => {
            queue.emit_op(OpCode::Pop);
        }
    }
    dx.compile_discard(try_node.handler, queue, stack)?;

    let region = HandlerRegion {
        function: begin.position().function,
        start: begin.position().index,
        end,
        catch,
        throws: 0,
    };
    Ok((region, exit))
}
