//! While loop compilation.
//!
//! ```text
//! start:
//!   condition
//!   JUMP_IF_FALSE end
//!   body
//!   JUMP start
//! end:
//! ```
//!
//! `continue` jumps to `start`; `break` jumps to `end`.

use quill_ast::{Node, WhileNode};
use quill_core::{CompilationError, NodeKind};

use super::Result;
use crate::bytecode::{OpCode, Position};
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::{CompilerStack, FrameData, LoopFrame};

/// Compile a while loop inside a loop frame.
pub fn lower_while(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::While(while_node) = *node else {
        return Err(unexpected(NodeKind::While, node));
    };

    let start = queue.position();
    let depth = queue.depth();
    let handle = stack.push_frame(FrameData::Loop(LoopFrame::new(start, depth)));
    let body = lower_loop(while_node, start, depth, dx, queue, stack);
    let frame = stack.pop_frame(handle);
    body?;

    let looped = frame?
        .into_loop()
        .ok_or_else(|| CompilationError::internal("while closed a non-loop frame"))?;
    queue.bind_all(looped.breaks)
}

fn lower_loop(
    while_node: &WhileNode<'_>,
    start: Position,
    depth: u32,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    dx.compile_value(while_node.condition, queue, stack)?;
    let exit = queue.emit_jump(OpCode::JumpIfFalse);

    dx.compile_discard(while_node.body, queue, stack)?;
    queue.emit_loop(start, depth)?;

    queue.bind(exit)
}
