//! Conditional expression compilation.
//!
//! ```text
//! c ? a : b    c, JUMP_IF_FALSE else, a, JUMP end, else: b, end:
//! ```

use quill_ast::{Node, TernaryNode};
use quill_core::{CompilationError, NodeKind};

use super::Result;
use crate::bytecode::OpCode;
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::{InstructionQueue, JumpLabel};
use crate::stack::{BranchFrame, CompilerStack, FrameData, FrameHandle};

/// Compile a ternary inside a branch frame.
pub fn lower_ternary(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Ternary(ternary) = *node else {
        return Err(unexpected(NodeKind::Ternary, node));
    };

    let handle = stack.push_frame(FrameData::Branch(BranchFrame::default()));
    let arms = lower_arms(ternary, handle, dx, queue, stack);
    let frame = stack.pop_frame(handle);
    arms?;

    let branch = frame?
        .into_branch()
        .ok_or_else(|| CompilationError::internal("ternary closed a non-branch frame"))?;
    queue.bind_all(branch.exits)
}

fn lower_arms(
    ternary: &TernaryNode<'_>,
    handle: FrameHandle,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    dx.compile_value(ternary.condition, queue, stack)?;
    let otherwise = queue.emit_jump(OpCode::JumpIfFalse);

    dx.compile_value(ternary.then_value, queue, stack)?;
    if queue.is_reachable() {
        let exit = queue.emit_jump(OpCode::Jump);
        push_exit(stack, handle, exit)?;
    }

    queue.bind(otherwise)?;
    set_arm(stack, handle, 1)?;
    dx.compile_value(ternary.else_value, queue, stack)
}

fn push_exit(
    stack: &mut CompilerStack,
    handle: FrameHandle,
    exit: JumpLabel,
) -> Result<()> {
    branch_mut(stack, handle)?.exits.push(exit);
    Ok(())
}

fn set_arm(stack: &mut CompilerStack, handle: FrameHandle, arm: u32) -> Result<()> {
    branch_mut(stack, handle)?.arm = arm;
    Ok(())
}

pub(crate) fn branch_mut(
    stack: &mut CompilerStack,
    handle: FrameHandle,
) -> Result<&mut BranchFrame> {
    stack
        .frame_mut(handle)?
        .as_branch_mut()
        .ok_or_else(|| CompilationError::internal("branch handle refers to another frame kind"))
}
