//! `if` / `else if` / `else` compilation.
//!
//! ```text
//! if (c0) b0          c0, JUMP_IF_FALSE next0, b0, JUMP end,
//! else if (c1) b1     next0: c1, JUMP_IF_FALSE next1, b1, JUMP end,
//! else b2             next1: b2,
//!                     end:
//! ```
//!
//! The last arm needs no exit jump when there is no `else`, and an arm that
//! cannot fall off its end gets none either.

use quill_ast::{IfNode, Node};
use quill_core::{CompilationError, NodeKind};

use super::Result;
use crate::bytecode::OpCode;
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::expr::ternary::branch_mut;
use crate::stack::{BranchFrame, CompilerStack, FrameData, FrameHandle};

/// Compile an `if` chain inside a branch frame.
pub fn lower_if(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::If(if_node) = *node else {
        return Err(unexpected(NodeKind::If, node));
    };

    let handle = stack.push_frame(FrameData::Branch(BranchFrame::default()));
    let arms = lower_arms(if_node, handle, dx, queue, stack);
    let frame = stack.pop_frame(handle);
    arms?;

    let branch = frame?
        .into_branch()
        .ok_or_else(|| CompilationError::internal("if closed a non-branch frame"))?;
    queue.bind_all(branch.exits)
}

fn lower_arms(
    if_node: &IfNode<'_>,
    handle: FrameHandle,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let last = if_node.branches.len().saturating_sub(1);

    for (arm, branch) in if_node.branches.iter().enumerate() {
        branch_mut(stack, handle)?.arm = arm as u32;

        dx.compile_value(branch.condition, queue, stack)?;
        let next = queue.emit_jump(OpCode::JumpIfFalse);
        dx.compile_discard(branch.body, queue, stack)?;

        let falls_out = arm < last || if_node.else_body.is_some();
        if falls_out && queue.is_reachable() {
            let exit = queue.emit_jump(OpCode::Jump);
            branch_mut(stack, handle)?.exits.push(exit);
        }
        queue.bind(next)?;
    }

    if let Some(else_body) = if_node.else_body {
        branch_mut(stack, handle)?.arm = if_node.branches.len() as u32;
        dx.compile_discard(else_body, queue, stack)?;
    }
    Ok(())
}
