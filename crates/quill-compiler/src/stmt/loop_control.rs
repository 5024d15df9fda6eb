//! `break` and `continue`.
//!
//! Both jump to a target owned by the innermost loop frame of the current
//! function. Handlers opened inside that loop are closed with `TRY_END`
//! before the jump leaves them.
//!
//! Either may appear in value position, for example as a ternary arm, but
//! only where the operand stack is back at the loop's own depth. Inside a
//! list or a call argument the partial values would ride along the jump, so
//! that is rejected with [`CompilationError::UnbalancedJump`].

use quill_ast::Node;
use quill_core::{CompilationError, NodeKind, ScopeKind, Span};

use super::Result;
use crate::bytecode::OpCode;
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::{CompilerStack, LoopFrame};

/// Compile `break`. The jump is bound when the loop closes.
pub fn lower_break(
    node: &Node<'_>,
    _dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Break(brk) = *node else {
        return Err(unexpected(NodeKind::Break, node));
    };

    leave_loop(NodeKind::Break, brk.span, queue, stack)?;
    let jump = queue.emit_jump(OpCode::Jump);
    innermost_loop(stack, brk.span)?.breaks.push(jump);
    Ok(())
}

/// Compile `continue`, jumping back to the loop's continue target.
pub fn lower_continue(
    node: &Node<'_>,
    _dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Continue(cont) = *node else {
        return Err(unexpected(NodeKind::Continue, node));
    };

    leave_loop(NodeKind::Continue, cont.span, queue, stack)?;
    let frame = innermost_loop(stack, cont.span)?;
    let (target, depth) = (frame.continue_target, frame.depth);
    queue.emit_loop(target, depth)?;
    Ok(())
}

/// Check the jump can leave for the innermost loop, then close the handlers
/// it crosses. Emits nothing on failure.
fn leave_loop(
    kind: NodeKind,
    span: Span,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let expected = innermost_loop(stack, span)?.depth;
    if queue.is_reachable() && queue.depth() != expected {
        return Err(CompilationError::UnbalancedJump {
            kind,
            expected,
            found: queue.depth(),
            span,
        });
    }
    // Unreachable code has no real depth; the jump carries the loop's.
    queue.assume_depth(expected);

    for _ in 0..stack.guarded_handlers_until(ScopeKind::Loop) {
        queue.emit_op(OpCode::TryEnd);
    }
    Ok(())
}

fn innermost_loop(stack: &mut CompilerStack, span: Span) -> Result<&mut LoopFrame> {
    stack
        .current_frame_mut(ScopeKind::Loop, span)?
        .as_loop_mut()
        .ok_or_else(|| CompilationError::internal("loop scope without loop data"))
}
