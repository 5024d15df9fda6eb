//! Block statement compilation.

use quill_ast::{BlockNode, Node};
use quill_core::NodeKind;

use super::Result;
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::{CompilerStack, FrameData};

/// Compile a block. Names declared inside go out of scope at its end.
pub fn lower_block(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Block(block) = *node else {
        return Err(unexpected(NodeKind::Block, node));
    };

    let handle = stack.push_frame(FrameData::Block);
    let body = lower_statements(&block, dx, queue, stack);
    let frame = stack.pop_frame(handle);
    body?;
    frame?;
    Ok(())
}

fn lower_statements(
    block: &BlockNode<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    block
        .stmts
        .iter()
        .try_for_each(|stmt| dx.compile_discard(stmt, queue, stack))
}
