//! `run` statement compilation: evaluate an expression for its effects.

use quill_ast::Node;
use quill_core::NodeKind;

use super::Result;
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::CompilerStack;

/// Compile `run expr`. The value is discarded.
pub fn lower_run(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Run(run) = *node else {
        return Err(unexpected(NodeKind::Run, node));
    };

    dx.compile_discard(run.expr, queue, stack)
}
