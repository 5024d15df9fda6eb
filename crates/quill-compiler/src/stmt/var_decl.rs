//! Variable declaration and assignment.
//!
//! `var` always introduces a fresh slot in the current function, even when
//! the name shadows an outer binding. The name becomes visible only after
//! its initializer, so `var x = x + 1` reads the outer `x`.

use quill_ast::Node;
use quill_core::{CompilationError, NodeKind};

use super::Result;
use crate::bytecode::{LocalRef, OpCode, Operand};
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::CompilerStack;

/// Compile `var name = init`.
pub fn lower_var(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Var(var) = *node else {
        return Err(unexpected(NodeKind::Var, node));
    };

    dx.compile_value(var.init, queue, stack)?;
    let slot = stack.declare(var.name.name, var.name.span)?;
    queue.emit(OpCode::Store, Operand::Local(LocalRef::new(0, slot)));
    Ok(())
}

/// Compile `name = value`. The name must already be a local.
pub fn lower_assign(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Assign(assign) = *node else {
        return Err(unexpected(NodeKind::Assign, node));
    };

    let target = stack
        .resolve(assign.name.name)
        .ok_or_else(|| CompilationError::UnknownVariable {
            name: assign.name.name.to_string(),
            span: assign.name.span,
        })?;

    dx.compile_value(assign.value, queue, stack)?;
    queue.emit(OpCode::Store, Operand::Local(target));
    Ok(())
}
