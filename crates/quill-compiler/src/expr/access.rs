//! Name and member access.
//!
//! Identifiers resolve to a local slot when one is in scope and otherwise to
//! a global the host supplies at run time. Query parameters (`${name}`) and
//! the current transform element (`#`) have their own forms.

use quill_ast::Node;
use quill_core::NodeKind;

use super::Result;
use crate::bytecode::{OpCode, Operand};
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::CompilerStack;

/// Compile an identifier reference.
pub fn lower_ident(
    node: &Node<'_>,
    _dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Ident(ident) = *node else {
        return Err(unexpected(NodeKind::Ident, node));
    };

    match stack.resolve(ident.name) {
        Some(local) => {
            queue.emit(OpCode::Load, Operand::Local(local));
        }
        None => {
            let name = queue.name(ident.name)?;
            queue.emit(OpCode::LoadGlobal, Operand::Const(name));
        }
    }
    Ok(())
}

/// Compile a query parameter reference.
pub fn lower_param(
    node: &Node<'_>,
    _dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    _stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Param(param) = *node else {
        return Err(unexpected(NodeKind::Param, node));
    };

    let name = queue.name(param.name)?;
    queue.emit(OpCode::LoadParam, Operand::Const(name));
    Ok(())
}

/// Compile `#`, the element the innermost transform is shaping.
pub fn lower_current(
    node: &Node<'_>,
    _dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Current(current) = *node else {
        return Err(unexpected(NodeKind::Current, node));
    };

    let element = stack.element(current.span)?;
    queue.emit(OpCode::Load, Operand::Local(element));
    Ok(())
}

/// Compile `object.name`.
pub fn lower_member(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Member(member) = *node else {
        return Err(unexpected(NodeKind::Member, node));
    };

    dx.compile_value(member.object, queue, stack)?;
    let name = queue.name(member.name.name)?;
    queue.emit(OpCode::GetMember, Operand::Const(name));
    Ok(())
}

/// Compile `object[index]`.
pub fn lower_index(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Index(index) = *node else {
        return Err(unexpected(NodeKind::Index, node));
    };

    dx.compile_value(index.object, queue, stack)?;
    dx.compile_value(index.index, queue, stack)?;
    queue.emit_op(OpCode::GetIndex);
    Ok(())
}
