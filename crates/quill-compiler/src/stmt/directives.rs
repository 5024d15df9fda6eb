//! Query directives: `hint` options and `import` bindings.

use quill_ast::{ImportKind, Node};
use quill_core::NodeKind;

use super::Result;
use crate::bytecode::{LocalRef, OpCode, Operand};
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::expr::literals::literal_constant;
use crate::stack::CompilerStack;

/// Compile `hint name = value`.
pub fn lower_hint(
    node: &Node<'_>,
    _dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    _stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Hint(hint) = *node else {
        return Err(unexpected(NodeKind::Hint, node));
    };

    let key = queue.name(hint.name.name)?;
    let value = queue.constant(literal_constant(hint.value))?;
    queue.emit(OpCode::Hint, Operand::Hint { key, value });
    Ok(())
}

/// Compile `import "path" as alias`, binding the import to a local.
pub fn lower_import(
    node: &Node<'_>,
    _dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Import(import) = *node else {
        return Err(unexpected(NodeKind::Import, node));
    };

    let op = match import.kind {
        ImportKind::Module => OpCode::ImportModule,
        ImportKind::Resource => OpCode::ImportResource,
    };
    let path = queue.name(import.path)?;
    let slot = stack.declare(import.alias.name, import.alias.span)?;

    queue.emit(op, Operand::Const(path));
    queue.emit(OpCode::Store, Operand::Local(LocalRef::new(0, slot)));
    Ok(())
}
