//! List and object construction.
//!
//! ```text
//! [a, b]       NEW_LIST, a, PUSH, b, PUSH
//! {k: v}       NEW_OBJECT, v, PUT "k"
//! ```

use quill_ast::Node;
use quill_core::NodeKind;

use super::Result;
use crate::bytecode::{OpCode, Operand};
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::CompilerStack;

/// Compile a list literal.
pub fn lower_list(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::List(list) = *node else {
        return Err(unexpected(NodeKind::List, node));
    };

    queue.emit_op(OpCode::NewList);
    for item in list.items {
        dx.compile_value(item, queue, stack)?;
        queue.emit_op(OpCode::Push);
    }
    Ok(())
}

/// Compile an object literal. Fields are stored in source order.
pub fn lower_object(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Object(object) = *node else {
        return Err(unexpected(NodeKind::Object, node));
    };

    queue.emit_op(OpCode::NewObject);
    for field in object.fields {
        dx.compile_value(field.value, queue, stack)?;
        let key = queue.name(field.key)?;
        queue.emit(OpCode::Put, Operand::Const(key));
    }
    Ok(())
}
