//! Literal expression compilation.
//!
//! `null`, `true` and `false` have dedicated opcodes. Numbers and strings go
//! through the constant pool.

use quill_ast::{LiteralValue, Node};
use quill_core::NodeKind;

use super::Result;
use crate::bytecode::{Constant, OpCode};
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::CompilerStack;

/// Compile a literal expression.
pub fn lower_literal(
    node: &Node<'_>,
    _dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    _stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Literal(literal) = *node else {
        return Err(unexpected(NodeKind::Literal, node));
    };

    match literal.value {
        LiteralValue::Null => {
            queue.emit_op(OpCode::PushNull);
        }
        LiteralValue::Bool(true) => {
            queue.emit_op(OpCode::PushTrue);
        }
        LiteralValue::Bool(false) => {
            queue.emit_op(OpCode::PushFalse);
        }
        value => {
            queue.emit_constant(literal_constant(value))?;
        }
    }
    Ok(())
}

/// The pooled form of a literal value.
pub fn literal_constant(value: LiteralValue<'_>) -> Constant {
    match value {
        LiteralValue::Null => Constant::Null,
        LiteralValue::Bool(b) => Constant::Bool(b),
        LiteralValue::Int(i) => Constant::Int(i),
        LiteralValue::Float(x) => Constant::Float(x),
        LiteralValue::String(s) => Constant::String(s.to_owned()),
    }
}
