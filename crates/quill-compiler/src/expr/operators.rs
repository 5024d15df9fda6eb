//! Operator expression compilation.
//!
//! Unary and binary operators map one-to-one onto opcodes. `&&` and `||`
//! short-circuit, so they lower to a conditional jump around the right
//! operand:
//!
//! ```text
//! a && b       a, DUP, JUMP_IF_FALSE end, POP, b, end:
//! a || b       a, DUP, JUMP_IF_TRUE end, POP, b, end:
//! ```

use quill_ast::{BinaryOp, LogicalOp, Node, UnaryOp};
use quill_core::NodeKind;

use super::Result;
use crate::bytecode::OpCode;
use crate::dispatch::{Dispatcher, unexpected};
use crate::emit::InstructionQueue;
use crate::stack::CompilerStack;

fn unary_opcode(op: UnaryOp) -> OpCode {
    match op {
        UnaryOp::Neg => OpCode::Neg,
        UnaryOp::Not => OpCode::Not,
        UnaryOp::BitNot => OpCode::BitNot,
    }
}

fn binary_opcode(op: BinaryOp) -> OpCode {
    match op {
        BinaryOp::Add => OpCode::Add,
        BinaryOp::Sub => OpCode::Sub,
        BinaryOp::Mul => OpCode::Mul,
        BinaryOp::Div => OpCode::Div,
        BinaryOp::IntDiv => OpCode::IntDiv,
        BinaryOp::Mod => OpCode::Mod,
        BinaryOp::Eq => OpCode::Eq,
        BinaryOp::Ne => OpCode::Ne,
        BinaryOp::Lt => OpCode::Lt,
        BinaryOp::Le => OpCode::Le,
        BinaryOp::Gt => OpCode::Gt,
        BinaryOp::Ge => OpCode::Ge,
        BinaryOp::BitAnd => OpCode::BitAnd,
        BinaryOp::BitOr => OpCode::BitOr,
        BinaryOp::BitXor => OpCode::BitXor,
        BinaryOp::Shl => OpCode::Shl,
        BinaryOp::Shr => OpCode::Shr,
        BinaryOp::UShr => OpCode::UShr,
    }
}

/// Compile a prefix operation.
pub fn lower_unary(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Unary(unary) = *node else {
        return Err(unexpected(NodeKind::Unary, node));
    };

    dx.compile_value(unary.operand, queue, stack)?;
    queue.emit_op(unary_opcode(unary.op));
    Ok(())
}

/// Compile a binary operation. The left operand is evaluated first.
pub fn lower_binary(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Binary(binary) = *node else {
        return Err(unexpected(NodeKind::Binary, node));
    };

    dx.compile_value(binary.left, queue, stack)?;
    dx.compile_value(binary.right, queue, stack)?;
    queue.emit_op(binary_opcode(binary.op));
    Ok(())
}

/// Compile a short-circuiting `&&` or `||`.
///
/// The result is whichever operand decided the outcome, not a coerced bool.
pub fn lower_logical(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Logical(logical) = *node else {
        return Err(unexpected(NodeKind::Logical, node));
    };

    let skip = match logical.op {
        LogicalOp::And => OpCode::JumpIfFalse,
        LogicalOp::Or => OpCode::JumpIfTrue,
    };

    dx.compile_value(logical.left, queue, stack)?;
    queue.emit_op(OpCode::Dup);
    let end = queue.emit_jump(skip);
    queue.emit_op(OpCode::Pop);
    dx.compile_value(logical.right, queue, stack)?;
    queue.bind(end)
}

/// Compile a parenthesized expression.
pub fn lower_group(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    let Node::Group(group) = *node else {
        return Err(unexpected(NodeKind::Group, node));
    };

    dx.compile_value(group.inner, queue, stack)
}
