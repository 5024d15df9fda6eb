//! Instruction set and compiled program types.
//!
//! - [`OpCode`] - The instruction set for the VM
//! - [`Instruction`] and [`Operand`] - One emitted instruction
//! - [`Constant`] and [`ConstantPool`] - Program-level constant storage
//! - [`Program`] - The frozen output of a compilation

mod constant;
mod instruction;
mod opcode;
mod program;

pub use constant::{Constant, ConstantPool, MAX_CONSTANTS};
pub use instruction::{ConstId, FunctionId, Instruction, LocalRef, Operand, Position};
pub use opcode::{OpCode, OperandKind};
pub use program::{FunctionCode, HandlerRegion, MAGIC, Program};
