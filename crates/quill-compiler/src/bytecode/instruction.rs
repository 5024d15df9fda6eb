//! Instructions and their operands.

use std::fmt;

use super::opcode::{OpCode, OperandKind};

/// Index into the constant pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstId(pub u32);

/// Index into a program's function table. The root is [`FunctionId::MAIN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

impl FunctionId {
    pub const MAIN: FunctionId = FunctionId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Address of a local slot as seen from the function being emitted.
///
/// `depth` is the number of function boundaries between the use and the
/// declaration: 0 for the current function, 1 for its enclosing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalRef {
    pub depth: u16,
    pub slot: u16,
}

impl LocalRef {
    pub fn new(depth: u16, slot: u16) -> Self {
        Self { depth, slot }
    }
}

/// Location of an instruction within a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub function: FunctionId,
    pub index: u32,
}

/// An instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    Const(ConstId),
    /// Instruction index in the same function. [`Operand::UNPATCHED`] until bound.
    Target(u32),
    Local(LocalRef),
    Count(u16),
    Function(FunctionId),
    Hint { key: ConstId, value: ConstId },
}

impl Operand {
    /// Placeholder target of a forward jump that has not been bound.
    pub const UNPATCHED: Operand = Operand::Target(u32::MAX);

    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::None => OperandKind::None,
            Operand::Const(_) => OperandKind::Const,
            Operand::Target(_) => OperandKind::Target,
            Operand::Local(_) => OperandKind::Local,
            Operand::Count(_) => OperandKind::Count,
            Operand::Function(_) => OperandKind::Function,
            Operand::Hint { .. } => OperandKind::Hint,
        }
    }
}

/// One opcode and its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: OpCode,
    pub operand: Operand,
}

impl Instruction {
    pub fn new(op: OpCode, operand: Operand) -> Self {
        Self { op, operand }
    }

    pub fn simple(op: OpCode) -> Self {
        Self::new(op, Operand::None)
    }

    /// `(pops, pushes)` of this instruction on its fall-through path.
    pub fn stack_effect(&self) -> (u32, u32) {
        let argc = match self.operand {
            Operand::Count(n) => n,
            _ => 0,
        };
        self.op.stack_effect(argc)
    }

    /// The jump target, if this instruction branches.
    pub fn target(&self) -> Option<u32> {
        match self.operand {
            Operand::Target(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Const(id) => write!(f, "#{}", id.0),
            Operand::Target(t) if *t == u32::MAX => f.write_str("@?"),
            Operand::Target(t) => write!(f, "@{t}"),
            Operand::Local(l) => write!(f, "{}:{}", l.depth, l.slot),
            Operand::Count(n) => write!(f, "{n}"),
            Operand::Function(id) => write!(f, "fn{}", id.0),
            Operand::Hint { key, value } => write!(f, "#{} #{}", key.0, value.0),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Operand::None => f.write_str(self.op.name()),
            operand => write!(f, "{} {}", self.op.name(), operand),
        }
    }
}
