//! Instruction opcodes.
//!
//! The VM is a stack machine. Every opcode declares the shape of its operand
//! and how many operand-stack slots it pops and pushes, which is what lets the
//! instruction queue track stack depth as code is emitted.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The kind of operand an opcode carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    None,
    /// Index into the constant pool.
    Const,
    /// Instruction index within the same function.
    Target,
    /// Local slot, `(depth, slot)`.
    Local,
    /// Argument count.
    Count,
    /// Function table index.
    Function,
    /// Pair of constant indices, `(key, value)`.
    Hint,
}

/// Instruction opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Constants
    // =========================================================================
    /// Push a constant from the pool.
    LoadConst = 0,
    PushNull,
    PushTrue,
    PushFalse,

    // =========================================================================
    // Stack
    // =========================================================================
    Pop,
    Dup,

    // =========================================================================
    // Variables
    // =========================================================================
    /// Push a local. Operand: `(depth, slot)`, depth counts enclosing functions.
    Load,
    /// Pop into a local.
    Store,
    /// Push a name from the host environment. Operand: name constant.
    LoadGlobal,
    /// Push a query parameter. Operand: name constant.
    LoadParam,

    // =========================================================================
    // Access
    // =========================================================================
    /// `[obj] -> [obj.name]`. Operand: name constant.
    GetMember,
    /// `[obj, idx] -> [obj[idx]]`
    GetIndex,

    // =========================================================================
    // Construction
    // =========================================================================
    NewList,
    /// `[list, item] -> [list]`
    Push,
    NewObject,
    /// `[obj, value] -> [obj]`. Operand: key constant.
    Put,
    /// Push a closure over a compiled function.
    MakeLambda,

    // =========================================================================
    // Calls
    // =========================================================================
    /// `[callee, arg0..argN] -> [result]`. Operand: argument count.
    Call,

    // =========================================================================
    // Operators
    // =========================================================================
    Neg,
    Not,
    BitNot,
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,

    // =========================================================================
    // Control flow
    // =========================================================================
    Jump,
    /// Pop the condition, jump if it is falsy.
    JumpIfFalse,
    /// Pop the condition, jump if it is truthy.
    JumpIfTrue,

    // =========================================================================
    // Iteration
    // =========================================================================
    /// `[source] -> [iterator]`
    IterStart,
    /// `[it] -> [it, item]`, or `[it]` and jump once exhausted.
    IterNext,

    // =========================================================================
    // Error handling
    // =========================================================================
    /// Install a handler. Operand: catch target. The catch path starts with
    /// the raised error on the stack.
    TryBegin,
    /// Remove the innermost handler.
    TryEnd,

    // =========================================================================
    // Directives
    // =========================================================================
    /// Set a compile option for the query. Operand: `(key, value)` constants.
    Hint,
    /// Push an imported module. Operand: path constant.
    ImportModule,
    /// Push an imported resource. Operand: path constant.
    ImportResource,

    // =========================================================================
    // Terminals: `[code, data] -> !`
    // =========================================================================
    Return,
    Exit,
    Throw,
}

impl OpCode {
    /// Decode an opcode byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// The operand this opcode carries.
    pub fn operand_kind(self) -> OperandKind {
        use OpCode::*;
        match self {
            LoadConst | LoadGlobal | LoadParam | GetMember | Put | ImportModule
            | ImportResource => OperandKind::Const,
            Load | Store => OperandKind::Local,
            Jump | JumpIfFalse | JumpIfTrue | IterNext | TryBegin => OperandKind::Target,
            Call => OperandKind::Count,
            MakeLambda => OperandKind::Function,
            Hint => OperandKind::Hint,
            _ => OperandKind::None,
        }
    }

    /// Encoded operand width in bytes.
    pub fn operand_size(self) -> usize {
        match self.operand_kind() {
            OperandKind::None => 0,
            OperandKind::Count => 2,
            OperandKind::Const | OperandKind::Target | OperandKind::Function => 4,
            OperandKind::Local => 4,
            OperandKind::Hint => 8,
        }
    }

    /// `(pops, pushes)` on the fall-through path.
    ///
    /// `argc` is only consulted for [`OpCode::Call`].
    pub fn stack_effect(self, argc: u16) -> (u32, u32) {
        use OpCode::*;
        match self {
            LoadConst | PushNull | PushTrue | PushFalse | Load | LoadGlobal | LoadParam
            | NewList | NewObject | MakeLambda | ImportModule | ImportResource => (0, 1),
            Dup => (1, 2),
            Pop | Store | JumpIfFalse | JumpIfTrue => (1, 0),
            GetMember | Neg | Not | BitNot | IterStart => (1, 1),
            GetIndex | Push | Put | Add | Sub | Mul | Div | IntDiv | Mod | Eq | Ne | Lt | Le
            | Gt | Ge | BitAnd | BitOr | BitXor | Shl | Shr | UShr => (2, 1),
            Call => (u32::from(argc) + 1, 1),
            IterNext => (1, 2),
            Jump | TryBegin | TryEnd | Hint => (0, 0),
            Return | Exit | Throw => (2, 0),
        }
    }

    /// `(pops, pushes)` on the path where the jump is taken, for branching
    /// opcodes.
    pub fn branch_effect(self) -> Option<(u32, u32)> {
        match self {
            OpCode::Jump => Some((0, 0)),
            OpCode::JumpIfFalse | OpCode::JumpIfTrue => Some((1, 0)),
            OpCode::IterNext => Some((1, 1)),
            OpCode::TryBegin => Some((0, 1)),
            _ => None,
        }
    }

    /// Whether control never falls through to the next instruction.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OpCode::Jump | OpCode::Return | OpCode::Exit | OpCode::Throw
        )
    }

    /// Assembly mnemonic.
    pub fn name(self) -> &'static str {
        use OpCode::*;
        match self {
            LoadConst => "LDC",
            PushNull => "PUSH_NULL",
            PushTrue => "PUSH_TRUE",
            PushFalse => "PUSH_FALSE",
            Pop => "POP",
            Dup => "DUP",
            Load => "LOAD",
            Store => "STORE",
            LoadGlobal => "LOAD_GLOBAL",
            LoadParam => "LOAD_PARAM",
            GetMember => "GET_MEMBER",
            GetIndex => "GET_INDEX",
            NewList => "NEW_LIST",
            Push => "PUSH",
            NewObject => "NEW_OBJECT",
            Put => "PUT",
            MakeLambda => "MAKE_LAMBDA",
            Call => "CALL",
            Neg => "NEG",
            Not => "NOT",
            BitNot => "BIT_NOT",
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            Div => "DIV",
            IntDiv => "INT_DIV",
            Mod => "MOD",
            Eq => "EQ",
            Ne => "NE",
            Lt => "LT",
            Le => "LE",
            Gt => "GT",
            Ge => "GE",
            BitAnd => "BIT_AND",
            BitOr => "BIT_OR",
            BitXor => "BIT_XOR",
            Shl => "SHL",
            Shr => "SHR",
            UShr => "USHR",
            Jump => "JUMP",
            JumpIfFalse => "JUMP_IF_FALSE",
            JumpIfTrue => "JUMP_IF_TRUE",
            IterStart => "ITER_START",
            IterNext => "ITER_NEXT",
            TryBegin => "TRY_BEGIN",
            TryEnd => "TRY_END",
            Hint => "HINT",
            ImportModule => "IMPORT_MODULE",
            ImportResource => "IMPORT_RESOURCE",
            Return => "RETURN",
            Exit => "EXIT",
            Throw => "THROW",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_repr() {
        assert_eq!(u8::from(OpCode::LoadConst), 0);
        assert_eq!(OpCode::from_u8(u8::from(OpCode::Throw)), Some(OpCode::Throw));
        assert_eq!(OpCode::from_u8(0xFF), None);
    }

    #[test]
    fn terminals_pop_code_and_data() {
        for op in [OpCode::Return, OpCode::Exit, OpCode::Throw] {
            assert_eq!(op.stack_effect(0), (2, 0));
            assert!(op.is_terminal());
        }
    }

    #[test]
    fn call_pops_callee_and_args() {
        assert_eq!(OpCode::Call.stack_effect(3), (4, 1));
        assert_eq!(OpCode::Call.stack_effect(0), (1, 1));
    }

    #[test]
    fn branch_paths_differ_from_fall_through() {
        assert_eq!(OpCode::IterNext.stack_effect(0), (1, 2));
        assert_eq!(OpCode::IterNext.branch_effect(), Some((1, 1)));
        assert_eq!(OpCode::TryBegin.branch_effect(), Some((0, 1)));
        assert_eq!(OpCode::Add.branch_effect(), None);
    }

    #[test]
    fn operand_shapes() {
        assert_eq!(OpCode::LoadConst.operand_kind(), OperandKind::Const);
        assert_eq!(OpCode::Store.operand_kind(), OperandKind::Local);
        assert_eq!(OpCode::JumpIfFalse.operand_kind(), OperandKind::Target);
        assert_eq!(OpCode::Throw.operand_size(), 0);
        assert_eq!(OpCode::Hint.operand_size(), 8);
    }

    #[test]
    fn mnemonics() {
        assert_eq!(OpCode::LoadConst.name(), "LDC");
        assert_eq!(OpCode::Throw.name(), "THROW");
    }
}
