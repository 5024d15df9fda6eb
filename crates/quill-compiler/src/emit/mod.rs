//! The instruction queue node compilers append to.
//!
//! [`InstructionQueue`] is an append-only buffer of instructions for every
//! function of the program being compiled. Alongside the code it tracks the
//! operand-stack depth at each point, so forward jumps can check that every
//! path reaching a join point agrees on the depth.
//!
//! # Example
//!
//! ```
//! use quill_compiler::bytecode::{Constant, OpCode, Operand};
//! use quill_compiler::emit::InstructionQueue;
//!
//! let mut queue = InstructionQueue::new();
//! queue.emit_constant(Constant::Int(404)).unwrap();
//! queue.emit_constant(Constant::from("not found")).unwrap();
//! queue.emit(OpCode::Throw, Operand::None);
//!
//! let program = queue.snapshot();
//! assert_eq!(program.main().len(), 3);
//! ```

use quill_core::CompilationError;

use crate::bytecode::{
    ConstId, Constant, ConstantPool, FunctionCode, FunctionId, HandlerRegion, Instruction, OpCode,
    Operand, Position, Program,
};

type Result<T> = std::result::Result<T, CompilationError>;

/// A forward jump waiting for its target.
///
/// Carries the operand-stack depth control arrives with when the jump is
/// taken, which [`InstructionQueue::bind`] checks against the fall-through
/// depth at the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "an unbound label leaves its jump unpatched"]
pub struct JumpLabel {
    position: Position,
    depth: u32,
}

impl JumpLabel {
    /// Where the jump instruction sits.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Operand-stack depth on the taken path.
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

#[derive(Debug)]
struct FunctionBuffer {
    params: u16,
    locals: u16,
    code: Vec<Instruction>,
    lines: Vec<u32>,
    depth: u32,
    max_depth: u32,
    reachable: bool,
}

impl FunctionBuffer {
    fn new(params: u16) -> Self {
        Self {
            params,
            locals: params,
            code: Vec::new(),
            lines: Vec::new(),
            depth: 0,
            max_depth: 0,
            reachable: true,
        }
    }

    fn set_depth(&mut self, depth: u32) {
        self.depth = depth;
        self.max_depth = self.max_depth.max(depth);
    }
}

/// Append-only instruction buffer for a program under compilation.
#[derive(Debug)]
pub struct InstructionQueue {
    functions: Vec<FunctionBuffer>,
    /// Functions being emitted into, innermost last. Never empty.
    open: Vec<FunctionId>,
    constants: ConstantPool,
    handlers: Vec<HandlerRegion>,
    line_info: bool,
    line: u32,
}

impl Default for InstructionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InstructionQueue {
    /// Create a queue positioned at the start of the root function.
    pub fn new() -> Self {
        Self::with_line_info(true)
    }

    /// Create a queue that records source lines only if `line_info` is set.
    pub fn with_line_info(line_info: bool) -> Self {
        Self {
            functions: vec![FunctionBuffer::new(0)],
            open: vec![FunctionId::MAIN],
            constants: ConstantPool::new(),
            handlers: Vec::new(),
            line_info,
            line: 0,
        }
    }

    // ==========================================================================
    // Line tracking
    // ==========================================================================

    /// Set the source line attached to subsequent instructions.
    pub fn set_line(&mut self, line: u32) {
        self.line = line;
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    // ==========================================================================
    // Emission
    // ==========================================================================

    /// Append an instruction to the current function.
    pub fn emit(&mut self, op: OpCode, operand: Operand) -> Position {
        debug_assert_eq!(
            op.operand_kind(),
            operand.kind(),
            "{} takes a {:?} operand",
            op.name(),
            op.operand_kind()
        );

        let function = self.current_function();
        let line = self.line;
        let line_info = self.line_info;
        let buf = self.current_mut();

        let inst = Instruction::new(op, operand);
        let (pops, pushes) = inst.stack_effect();
        debug_assert!(
            !buf.reachable || buf.depth >= pops,
            "{} pops {pops} from a stack of depth {}",
            op.name(),
            buf.depth
        );

        let index = buf.code.len() as u32;
        buf.code.push(inst);
        if line_info {
            buf.lines.push(line);
        }
        let depth = buf.depth.saturating_sub(pops) + pushes;
        buf.set_depth(depth);
        if op.is_terminal() {
            buf.reachable = false;
        }

        Position { function, index }
    }

    /// Append an operand-less instruction.
    pub fn emit_op(&mut self, op: OpCode) -> Position {
        self.emit(op, Operand::None)
    }

    /// Pool `constant` and push it with `LDC`.
    pub fn emit_constant(&mut self, constant: Constant) -> Result<Position> {
        let id = self.constant(constant)?;
        Ok(self.emit(OpCode::LoadConst, Operand::Const(id)))
    }

    /// Emit a forward jump. Bind the returned label at the target.
    pub fn emit_jump(&mut self, op: OpCode) -> JumpLabel {
        let (pops, pushes) = op.branch_effect().unwrap_or_else(|| {
            debug_assert!(false, "{} is not a branch", op.name());
            (0, 0)
        });
        let depth = self.depth().saturating_sub(pops) + pushes;
        let position = self.emit(op, Operand::UNPATCHED);
        JumpLabel { position, depth }
    }

    /// Emit a backward jump to `target`, where the operand stack had `depth`
    /// values.
    ///
    /// Reachable code must arrive with the same depth.
    pub fn emit_loop(&mut self, target: Position, depth: u32) -> Result<Position> {
        if target.function != self.current_function() {
            return Err(CompilationError::internal(format!(
                "loop target in fn{} emitted from fn{}",
                target.function.0,
                self.current_function().0
            )));
        }
        if self.is_reachable() && self.depth() != depth {
            return Err(CompilationError::internal(format!(
                "jump to @{} leaves operand stack depth {}, target expects {depth}",
                target.index,
                self.depth()
            )));
        }
        Ok(self.emit(OpCode::Jump, Operand::Target(target.index)))
    }

    /// Point the jump at `position` to instruction `target`.
    pub fn patch(&mut self, position: Position, target: u32) -> Result<()> {
        let inst = self
            .functions
            .get_mut(position.function.index())
            .and_then(|f| f.code.get_mut(position.index as usize))
            .ok_or_else(|| {
                CompilationError::internal(format!(
                    "no instruction at fn{}@{}",
                    position.function.0, position.index
                ))
            })?;

        match inst.operand {
            Operand::Target(_) => {
                inst.operand = Operand::Target(target);
                Ok(())
            }
            _ => Err(CompilationError::internal(format!(
                "{} at fn{}@{} is not a jump",
                inst.op.name(),
                position.function.0,
                position.index
            ))),
        }
    }

    /// Bind `label` to the next instruction.
    ///
    /// If the current position is reachable by fall-through its depth must
    /// match the label's. Otherwise the label's depth becomes current.
    pub fn bind(&mut self, label: JumpLabel) -> Result<()> {
        let here = self.position();
        if label.position.function != here.function {
            return Err(CompilationError::internal(format!(
                "label from fn{} bound in fn{}",
                label.position.function.0, here.function.0
            )));
        }
        self.patch(label.position, here.index)?;

        let buf = self.current_mut();
        if buf.reachable && buf.depth != label.depth {
            return Err(CompilationError::internal(format!(
                "operand stack depth {} at @{} but jump from @{} arrives with {}",
                buf.depth, here.index, label.position.index, label.depth
            )));
        }
        buf.set_depth(label.depth);
        buf.reachable = true;
        Ok(())
    }

    /// Bind every label in `labels` to the next instruction.
    pub fn bind_all(&mut self, labels: impl IntoIterator<Item = JumpLabel>) -> Result<()> {
        labels.into_iter().try_for_each(|label| self.bind(label))
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    /// Add a constant to the pool, returning its index.
    pub fn constant(&mut self, constant: Constant) -> Result<ConstId> {
        self.constants.add(constant)
    }

    /// Pool a name as a string constant.
    pub fn name(&mut self, name: &str) -> Result<ConstId> {
        self.constant(Constant::from(name))
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    // ==========================================================================
    // Functions and handlers
    // ==========================================================================

    /// Start emitting into a new function with `params` parameters.
    pub fn begin_function(&mut self, params: u16) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(FunctionBuffer::new(params));
        self.open.push(id);
        id
    }

    /// Finish the innermost function and resume emitting into its parent.
    pub fn end_function(&mut self, locals: u16) -> Result<FunctionId> {
        if self.open.len() <= 1 {
            return Err(CompilationError::internal("no nested function is open"));
        }
        self.set_locals(locals);
        let id = self.current_function();
        self.open.pop();
        Ok(id)
    }

    /// Record the local slot count of the current function.
    pub fn set_locals(&mut self, locals: u16) {
        let buf = self.current_mut();
        buf.locals = buf.locals.max(locals);
    }

    pub fn current_function(&self) -> FunctionId {
        self.open.last().copied().unwrap_or(FunctionId::MAIN)
    }

    pub fn add_handler(&mut self, region: HandlerRegion) {
        self.handlers.push(region);
    }

    pub fn handlers(&self) -> &[HandlerRegion] {
        &self.handlers
    }

    // ==========================================================================
    // Inspection
    // ==========================================================================

    /// Position the next instruction will occupy.
    pub fn position(&self) -> Position {
        Position {
            function: self.current_function(),
            index: self.current().code.len() as u32,
        }
    }

    /// Instruction count of the current function.
    pub fn len(&self) -> usize {
        self.current().code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current().code.is_empty()
    }

    /// Instruction count across all functions.
    pub fn total_len(&self) -> usize {
        self.functions.iter().map(|f| f.code.len()).sum()
    }

    /// Instructions of the current function.
    pub fn instructions(&self) -> &[Instruction] {
        &self.current().code
    }

    pub fn instruction(&self, position: Position) -> Option<&Instruction> {
        self.functions
            .get(position.function.index())?
            .code
            .get(position.index as usize)
    }

    /// Operand-stack depth at the next instruction of the current function.
    pub fn depth(&self) -> u32 {
        self.current().depth
    }

    /// Set the depth of the current position.
    ///
    /// Used after code that never falls through, where the depth is whatever
    /// the surrounding construct expects.
    pub fn assume_depth(&mut self, depth: u32) {
        self.current_mut().set_depth(depth);
    }

    pub fn max_depth(&self) -> u32 {
        self.current().max_depth
    }

    /// Whether the next instruction can be reached by fall-through.
    pub fn is_reachable(&self) -> bool {
        self.current().reachable
    }

    /// Freeze the queue into a [`Program`].
    pub fn snapshot(self) -> Program {
        let functions = self
            .functions
            .into_iter()
            .enumerate()
            .map(|(i, buf)| FunctionCode {
                id: FunctionId(i as u32),
                params: buf.params,
                locals: buf.locals,
                max_stack: buf.max_depth,
                instructions: buf.code,
                lines: buf.lines,
            })
            .collect();
        Program::new(functions, self.constants.into_constants(), self.handlers)
    }

    fn current(&self) -> &FunctionBuffer {
        &self.functions[self.current_function().index()]
    }

    fn current_mut(&mut self) -> &mut FunctionBuffer {
        let index = self.current_function().index();
        &mut self.functions[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_tracks_depth() {
        let mut queue = InstructionQueue::new();
        queue.emit_constant(Constant::Int(1)).unwrap();
        queue.emit_constant(Constant::Int(2)).unwrap();
        assert_eq!(queue.depth(), 2);
        queue.emit_op(OpCode::Add);
        assert_eq!(queue.depth(), 1);
        assert_eq!(queue.max_depth(), 2);
    }

    #[test]
    fn terminal_makes_code_unreachable() {
        let mut queue = InstructionQueue::new();
        queue.emit_constant(Constant::Int(0)).unwrap();
        queue.emit_op(OpCode::PushNull);
        queue.emit_op(OpCode::Throw);
        assert!(!queue.is_reachable());
        assert_eq!(queue.depth(), 0);
    }

    #[test]
    fn bind_patches_forward_jump() {
        let mut queue = InstructionQueue::new();
        queue.emit_op(OpCode::PushTrue);
        let label = queue.emit_jump(OpCode::JumpIfFalse);
        queue.emit_op(OpCode::PushNull);
        queue.emit_op(OpCode::Pop);
        queue.bind(label).unwrap();

        let inst = queue.instruction(label.position()).unwrap();
        assert_eq!(inst.operand, Operand::Target(4));
    }

    #[test]
    fn bind_rejects_depth_disagreement() {
        let mut queue = InstructionQueue::new();
        queue.emit_op(OpCode::PushTrue);
        let label = queue.emit_jump(OpCode::JumpIfFalse);
        queue.emit_op(OpCode::PushNull);
        let err = queue.bind(label).unwrap_err();
        assert!(matches!(err, CompilationError::Internal { .. }));
    }

    #[test]
    fn bind_after_terminal_adopts_label_depth() {
        let mut queue = InstructionQueue::new();
        queue.emit_op(OpCode::PushNull);
        let label = queue.emit_jump(OpCode::Jump);
        assert!(!queue.is_reachable());
        queue.bind(label).unwrap();
        assert!(queue.is_reachable());
        assert_eq!(queue.depth(), 1);
    }

    #[test]
    fn patch_rejects_non_jump() {
        let mut queue = InstructionQueue::new();
        let pos = queue.emit_op(OpCode::PushNull);
        assert!(queue.patch(pos, 0).is_err());
    }

    #[test]
    fn try_begin_label_carries_caught_error() {
        let mut queue = InstructionQueue::new();
        let label = queue.emit_jump(OpCode::TryBegin);
        assert_eq!(label.depth(), 1);
        assert_eq!(queue.depth(), 0);
    }

    #[test]
    fn nested_functions_have_independent_code() {
        let mut queue = InstructionQueue::new();
        queue.emit_op(OpCode::PushNull);
        let id = queue.begin_function(2);
        assert_eq!(queue.len(), 0);
        queue.emit_op(OpCode::PushTrue);
        assert_eq!(queue.end_function(3).unwrap(), id);
        queue.emit(OpCode::MakeLambda, Operand::Function(id));

        assert!(queue.end_function(0).is_err());
        let program = queue.snapshot();
        assert_eq!(program.functions().len(), 2);
        assert_eq!(program.main().len(), 2);
        let lambda = program.function(id).unwrap();
        assert_eq!((lambda.params, lambda.locals), (2, 3));
    }

    #[test]
    fn emit_loop_rejects_foreign_target() {
        let mut queue = InstructionQueue::new();
        let start = queue.position();
        queue.begin_function(0);
        assert!(queue.emit_loop(start, 0).is_err());
    }

    #[test]
    fn emit_loop_checks_target_depth() {
        let mut queue = InstructionQueue::new();
        let start = queue.position();
        queue.emit_op(OpCode::PushNull);
        let err = queue.emit_loop(start, 0).unwrap_err();
        assert!(matches!(err, CompilationError::Internal { .. }));
        assert_eq!(queue.len(), 1);

        queue.emit_op(OpCode::Pop);
        queue.emit_loop(start, 0).unwrap();
        assert!(!queue.is_reachable());
    }

    #[test]
    fn lines_follow_set_line() {
        let mut queue = InstructionQueue::new();
        queue.set_line(4);
        queue.emit_op(OpCode::PushNull);
        queue.set_line(9);
        queue.emit_op(OpCode::Pop);
        let program = queue.snapshot();
        assert_eq!(program.main().lines, vec![4, 9]);

        let mut quiet = InstructionQueue::with_line_info(false);
        quiet.emit_op(OpCode::PushNull);
        assert!(quiet.snapshot().main().lines.is_empty());
    }
}
