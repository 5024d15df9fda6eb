//! The compiled output handed to the VM.

use std::fmt;

use xxhash_rust::xxh64::xxh64;

use super::constant::Constant;
use super::instruction::{ConstId, FunctionId, Instruction, Operand};

/// Leading bytes of an encoded program.
pub const MAGIC: &[u8; 4] = b"QIL\x01";

/// Code for one function: the query root or a lambda body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCode {
    pub id: FunctionId,
    /// Number of parameters, occupying slots `0..params`.
    pub params: u16,
    /// Number of local slots, parameters included.
    pub locals: u16,
    /// Highest operand-stack depth reached.
    pub max_stack: u32,
    pub instructions: Vec<Instruction>,
    /// Source line per instruction. Empty when line info is disabled.
    pub lines: Vec<u32>,
}

impl FunctionCode {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Source line of the instruction at `index`, if recorded.
    pub fn line(&self, index: usize) -> Option<u32> {
        self.lines.get(index).copied()
    }
}

/// A protected instruction range and where its errors are caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerRegion {
    pub function: FunctionId,
    /// Index of the `TryBegin`.
    pub start: u32,
    /// End of the guarded range: the closing `TryEnd`, or the first catch
    /// instruction when the body never completes normally.
    pub end: u32,
    /// First instruction of the catch path.
    pub catch: u32,
    /// Number of `throw` statements lowered inside the guarded range.
    pub throws: u32,
}

/// A compiled query.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    functions: Vec<FunctionCode>,
    constants: Vec<Constant>,
    handlers: Vec<HandlerRegion>,
}

impl Program {
    pub(crate) fn new(
        functions: Vec<FunctionCode>,
        constants: Vec<Constant>,
        handlers: Vec<HandlerRegion>,
    ) -> Self {
        Self {
            functions,
            constants,
            handlers,
        }
    }

    /// The query root.
    pub fn main(&self) -> &FunctionCode {
        &self.functions[FunctionId::MAIN.index()]
    }

    pub fn function(&self, id: FunctionId) -> Option<&FunctionCode> {
        self.functions.get(id.index())
    }

    pub fn functions(&self) -> &[FunctionCode] {
        &self.functions
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn constant(&self, id: ConstId) -> Option<&Constant> {
        self.constants.get(id.0 as usize)
    }

    pub fn handlers(&self) -> &[HandlerRegion] {
        &self.handlers
    }

    /// Total instruction count across all functions.
    pub fn instruction_count(&self) -> usize {
        self.functions.iter().map(FunctionCode::len).sum()
    }

    /// Render one function's instructions with constants resolved inline,
    /// e.g. `LDC 404` rather than `LDC #0`.
    pub fn listing(&self, id: FunctionId) -> Vec<String> {
        let Some(function) = self.function(id) else {
            return Vec::new();
        };
        function
            .instructions
            .iter()
            .map(|inst| self.render(inst))
            .collect()
    }

    fn render(&self, inst: &Instruction) -> String {
        let name = inst.op.name();
        let resolve = |id: ConstId| match self.constant(id) {
            Some(c) => c.to_string(),
            None => format!("#{}?", id.0),
        };
        match inst.operand {
            Operand::None => name.to_string(),
            Operand::Const(id) => format!("{name} {}", resolve(id)),
            Operand::Hint { key, value } => format!("{name} {} {}", resolve(key), resolve(value)),
            operand => format!("{name} {operand}"),
        }
    }

    /// Serialize to the VM's big-endian binary format.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.instruction_count() * 5);
        out.extend_from_slice(MAGIC);

        write_u32(&mut out, self.constants.len() as u32);
        for constant in &self.constants {
            out.push(constant.tag());
            match constant {
                Constant::Null => {}
                Constant::Bool(b) => out.push(u8::from(*b)),
                Constant::Int(i) => out.extend_from_slice(&i.to_be_bytes()),
                Constant::Float(x) => out.extend_from_slice(&x.to_bits().to_be_bytes()),
                Constant::String(s) => {
                    write_u32(&mut out, s.len() as u32);
                    out.extend_from_slice(s.as_bytes());
                }
            }
        }

        write_u32(&mut out, self.functions.len() as u32);
        for function in &self.functions {
            write_u16(&mut out, function.params);
            write_u16(&mut out, function.locals);
            write_u32(&mut out, function.max_stack);
            write_u32(&mut out, function.instructions.len() as u32);
            for inst in &function.instructions {
                out.push(u8::from(inst.op));
                encode_operand(&mut out, inst.operand);
            }
        }

        write_u32(&mut out, self.handlers.len() as u32);
        for region in &self.handlers {
            write_u32(&mut out, region.function.0);
            write_u32(&mut out, region.start);
            write_u32(&mut out, region.end);
            write_u32(&mut out, region.catch);
            write_u32(&mut out, region.throws);
        }
        out
    }

    /// Stable 64-bit digest of [`Program::encode`].
    pub fn fingerprint(&self) -> u64 {
        xxh64(&self.encode(), 0)
    }
}

fn write_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn encode_operand(out: &mut Vec<u8>, operand: Operand) {
    match operand {
        Operand::None => {}
        Operand::Const(id) => write_u32(out, id.0),
        Operand::Target(t) => write_u32(out, t),
        Operand::Local(local) => {
            write_u16(out, local.depth);
            write_u16(out, local.slot);
        }
        Operand::Count(n) => write_u16(out, n),
        Operand::Function(id) => write_u32(out, id.0),
        Operand::Hint { key, value } => {
            write_u32(out, key.0);
            write_u32(out, value.0);
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for function in &self.functions {
            writeln!(
                f,
                "fn{} (params: {}, locals: {}, stack: {}):",
                function.id.0, function.params, function.locals, function.max_stack
            )?;
            for (i, inst) in function.instructions.iter().enumerate() {
                match function.line(i) {
                    Some(line) => writeln!(f, "  {i:04} [{line:>4}] {}", self.render(inst))?,
                    None => writeln!(f, "  {i:04}        {}", self.render(inst))?,
                }
            }
        }
        for region in &self.handlers {
            writeln!(
                f,
                "handler fn{} @{}..@{} -> @{} (throws: {})",
                region.function.0, region.start, region.end, region.catch, region.throws
            )?;
        }
        Ok(())
    }
}
