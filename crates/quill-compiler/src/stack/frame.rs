//! Scope frames and their per-kind metadata.

use quill_core::ScopeKind;
use rustc_hash::FxHashMap;

use crate::bytecode::{FunctionId, Position};
use crate::emit::JumpLabel;

/// Metadata carried by a function frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionFrame {
    pub function: FunctionId,
    /// Next free local slot. Slots are never reused within a function.
    pub next_slot: u16,
}

/// Metadata carried by a loop frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopFrame {
    /// Where `continue` jumps back to.
    pub continue_target: Position,
    /// Operand-stack depth at both the continue target and the exit.
    pub depth: u32,
    /// `break` jumps, bound when the loop is closed.
    pub breaks: Vec<JumpLabel>,
}

impl LoopFrame {
    pub fn new(continue_target: Position, depth: u32) -> Self {
        Self {
            continue_target,
            depth,
            breaks: Vec::new(),
        }
    }
}

/// Metadata carried by a handler frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFrame {
    /// Position of the `TryBegin`.
    pub begin: Position,
    /// Whether code being emitted is inside the protected region. False
    /// once the catch path starts.
    pub guarded: bool,
    /// Number of `throw` statements lowered while guarded.
    pub throws: u32,
}

impl HandlerFrame {
    pub fn new(begin: Position) -> Self {
        Self {
            begin,
            guarded: true,
            throws: 0,
        }
    }
}

/// Metadata carried by a branch frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchFrame {
    /// Index of the arm being lowered.
    pub arm: u32,
    /// Jumps from the end of each arm to the join point.
    pub exits: Vec<JumpLabel>,
}

/// Metadata carried by a transform frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformFrame {
    /// Slot holding the current element, `#`.
    pub element: u16,
}

/// Kind-specific metadata of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameData {
    Function(FunctionFrame),
    Loop(LoopFrame),
    Handler(HandlerFrame),
    Branch(BranchFrame),
    Block,
    Transform(TransformFrame),
}

impl FrameData {
    pub fn kind(&self) -> ScopeKind {
        match self {
            FrameData::Function(_) => ScopeKind::Function,
            FrameData::Loop(_) => ScopeKind::Loop,
            FrameData::Handler(_) => ScopeKind::Handler,
            FrameData::Branch(_) => ScopeKind::Branch,
            FrameData::Block => ScopeKind::Block,
            FrameData::Transform(_) => ScopeKind::Transform,
        }
    }
}

/// A scope frame on the compiler stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Unique per stack, in push order.
    pub serial: u32,
    /// Locals declared in this scope, by name.
    pub bindings: FxHashMap<String, u16>,
    pub data: FrameData,
}

impl Frame {
    pub(super) fn new(serial: u32, data: FrameData) -> Self {
        Self {
            serial,
            bindings: FxHashMap::default(),
            data,
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.data.kind()
    }

    pub fn lookup(&self, name: &str) -> Option<u16> {
        self.bindings.get(name).copied()
    }

    pub fn as_loop_mut(&mut self) -> Option<&mut LoopFrame> {
        match &mut self.data {
            FrameData::Loop(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_handler_mut(&mut self) -> Option<&mut HandlerFrame> {
        match &mut self.data {
            FrameData::Handler(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_branch_mut(&mut self) -> Option<&mut BranchFrame> {
        match &mut self.data {
            FrameData::Branch(frame) => Some(frame),
            _ => None,
        }
    }

    /// Consume a loop frame, returning its metadata.
    pub fn into_loop(self) -> Option<LoopFrame> {
        match self.data {
            FrameData::Loop(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn into_handler(self) -> Option<HandlerFrame> {
        match self.data {
            FrameData::Handler(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn into_branch(self) -> Option<BranchFrame> {
        match self.data {
            FrameData::Branch(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn into_function(self) -> Option<FunctionFrame> {
        match self.data {
            FrameData::Function(frame) => Some(frame),
            _ => None,
        }
    }
}
