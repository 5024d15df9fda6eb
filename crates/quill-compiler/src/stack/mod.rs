//! Compile-time scope tracking.
//!
//! The [`CompilerStack`] holds one [`Frame`] per construct currently being
//! lowered that opens a scope: the enclosing function, loops, `try` handlers,
//! branches, blocks and transforms. Node compilers push a frame on entry and
//! pop it on exit, and consult it for:
//! - Where `break` and `continue` jump
//! - Which handlers a jump out of a region crosses
//! - Which local slot a name refers to
//! - Which slot holds the current transform element
//!
//! Frames are closed through the [`FrameHandle`] their push returned, so a
//! compiler that exits out of order is caught immediately.

mod frame;
mod trace;

pub use frame::{
    BranchFrame, Frame, FrameData, FunctionFrame, HandlerFrame, LoopFrame, TransformFrame,
};
pub use trace::{ScopeEvent, ScopeStats, is_well_nested};

use quill_core::{CompilationError, ScopeKind, Span};
use tracing::trace;

use crate::bytecode::LocalRef;

type Result<T> = std::result::Result<T, CompilationError>;

/// Most local slots one function can address.
pub const MAX_LOCALS: usize = u16::MAX as usize;

/// Proof of a push, required to pop the frame again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a pushed frame must be popped with its handle"]
pub struct FrameHandle {
    index: usize,
    serial: u32,
    kind: ScopeKind,
}

impl FrameHandle {
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }
}

/// Stack of scope frames for one compilation.
#[derive(Debug, Default)]
pub struct CompilerStack {
    frames: Vec<Frame>,
    next_serial: u32,
    stats: ScopeStats,
    events: Option<Vec<ScopeEvent>>,
}

impl CompilerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack that also records every push and pop.
    pub fn traced() -> Self {
        Self {
            events: Some(Vec::new()),
            ..Self::default()
        }
    }

    // ==========================================================================
    // Push and pop
    // ==========================================================================

    /// Open a frame.
    pub fn push_frame(&mut self, data: FrameData) -> FrameHandle {
        let kind = data.kind();
        let serial = self.next_serial;
        self.next_serial += 1;

        let index = self.frames.len();
        self.frames.push(Frame::new(serial, data));

        let height = self.frames.len();
        self.stats.pushes += 1;
        self.stats.max_height = self.stats.max_height.max(height);
        if let Some(events) = &mut self.events {
            events.push(ScopeEvent::Push {
                serial,
                kind,
                height,
            });
        }
        trace!(serial, %kind, height, "enter scope");

        FrameHandle {
            index,
            serial,
            kind,
        }
    }

    /// Close the frame `handle` refers to, which must be the innermost one.
    pub fn pop_frame(&mut self, handle: FrameHandle) -> Result<Frame> {
        match self.frames.last() {
            Some(top) if top.serial == handle.serial => {}
            top => {
                return Err(CompilationError::UnbalancedScope {
                    closing: handle.kind,
                    innermost: top.map(Frame::kind),
                });
            }
        }

        let Some(frame) = self.frames.pop() else {
            return Err(CompilationError::internal("scope stack emptied during pop"));
        };
        self.stats.pops += 1;
        if let Some(events) = &mut self.events {
            events.push(ScopeEvent::Pop {
                serial: frame.serial,
                kind: frame.kind(),
            });
        }
        trace!(serial = frame.serial, kind = %frame.kind(), "exit scope");
        Ok(frame)
    }

    /// The frame `handle` refers to, wherever it sits on the stack.
    pub fn frame_mut(&mut self, handle: FrameHandle) -> Result<&mut Frame> {
        match self.frames.get_mut(handle.index) {
            Some(frame) if frame.serial == handle.serial => Ok(frame),
            _ => Err(CompilationError::internal(format!(
                "{} frame #{} is no longer on the stack",
                handle.kind, handle.serial
            ))),
        }
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    /// Number of open frames.
    pub fn height(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Open frames, outermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Index of the innermost `kind` frame in the current function.
    ///
    /// Never looks past a function frame: a loop around a lambda is not a
    /// target for `break` inside it. Loop lookups also stop at a transform,
    /// whose iterator and accumulator sit above the loop's operands.
    fn find(&self, kind: ScopeKind) -> Option<usize> {
        for (i, frame) in self.frames.iter().enumerate().rev() {
            if frame.kind() == kind {
                return Some(i);
            }
            match frame.kind() {
                ScopeKind::Function => return None,
                ScopeKind::Transform if kind == ScopeKind::Loop => return None,
                _ => {}
            }
        }
        None
    }

    /// The innermost frame of `kind` in the current function.
    pub fn current_frame(&self, kind: ScopeKind, span: Span) -> Result<&Frame> {
        self.find(kind)
            .map(|i| &self.frames[i])
            .ok_or(CompilationError::NoEnclosingScope { kind, span })
    }

    pub fn current_frame_mut(&mut self, kind: ScopeKind, span: Span) -> Result<&mut Frame> {
        match self.find(kind) {
            Some(i) => Ok(&mut self.frames[i]),
            None => Err(CompilationError::NoEnclosingScope { kind, span }),
        }
    }

    /// Number of handler frames still guarding code between the top of the
    /// stack and the innermost `kind` frame.
    ///
    /// A jump to that frame's target must close each of them first.
    pub fn guarded_handlers_until(&self, kind: ScopeKind) -> usize {
        self.frames
            .iter()
            .rev()
            .take_while(|frame| frame.kind() != kind && frame.kind() != ScopeKind::Function)
            .filter(|frame| matches!(&frame.data, FrameData::Handler(h) if h.guarded))
            .count()
    }

    /// The innermost handler guarding the current position, if any.
    pub fn innermost_guarded_handler_mut(&mut self) -> Option<&mut HandlerFrame> {
        for frame in self.frames.iter_mut().rev() {
            match &mut frame.data {
                FrameData::Handler(handler) if handler.guarded => return Some(handler),
                FrameData::Function(_) => return None,
                _ => {}
            }
        }
        None
    }

    // ==========================================================================
    // Locals
    // ==========================================================================

    /// Reserve a slot in the current function without naming it.
    pub fn allocate_slot(&mut self, span: Span) -> Result<u16> {
        let index = self.find(ScopeKind::Function).ok_or(CompilationError::NoEnclosingScope {
            kind: ScopeKind::Function,
            span,
        })?;
        let FrameData::Function(function) = &mut self.frames[index].data else {
            return Err(CompilationError::internal("function frame without function data"));
        };

        if usize::from(function.next_slot) >= MAX_LOCALS {
            return Err(CompilationError::TooManyLocals {
                limit: MAX_LOCALS,
                span,
            });
        }
        let slot = function.next_slot;
        function.next_slot += 1;
        Ok(slot)
    }

    /// Declare `name` in the innermost frame, shadowing outer bindings.
    pub fn declare(&mut self, name: &str, span: Span) -> Result<u16> {
        let slot = self.allocate_slot(span)?;
        // allocate_slot succeeded, so there is a frame.
        if let Some(top) = self.frames.last_mut() {
            top.bindings.insert(name.to_string(), slot);
        }
        Ok(slot)
    }

    /// Bind `name` to an already allocated slot in the innermost frame.
    pub fn bind(&mut self, name: &str, slot: u16) {
        if let Some(top) = self.frames.last_mut() {
            top.bindings.insert(name.to_string(), slot);
        }
    }

    /// Look up a local by name, innermost binding first.
    pub fn resolve(&self, name: &str) -> Option<LocalRef> {
        let mut depth = 0u16;
        for frame in self.frames.iter().rev() {
            if let Some(slot) = frame.lookup(name) {
                return Some(LocalRef::new(depth, slot));
            }
            if frame.kind() == ScopeKind::Function {
                depth += 1;
            }
        }
        None
    }

    /// The slot of the current transform element, `#`.
    ///
    /// Unlike loop lookups this crosses function boundaries, so a lambda
    /// inside a transform shape sees the element being shaped.
    pub fn element(&self, span: Span) -> Result<LocalRef> {
        let mut depth = 0u16;
        for frame in self.frames.iter().rev() {
            match &frame.data {
                FrameData::Transform(transform) => {
                    return Ok(LocalRef::new(depth, transform.element));
                }
                FrameData::Function(_) => depth += 1,
                _ => {}
            }
        }
        Err(CompilationError::NoEnclosingScope {
            kind: ScopeKind::Transform,
            span,
        })
    }

    /// Slots used so far by the current function.
    pub fn function_slots(&self) -> u16 {
        self.find(ScopeKind::Function)
            .and_then(|i| match &self.frames[i].data {
                FrameData::Function(f) => Some(f.next_slot),
                _ => None,
            })
            .unwrap_or(0)
    }

    // ==========================================================================
    // Tracing
    // ==========================================================================

    pub fn stats(&self) -> ScopeStats {
        self.stats
    }

    /// Recorded events, if this stack was created with [`CompilerStack::traced`].
    pub fn events(&self) -> Option<&[ScopeEvent]> {
        self.events.as_deref()
    }
}
