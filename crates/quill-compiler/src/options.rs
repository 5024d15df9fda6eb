//! Compilation options.

use bitflags::bitflags;

/// Default nesting limit for an AST.
pub const DEFAULT_MAX_DEPTH: usize = 256;

bitflags! {
    /// Optional compiler behaviors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CompileFlags: u8 {
        /// Record the source line of every instruction.
        const LINE_INFO = 1 << 0;
        /// Check every node's operand-stack contract as it is lowered.
        const VERIFY_STACK = 1 << 1;
    }
}

impl Default for CompileFlags {
    fn default() -> Self {
        CompileFlags::LINE_INFO | CompileFlags::VERIFY_STACK
    }
}

/// Settings for one [`Compiler`](crate::Compiler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Deepest AST nesting accepted before compilation fails.
    pub max_depth: usize,
    pub flags: CompileFlags,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            flags: CompileFlags::default(),
        }
    }
}

impl CompileOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_flags(mut self, flags: CompileFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn without(mut self, flags: CompileFlags) -> Self {
        self.flags.remove(flags);
        self
    }

    #[inline]
    pub fn line_info(&self) -> bool {
        self.flags.contains(CompileFlags::LINE_INFO)
    }

    #[inline]
    pub fn verify_stack(&self) -> bool {
        self.flags.contains(CompileFlags::VERIFY_STACK)
    }
}
