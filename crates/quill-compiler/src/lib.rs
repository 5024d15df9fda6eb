//! Quill Compiler
//!
//! Lowers a Quill query AST into a flat instruction program for the Quill VM.
//!
//! ## Architecture
//!
//! Lowering is a single recursive pass. The [`Compiler`] opens the root
//! function scope and hands the root node to the [`Dispatcher`], which looks
//! up the node's compiler in the [`CompilerRegistry`]. Each node compiler
//! appends its instructions to the [`InstructionQueue`], tracks scopes on the
//! [`CompilerStack`], and sends child nodes back through the dispatcher.
//!
//! ## Modules
//!
//! - [`bytecode`]: Instruction set, constant pool and the compiled [`Program`]
//! - [`dispatch`]: Node-to-compiler routing and stack-contract checks
//! - [`emit`]: The instruction queue
//! - [`expr`]: Compilers for expression nodes
//! - [`options`]: Compilation options
//! - [`registry`]: Node-kind to compiler registry
//! - [`stack`]: Compile-time scope frames
//! - [`stmt`]: Compilers for statement nodes

pub mod bytecode;
mod compiler;
pub mod dispatch;
pub mod emit;
pub mod expr;
pub mod options;
pub mod registry;
pub mod stack;
pub mod stmt;

pub use bytecode::{Constant, FunctionId, Instruction, OpCode, Operand, Program};
pub use compiler::Compiler;
pub use dispatch::Dispatcher;
pub use emit::{InstructionQueue, JumpLabel};
pub use options::{CompileFlags, CompileOptions, DEFAULT_MAX_DEPTH};
pub use registry::{CompilerRegistry, LowerFn, RegistryBuilder, standard_compiler};
pub use stack::{CompilerStack, FrameHandle};

// Re-export CompilationError from core for convenience
pub use quill_core::CompilationError;

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize a tracing subscriber for tests, filtered by `RUST_LOG`
    /// (default `debug`). Call at the start of a test to see lowering traces.
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Ignore the error if another test already installed a subscriber.
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }

    /// Compile `root` with the standard registry and default options.
    pub fn compile(root: &quill_ast::Node<'_>) -> crate::Program {
        match crate::Compiler::new().compile(root) {
            Ok(program) => program,
            Err(err) => panic!("compilation failed: {err}"),
        }
    }

    /// Instructions of the root function of `root`, constants inline.
    pub fn main_listing(root: &quill_ast::Node<'_>) -> Vec<String> {
        compile(root).listing(crate::FunctionId::MAIN)
    }
}
