//! Quill: the lowering stage of an embedded query-language compiler.
//!
//! The parser hands over an AST ([`ast`]) and this crate lowers it into a
//! flat, jump-patched instruction [`Program`] for the query VM ([`compiler`]).
//!
//! # Example
//!
//! ```
//! use quill::prelude::*;
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//! let program = quill::compile(&ast.throw(404, ast.string("not found"))).unwrap();
//!
//! assert_eq!(
//!     program.listing(FunctionId::MAIN),
//!     ["LDC 404", "LDC \"not found\"", "THROW"]
//! );
//! ```

pub use quill_ast as ast;
pub use quill_compiler as compiler;
pub use quill_core as core;

pub use quill_compiler::{CompilationError, CompileOptions, Compiler, Program};

/// Compile `root` with the standard compilers and default options.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile(root: &ast::Node<'_>) -> Result<Program, CompilationError> {
    Compiler::new().compile(root)
}

pub mod prelude {
    pub use bumpalo::Bump;
    pub use quill_ast::{AstBuilder, BinaryOp, ImportKind, LiteralValue, LogicalOp, Node, UnaryOp};
    pub use quill_compiler::bytecode::{Constant, FunctionId, HandlerRegion, OpCode, Operand};
    pub use quill_compiler::{
        CompilationError, CompileFlags, CompileOptions, Compiler, CompilerRegistry, Program,
        RegistryBuilder,
    };
    pub use quill_core::{NodeKind, ScopeKind, Span, StackEffect};
}
