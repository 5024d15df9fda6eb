//! Compilers for statement nodes.
//!
//! Statements leave the operand stack as they found it, except for the
//! terminal statements (`break`, `continue`, `return`, `exit`, `throw`),
//! which never fall through. Constructs that open a scope push exactly one
//! frame on entry and pop it on every exit path, including errors:
//!
//! ```ignore
//! let handle = stack.push_frame(FrameData::Block);
//! let body = lower_statements(block, dx, queue, stack);
//! let frame = stack.pop_frame(handle);
//! body?;
//! frame?;
//! ```

pub mod block;
pub mod directives;
pub mod foreach_stmt;
pub mod if_stmt;
pub mod loop_control;
pub mod outcome;
pub mod run_stmt;
pub mod throw_stmt;
pub mod try_catch;
pub mod var_decl;
pub mod while_stmt;

use quill_core::CompilationError;

type Result<T> = std::result::Result<T, CompilationError>;
