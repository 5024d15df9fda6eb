//! Compilers for expression nodes.
//!
//! Every expression leaves exactly one value on the operand stack. Children
//! are lowered through [`Dispatcher::compile_value`](crate::Dispatcher::compile_value),
//! never by calling another compiler directly.

pub mod access;
pub mod call;
pub mod collections;
pub mod lambda;
pub mod literals;
pub mod operators;
pub mod ternary;
pub mod transform;

use quill_core::CompilationError;

type Result<T> = std::result::Result<T, CompilationError>;
