//! Quill Core
//!
//! Shared vocabulary for the Quill query language toolchain: source spans,
//! the node and scope kind discriminators, and the compilation error type.
//!
//! The parser and the compiler both depend on this crate so that errors can
//! name the construct that caused them without a dependency cycle.

mod error;
mod kinds;
mod span;

pub use error::CompilationError;
pub use kinds::{NodeKind, ScopeKind, StackEffect};
pub use span::Span;
