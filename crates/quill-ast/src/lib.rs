//! Quill AST crate.
//!
//! The abstract syntax tree handed from the parser to the compiler. Nodes are
//! allocated in a [`bumpalo::Bump`] arena owned by the caller and borrowed
//! for `'ast`; the compiler only ever reads them.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use quill_ast::{AstBuilder, NodeKind};
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//! let root = ast.throw(404, ast.string("not found"));
//! assert_eq!(root.kind(), NodeKind::Throw);
//! ```

mod builder;
pub mod node;
pub mod ops;
mod walk;

pub use builder::AstBuilder;
pub use node::*;
pub use ops::{BinaryOp, LogicalOp, UnaryOp};
pub use walk::{Children, Walk};

pub use quill_core::{NodeKind, Span, StackEffect};
