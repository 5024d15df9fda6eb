//! Compilation errors.
//!
//! Every variant is fatal to the compilation that raised it: the compiler
//! never hands out a partial program. Runtime errors raised by `throw` are
//! not represented here; they are opaque `(code, data)` pairs for the VM.

use thiserror::Error;

use crate::{NodeKind, ScopeKind, Span};

/// Errors that occur while lowering an AST to instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    /// No compiler is registered for a node kind.
    #[error("at {span}: no compiler registered for {kind} nodes")]
    UnsupportedNodeKind {
        /// The kind that could not be resolved.
        kind: NodeKind,
        /// Where the node was found.
        span: Span,
    },

    /// A scope frame was closed while it was not the innermost frame.
    #[error(
        "scope exit out of order: closing {closing} frame but innermost is {}",
        innermost.map_or("none", ScopeKind::name)
    )]
    UnbalancedScope {
        /// The kind of frame the caller tried to close.
        closing: ScopeKind,
        /// The kind of the frame actually on top, if any.
        innermost: Option<ScopeKind>,
    },

    /// A construct needs an enclosing scope that does not exist.
    #[error("at {span}: no enclosing {kind} scope")]
    NoEnclosingScope {
        /// The scope kind that was requested.
        kind: ScopeKind,
        /// Where the request was made.
        span: Span,
    },

    /// The AST nests deeper than the configured limit.
    #[error("at {span}: nesting depth exceeds the limit of {limit}")]
    DepthExceeded {
        /// The configured maximum depth.
        limit: usize,
        /// The first node found past the limit.
        span: Span,
    },

    /// Assignment to a name that is not a declared local.
    #[error("at {span}: assignment to undeclared variable '{name}'")]
    UnknownVariable {
        /// The variable name.
        name: String,
        /// Where the assignment occurred.
        span: Span,
    },

    /// A node compiler left the operand stack at the wrong depth.
    #[error("at {span}: {kind} left operand stack at depth {found}, expected {expected}")]
    StackMismatch {
        /// The node kind whose contract was violated.
        kind: NodeKind,
        /// Depth required by the node's stack contract.
        expected: u32,
        /// Depth actually reached.
        found: u32,
        /// Where the node was found.
        span: Span,
    },

    /// A `break` or `continue` would leave its loop with values still on the
    /// operand stack, as when it appears inside a list or call argument.
    #[error("at {span}: {kind} leaves operand stack at depth {found}, loop expects {expected}")]
    UnbalancedJump {
        /// `break` or `continue`.
        kind: NodeKind,
        /// Depth at the loop's jump targets.
        expected: u32,
        /// Depth where the jump was requested.
        found: u32,
        /// Where the jump was found.
        span: Span,
    },

    /// Two compilers were registered for the same node kind.
    #[error("a compiler is already registered for {kind} nodes")]
    DuplicateRegistration {
        /// The kind registered twice.
        kind: NodeKind,
    },

    /// The constant pool is full.
    #[error("too many constants (limit: {limit})")]
    TooManyConstants {
        /// Maximum number of constants.
        limit: usize,
    },

    /// A function needs more local slots than an operand can address.
    #[error("at {span}: too many local variables (limit: {limit})")]
    TooManyLocals {
        /// Maximum number of local slots.
        limit: usize,
        /// Where the last local was declared.
        span: Span,
    },

    /// Internal compiler error.
    #[error("internal compiler error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::UnsupportedNodeKind { span, .. } => *span,
            CompilationError::NoEnclosingScope { span, .. } => *span,
            CompilationError::DepthExceeded { span, .. } => *span,
            CompilationError::UnknownVariable { span, .. } => *span,
            CompilationError::StackMismatch { span, .. } => *span,
            CompilationError::UnbalancedJump { span, .. } => *span,
            CompilationError::TooManyLocals { span, .. } => *span,
            CompilationError::UnbalancedScope { .. }
            | CompilationError::DuplicateRegistration { .. }
            | CompilationError::TooManyConstants { .. }
            | CompilationError::Internal { .. } => Span::default(),
        }
    }

    /// Shorthand for an [`CompilationError::Internal`] error.
    pub fn internal(message: impl Into<String>) -> Self {
        CompilationError::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_kind_message_names_the_kind() {
        let err = CompilationError::UnsupportedNodeKind {
            kind: NodeKind::Throw,
            span: Span::new(3, 7, 5),
        };
        assert_eq!(err.to_string(), "at 3:7: no compiler registered for throw nodes");
        assert_eq!(err.span(), Span::new(3, 7, 5));
    }

    #[test]
    fn unbalanced_scope_message() {
        let err = CompilationError::UnbalancedScope {
            closing: ScopeKind::Loop,
            innermost: Some(ScopeKind::Handler),
        };
        assert_eq!(
            err.to_string(),
            "scope exit out of order: closing loop frame but innermost is handler"
        );

        let empty = CompilationError::UnbalancedScope {
            closing: ScopeKind::Block,
            innermost: None,
        };
        assert!(empty.to_string().ends_with("innermost is none"));
    }

    #[test]
    fn unbalanced_jump_message() {
        let err = CompilationError::UnbalancedJump {
            kind: NodeKind::Continue,
            expected: 0,
            found: 1,
            span: Span::point(2, 9),
        };
        assert_eq!(
            err.to_string(),
            "at 2:9: continue leaves operand stack at depth 1, loop expects 0"
        );
        assert_eq!(err.span(), Span::point(2, 9));
    }

    #[test]
    fn scope_errors_carry_no_span() {
        let err = CompilationError::internal("boom");
        assert_eq!(err.span(), Span::default());
        assert_eq!(err.to_string(), "internal compiler error: boom");
    }
}
