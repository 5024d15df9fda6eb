//! Node-kind to compiler registry.
//!
//! Every [`NodeKind`] maps to exactly one lowering function. The standard
//! registry is built once from an exhaustive `match`, so adding a node kind
//! without a compiler is a build error rather than a runtime gap. Custom
//! registries, for embedding hosts that replace or withhold constructs, are
//! assembled with [`RegistryBuilder`].

use lazy_static::lazy_static;
use quill_ast::Node;
use quill_core::{CompilationError, NodeKind, Span};

use crate::dispatch::Dispatcher;
use crate::emit::InstructionQueue;
use crate::stack::CompilerStack;
use crate::{expr, stmt};

/// A node compiler.
///
/// Appends the instructions for `node` to the queue, compiling children
/// through the dispatcher, and leaves the compiler stack as it found it.
pub type LowerFn = fn(
    &Node<'_>,
    &mut Dispatcher<'_>,
    &mut InstructionQueue,
    &mut CompilerStack,
) -> Result<(), CompilationError>;

lazy_static! {
    static ref STANDARD: CompilerRegistry = CompilerRegistry::from_fn(standard_compiler);
}

/// The built-in compiler for `kind`.
pub fn standard_compiler(kind: NodeKind) -> LowerFn {
    match kind {
        NodeKind::Literal => expr::literals::lower_literal,
        NodeKind::List => expr::collections::lower_list,
        NodeKind::Object => expr::collections::lower_object,
        NodeKind::Ident => expr::access::lower_ident,
        NodeKind::Param => expr::access::lower_param,
        NodeKind::Current => expr::access::lower_current,
        NodeKind::Member => expr::access::lower_member,
        NodeKind::Index => expr::access::lower_index,
        NodeKind::Call => expr::call::lower_call,
        NodeKind::Unary => expr::operators::lower_unary,
        NodeKind::Binary => expr::operators::lower_binary,
        NodeKind::Logical => expr::operators::lower_logical,
        NodeKind::Ternary => expr::ternary::lower_ternary,
        NodeKind::Group => expr::operators::lower_group,
        NodeKind::Lambda => expr::lambda::lower_lambda,
        NodeKind::Transform => expr::transform::lower_transform,
        NodeKind::Block => stmt::block::lower_block,
        NodeKind::Var => stmt::var_decl::lower_var,
        NodeKind::Assign => stmt::var_decl::lower_assign,
        NodeKind::Run => stmt::run_stmt::lower_run,
        NodeKind::Hint => stmt::directives::lower_hint,
        NodeKind::Import => stmt::directives::lower_import,
        NodeKind::If => stmt::if_stmt::lower_if,
        NodeKind::While => stmt::while_stmt::lower_while,
        NodeKind::ForEach => stmt::foreach_stmt::lower_foreach,
        NodeKind::Break => stmt::loop_control::lower_break,
        NodeKind::Continue => stmt::loop_control::lower_continue,
        NodeKind::Try => stmt::try_catch::lower_try,
        NodeKind::Return => stmt::outcome::lower_return,
        NodeKind::Exit => stmt::outcome::lower_exit,
        NodeKind::Throw => stmt::throw_stmt::lower_throw,
    }
}

/// Immutable mapping from node kind to compiler.
#[derive(Clone)]
pub struct CompilerRegistry {
    entries: [Option<LowerFn>; NodeKind::COUNT],
}

impl std::fmt::Debug for CompilerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerRegistry")
            .field("registered", &self.len())
            .field("missing", &self.missing_kinds())
            .finish()
    }
}

impl CompilerRegistry {
    /// The registry with a compiler for every node kind.
    pub fn standard() -> &'static CompilerRegistry {
        &STANDARD
    }

    fn from_fn(f: impl Fn(NodeKind) -> LowerFn) -> Self {
        let mut entries = [None; NodeKind::COUNT];
        for kind in NodeKind::ALL {
            entries[kind.index()] = Some(f(kind));
        }
        Self { entries }
    }

    /// Look up the compiler for `kind`. `span` locates the error if none is
    /// registered.
    pub fn resolve(&self, kind: NodeKind, span: Span) -> Result<LowerFn, CompilationError> {
        self.get(kind)
            .ok_or(CompilationError::UnsupportedNodeKind { kind, span })
    }

    pub fn get(&self, kind: NodeKind) -> Option<LowerFn> {
        self.entries[kind.index()]
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.entries[kind.index()].is_some()
    }

    /// Number of kinds with a compiler.
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every node kind has a compiler.
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(Option::is_some)
    }

    /// Kinds without a compiler, in declaration order.
    pub fn missing_kinds(&self) -> Vec<NodeKind> {
        NodeKind::ALL
            .into_iter()
            .filter(|kind| !self.contains(*kind))
            .collect()
    }
}

/// Assembles a [`CompilerRegistry`].
#[derive(Clone)]
pub struct RegistryBuilder {
    entries: [Option<LowerFn>; NodeKind::COUNT],
}

impl std::fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registered = self.entries.iter().flatten().count();
        f.debug_struct("RegistryBuilder")
            .field("registered", &registered)
            .finish()
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self {
            entries: [None; NodeKind::COUNT],
        }
    }

    /// A builder pre-filled with the standard compilers.
    pub fn standard() -> Self {
        Self {
            entries: STANDARD.entries,
        }
    }

    /// Register `compiler` for `kind`. Each kind can be registered once.
    pub fn register(
        &mut self,
        kind: NodeKind,
        compiler: LowerFn,
    ) -> Result<&mut Self, CompilationError> {
        let entry = &mut self.entries[kind.index()];
        if entry.is_some() {
            return Err(CompilationError::DuplicateRegistration { kind });
        }
        *entry = Some(compiler);
        Ok(self)
    }

    /// Remove the compiler for `kind`, returning it if one was registered.
    pub fn unregister(&mut self, kind: NodeKind) -> Option<LowerFn> {
        self.entries[kind.index()].take()
    }

    pub fn build(&self) -> CompilerRegistry {
        CompilerRegistry {
            entries: self.entries,
        }
    }
}
