//! Whole-query compilation.

use quill_ast::{Node, Walk};
use quill_core::{CompilationError, StackEffect};
use tracing::debug;

use crate::bytecode::{Constant, FunctionId, OpCode, Program};
use crate::dispatch::Dispatcher;
use crate::emit::InstructionQueue;
use crate::options::CompileOptions;
use crate::registry::CompilerRegistry;
use crate::stack::{CompilerStack, FrameData, FunctionFrame};

type Result<T> = std::result::Result<T, CompilationError>;

/// Compiles query ASTs to [`Program`]s.
///
/// A compiler holds no per-compilation state and can be reused; every call
/// to [`Compiler::compile`] starts from a fresh queue and stack.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'r> {
    registry: &'r CompilerRegistry,
    options: CompileOptions,
}

impl Default for Compiler<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler<'static> {
    /// A compiler using the standard registry and default options.
    pub fn new() -> Self {
        Self::with_options(CompileOptions::default())
    }

    pub fn with_options(options: CompileOptions) -> Self {
        Self::with_registry(CompilerRegistry::standard(), options)
    }
}

impl<'r> Compiler<'r> {
    /// A compiler using a custom registry.
    pub fn with_registry(registry: &'r CompilerRegistry, options: CompileOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile the query rooted at `root`.
    ///
    /// Either the whole tree compiles or an error is returned; there is no
    /// partial output.
    pub fn compile(&self, root: &Node<'_>) -> Result<Program> {
        self.compile_on(root, CompilerStack::new())
            .map(|(program, _)| program)
    }

    /// Like [`Compiler::compile`], also returning the compiler stack with
    /// its recorded scope events.
    pub fn compile_traced(&self, root: &Node<'_>) -> Result<(Program, CompilerStack)> {
        self.compile_on(root, CompilerStack::traced())
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn compile_on(
        &self,
        root: &Node<'_>,
        mut stack: CompilerStack,
    ) -> Result<(Program, CompilerStack)> {
        self.preflight(root)?;
        debug!(root = %root.kind(), "compiling query");

        let mut queue = InstructionQueue::with_line_info(self.options.line_info());
        let mut dx = Dispatcher::new(self.registry, self.options);

        let handle = stack.push_frame(FrameData::Function(FunctionFrame {
            function: FunctionId::MAIN,
            next_slot: 0,
        }));
        let body = lower_body(root, &mut dx, &mut queue, &mut stack);
        let frame = stack.pop_frame(handle);
        body?;
        let frame = frame?;

        if !stack.is_empty() {
            return Err(CompilationError::internal(format!(
                "{} scope frames left open after compilation",
                stack.height()
            )));
        }

        let locals = frame.into_function().map_or(0, |f| f.next_slot);
        queue.set_locals(locals);
        let program = queue.snapshot();

        debug!(
            instructions = program.instruction_count(),
            functions = program.functions().len(),
            constants = program.constants().len(),
            "compiled query"
        );
        Ok((program, stack))
    }

    /// Check that every node has a compiler and the tree is within the depth
    /// limit, before anything is emitted.
    ///
    /// Iterative, so a pathologically deep tree is reported as
    /// [`CompilationError::DepthExceeded`] instead of exhausting the stack.
    fn preflight(&self, root: &Node<'_>) -> Result<()> {
        for (node, depth) in Walk::new(root) {
            self.registry.resolve(node.kind(), node.span())?;
            if depth > self.options.max_depth {
                return Err(CompilationError::DepthExceeded {
                    limit: self.options.max_depth,
                    span: node.span(),
                });
            }
        }
        Ok(())
    }
}

/// Lower a function body and terminate it.
///
/// A value body returns its value with code 0. A statement body that can
/// fall off its end returns `(0, null)`. A diverging body already ends in a
/// terminal instruction.
pub(crate) fn lower_body(
    body: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<()> {
    match body.kind().stack_effect() {
        StackEffect::Value => {
            queue.emit_constant(Constant::Int(0))?;
            dx.compile_value(body, queue, stack)?;
            queue.emit_op(OpCode::Return);
        }
        StackEffect::Effect => {
            dx.compile(body, queue, stack)?;
            if queue.is_reachable() {
                queue.emit_constant(Constant::Int(0))?;
                queue.emit_op(OpCode::PushNull);
                queue.emit_op(OpCode::Return);
            }
        }
        StackEffect::Diverges => dx.compile(body, queue, stack)?,
    }
    Ok(())
}
