//! Whole-program properties of the compiler: determinism, registry coverage,
//! scope balance and failure behavior.

use pretty_assertions::assert_eq;
use quill::compiler::stack::{CompilerStack, is_well_nested};
use quill::compiler::{Dispatcher, InstructionQueue};
use quill::prelude::*;

/// A query touching every statement and most expression kinds.
fn sample<'a>(ast: &AstBuilder<'a>) -> Node<'a> {
    ast.block(&[
        ast.hint("MAX_ROWS", LiteralValue::Int(50)),
        ast.import(ImportKind::Module, "net.quill.fx.Collections", "col"),
        ast.var("total", ast.int(0)),
        ast.var(
            "rows",
            ast.call(
                ast.member(ast.ident("col"), "filter"),
                &[
                    ast.param("rows"),
                    ast.lambda(
                        &["r"],
                        ast.binary(BinaryOp::Gt, ast.member(ast.ident("r"), "age"), ast.int(18)),
                    ),
                ],
            ),
        ),
        ast.for_each(
            "row",
            ast.ident("rows"),
            ast.block(&[
                ast.if_else(
                    ast.unary(UnaryOp::Not, ast.member(ast.ident("row"), "active")),
                    ast.continue_stmt(),
                    None,
                ),
                ast.assign(
                    "total",
                    ast.binary(BinaryOp::Add, ast.ident("total"), ast.int(1)),
                ),
                ast.if_else(
                    ast.binary(BinaryOp::Ge, ast.ident("total"), ast.int(10)),
                    ast.break_stmt(),
                    None,
                ),
            ]),
        ),
        ast.try_catch(
            ast.if_else(
                ast.binary(BinaryOp::Eq, ast.ident("total"), ast.int(0)),
                ast.throw(404, ast.string("no rows")),
                None,
            ),
            Some("e"),
            ast.exit_with(1, Some(ast.ident("e"))),
        ),
        ast.return_with(
            0,
            Some(ast.each(
                ast.ident("rows"),
                ast.object(&[
                    ("name", ast.member(ast.current(), "name")),
                    (
                        "adult",
                        ast.ternary(
                            ast.logical(
                                LogicalOp::And,
                                ast.bool(true),
                                ast.member(ast.current(), "adult"),
                            ),
                            ast.string("yes"),
                            ast.string("no"),
                        ),
                    ),
                ]),
            )),
        ),
    ])
}

#[test]
fn test_compilation_is_deterministic() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let root = sample(&ast);

    let first = quill::compile(&root).unwrap();
    let second = quill::compile(&root).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.encode(), second.encode());
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn test_encoding_starts_with_magic() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = quill::compile(&sample(&ast)).unwrap();
    assert!(program.encode().starts_with(quill::compiler::bytecode::MAGIC));
}

#[test]
fn test_every_kind_has_a_standard_compiler() {
    let registry = CompilerRegistry::standard();
    assert!(registry.is_complete());
    assert!(registry.missing_kinds().is_empty());
    assert_eq!(registry.len(), NodeKind::COUNT);
    for kind in NodeKind::ALL {
        assert!(registry.contains(kind), "{kind}");
        assert!(registry.resolve(kind, Span::default()).is_ok());
    }
}

#[test]
fn test_scope_frames_are_balanced() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let (_, stack) = Compiler::new().compile_traced(&sample(&ast)).unwrap();

    let events = stack.events().unwrap();
    assert!(is_well_nested(events));
    assert!(stack.stats().is_balanced());
    assert!(stack.is_empty());

    for kind in [
        ScopeKind::Function,
        ScopeKind::Loop,
        ScopeKind::Handler,
        ScopeKind::Branch,
        ScopeKind::Block,
        ScopeKind::Transform,
    ] {
        assert!(
            events.iter().any(|e| e.kind() == kind),
            "no {kind} frame recorded"
        );
    }
}

#[test]
fn test_sample_compiles_to_two_functions() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = quill::compile(&sample(&ast)).unwrap();

    assert_eq!(program.functions().len(), 2);
    let lambda = program.function(FunctionId(1)).unwrap();
    assert_eq!(lambda.params, 1);
    assert_eq!(program.handlers().len(), 1);
    let unpatched = Some(u32::MAX);
    assert!(program.main().instructions.iter().all(|inst| inst.target() != unpatched));
}

#[test]
fn test_failure_emits_no_partial_program() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena).at(4, 2);

    let root = ast.block(&[ast.run(ast.int(1)), ast.break_stmt()]);
    let err = quill::compile(&root).unwrap_err();
    assert_eq!(
        err,
        CompilationError::NoEnclosingScope {
            kind: ScopeKind::Loop,
            span: Span::point(4, 2),
        }
    );
}

#[test]
fn test_break_failure_leaves_queue_untouched_by_break() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let mut dx = Dispatcher::new(CompilerRegistry::standard(), CompileOptions::default());
    let mut queue = InstructionQueue::new();
    let mut stack = CompilerStack::new();

    queue.emit_op(OpCode::PushNull);
    queue.emit_op(OpCode::Pop);
    let before = queue.len();

    assert!(dx.compile(&ast.break_stmt(), &mut queue, &mut stack).is_err());
    assert_eq!(queue.len(), before);
    assert_eq!(queue.depth(), 0);
    assert!(stack.is_empty());
}

#[test]
fn test_unbalanced_continue_stops_at_the_jump() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let mut dx = Dispatcher::new(CompilerRegistry::standard(), CompileOptions::default());
    let mut queue = InstructionQueue::new();
    let mut stack = CompilerStack::new();

    let root = ast.while_loop(
        ast.bool(true),
        ast.run(ast.list(&[ast.int(1), ast.continue_stmt()])),
    );
    let err = dx.compile(&root, &mut queue, &mut stack).unwrap_err();
    assert!(matches!(
        err,
        CompilationError::UnbalancedJump {
            kind: NodeKind::Continue,
            expected: 0,
            found: 1,
            ..
        }
    ));
    // PUSH_TRUE, JUMP_IF_FALSE, NEW_LIST, LDC 1, PUSH and nothing after.
    assert_eq!(queue.len(), 5);
    assert_eq!(
        queue.instructions().last().map(|i| i.op),
        Some(OpCode::Push)
    );
    assert!(stack.is_empty());
}

#[test]
fn test_pathological_nesting_is_rejected_up_front() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);

    let mut node = ast.int(1);
    for _ in 0..10_000 {
        node = ast.group(node);
    }
    let err = quill::compile(&node).unwrap_err();
    assert!(matches!(
        err,
        CompilationError::DepthExceeded { limit: 256, .. }
    ));
}

#[test]
fn test_missing_compiler_is_reported_before_emission() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena).at(2, 7);

    let mut builder = RegistryBuilder::standard();
    builder.unregister(NodeKind::Transform);
    let registry = builder.build();
    let compiler = Compiler::with_registry(&registry, CompileOptions::default());

    let root = ast.block(&[ast.run(ast.each(ast.param("xs"), ast.current()))]);
    let err = compiler.compile(&root).unwrap_err();
    assert_eq!(
        err,
        CompilationError::UnsupportedNodeKind {
            kind: NodeKind::Transform,
            span: Span::point(2, 7),
        }
    );
}

// Replaces the standard throw lowering: wraps the data in a one-element list.
fn boxed_throw(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<(), CompilationError> {
    let Node::Throw(throw) = *node else {
        return Err(CompilationError::internal("not a throw"));
    };
    queue.emit_constant(Constant::Int(throw.code))?;
    queue.emit_op(OpCode::NewList);
    dx.compile_value(throw.data, queue, stack)?;
    queue.emit_op(OpCode::Push);
    queue.emit_op(OpCode::Throw);
    Ok(())
}

#[test]
fn test_registry_accepts_replacement_compilers() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);

    let mut builder = RegistryBuilder::standard();
    assert!(builder.register(NodeKind::Throw, boxed_throw).is_err());
    builder.unregister(NodeKind::Throw);
    builder.register(NodeKind::Throw, boxed_throw).unwrap();
    let registry = builder.build();

    let program = Compiler::with_registry(&registry, CompileOptions::default())
        .compile(&ast.throw(7, ast.string("x")))
        .unwrap();
    assert_eq!(
        program.listing(FunctionId::MAIN),
        ["LDC 7", "NEW_LIST", "LDC \"x\"", "PUSH", "THROW"]
    );
}

#[test]
fn test_line_info_can_be_disabled() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena).at(3, 1);

    let options = CompileOptions::default().without(CompileFlags::LINE_INFO);
    let program = Compiler::with_options(options)
        .compile(&ast.throw(1, ast.null()))
        .unwrap();
    assert!(program.main().lines.is_empty());
    assert_eq!(program.main().line(0), None);
}
