//! End-to-end lowering of `throw` statements.

use pretty_assertions::assert_eq;
use quill::compiler::expr::literals::lower_literal;
use quill::compiler::stack::CompilerStack;
use quill::compiler::{Dispatcher, InstructionQueue};
use quill::prelude::*;
use std::cell::Cell;

fn listing(root: &Node<'_>) -> Vec<String> {
    quill::compile(root)
        .expect("compilation should succeed")
        .listing(FunctionId::MAIN)
}

#[test]
fn test_throw_with_string_data() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);

    let root = ast.throw(404, ast.string("not found"));
    assert_eq!(listing(&root), ["LDC 404", "LDC \"not found\"", "THROW"]);
}

#[test]
fn test_throw_as_data_of_throw() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);

    let root = ast.throw(1, ast.throw(2, ast.int(0)));
    assert_eq!(listing(&root), ["LDC 1", "LDC 2", "LDC 0", "THROW", "THROW"]);
}

#[test]
fn test_throw_pushes_exactly_two() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);

    let program = quill::compile(&ast.throw(9, ast.object(&[("a", ast.int(1))]))).unwrap();
    let main = program.main();
    // LDC, NEW_OBJECT, LDC, PUT peak at three; the two survivors feed THROW.
    assert_eq!(main.max_stack, 3);
    assert_eq!(main.instructions.last().map(|i| i.op), Some(OpCode::Throw));
}

#[test]
fn test_throw_constants_are_pooled() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);

    let root = ast.block(&[
        ast.if_else(ast.param("a"), ast.throw(404, ast.string("missing")), None),
        ast.throw(404, ast.string("missing")),
    ]);
    let program = quill::compile(&root).unwrap();
    let constants: Vec<String> = program.constants().iter().map(|c| c.to_string()).collect();
    assert_eq!(constants, ["\"a\"", "404", "\"missing\""]);
}

#[test]
fn test_throw_records_source_line() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena).at(12, 5);

    let program = quill::compile(&ast.throw(500, ast.null())).unwrap();
    let main = program.main();
    assert_eq!(main.lines, vec![12, 12, 12]);
}

#[test]
fn test_throw_inside_try_is_counted() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);

    let root = ast.try_catch(
        ast.block(&[ast.throw(1, ast.null()), ast.throw(2, ast.null())]),
        Some("err"),
        ast.exit_with(1, Some(ast.ident("err"))),
    );
    let program = quill::compile(&root).unwrap();
    assert_eq!(program.handlers().len(), 1);
    assert_eq!(program.handlers()[0].throws, 2);
}

thread_local! {
    // (instruction count, operand depth) right after a literal is lowered.
    static AFTER_LITERAL: Cell<Option<(usize, u32)>> = const { Cell::new(None) };
}

fn spy_literal(
    node: &Node<'_>,
    dx: &mut Dispatcher<'_>,
    queue: &mut InstructionQueue,
    stack: &mut CompilerStack,
) -> Result<(), CompilationError> {
    lower_literal(node, dx, queue, stack)?;
    let recorded = Some((queue.len(), queue.depth()));
    AFTER_LITERAL.with(|cell| cell.set(recorded));
    Ok(())
}

#[test]
fn test_throw_holds_two_values_at_throw() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);

    let mut builder = RegistryBuilder::standard();
    builder.unregister(NodeKind::Literal);
    builder.register(NodeKind::Literal, spy_literal).unwrap();
    let registry = builder.build();

    let mut dx = Dispatcher::new(&registry, CompileOptions::default());
    let mut queue = InstructionQueue::new();
    let mut stack = CompilerStack::new();
    queue.emit_op(OpCode::PushNull);
    let start = queue.depth();

    // The data literal is the last thing lowered before THROW; the code is
    // pooled directly and never goes through the literal compiler.
    AFTER_LITERAL.with(|cell| cell.set(None));
    dx.compile(&ast.throw(7, ast.string("x")), &mut queue, &mut stack)
        .unwrap();

    let (index, depth) = AFTER_LITERAL
        .with(Cell::get)
        .expect("data literal was lowered");
    assert_eq!(queue.instructions()[index].op, OpCode::Throw);
    assert_eq!(index + 1, queue.len());
    assert_eq!(depth, start + 2);
}
