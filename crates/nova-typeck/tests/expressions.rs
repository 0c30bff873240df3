use nova_config::AnalysisConfig;
use nova_hir::{Ast, AstBuilder, BinaryOp, ExprId, LambdaBody, Modifiers, StmtId, TypeDecl, UnaryOp};
use nova_resolve::NoActions;
use nova_typeck::{analyze, AnalysisError, AnalysisSummary};
use nova_types::{ClassKind, TypeStore};
use pretty_assertions::assert_eq;

fn run(ast: &mut Ast) -> Result<AnalysisSummary, AnalysisError> {
    let jdk = TypeStore::with_minimal_jdk();
    analyze(ast, &jdk, &AnalysisConfig::default(), &NoActions)
}

fn ty(ast: &Ast, id: ExprId) -> String {
    ast.expr_ty(id).map(ToString::to_string).unwrap_or_default()
}

/// `class A { void m(params) { body } }` plus extra members.
fn unit_with_method(b: &mut AstBuilder, params: &[(&str, &str)], body: Vec<StmtId>, extra: Vec<nova_hir::Member>) {
    let m = b.method_decl(Modifiers::default(), "void", "m", params, Some(body));
    let mut class = TypeDecl::class("A").with_method(m);
    for member in extra {
        class = class.with_member(member);
    }
    b.top_level(class);
}

#[test]
fn arithmetic_takes_the_wider_operand() {
    let mut b = AstBuilder::new();
    b.package("app");
    let (bn, sn) = (b.name("b"), b.name("s"));
    let mul = b.binary(BinaryOp::Mul, bn, sn);
    let (ln, bn2) = (b.name("l"), b.name("b"));
    let add = b.binary(BinaryOp::Add, ln, bn2);
    let (x, y) = (b.name("x"), b.name("y"));
    let ints = b.binary(BinaryOp::Add, x, y);
    let (d, one) = (b.name("d"), b.int(1));
    let mixed = b.binary(BinaryOp::Div, one, d);
    let neg = {
        let operand = b.name("b");
        b.unary(UnaryOp::Minus, operand)
    };

    let stmts = vec![
        b.expr_stmt(mul),
        b.expr_stmt(add),
        b.expr_stmt(ints),
        b.expr_stmt(mixed),
        b.expr_stmt(neg),
    ];
    unit_with_method(
        &mut b,
        &[("byte", "b"), ("short", "s"), ("long", "l"), ("int", "x"), ("int", "y"), ("double", "d")],
        stmts,
        Vec::new(),
    );
    let mut ast = b.finish();

    let summary = run(&mut ast).unwrap();
    assert_eq!(ty(&ast, mul), "short");
    assert_eq!(ty(&ast, add), "long");
    assert_eq!(ty(&ast, ints), "int");
    assert_eq!(ty(&ast, mixed), "double");
    assert_eq!(ty(&ast, neg), "byte");
    assert_eq!(summary.classes, 1);
    assert_eq!(summary.untyped_expressions, 0);
    assert_eq!(summary.resolved_calls, 0);
}

#[test]
fn boxed_operands_unbox_and_strings_concatenate() {
    let mut b = AstBuilder::new();
    b.package("app");
    let (i, one) = (b.name("i"), b.int(1));
    let boxed = b.binary(BinaryOp::Add, i, one);
    let (l, half) = (b.name("l"), b.double(0.5));
    let widened = b.binary(BinaryOp::Mul, l, half);
    let (text, n) = (b.string("n = "), b.name("i"));
    let concat = b.binary(BinaryOp::Add, text, n);
    let (i2, zero) = (b.name("i"), b.int(0));
    let cmp = b.binary(BinaryOp::Gt, i2, zero);

    let stmts = vec![
        b.expr_stmt(boxed),
        b.expr_stmt(widened),
        b.expr_stmt(concat),
        b.expr_stmt(cmp),
    ];
    unit_with_method(&mut b, &[("Integer", "i"), ("Long", "l")], stmts, Vec::new());
    let mut ast = b.finish();

    run(&mut ast).unwrap();
    assert_eq!(ty(&ast, boxed), "int");
    assert_eq!(ty(&ast, widened), "double");
    assert_eq!(ty(&ast, concat), "java.lang.String");
    assert_eq!(ty(&ast, cmp), "boolean");
}

#[test]
fn invalid_operands_fail_as_operator_overloads() {
    let mut b = AstBuilder::new();
    b.package("app");
    let (s, one) = (b.name("s"), b.int(1));
    let sub = b.binary(BinaryOp::Sub, s, one);
    let stmts = vec![b.expr_stmt(sub)];
    unit_with_method(&mut b, &[("String", "s")], stmts, Vec::new());
    let mut ast = b.finish();

    let err = run(&mut ast).unwrap_err();
    assert!(err.is_overload_failure());
    assert_eq!(err.expression, "s - 1");
}

#[test]
fn fixed_arity_wins_over_varargs() {
    let mut b = AstBuilder::new();
    b.package("app");
    let fixed = b.method_decl(Modifiers::default(), "int", "f", &[("int", "x")], None);
    let spread = b.method_decl(Modifiers::default(), "String", "f", &[("int...", "xs")], None);

    let one = b.int(1);
    let single = b.call(None, "f", vec![one]);
    let (two, three) = (b.int(2), b.int(3));
    let pair = b.call(None, "f", vec![two, three]);
    let none = b.call(None, "f", Vec::new());
    let stmts = vec![b.expr_stmt(single), b.expr_stmt(pair), b.expr_stmt(none)];
    unit_with_method(
        &mut b,
        &[],
        stmts,
        vec![nova_hir::Member::Method(spread), nova_hir::Member::Method(fixed)],
    );
    let mut ast = b.finish();

    let summary = run(&mut ast).unwrap();
    assert_eq!(ty(&ast, single), "int");
    assert_eq!(ty(&ast, pair), "java.lang.String");
    assert_eq!(ty(&ast, none), "java.lang.String");
    assert_eq!(summary.resolved_calls, 3);
}

#[test]
fn no_applicable_overload_reports_the_whole_call() {
    let mut b = AstBuilder::new();
    b.package("app");
    let fs = b.method_decl(Modifiers::static_(), "void", "fs", &[("String", "s")], None);
    let mut any = b.method_decl(Modifiers::static_(), "T", "anyObject", &[], None);
    any.type_params = vec![b.type_param("T", &[])];

    let recv = b.name("A");
    let inner_recv = b.name("A");
    let inner = b.call(Some(inner_recv), "anyObject", Vec::new());
    let call = b.call(Some(recv), "fs", vec![inner]);
    let stmts = vec![b.expr_stmt(call)];
    unit_with_method(
        &mut b,
        &[],
        stmts,
        vec![nova_hir::Member::Method(fs), nova_hir::Member::Method(any)],
    );
    let mut ast = b.finish();

    let err = run(&mut ast).unwrap_err();
    assert!(err.is_overload_failure());
    assert_eq!(err.expression, "A.fs(A.anyObject())");
    assert!(err.to_string().contains("fs(java.lang.Object)"), "{err}");
    // The argument was typed before the call failed.
    assert_eq!(ty(&ast, inner), "java.lang.Object");
}

#[test]
fn unknown_names_are_symbol_failures() {
    let mut b = AstBuilder::new();
    b.package("app");
    let missing = b.name("missing");
    let stmts = vec![b.expr_stmt(missing)];
    unit_with_method(&mut b, &[], stmts, Vec::new());
    let mut ast = b.finish();

    let err = run(&mut ast).unwrap_err();
    assert!(err.is_symbol_failure());
    assert_eq!(err.expression, "missing");
}

#[test]
fn generic_members_substitute_receiver_arguments() {
    let mut b = AstBuilder::new();
    b.package("app");
    let get = b.method_decl(Modifiers::default(), "T", "get", &[], None);
    let type_param = b.type_param("T", &[]);
    let mut boxed = TypeDecl::class("Box").with_method(get);
    boxed.type_params = vec![type_param];
    b.top_level(boxed);

    let typed_recv = b.name("typed");
    let typed = b.call(Some(typed_recv), "get", Vec::new());
    let raw_recv = b.name("raw");
    let raw = b.call(Some(raw_recv), "get", Vec::new());
    let chained = b.call(Some(typed), "length", Vec::new());
    let stmts = vec![b.expr_stmt(chained), b.expr_stmt(raw)];
    unit_with_method(&mut b, &[("Box<String>", "typed"), ("Box", "raw")], stmts, Vec::new());
    let mut ast = b.finish();

    run(&mut ast).unwrap();
    assert_eq!(ty(&ast, typed), "java.lang.String");
    assert_eq!(ty(&ast, chained), "int");
    assert_eq!(ty(&ast, raw), "java.lang.Object");
}

#[test]
fn wildcard_elements_read_as_their_upper_bound() {
    let mut b = AstBuilder::new();
    b.package("app");
    b.import("java.util.List");
    let foo = b.method_decl(Modifiers::default(), "List<? extends A>", "foo", &[], None);
    let call = b.call(None, "foo", Vec::new());
    let zero = b.int(0);
    let get = b.call(Some(call), "get", vec![zero]);
    let stmts = vec![b.expr_stmt(get)];
    unit_with_method(&mut b, &[], stmts, vec![nova_hir::Member::Method(foo)]);
    let mut ast = b.finish();

    run(&mut ast).unwrap();
    assert_eq!(ty(&ast, call), "java.util.List<? extends app.A>");
    assert_eq!(ty(&ast, get), "app.A");
}

#[test]
fn array_length_and_indexing() {
    let mut b = AstBuilder::new();
    b.package("app");
    let cs = b.name("cs");
    let length = b.field(cs, "length");
    let (cs2, i) = (b.name("cs"), b.int(0));
    let element = b.index(cs2, i);
    let cs3 = b.name("cs");
    let cloned = b.call(Some(cs3), "clone", Vec::new());
    let stmts = vec![b.expr_stmt(length), b.expr_stmt(element), b.expr_stmt(cloned)];
    unit_with_method(&mut b, &[("char[]", "cs")], stmts, Vec::new());
    let mut ast = b.finish();

    run(&mut ast).unwrap();
    assert_eq!(ty(&ast, length), "int");
    assert_eq!(ty(&ast, element), "char");
    assert_eq!(ty(&ast, cloned), "char[]");
}

#[test]
fn lambdas_take_the_target_interface() {
    let mut b = AstBuilder::new();
    b.package("app");
    b.import("java.util.function.Function");
    let (x, one) = (b.name("x"), b.int(1));
    let body = b.binary(BinaryOp::Add, x, one);
    let lambda = b.lambda(&["x"], body);
    let decl = b.local("Function<Integer, Integer>", "f", Some(lambda));
    unit_with_method(&mut b, &[], vec![decl], Vec::new());
    let mut ast = b.finish();

    run(&mut ast).unwrap();
    assert_eq!(
        ty(&ast, lambda),
        "java.util.function.Function<java.lang.Integer, java.lang.Integer>"
    );
    assert_eq!(ty(&ast, body), "int");
}

#[test]
fn lambda_parameters_come_from_a_declared_interface() {
    let mut b = AstBuilder::new();
    b.package("app");
    let apply = b.method_decl(Modifiers::default(), "int", "apply", &[("int", "x")], None);
    b.top_level(TypeDecl::new("F", ClassKind::Interface).with_method(apply));

    let (x, one) = (b.name("x"), b.int(1));
    let body = b.binary(BinaryOp::Add, x, one);
    let lambda = b.lambda(&["x"], body);
    let call = b.call(None, "call", vec![lambda]);
    let stmt = b.expr_stmt(call);
    let target = b.method_decl(Modifiers::static_(), "int", "call", &[("F", "f")], Some(Vec::new()));
    unit_with_method(&mut b, &[], vec![stmt], vec![nova_hir::Member::Method(target)]);
    let mut ast = b.finish();

    let summary = run(&mut ast).unwrap();
    assert_eq!(ty(&ast, x), "int");
    assert_eq!(ty(&ast, body), "int");
    assert_eq!(ty(&ast, lambda), "app.F");
    assert_eq!(ty(&ast, call), "int");
    assert_eq!(summary.resolved_calls, 1);
}

#[test]
fn lambda_bodies_decide_between_functional_overloads() {
    let mut b = AstBuilder::new();
    b.package("app");
    b.import("java.util.function.*");
    let predicate = b.method_decl(Modifiers::static_(), "void", "use", &[("Predicate<String>", "p")], Some(Vec::new()));
    let function = b.method_decl(
        Modifiers::static_(),
        "int",
        "use",
        &[("Function<String, Integer>", "f")],
        Some(Vec::new()),
    );
    let s = b.name("s");
    let length = b.call(Some(s), "length", Vec::new());
    let lambda = b.lambda(&["s"], length);
    let call = b.call(None, "use", vec![lambda]);
    let stmt = b.expr_stmt(call);
    unit_with_method(
        &mut b,
        &[],
        vec![stmt],
        vec![nova_hir::Member::Method(predicate), nova_hir::Member::Method(function)],
    );
    let mut ast = b.finish();

    let summary = run(&mut ast).unwrap();
    assert_eq!(ty(&ast, call), "int");
    assert_eq!(
        ty(&ast, lambda),
        "java.util.function.Function<java.lang.String, java.lang.Integer>"
    );
    assert_eq!(ty(&ast, length), "int");
    // `use` and `s.length()`, counted once despite the rejected attempt.
    assert_eq!(summary.resolved_calls, 2);
}

#[test]
fn lambda_rejected_by_every_overload_reports_the_lambda() {
    let mut b = AstBuilder::new();
    b.package("app");
    b.import("java.util.function.Predicate");
    let predicate = b.method_decl(Modifiers::static_(), "void", "use", &[("Predicate<String>", "p")], Some(Vec::new()));
    let s = b.name("s");
    let length = b.call(Some(s), "length", Vec::new());
    let lambda = b.lambda(&["s"], length);
    let call = b.call(None, "use", vec![lambda]);
    let stmt = b.expr_stmt(call);
    unit_with_method(&mut b, &[], vec![stmt], vec![nova_hir::Member::Method(predicate)]);
    let mut ast = b.finish();

    let err = run(&mut ast).unwrap_err();
    assert!(err.is_overload_failure());
    assert_eq!(err.expression, "(s) -> s.length()");
    assert!(err.to_string().contains("java.util.function.Predicate<java.lang.String>(int)"), "{err}");
}

#[test]
fn only_increments_make_expression_lambdas_void_compatible() {
    let mut b = AstBuilder::new();
    b.package("app");
    b.import("java.util.function.*");
    let consumer = b.method_decl(Modifiers::static_(), "void", "act", &[("Consumer<Integer>", "c")], Some(Vec::new()));
    let function = b.method_decl(
        Modifiers::static_(),
        "int",
        "act",
        &[("Function<Integer, Integer>", "f")],
        Some(Vec::new()),
    );
    let x = b.name("x");
    let negated = b.unary(UnaryOp::Minus, x);
    let negate = b.lambda(&["x"], negated);
    let value_call = b.call(None, "act", vec![negate]);
    let y = b.name("y");
    let bumped = b.unary(UnaryOp::PostInc, y);
    let bump = b.lambda(&["y"], bumped);
    let void_call = b.call(None, "act", vec![bump]);
    let stmts = vec![b.expr_stmt(value_call), b.expr_stmt(void_call)];
    unit_with_method(
        &mut b,
        &[],
        stmts,
        vec![nova_hir::Member::Method(consumer), nova_hir::Member::Method(function)],
    );
    let mut ast = b.finish();

    run(&mut ast).unwrap();
    assert_eq!(ty(&ast, value_call), "int");
    assert_eq!(ty(&ast, void_call), "void");
}

#[test]
fn lambda_bodies_must_fit_the_return_type() {
    let mut b = AstBuilder::new();
    b.package("app");
    b.import("java.util.function.Function");
    let (x, one) = (b.name("x"), b.int(1));
    let body = b.binary(BinaryOp::Add, x, one);
    let lambda = b.lambda(&["x"], body);
    let decl = b.local("Function<Integer, String>", "f", Some(lambda));
    unit_with_method(&mut b, &[], vec![decl], Vec::new());
    let mut ast = b.finish();

    let err = run(&mut ast).unwrap_err();
    assert!(err.is_overload_failure());
}

#[test]
fn explicit_lambda_parameters_are_checked() {
    let mut b = AstBuilder::new();
    b.package("app");
    b.import("java.util.function.Predicate");
    let (s, empty) = (b.name("s"), b.string(""));
    let eq = b.binary(BinaryOp::Ne, s, empty);
    let lambda = b.typed_lambda(&[("String", "s")], LambdaBody::Expr(eq));
    let decl = b.local("Predicate<String>", "p", Some(lambda));
    unit_with_method(&mut b, &[], vec![decl], Vec::new());
    let mut ast = b.finish();

    run(&mut ast).unwrap();
    assert_eq!(ty(&ast, lambda), "java.util.function.Predicate<java.lang.String>");
    assert_eq!(ty(&ast, eq), "boolean");
}

#[test]
fn lambda_results_infer_method_type_arguments() {
    let mut b = AstBuilder::new();
    b.package("app");
    b.import("java.util.List");
    let list = b.name("list");
    let stream = b.call(Some(list), "stream", Vec::new());
    let s = b.name("s");
    let length = b.call(Some(s), "length", Vec::new());
    let lambda = b.lambda(&["s"], length);
    let mapped = b.call(Some(stream), "map", vec![lambda]);
    let stmts = vec![b.expr_stmt(mapped)];
    unit_with_method(&mut b, &[("List<String>", "list")], stmts, Vec::new());
    let mut ast = b.finish();

    let summary = run(&mut ast).unwrap();
    assert_eq!(ty(&ast, stream), "java.util.stream.Stream<java.lang.String>");
    assert_eq!(ty(&ast, length), "int");
    assert_eq!(ty(&ast, mapped), "java.util.stream.Stream<java.lang.Integer>");
    assert_eq!(summary.resolved_calls, 3);
}

#[test]
fn diamond_takes_arguments_from_the_declared_type() {
    let mut b = AstBuilder::new();
    b.package("app");
    b.import("java.util.*");
    let ty_ref = b.ty("ArrayList<>");
    let created = b.new_object(ty_ref, Vec::new());
    let decl = b.local("List<String>", "names", Some(created));
    unit_with_method(&mut b, &[], vec![decl], Vec::new());
    let mut ast = b.finish();

    run(&mut ast).unwrap();
    assert_eq!(ty(&ast, created), "java.util.ArrayList<java.lang.String>");
    assert_eq!(
        ast.type_ref_ty(ty_ref).map(ToString::to_string).as_deref(),
        Some("java.util.ArrayList<java.lang.String>")
    );
}

#[test]
fn class_literals_box_primitives() {
    let mut b = AstBuilder::new();
    b.package("app");
    let int_ty = b.ty("int");
    let int_class = b.class_literal(int_ty);
    let void_ty = b.ty("void");
    let void_class = b.class_literal(void_ty);
    let stmts = vec![b.expr_stmt(int_class), b.expr_stmt(void_class)];
    unit_with_method(&mut b, &[], stmts, Vec::new());
    let mut ast = b.finish();

    run(&mut ast).unwrap();
    assert_eq!(ty(&ast, int_class), "java.lang.Class<java.lang.Integer>");
    assert_eq!(ty(&ast, void_class), "java.lang.Class<java.lang.Void>");
}
