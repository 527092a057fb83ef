use kiln_diagnostic::ErrorCode;
use kiln_ir::{
    BinaryOp, Block, CompilationUnit, Expr, MethodDecl, Modifiers, NamespaceDecl, Param,
    QualifiedName, Stmt, TypeDecl, TypeRef, UsingDirective,
};
use kiln_parse::parse_source;
use pretty_assertions::assert_eq;

use super::*;
use crate::corelib::{core_metadata, Native};
use crate::hir::{HBinOp, HExprKind, HStmt, OutputKind};
use crate::metadata::{ModuleMetadata, TypeMetadata};

const CALCULATOR: &str = "\
using Playground;

namespace GeneratedCalculator
{
    public class DynamicCalculator : ICalculator
    {
        public int Add(int a, int b)
        {
            return a + b;
        }
    }
}
";

fn contracts() -> ModuleMetadata {
    ModuleMetadata::new("Playground")
        .with_type(
            TypeMetadata::interface("Playground.ICalculator")
                .with_method(MethodSig::new("Add", vec![Ty::Int, Ty::Int], Ty::Int)),
        )
        .with_type(
            TypeMetadata::interface("Playground.IScientific")
                .with_interface("Playground.ICalculator")
                .with_method(MethodSig::new("Pow", vec![Ty::Int, Ty::Int], Ty::Int)),
        )
}

fn check_with(source: &str, references: &[ModuleMetadata], output_kind: OutputKind) -> CheckOutput {
    let parsed = parse_source(source);
    assert!(!parsed.has_errors(), "{:#?}", parsed.diagnostics);
    let options = CheckOptions {
        output_kind,
        ..CheckOptions::default()
    };
    check(&parsed.unit, references, &options)
}

fn check_source(source: &str) -> CheckOutput {
    check_with(source, &[core_metadata(), contracts()], OutputKind::Library)
}

fn codes(output: &CheckOutput) -> Vec<ErrorCode> {
    output.diagnostics.iter().map(|d| d.code).collect()
}

fn assert_codes(source: &str, expected: &[ErrorCode]) {
    let output = check_source(source);
    assert_eq!(codes(&output), expected, "{:#?}", output.diagnostics);
}

#[test]
fn test_calculator_checks_cleanly() {
    let output = check_source(CALCULATOR);
    assert!(output.diagnostics.is_empty(), "{:#?}", output.diagnostics);

    let ty = output
        .module
        .find_type("GeneratedCalculator.DynamicCalculator")
        .unwrap();
    assert_eq!(ty.interfaces, vec!["Playground.ICalculator"]);
    assert!(ty.is_public);
    let add = &ty.methods[0];
    assert_eq!(add.locals, vec![Ty::Int, Ty::Int]);
    let body = add.body.as_ref().unwrap();
    let [HStmt::Return(Some(value))] = body.as_slice() else {
        panic!("unexpected body {body:#?}");
    };
    match &value.kind {
        HExprKind::Binary { op, lhs, rhs } => {
            assert_eq!(*op, HBinOp::Add);
            assert_eq!(lhs.kind, HExprKind::Local(0));
            assert_eq!(rhs.kind, HExprKind::Local(1));
        }
        other => panic!("unexpected expression {other:?}"),
    }
}

#[test]
fn test_exported_metadata() {
    let source = "\
public class Visible { public int A() { return 1; } int B() { return 2; } }
class Hidden { }
";
    let output = check_source(source);
    let metadata = &output.module.metadata;
    assert_eq!(metadata.types.len(), 1);
    let visible = metadata.find_type("Visible").unwrap();
    assert_eq!(visible.methods.len(), 1);
    assert_eq!(visible.methods[0].name, "A");
}

#[test]
fn test_builder_tree_checks_like_text() {
    let add = MethodDecl::new(TypeRef::int(), "Add")
        .with_modifiers(Modifiers::PUBLIC)
        .with_param(Param::new(TypeRef::int(), "a"))
        .with_param(Param::new(TypeRef::int(), "b"))
        .with_body(Block::new(vec![Stmt::ret(Expr::binary(
            BinaryOp::Add,
            Expr::name("a"),
            Expr::name("b"),
        ))]));
    let unit = CompilationUnit::new()
        .with_using(UsingDirective::new(QualifiedName::from_dotted("Playground")))
        .with_member(
            NamespaceDecl::new(QualifiedName::from_dotted("GeneratedCalculator")).with_member(
                TypeDecl::class("DynamicCalculator")
                    .with_modifiers(Modifiers::PUBLIC)
                    .with_base(TypeRef::named("ICalculator"))
                    .with_member(add),
            ),
        );
    let output = check(
        &unit,
        &[core_metadata(), contracts()],
        &CheckOptions::default(),
    );
    assert!(output.diagnostics.is_empty(), "{:#?}", output.diagnostics);
}

#[test]
fn test_missing_core_reported_once() {
    let source = "public class C { public int Add(int a, int b) { return a + b; } }";
    let output = check_with(source, &[contracts()], OutputKind::Library);
    assert_eq!(codes(&output), vec![ErrorCode::E2018]);
    assert!(output.diagnostics[0].message.contains("System.Int32"));
}

#[test]
fn test_unresolved_interface() {
    assert_codes("public class C : ICalculator { }", &[ErrorCode::E2002]);
}

#[test]
fn test_unknown_identifier() {
    assert_codes(
        "public class C { public int F(int a) { return a + c; } }",
        &[ErrorCode::E2003],
    );
}

#[test]
fn test_return_type_mismatch() {
    assert_codes(
        "public class C { public int F() { return \"x\"; } }",
        &[ErrorCode::E2001],
    );
}

#[test]
fn test_interface_implementation() {
    assert_codes(
        "using Playground; public class C : ICalculator { }",
        &[ErrorCode::E2006],
    );
    assert_codes(
        "using Playground; public class C : ICalculator { public int Add(int a) { return a; } }",
        &[ErrorCode::E2015],
    );
    assert_codes(
        "using Playground; public class C : ICalculator { int Add(int a, int b) { return a + b; } }",
        &[ErrorCode::E2015],
    );
}

#[test]
fn test_inherited_interface_members_required() {
    assert_codes(
        "using Playground; public class Sci : IScientific { public int Pow(int a, int b) { return a * b; } }",
        &[ErrorCode::E2006],
    );
}

#[test]
fn test_not_all_paths_return() {
    assert_codes(
        "public class C { public int Max(int a, int b) { if (a > b) { return a; } } }",
        &[ErrorCode::E2007],
    );
    assert_codes(
        "public class C { public int Max(int a, int b) { if (a > b) { return a; } else { return b; } } }",
        &[],
    );
}

#[test]
fn test_endless_loop_needs_no_return() {
    assert_codes(
        "public class C { public static int Spin() { while (true) { } } }",
        &[],
    );
}

#[test]
fn test_warnings_do_not_fail() {
    let output = check_source("public class C { public int F(int a) { return a; F(a); } }");
    assert_eq!(codes(&output), vec![ErrorCode::E2101]);
    assert!(!output.has_errors());

    assert_codes(
        "public class C { public int F() { int unused = 1; return 2; } }",
        &[ErrorCode::E2100],
    );
}

#[test]
fn test_using_diagnostics() {
    assert_codes(
        "using System; using System; public class C { }",
        &[ErrorCode::E2102, ErrorCode::E2200],
    );
    assert_codes("using Nowhere; public class C { }", &[ErrorCode::E2008]);

    let output = check_source("using System; using System; public class C { }");
    assert!(!output.has_errors());
    assert!(output.diagnostics[0].is_warning());
    assert!(!output.diagnostics[1].is_warning());
}

#[test]
fn test_core_math_calls_are_native() {
    let source = "\
using System;
public class C { public int F(int a, int b) { return Math.Max(a, System.Math.Abs(b)); } }
";
    let output = check_source(source);
    assert!(output.diagnostics.is_empty(), "{:#?}", output.diagnostics);
    let method = &output.module.find_type("C").unwrap().methods[0];
    let [HStmt::Return(Some(value))] = method.body.as_deref().unwrap() else {
        panic!("unexpected body");
    };
    let HExprKind::CallNative { native, args } = &value.kind else {
        panic!("expected a native call, got {:?}", value.kind);
    };
    assert_eq!(*native, Native::MathMax);
    assert!(matches!(
        args[1].kind,
        HExprKind::CallNative {
            native: Native::MathAbs,
            ..
        }
    ));
}

#[test]
fn test_static_context() {
    assert_codes(
        "public class C { int Inst() { return 1; } static int S() { return Inst(); } }",
        &[ErrorCode::E2012],
    );
    assert_codes(
        "public class C { void Inst() { } static void S() { this.Inst(); } }",
        &[ErrorCode::E2012],
    );
}

#[test]
fn test_invalid_assignment_target() {
    assert_codes(
        "public class C { public void F(int a, int b) { (a + b) = 3; } }",
        &[ErrorCode::E2011],
    );
}

#[test]
fn test_expression_statement_must_have_effect() {
    assert_codes(
        "public class C { public void F(int a, int b) { a + b; } }",
        &[ErrorCode::E2021],
    );
}

#[test]
fn test_int_literal_range() {
    assert_codes(
        "public class C { public int F() { return 2147483648; } }",
        &[ErrorCode::E2020],
    );
    let output = check_source("public class C { public int F() { return -2147483648; } }");
    assert!(output.diagnostics.is_empty());
    let method = &output.module.find_type("C").unwrap().methods[0];
    let [HStmt::Return(Some(value))] = method.body.as_deref().unwrap() else {
        panic!("unexpected body");
    };
    assert_eq!(value.kind, HExprKind::Int(i32::MIN));
}

#[test]
fn test_fields_and_concatenation() {
    let source = "\
public class Counter
{
    private int count = 1;
    private static string label = \"n\";

    public int Next(int step)
    {
        count += step;
        return count;
    }

    public string Label()
    {
        return label + count;
    }
}
";
    let output = check_source(source);
    assert!(output.diagnostics.is_empty(), "{:#?}", output.diagnostics);
    let counter = output.module.find_type("Counter").unwrap();
    assert_eq!(counter.fields.len(), 2);
    assert!(counter.fields[1].is_static);
    assert_eq!(
        counter.fields[0].init.as_ref().unwrap().kind,
        HExprKind::Int(1)
    );
    let [HStmt::Return(Some(value))] = counter.methods[1].body.as_deref().unwrap() else {
        panic!("unexpected body");
    };
    assert_eq!(value.ty, Ty::Str);
    assert!(matches!(
        value.kind,
        HExprKind::Binary {
            op: HBinOp::Concat,
            ..
        }
    ));
}

#[test]
fn test_named_field_needs_initializer() {
    assert_codes(
        "using Playground; public class C { private ICalculator other; }",
        &[ErrorCode::E2001],
    );
}

#[test]
fn test_entry_point() {
    let references = [core_metadata()];
    let output = check_with(
        "public class Program { public static int Main() { return 0; } }",
        &references,
        OutputKind::Executable,
    );
    assert!(output.diagnostics.is_empty());
    let entry = output.module.entry_point.unwrap();
    assert_eq!(entry.type_name, "Program");
    assert!(entry.returns_int);

    let output = check_with("public class Program { }", &references, OutputKind::Executable);
    assert_eq!(codes(&output), vec![ErrorCode::E2013]);

    let output = check_with(
        "class A { static void Main() { } } class B { static void Main() { } }",
        &references,
        OutputKind::Executable,
    );
    assert_eq!(codes(&output), vec![ErrorCode::E2013]);
}

#[test]
fn test_library_ignores_main() {
    let output = check_source("public class Program { public static int Main() { return 0; } }");
    assert!(output.module.entry_point.is_none());
}

#[test]
fn test_ambiguous_name() {
    let shapes = ModuleMetadata::new("Shapes")
        .with_type(TypeMetadata::interface("A.IThing"))
        .with_type(TypeMetadata::interface("B.IThing"));
    let output = check_with(
        "using A; using B; public class C : IThing { }",
        &[core_metadata(), shapes],
        OutputKind::Library,
    );
    assert_eq!(codes(&output), vec![ErrorCode::E2024]);
}

#[test]
fn test_argument_count() {
    assert_codes(
        "public class C { public int F(int a) { return F(a, a); } }",
        &[ErrorCode::E2004],
    );
}

#[test]
fn test_interface_member_rules() {
    assert_codes(
        "public interface I { int x; int F() { return 1; } }",
        &[ErrorCode::E2022, ErrorCode::E2022],
    );
}

#[test]
fn test_base_must_be_interface() {
    assert_codes(
        "public class Base { } public class D : Base { }",
        &[ErrorCode::E2009],
    );
    assert_codes(
        "interface I1 : I2 { } interface I2 : I1 { }",
        &[ErrorCode::E2009, ErrorCode::E2009],
    );
}

#[test]
fn test_modifier_rules() {
    assert_codes("private class X { }", &[ErrorCode::E2023]);
    assert_codes("static interface I { }", &[ErrorCode::E2023]);
    assert_codes(
        "using Playground; public static class S : ICalculator { }",
        &[ErrorCode::E2023],
    );
    assert_codes(
        "public static class S { public int F() { return 1; } }",
        &[ErrorCode::E2012],
    );
}

#[test]
fn test_duplicates() {
    assert_codes("public class A { } public class A { }", &[ErrorCode::E2005]);
    assert_codes(
        "public class A { int F() { return 1; } int F() { return 2; } }",
        &[ErrorCode::E2005],
    );
    assert_codes(
        "public class A { int F() { int x = 1; int x = 2; return x; } }",
        &[ErrorCode::E2005],
    );
}

#[test]
fn test_void_value() {
    assert_codes(
        "public class C { static void Log() { } static int F() { int y = Log(); return y; } }",
        &[ErrorCode::E2016],
    );
}

#[test]
fn test_conditional_branches_must_agree() {
    assert_codes(
        "public class C { int F(bool c) { return c ? 1 : \"a\"; } }",
        &[ErrorCode::E2001],
    );
}

#[test]
fn test_private_member_of_other_type() {
    assert_codes(
        "public class A { private int Secret() { return 1; } } public class B { public int F(A a) { return a.Secret(); } }",
        &[ErrorCode::E2010],
    );
}

#[test]
fn test_this_converts_to_interface() {
    let source = "\
using Playground;
public class C : ICalculator
{
    public int Add(int a, int b) { return Twice(this, a); }
    private static int Twice(ICalculator calc, int a) { return calc.Add(a, a); }
}
";
    let output = check_source(source);
    assert!(output.diagnostics.is_empty(), "{:#?}", output.diagnostics);
}
