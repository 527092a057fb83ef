use super::*;
use kiln_ir::{
    BinaryOp, ExprKind, MethodBody, Modifiers, NamespaceMember, PredefinedType, StmtKind,
    TypeDeclKind, UnaryOp,
};
use pretty_assertions::assert_eq;

const CALCULATOR: &str = "\
using System;
namespace GeneratedCalculator
{
    public class DynamicCalculator : Playground.ICalculator
    {
        public int Add(int a, int b)
        {
            return a + b;
        }
    }
}
";

fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
    diagnostics.iter().map(|d| d.code).collect()
}

fn binary_parts(expr: &Expr) -> (BinaryOp, &Expr, &Expr) {
    match &expr.kind {
        ExprKind::Binary { op, lhs, rhs } => (*op, lhs, rhs),
        other => panic!("expected binary expression, got {other:?}"),
    }
}

fn name_of(expr: &Expr) -> &str {
    match &expr.kind {
        ExprKind::Name(ident) => ident.as_str(),
        other => panic!("expected name, got {other:?}"),
    }
}

#[test]
fn test_parse_calculator() {
    let output = parse_source(CALCULATOR);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);

    let unit = output.unit;
    assert_eq!(unit.usings.len(), 1);
    assert_eq!(unit.usings[0].name.to_dotted(), "System");
    assert_eq!(unit.usings[0].span, Span::new(0, 13));

    let NamespaceMember::Namespace(ns) = &unit.members[0] else {
        panic!("expected namespace");
    };
    assert_eq!(ns.name.to_dotted(), "GeneratedCalculator");

    let NamespaceMember::Type(class) = &ns.members[0] else {
        panic!("expected type");
    };
    assert_eq!(class.kind, TypeDeclKind::Class);
    assert_eq!(class.modifiers, Modifiers::PUBLIC);
    assert_eq!(class.name.as_str(), "DynamicCalculator");
    assert_eq!(class.bases.len(), 1);
    assert_eq!(class.bases[0].to_string(), "Playground.ICalculator");

    let Member::Method(add) = &class.members[0] else {
        panic!("expected method");
    };
    assert_eq!(add.name.as_str(), "Add");
    assert_eq!(add.params.len(), 2);
    assert_eq!(add.params[1].name.as_str(), "b");
    assert!(matches!(
        add.return_type,
        TypeRef::Predefined {
            ty: PredefinedType::Int,
            ..
        }
    ));
    let Some(MethodBody::Block(body)) = &add.body else {
        panic!("expected block body");
    };
    let StmtKind::Return(Some(value)) = &body.stmts[0].kind else {
        panic!("expected return");
    };
    let (op, lhs, rhs) = binary_parts(value);
    assert_eq!(op, BinaryOp::Add);
    assert_eq!((name_of(lhs), name_of(rhs)), ("a", "b"));
}

#[test]
fn test_empty_source() {
    let output = parse_source("  // nothing here\n");
    assert!(output.unit.is_empty());
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_interface_members_have_no_body() {
    let output = parse_source("interface ICalculator { int Add(int a, int b); }");
    assert!(output.diagnostics.is_empty());
    let NamespaceMember::Type(iface) = &output.unit.members[0] else {
        panic!("expected type");
    };
    assert_eq!(iface.kind, TypeDeclKind::Interface);
    let Member::Method(add) = &iface.members[0] else {
        panic!("expected method");
    };
    assert!(add.body.is_none());
}

#[test]
fn test_class_method_without_body() {
    let output = parse_source("class C { int Add(int a, int b); }");
    assert_eq!(codes(&output.diagnostics), vec![ErrorCode::E1007]);
    assert!(output.diagnostics[0].message.contains("`Add`"));
}

#[test]
fn test_fields_and_expression_bodies() {
    let output = parse_source("class C { private int total = 1; int Get() => total; }");
    assert!(output.diagnostics.is_empty());
    let NamespaceMember::Type(class) = &output.unit.members[0] else {
        panic!("expected type");
    };
    let Member::Field(field) = &class.members[0] else {
        panic!("expected field");
    };
    assert_eq!(field.modifiers, Modifiers::PRIVATE);
    assert!(matches!(field.init, Some(Expr { kind: ExprKind::Int(1), .. })));
    let Member::Method(get) = &class.members[1] else {
        panic!("expected method");
    };
    assert!(matches!(get.body, Some(MethodBody::Expr(_))));
}

#[test]
fn test_multiplication_binds_tighter() {
    let expr = parse_expression("a + b * c").unwrap();
    let (op, lhs, rhs) = binary_parts(&expr);
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(name_of(lhs), "a");
    assert_eq!(binary_parts(rhs).0, BinaryOp::Mul);
}

#[test]
fn test_binary_is_left_associative() {
    let expr = parse_expression("a - b - c").unwrap();
    let (op, lhs, rhs) = binary_parts(&expr);
    assert_eq!(op, BinaryOp::Sub);
    assert_eq!(name_of(rhs), "c");
    assert_eq!(binary_parts(lhs).0, BinaryOp::Sub);
}

#[test]
fn test_logical_operator_precedence() {
    let expr = parse_expression("a || b && c == d").unwrap();
    let (op, _, rhs) = binary_parts(&expr);
    assert_eq!(op, BinaryOp::Or);
    let (op, _, rhs) = binary_parts(rhs);
    assert_eq!(op, BinaryOp::And);
    assert_eq!(binary_parts(rhs).0, BinaryOp::Eq);
}

#[test]
fn test_assignment_is_right_associative() {
    let expr = parse_expression("x = y += 1").unwrap();
    let ExprKind::Assign { op, target, value } = &expr.kind else {
        panic!("expected assignment");
    };
    assert_eq!(*op, kiln_ir::AssignOp::Assign);
    assert_eq!(name_of(target), "x");
    assert!(matches!(
        value.kind,
        ExprKind::Assign {
            op: kiln_ir::AssignOp::AddAssign,
            ..
        }
    ));
}

#[test]
fn test_conditional_nests_to_the_right() {
    let expr = parse_expression("a ? 1 : b ? 2 : 3").unwrap();
    let ExprKind::Conditional { else_expr, .. } = &expr.kind else {
        panic!("expected conditional");
    };
    assert!(matches!(else_expr.kind, ExprKind::Conditional { .. }));
}

#[test]
fn test_unary_binds_tighter_than_binary() {
    let expr = parse_expression("-a * !b").unwrap();
    let (op, lhs, rhs) = binary_parts(&expr);
    assert_eq!(op, BinaryOp::Mul);
    assert!(matches!(lhs.kind, ExprKind::Unary { op: UnaryOp::Neg, .. }));
    assert!(matches!(rhs.kind, ExprKind::Unary { op: UnaryOp::Not, .. }));
}

#[test]
fn test_member_call_chain() {
    let expr = parse_expression("System.Math.Max(a, 2)").unwrap();
    let ExprKind::Call { callee, args } = &expr.kind else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 2);
    let ExprKind::Member { target, name } = &callee.kind else {
        panic!("expected member access");
    };
    assert_eq!(name.as_str(), "Max");
    assert!(matches!(target.kind, ExprKind::Member { .. }));
    assert_eq!(expr.span, Span::new(0, 21));
}

#[test]
fn test_parenthesized_expression() {
    let expr = parse_expression("(a + b) * c").unwrap();
    let (op, lhs, _) = binary_parts(&expr);
    assert_eq!(op, BinaryOp::Mul);
    assert!(matches!(lhs.kind, ExprKind::Paren(_)));
    assert_eq!(lhs.span, Span::new(0, 7));
}

#[test]
fn test_local_declarations() {
    let stmt = parse_statement("int x = 1;").unwrap();
    assert!(matches!(stmt.kind, StmtKind::Local { ty: Some(_), .. }));

    let stmt = parse_statement("var y = 2;").unwrap();
    assert!(matches!(stmt.kind, StmtKind::Local { ty: None, .. }));

    let stmt = parse_statement("Foo.Bar z = w;").unwrap();
    let StmtKind::Local { ty: Some(ty), name, .. } = &stmt.kind else {
        panic!("expected local");
    };
    assert_eq!(ty.to_string(), "Foo.Bar");
    assert_eq!(name.as_str(), "z");

    let stmt = parse_statement("a.b = c;").unwrap();
    assert!(matches!(stmt.kind, StmtKind::Expr(_)));
}

#[test]
fn test_local_requires_initializer() {
    let diags = parse_statement("int x;").unwrap_err();
    assert_eq!(codes(&diags), vec![ErrorCode::E1001]);
    assert!(diags[0]
        .notes
        .iter()
        .any(|n| n.contains("must be initialized")));
}

#[test]
fn test_control_flow_statements() {
    let stmt = parse_statement("if (a) b = 1; else { b = 2; }").unwrap();
    let StmtKind::If { else_branch, .. } = &stmt.kind else {
        panic!("expected if");
    };
    assert!(matches!(
        else_branch.as_deref(),
        Some(Stmt {
            kind: StmtKind::Block(_),
            ..
        })
    ));

    let stmt = parse_statement("while (i < 10) i += 1;").unwrap();
    assert!(matches!(stmt.kind, StmtKind::While { .. }));
    assert!(matches!(
        parse_statement(";").unwrap().kind,
        StmtKind::Empty
    ));
    assert!(matches!(
        parse_statement("return;").unwrap().kind,
        StmtKind::Return(None)
    ));
}

#[test]
fn test_fragment_type_and_name() {
    assert!(matches!(
        parse_type_name("int").unwrap(),
        TypeRef::Predefined {
            ty: PredefinedType::Int,
            ..
        }
    ));
    assert_eq!(
        parse_type_name("Playground.ICalculator").unwrap().to_string(),
        "Playground.ICalculator"
    );
    assert_eq!(
        parse_name("GeneratedCalculator").unwrap().to_dotted(),
        "GeneratedCalculator"
    );
    let diags = parse_type_name("42").unwrap_err();
    assert_eq!(codes(&diags), vec![ErrorCode::E1005]);
}

#[test]
fn test_fragment_member() {
    let member = parse_member("public int Add(int a, int b) => a + b;").unwrap();
    assert_eq!(member.name().as_str(), "Add");
}

#[test]
fn test_fragment_trailing_input() {
    let diags = parse_name("A.B C").unwrap_err();
    assert_eq!(codes(&diags), vec![ErrorCode::E1001]);
    assert!(diags[0].message.contains("identifier `C`"));
}

#[test]
fn test_fragment_reports_lex_errors() {
    let diags = parse_expression("a @ b").unwrap_err();
    assert_eq!(codes(&diags), vec![ErrorCode::E0002]);
}

#[test]
fn test_incomplete_expression() {
    let diags = parse_expression("1 +").unwrap_err();
    assert_eq!(codes(&diags), vec![ErrorCode::E1002]);
    assert_eq!(diags[0].message, "expected expression, found end of input");
}

#[test]
fn test_statement_recovery() {
    let source = "class C { int A() { return 1 +; return 2; } int B() => 3; }";
    let output = parse_source(source);
    assert_eq!(codes(&output.diagnostics), vec![ErrorCode::E1002]);
    let NamespaceMember::Type(class) = &output.unit.members[0] else {
        panic!("expected type");
    };
    assert_eq!(class.members.len(), 2);
    let Member::Method(a) = &class.members[0] else {
        panic!("expected method");
    };
    let Some(MethodBody::Block(body)) = &a.body else {
        panic!("expected block");
    };
    assert_eq!(body.stmts.len(), 1);
}

#[test]
fn test_member_recovery() {
    let output = parse_source("class C { int 5; int B() => 3; }");
    assert_eq!(codes(&output.diagnostics), vec![ErrorCode::E1004]);
    let NamespaceMember::Type(class) = &output.unit.members[0] else {
        panic!("expected type");
    };
    assert_eq!(class.members.len(), 1);
    assert_eq!(class.members[0].name().as_str(), "B");
}

#[test]
fn test_broken_signature_skips_body() {
    let output = parse_source("class C { int A(int a int b) { return a; } int B() => 3; }");
    assert_eq!(output.diagnostics.len(), 1);
    let NamespaceMember::Type(class) = &output.unit.members[0] else {
        panic!("expected type");
    };
    assert_eq!(class.members.len(), 1);
}

#[test]
fn test_item_recovery() {
    let output = parse_source("int x; } class A {}");
    assert_eq!(
        codes(&output.diagnostics),
        vec![ErrorCode::E1006, ErrorCode::E1006]
    );
    assert_eq!(output.unit.members.len(), 1);
}

#[test]
fn test_unclosed_braces() {
    let output = parse_source("class C { int A() { return 1;");
    assert_eq!(
        codes(&output.diagnostics),
        vec![ErrorCode::E1003, ErrorCode::E1003]
    );
    assert_eq!(output.unit.members.len(), 1);
}

#[test]
fn test_using_after_declaration() {
    let output = parse_source("class A {} using System;");
    assert_eq!(codes(&output.diagnostics), vec![ErrorCode::E1006]);
    assert_eq!(output.unit.usings.len(), 1);
}

#[test]
fn test_modifier_errors() {
    let output = parse_source("public public class A {}");
    assert_eq!(codes(&output.diagnostics), vec![ErrorCode::E2023]);
    assert!(output.diagnostics[0].message.contains("duplicate `public`"));

    let output = parse_source("public private class A {}");
    assert_eq!(codes(&output.diagnostics), vec![ErrorCode::E2023]);
    assert_eq!(output.diagnostics[0].message, "more than one access modifier");

    let output = parse_source("public static sealed class A {}");
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_lex_diagnostics_come_first() {
    let output = parse_source("class A { int x = \"open\n }");
    assert_eq!(output.diagnostics[0].code, ErrorCode::E0001);
    assert!(output.has_errors());
}

#[test]
fn test_deep_nesting_is_an_error() {
    let source = format!("{}1{}", "(".repeat(600), ")".repeat(600));
    let diags = parse_expression(&source).unwrap_err();
    assert!(diags.iter().any(|d| d.code == ErrorCode::E1008
        && d.message == "nesting exceeds the limit of 512 levels"));
}

#[test]
fn test_moderate_nesting_is_fine() {
    let source = format!("{}1{}", "(".repeat(100), ")".repeat(100));
    assert!(parse_expression(&source).is_ok());
}

fn method_returning(expr: &str) -> String {
    format!("class C {{ int F(int a) {{ return {expr}; }} }}")
}

fn nesting_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.code == ErrorCode::E1008)
        .count()
}

#[test]
fn test_long_binary_chain_is_bounded() {
    let chain = vec!["1"; 20_000].join(" + ");
    let output = parse_source(&method_returning(&chain));
    assert_eq!(nesting_errors(&output.diagnostics), 1);
    assert!(output.diagnostics[0]
        .message
        .contains("nesting exceeds the limit of 512 levels"));
    // The class survives recovery; the oversized statement does not.
    assert_eq!(output.unit.members.len(), 1);
    drop(output);

    let mixed = vec!["a * 2"; 20_000].join(" - ");
    let diags = parse_expression(&mixed).unwrap_err();
    assert_eq!(nesting_errors(&diags), 1);
}

#[test]
fn test_long_postfix_chains_are_bounded() {
    let members = format!("a{}", ".b".repeat(20_000));
    assert_eq!(nesting_errors(&parse_expression(&members).unwrap_err()), 1);

    let calls = format!("f{}", "()".repeat(20_000));
    assert_eq!(nesting_errors(&parse_expression(&calls).unwrap_err()), 1);

    let output = parse_source(&method_returning(&format!("System{}", ".Math".repeat(20_000))));
    assert_eq!(nesting_errors(&output.diagnostics), 1);
}

#[test]
fn test_moderate_chains_are_fine() {
    let chain = vec!["a"; 300].join(" + ");
    let output = parse_source(&method_returning(&chain));
    assert!(output.diagnostics.is_empty(), "{:#?}", output.diagnostics);

    assert!(parse_expression(&format!("a{}", ".b".repeat(300))).is_ok());
    assert!(parse_expression(&format!("f{}", "(1)".repeat(300))).is_ok());
}

#[test]
fn test_chain_budget_is_released() {
    // Two chains side by side each fit; the budget is per chain, not per
    // statement list.
    let chain = vec!["1"; 400].join(" + ");
    let source = format!(
        "class C {{ int F() {{ int x = {chain}; int y = {chain}; return x + y; }} }}"
    );
    let output = parse_source(&source);
    assert!(output.diagnostics.is_empty(), "{:#?}", output.diagnostics);
}
