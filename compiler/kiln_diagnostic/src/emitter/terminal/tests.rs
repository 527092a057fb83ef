use super::*;
use crate::ErrorCode;
use pretty_assertions::assert_eq;

fn sample_diagnostic() -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message("type mismatch: expected `int`, found `string`")
        .with_label(Span::new(10, 15), "expected `int`")
        .with_secondary_label(Span::new(0, 5), "declared here")
        .with_note("int and string are incompatible")
        .with_suggestion("return an integer expression")
}

fn render(emitter: TerminalEmitter<Vec<u8>>, diag: &Diagnostic) -> String {
    let mut emitter = emitter;
    emitter.emit(diag);
    emitter.flush();
    String::from_utf8(emitter.into_inner()).unwrap()
}

#[test]
fn test_terminal_emitter_no_color() {
    let emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    let text = render(emitter, &sample_diagnostic());

    assert!(text.contains("error[E2001]"));
    assert!(text.contains("type mismatch"));
    assert!(text.contains("--> 10..15: expected `int`"));
    assert!(text.contains("= note: int and string"));
    assert!(text.contains("= help: return an integer"));
    assert!(!text.contains("\x1b["));
}

#[test]
fn test_terminal_emitter_with_color() {
    let emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Always, false);
    let text = render(emitter, &sample_diagnostic());
    assert!(text.contains("\x1b["));
    assert!(text.contains("E2001"));
}

#[test]
fn test_source_snippet() {
    let source = "class C\n{\n    int F() { return a; }\n}\n";
    let at = u32::try_from(source.find("a;").unwrap()).unwrap();
    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_message("the name `a` does not exist in the current context")
        .with_label(Span::new(at, at + 1), "not found in this scope");

    let emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false)
        .with_source("calc.kn", source);
    let text = render(emitter, &diag);

    let expected = "\
error[E2003]: the name `a` does not exist in the current context
 --> calc.kn:3:22
  |
3 |     int F() { return a; }
  |                      ^ not found in this scope

";
    assert_eq!(text, expected);
}

#[test]
fn test_escalated_warning_renders_as_error() {
    let mut diag = Diagnostic::warning(ErrorCode::E2100).with_message("unused local `x`");
    diag.escalate();
    let emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    let text = render(emitter, &diag);
    assert!(text.starts_with("error[E2100]"));
    assert!(text.contains("warning treated as error"));
}

#[test]
fn test_emit_summary_errors() {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_summary(2, 1);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert!(text.contains("2 previous errors"));
    assert!(text.contains("1 warning emitted"));
}

#[test]
fn test_emit_summary_warnings_only() {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_summary(0, 3);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert_eq!(text, "warning: 3 warnings emitted\n");
}

#[test]
fn test_emit_summary_nothing() {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_summary(0, 0);
    assert!(emitter.into_inner().is_empty());
}

#[test]
fn test_report_summarizes_escalated_warnings() {
    let mut escalated = Diagnostic::warning(ErrorCode::E2100).with_message("unused local `x`");
    escalated.escalate();
    let diagnostics = [
        escalated,
        Diagnostic::warning(ErrorCode::E2101).with_message("unreachable statement"),
    ];
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    let tally = emitter.report(&diagnostics);
    assert_eq!(tally.errors, 1);
    assert_eq!(tally.warnings, 1);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert!(text.starts_with("error[E2100]"));
    assert!(text.contains("warning[E2101]"));
    assert!(text.ends_with("compilation failed due to previous error; 1 warning emitted\n"));
}

#[test]
fn test_color_mode() {
    assert!(ColorMode::Auto.should_use_colors(true));
    assert!(!ColorMode::Auto.should_use_colors(false));
    assert!(ColorMode::Always.should_use_colors(false));
    assert!(!ColorMode::Never.should_use_colors(true));
    assert_eq!(ColorMode::default(), ColorMode::Auto);
}
