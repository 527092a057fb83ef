use super::*;
use pretty_assertions::assert_eq;

fn err(code: ErrorCode, at: u32, msg: &str) -> Diagnostic {
    Diagnostic::error(code)
        .with_message(msg)
        .with_label(Span::new(at, at + 1), "here")
}

#[test]
fn test_flush_orders_by_position() {
    let mut queue = DiagnosticQueue::new();
    queue.add(err(ErrorCode::E2003, 40, "late"));
    queue.add(err(ErrorCode::E1001, 10, "early"));
    queue.add(Diagnostic::error(ErrorCode::E2019).with_message("no location"));

    let messages: Vec<_> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["no location", "early", "late"]);
}

#[test]
fn test_ties_keep_insertion_order() {
    let mut queue = DiagnosticQueue::new();
    queue.add(err(ErrorCode::E2003, 5, "first"));
    queue.add(err(ErrorCode::E2001, 5, "second"));

    let messages: Vec<_> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["first", "second"]);
}

#[test]
fn test_deduplicates_identical_diagnostics() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(err(ErrorCode::E2003, 5, "same")));
    assert!(!queue.add(err(ErrorCode::E2003, 5, "same")));
    assert!(queue.add(err(ErrorCode::E2003, 6, "same")));
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_error_limit() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: true,
    });
    queue.add(err(ErrorCode::E2003, 1, "a"));
    queue.add(err(ErrorCode::E2003, 2, "b"));
    assert!(!queue.add(err(ErrorCode::E2003, 3, "c")));
    assert!(queue.add(Diagnostic::warning(ErrorCode::E2100).with_message("w")));
    assert!(queue.was_truncated());
    assert_eq!(queue.error_count(), 2);
    assert_eq!(queue.warning_count(), 1);
}

#[test]
fn test_unlimited_keeps_duplicates() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(err(ErrorCode::E2003, 5, "same"));
    queue.add(err(ErrorCode::E2003, 5, "same"));
    assert_eq!(queue.len(), 2);
    assert!(queue.has_errors());
}
