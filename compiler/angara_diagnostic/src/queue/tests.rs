use super::*;

fn err(code: ErrorCode, msg: &str) -> Diagnostic {
    Diagnostic::error(code).with_message(msg)
}

#[test]
fn collects_and_counts() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(err(ErrorCode::E2003, "a"), 1, 1));
    assert!(queue.add(Diagnostic::warning(ErrorCode::E2004).with_message("w"), 2, 1));
    assert_eq!(queue.error_count(), 1);
    assert_eq!(queue.warning_count(), 1);
    assert!(queue.has_errors().is_some());
}

#[test]
fn flush_sorts_by_position() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(err(ErrorCode::E2003, "third"), 5, 1);
    queue.add(err(ErrorCode::E2003, "first"), 1, 9);
    queue.add(err(ErrorCode::E2003, "second"), 1, 10);

    let messages: Vec<String> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
    assert_eq!(queue.error_count(), 0);
    assert!(queue.has_errors().is_none());
}

#[test]
fn deduplicates_same_line_same_message() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(err(ErrorCode::E2003, "unknown identifier `x`"), 3, 1));
    assert!(!queue.add(err(ErrorCode::E2003, "unknown identifier `x`"), 3, 8));
    assert!(queue.add(err(ErrorCode::E2003, "unknown identifier `y`"), 3, 12));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn deduplicates_syntax_errors_per_line() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(err(ErrorCode::E1001, "unexpected `)`"), 7, 1));
    assert!(!queue.add(err(ErrorCode::E1002, "expected expression"), 7, 4));
    assert!(queue.add(err(ErrorCode::E1002, "expected expression"), 8, 4));
}

#[test]
fn error_limit_stops_and_reports() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    assert!(queue.add(err(ErrorCode::E2003, "a"), 1, 1));
    assert!(queue.add(err(ErrorCode::E2003, "b"), 2, 1));
    assert!(queue.limit_reached());
    assert!(!queue.add(err(ErrorCode::E2003, "c"), 3, 1));

    let out = queue.flush();
    assert_eq!(out.len(), 3);
    assert_eq!(out[2].code, ErrorCode::E9002);
}

#[test]
fn emit_error_returns_proof() {
    let mut queue = DiagnosticQueue::new();
    let _proof: ErrorGuaranteed = queue.emit_error(err(ErrorCode::E2002, "const"), 1, 1);
    assert_eq!(queue.peek().count(), 1);
}
