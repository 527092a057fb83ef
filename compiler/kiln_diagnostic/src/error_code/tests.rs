use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    assert_eq!(ErrorCode::E2001.as_str(), "E2001");
}

#[test]
fn test_all_is_sorted_and_unique() {
    for pair in ErrorCode::ALL.windows(2) {
        assert!(pair[0].as_str() < pair[1].as_str(), "{:?}", pair);
    }
}

#[test]
fn test_from_str_roundtrips_every_code() {
    for code in ErrorCode::ALL {
        assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(*code));
    }
    assert_eq!("e2003".parse::<ErrorCode>(), Ok(ErrorCode::E2003));
    assert!("E9999".parse::<ErrorCode>().is_err());
}

#[test]
fn test_default_severity() {
    assert_eq!(ErrorCode::E2003.default_severity(), Severity::Error);
    assert_eq!(ErrorCode::E2100.default_severity(), Severity::Warning);
    assert_eq!(ErrorCode::E2200.default_severity(), Severity::Info);
}

#[test]
fn test_predicate_exclusivity() {
    for code in ErrorCode::ALL {
        let categories = [
            code.is_lexer_error(),
            code.is_parser_error(),
            code.is_semantic_error(),
            code.is_warning(),
            code.is_info(),
            code.is_emit_error(),
        ];
        assert_eq!(
            categories.iter().filter(|c| **c).count(),
            1,
            "{code} belongs to exactly one category"
        );
    }
}

#[test]
fn test_every_code_has_title() {
    for code in ErrorCode::ALL {
        assert!(!code.title().is_empty(), "{code} has no title");
    }
}
