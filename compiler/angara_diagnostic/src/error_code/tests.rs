use super::*;

#[test]
fn display_matches_name() {
    assert_eq!(ErrorCode::E2003.to_string(), "E2003");
    assert_eq!(format!("{}", ErrorCode::E9002), "E9002");
}

#[test]
fn phase_classification() {
    assert!(ErrorCode::E0001.is_lexer_error());
    assert!(ErrorCode::E1001.is_parser_error());
    assert!(ErrorCode::E1001.is_syntax_error());
    assert!(ErrorCode::E2004.is_semantic_error());
    assert!(!ErrorCode::E2004.is_syntax_error());
    assert!(!ErrorCode::E9001.is_semantic_error());
}

#[test]
fn from_name_round_trips_every_code() {
    for code in ErrorCode::ALL {
        assert_eq!(ErrorCode::from_name(code.as_str()), Some(*code));
        assert!(!code.description().is_empty());
    }
    assert_eq!(ErrorCode::from_name("E4242"), None);
}
