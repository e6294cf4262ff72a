use super::*;

#[test]
fn span_len_and_empty() {
    assert_eq!(Span::new(3, 9).len(), 6);
    assert!(Span::point(4).is_empty());
    assert!(!Span::new(0, 1).is_empty());
}

#[test]
fn span_merge_covers_both() {
    let merged = Span::new(10, 12).merge(Span::new(2, 5));
    assert_eq!(merged, Span::new(2, 12));
}

#[test]
fn span_dummy() {
    assert!(Span::DUMMY.is_dummy());
    assert!(!Span::new(1, 2).is_dummy());
}

#[test]
fn span_debug_format() {
    assert_eq!(format!("{:?}", Span::new(4, 8)), "4..8");
}
