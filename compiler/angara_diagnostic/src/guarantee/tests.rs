use super::*;

#[test]
fn guarantee_is_zero_sized() {
    assert_eq!(std::mem::size_of::<ErrorGuaranteed>(), 0);
}

#[test]
fn guarantees_compare_equal() {
    assert_eq!(ErrorGuaranteed::new(), ErrorGuaranteed::new());
}
