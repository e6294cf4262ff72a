use pretty_assertions::assert_eq;

use super::*;

#[test]
fn display_in_source_syntax() {
    assert_eq!(Ty::I64.to_string(), "i64");
    assert_eq!(Ty::list_of(Ty::String).to_string(), "list<string>");
    assert_eq!(
        Ty::function(vec![Ty::String, Ty::I64], Ty::String).to_string(),
        "fn(string, i64) -> string"
    );
    assert_eq!(Ty::Instance("Stopwatch".into()).to_string(), "Stopwatch");
}

#[test]
fn any_is_compatible_both_ways() {
    assert!(Ty::Any.accepts(&Ty::I64));
    assert!(Ty::String.accepts(&Ty::Any));
}

#[test]
fn int_widens_to_float_only() {
    assert!(Ty::F64.accepts(&Ty::I64));
    assert!(!Ty::I64.accepts(&Ty::F64));
}

#[test]
fn lists_compare_elements() {
    assert!(Ty::list_of(Ty::Any).accepts(&Ty::list_of(Ty::I64)));
    assert!(!Ty::list_of(Ty::String).accepts(&Ty::list_of(Ty::I64)));
}

#[test]
fn from_native_signature() {
    let signature: Signature = "s...->s".parse().unwrap_or_else(|e| panic!("{e}"));
    let ty = Ty::from_signature(&signature);
    assert_eq!(ty.to_string(), "fn(string...) -> string");

    let signature: Signature = "{}->i".parse().unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(
        Ty::from_signature(&signature),
        Ty::function(vec![Ty::Record], Ty::I64)
    );

    let signature: Signature = "->Stopwatch".parse().unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(
        Ty::from_signature(&signature),
        Ty::function(vec![], Ty::Instance("Stopwatch".into()))
    );
}
