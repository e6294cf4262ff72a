use pretty_assertions::assert_eq;

use super::*;
use crate::class::{class_new, instance_new};
use crate::object::decref;
use crate::string::string_from;

fn parse(text: &str) -> Signature {
    text.parse()
        .unwrap_or_else(|e: SignatureError| panic!("{e}"))
}

fn error_kind(text: &str) -> SignatureErrorKind {
    match text.parse::<Signature>() {
        Ok(sig) => panic!("`{text}` parsed as {sig:?}"),
        Err(e) => e.kind,
    }
}

#[test]
fn simple_signatures() {
    let sig = parse("ss->n");
    assert_eq!(sig.params, vec![TypeTag::String, TypeTag::String]);
    assert_eq!(sig.ret, TypeTag::Nil);
    assert!(!sig.variadic);

    let sig = parse("->i");
    assert!(sig.params.is_empty());
    assert_eq!(sig.ret, TypeTag::I64);
}

#[test]
fn every_single_letter_tag() {
    let sig = parse("sidbnaL R->a");
    assert_eq!(
        sig.params,
        vec![
            TypeTag::String,
            TypeTag::I64,
            TypeTag::F64,
            TypeTag::Bool,
            TypeTag::Nil,
            TypeTag::Any,
            TypeTag::List,
            TypeTag::Record,
        ]
    );
}

#[test]
fn variadic_repeats_last_param() {
    let sig = parse("s...->s");
    assert!(sig.variadic);
    assert_eq!(sig.required_args(), 0);
    assert!(sig.accepts_count(0));
    assert!(sig.accepts_count(5));
    assert_eq!(sig.param(3), Some(&TypeTag::String));

    let sig = parse("i s ... -> s");
    assert_eq!(sig.required_args(), 1);
    assert!(!sig.accepts_count(0));
    assert_eq!(sig.param(0), Some(&TypeTag::I64));
    assert_eq!(sig.param(4), Some(&TypeTag::String));
}

#[test]
fn fixed_arity_rejects_extra_args() {
    let sig = parse("s->b");
    assert!(sig.accepts_count(1));
    assert!(!sig.accepts_count(2));
    assert_eq!(sig.param(1), None);
}

#[test]
fn class_names_and_shapes() {
    let sig = parse("File {path: s} L s->Stopwatch");
    assert_eq!(
        sig.params,
        vec![
            TypeTag::Instance("File".into()),
            TypeTag::RecordShape("path: s".into()),
            TypeTag::List,
            TypeTag::String,
        ]
    );
    assert_eq!(sig.ret, TypeTag::Instance("Stopwatch".into()));
}

#[test]
fn container_tags_run_into_following_tags() {
    let sig = parse("Ls->s");
    assert_eq!(sig.params, vec![TypeTag::List, TypeTag::String]);
    assert_eq!(sig.ret, TypeTag::String);

    let sig = parse("Rd->n");
    assert_eq!(sig.params, vec![TypeTag::Record, TypeTag::F64]);

    let sig = parse("L{x: i}R...->L");
    assert_eq!(
        sig.params,
        vec![
            TypeTag::List,
            TypeTag::RecordShape("x: i".into()),
            TypeTag::Record,
        ]
    );
    assert!(sig.variadic);
    assert_eq!(sig.ret, TypeTag::List);
}

#[test]
fn longer_names_starting_with_l_or_r_are_classes() {
    let sig = parse("Logger Rng2->Lx");
    assert_eq!(
        sig.params,
        vec![
            TypeTag::Instance("Logger".into()),
            TypeTag::Instance("Rng2".into()),
        ]
    );
    assert_eq!(sig.ret, TypeTag::Instance("Lx".into()));
}

#[test]
fn nested_shape_braces() {
    let sig = parse("{a: {b: i}}->n");
    assert_eq!(sig.params, vec![TypeTag::RecordShape("a: {b: i}".into())]);
}

#[test]
fn display_reparses_to_the_same_signature() {
    for text in ["ss->n", "s...->s", "L s->R", "File{x}->Stopwatch", "->a", "Ls->L"] {
        let sig = parse(text);
        assert_eq!(parse(&sig.to_string()), sig, "{text} -> {sig}");
    }
    assert_eq!(parse("L s -> n").to_string(), "L s->n");
}

#[test]
fn malformed_signatures() {
    assert_eq!(error_kind("ss"), SignatureErrorKind::MissingArrow);
    assert_eq!(error_kind("s->"), SignatureErrorKind::MissingReturn);
    assert_eq!(error_kind("x->s"), SignatureErrorKind::UnexpectedChar('x'));
    assert_eq!(error_kind("{a->s"), SignatureErrorKind::UnbalancedBrace);
    assert_eq!(error_kind("...->s"), SignatureErrorKind::DanglingVariadic);
    assert_eq!(error_kind("s...i->s"), SignatureErrorKind::VariadicNotLast);
    assert_eq!(error_kind("s->s s"), SignatureErrorKind::TrailingInput);
}

#[test]
fn error_reports_byte_position() {
    let err = "ss?->n"
        .parse::<Signature>()
        .err()
        .unwrap_or_else(|| panic!("expected an error"));
    assert_eq!(err.position, 2);
    assert_eq!(
        err.to_string(),
        "invalid signature `ss?->n` at byte 2: unexpected character `?`"
    );
}

#[test]
fn tags_match_values() {
    let s = string_from("x");
    assert!(TypeTag::String.matches(s));
    assert!(!TypeTag::I64.matches(s));
    assert!(TypeTag::F64.matches(Value::int(1)));
    assert!(!TypeTag::I64.matches(Value::float(1.0)));
    assert!(TypeTag::Any.matches(Value::NIL));
    decref(s);

    let class = class_new("Stopwatch");
    let inst = instance_new(class);
    assert!(TypeTag::Instance("Stopwatch".into()).matches(inst));
    assert!(!TypeTag::Instance("File".into()).matches(inst));
    decref(inst);
    decref(class);
}

#[test]
fn readable_names() {
    assert_eq!(TypeTag::F64.to_string(), "f64");
    assert_eq!(TypeTag::RecordShape("a: i".into()).to_string(), "record");
    assert_eq!(TypeTag::Instance("File".into()).to_string(), "File");
}
