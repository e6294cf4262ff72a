//! Text forms of primitive values.
//!
//! Floats print like C's `%g`: six significant digits, exponent form when
//! the decimal exponent is below -4 or at least 6, trailing zeros dropped.
//! [`parse_primitive`] reads those renderings back.

use crate::value::Value;

const PRECISION: i32 = 6;

/// `%g` rendering of `f`.
pub fn format_g(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Scientific form with PRECISION significant digits gives the exponent
    // after rounding, which is what picks the style.
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, f);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (PRECISION - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{f:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Parse the text form of `nil`, a bool, an integer or a float.
pub fn parse_primitive(text: &str) -> Option<Value> {
    match text {
        "nil" => return Some(Value::NIL),
        "true" => return Some(Value::TRUE),
        "false" => return Some(Value::FALSE),
        "nan" => return Some(Value::float(f64::NAN)),
        "inf" => return Some(Value::float(f64::INFINITY)),
        "-inf" => return Some(Value::float(f64::NEG_INFINITY)),
        _ => {}
    }

    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::int(n));
    }
    // Reject words Rust would accept as floats ("infinity", "NaN").
    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return None;
    }
    text.parse::<f64>().ok().map(Value::float)
}
