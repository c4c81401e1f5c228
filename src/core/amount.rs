//! Amount field normalization.
//!
//! Parsing follows the browser's `parseFloat` (longest numeric prefix, `NaN` when nothing
//! parses) and formatting follows `Number.prototype.toFixed(2)`, so the field reads the same
//! as it would in a live page.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const FRACTION_DIGITS: u32 = 2;
const INFINITY: &str = "Infinity";

/// Parses the amount field into a number and formats it back with two fraction digits.
pub fn normalize_amount(raw: &str) -> String {
    to_fixed(parse_float(raw))
}

/// Parses the longest numeric prefix of `input`. Returns `NaN` if there is none.
pub fn parse_float(input: &str) -> f64 {
    let trimmed = input.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let prefix = numeric_prefix(trimmed);

    let unsigned = prefix.trim_start_matches(['+', '-']);
    if unsigned == INFINITY {
        return if prefix.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    prefix.parse::<f64>().unwrap_or(f64::NAN)
}

fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with(INFINITY) {
        return &s[..end + INFINITY.len()];
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        // A lone "." is not a number, "5." and ".5" are.
        if digits + (frac_end - frac_start) > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return "";
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    &s[..end]
}

/// Formats `value` with exactly two fraction digits.
///
/// Ties round away from zero on the exact binary value, `NaN` and the infinities print as
/// literals, and magnitudes of 1e21 or more fall back to exponent notation.
pub fn to_fixed(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 {
            INFINITY.to_string()
        } else {
            format!("-{INFINITY}")
        };
    }
    if value.abs() >= 1e21 {
        return exponent_notation(value);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    let fixed = Decimal::from_f64_retain(magnitude)
        .map(|exact| {
            let mut rounded = exact.round_dp_with_strategy(
                FRACTION_DIGITS,
                RoundingStrategy::MidpointAwayFromZero,
            );
            rounded.rescale(FRACTION_DIGITS);
            rounded.to_string()
        })
        .unwrap_or_else(|| format!("{magnitude:.2}"));

    format!("{sign}{fixed}")
}

fn exponent_notation(value: f64) -> String {
    let shortest = format!("{value:e}");
    match shortest.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => shortest,
    }
}

/// Rounds a computed amount to cents, ties to even on the exact binary value.
pub fn round_to_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    Decimal::from_f64_retain(value)
        .map(|exact| exact.round_dp_with_strategy(FRACTION_DIGITS, RoundingStrategy::MidpointNearestEven))
        .and_then(|rounded| rounded.to_f64())
        .unwrap_or(value)
}
