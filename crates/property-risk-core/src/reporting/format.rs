use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;

use crate::types::{Money, Percent};

const NOT_AVAILABLE: &str = "N/A";

/// Format a dollar amount with no decimals and thousands separators:
/// `1234567.5` renders as `"$1,234,568"`, `-1234.5` as `"-$1,235"`.
///
/// Halves round away from zero. Non-finite values, and values beyond the
/// range of `Decimal`, render as `"N/A"`.
pub fn format_currency(value: Money) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    match Decimal::from_f64(value) {
        Some(d) => format_currency_decimal(d),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// [`format_currency`] for an exact decimal amount.
pub fn format_currency_decimal(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let whole = match rounded.abs().to_u128() {
        Some(w) => w,
        None => return NOT_AVAILABLE.to_string(),
    };
    let sign = if rounded.is_sign_negative() && whole != 0 {
        "-"
    } else {
        ""
    };
    format!("{sign}${}", group_thousands(whole))
}

/// Format a value already in percent with two decimals: `7.254` renders as
/// `"7.25%"`.
pub fn format_percentage(value: Percent) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{value:.2}%")
}

/// Insert a comma every three digits.
pub(crate) fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
