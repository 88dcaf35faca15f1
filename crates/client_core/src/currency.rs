//! Euro amounts rendered the way the French locale prints them.
//!
//! Service figures may arrive as numbers or as already-formatted strings
//! (`"1 234,56 €"`). Strings go through [`parse_amount`]: sanitize, normalize
//! the decimal separator, then parse the longest numeric prefix.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

pub const NOT_AVAILABLE: &str = "N/A";

const GROUP_SEPARATOR: char = '\u{202F}';
const DECIMAL_SEPARATOR: char = ',';
const CURRENCY_SUFFIX: &str = "\u{00A0}€";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurrencyValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl From<f64> for CurrencyValue<'_> {
    fn from(value: f64) -> Self {
        CurrencyValue::Number(value)
    }
}

impl<'a> From<&'a str> for CurrencyValue<'a> {
    fn from(value: &'a str) -> Self {
        CurrencyValue::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("no numeric value in '{0}'")]
    NoDigits(String),
    #[error("amount is not a finite number")]
    NotFinite,
}

/// Keeps ASCII digits, `,` and `.`; everything else (symbols, spaces, signs) is dropped.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect()
}

/// Turns the first comma into a decimal point.
pub fn normalize(sanitized: &str) -> String {
    sanitized.replacen(',', ".", 1)
}

pub fn parse_amount(raw: &str) -> Result<f64, AmountParseError> {
    let normalized = normalize(&sanitize(raw));
    let prefix = numeric_prefix(&normalized);
    if !prefix.bytes().any(|b| b.is_ascii_digit()) {
        return Err(AmountParseError::NoDigits(raw.to_string()));
    }
    let candidate = if prefix.starts_with('.') {
        format!("0{prefix}")
    } else {
        prefix.to_string()
    };
    candidate
        .parse::<f64>()
        .map_err(|_| AmountParseError::NoDigits(raw.to_string()))
}

// `digits[.digits]`; stops at the second separator.
fn numeric_prefix(normalized: &str) -> &str {
    let mut seen_point = false;
    let mut end = 0;
    for (idx, c) in normalized.char_indices() {
        match c {
            '0'..='9' => end = idx + 1,
            '.' if !seen_point => {
                seen_point = true;
                end = idx + 1;
            }
            _ => break,
        }
    }
    &normalized[..end]
}

pub fn format_currency(value: Option<CurrencyValue<'_>>) -> String {
    let amount = match value {
        None => return NOT_AVAILABLE.to_string(),
        Some(CurrencyValue::Number(number)) => Ok(number),
        Some(CurrencyValue::Text(text)) => parse_amount(text),
    };
    match amount {
        Ok(number) => format_amount(number),
        Err(_) => NOT_AVAILABLE.to_string(),
    }
}

/// Renders a number as `fr-FR` euros, e.g. `1234.5` -> `1 234,50 €`.
pub fn format_amount(value: f64) -> String {
    match render_eur(value) {
        Ok(rendered) => rendered,
        Err(_) => NOT_AVAILABLE.to_string(),
    }
}

fn render_eur(value: f64) -> Result<String, AmountParseError> {
    if !value.is_finite() {
        return Err(AmountParseError::NotFinite);
    }
    // Rounds the shortest decimal spelling of the value, half away from zero.
    let fixed = value
        .to_string()
        .parse::<Decimal>()
        .map(|d| {
            let mut rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(2);
            rounded.to_string()
        })
        .unwrap_or_else(|_| format!("{value:.2}"));

    // Negatives that round to zero keep their sign (`-0,00 €`).
    let negative = value.is_sign_negative();
    let unsigned = fixed.trim_start_matches('-');
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut out = String::with_capacity(fixed.len() + 8);
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(integer));
    out.push(DECIMAL_SEPARATOR);
    out.push_str(fraction);
    out.push_str(CURRENCY_SUFFIX);
    Ok(out)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3 * GROUP_SEPARATOR.len_utf8());
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(c);
    }
    grouped
}
