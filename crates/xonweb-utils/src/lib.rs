//! Utility functions and helpers

use rust_decimal::Decimal;
use std::str::FromStr;

/// Group the digits of an integer string with a thousands separator
pub fn format_number(digits: &str, separator: &str) -> String {
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Format an amount for display, e.g. `Rp 1.250.000`
pub fn format_currency(
    amount: Decimal,
    symbol: &str,
    thousands_separator: &str,
    decimal_separator: &str,
    decimal_places: u32,
) -> String {
    let rounded = amount.abs().round_dp(decimal_places);
    let text = format!("{:.*}", decimal_places as usize, rounded);
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut out = String::new();
    if amount.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    if !symbol.is_empty() {
        out.push_str(symbol);
        out.push(' ');
    }
    out.push_str(&format_number(whole, thousands_separator));
    if let Some(fraction) = fraction {
        out.push_str(decimal_separator);
        out.push_str(fraction);
    }
    out
}

/// Numeric coercion for form input: anything that does not parse is zero
pub fn coerce_decimal(input: &str) -> Decimal {
    parse_decimal(input).unwrap_or(Decimal::ZERO)
}

/// Parse user-entered numeric text
///
/// Accepts plain and scientific notation. Returns `None` for empty or
/// non-numeric input.
pub fn parse_decimal(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Case-insensitive substring match
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number("1250000", "."), "1.250.000");
        assert_eq!(format_number("999", "."), "999");
        assert_eq!(format_number("1000", ","), "1,000");
        assert_eq!(format_number("", "."), "");
    }

    #[test]
    fn test_format_currency_rupiah() {
        let amount = Decimal::new(1_250_000, 0);
        assert_eq!(format_currency(amount, "Rp", ".", ",", 0), "Rp 1.250.000");
    }

    #[test]
    fn test_format_currency_with_fraction_and_sign() {
        let amount = Decimal::new(-123_456_78, 2);
        assert_eq!(format_currency(amount, "Rp", ".", ",", 2), "-Rp 123.456,78");
    }

    #[test]
    fn test_coerce_decimal() {
        assert_eq!(coerce_decimal("12.5"), Decimal::new(125, 1));
        assert_eq!(coerce_decimal(" 3 "), Decimal::new(3, 0));
        assert_eq!(coerce_decimal("abc"), Decimal::ZERO);
        assert_eq!(coerce_decimal(""), Decimal::ZERO);
        assert_eq!(coerce_decimal("1e3"), Decimal::new(1000, 0));
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Semen Tiga Roda", "semen"));
        assert!(contains_ignore_case("Semen Tiga Roda", "TIGA"));
        assert!(!contains_ignore_case("Pasir", "semen"));
    }
}
