//! Amount parsing for locale-ambiguous statement numbers.
//!
//! Statements mix `34,736.28`, `1.234,56` and plain integers. The lenient
//! parser never fails: anything it cannot read becomes zero so one bad cell
//! never aborts a page. The strict checks are used when deciding whether a
//! cell is an amount at all.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static GROUPED_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(?:,\d{3})*\.\d{2}$").expect("valid amount regex"));
static PLAIN_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d{2}$").expect("valid amount regex"));
static PLAIN_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid amount regex"));

/// Amount-shaped tokens inside free text.
static AMOUNT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}(?:,\d{3})*\.\d{2}|\d{1,7}\.\d{2})\b").expect("valid amount regex")
});

/// Parse an amount, returning zero for anything unreadable.
///
/// Every character other than digits, `,`, `.` and `-` is stripped first.
/// The last separator is the decimal mark only when 1 or 2 digits follow
/// it; otherwise all separators are grouping marks. A leading or trailing
/// minus, or surrounding parentheses, make the result negative.
pub fn parse_amount(text: &str) -> Decimal {
    parse_lenient(text).unwrap_or(Decimal::ZERO)
}

fn parse_lenient(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parenthesized = trimmed.starts_with('(') && trimmed.ends_with(')');
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let negative = parenthesized || cleaned.starts_with('-') || cleaned.ends_with('-');
    let body: String = cleaned.chars().filter(|c| *c != '-').collect();
    if !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match body.rfind(['.', ',']) {
        Some(pos) => {
            let fraction = &body[pos + 1..];
            let integer: String = body[..pos].chars().filter(char::is_ascii_digit).collect();
            if (1..=2).contains(&fraction.len()) {
                let integer = if integer.is_empty() {
                    "0".to_string()
                } else {
                    integer
                };
                format!("{}.{}", integer, fraction)
            } else {
                body.chars().filter(char::is_ascii_digit).collect()
            }
        }
        None => body,
    };

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// Check if text is exactly one canonical amount shape.
///
/// Accepted: `1,234.56`, `1234.56`, `1234`.
pub fn is_valid_amount(text: &str) -> bool {
    let text = text.trim();
    GROUPED_DECIMAL.is_match(text) || PLAIN_DECIMAL.is_match(text) || PLAIN_INTEGER.is_match(text)
}

/// Parse an amount only if it has a canonical shape.
pub fn parse_amount_strict(text: &str) -> Option<Decimal> {
    if is_valid_amount(text) {
        parse_lenient(text)
    } else {
        None
    }
}

/// Find every positive amount-shaped token in free text, in order.
pub fn find_amounts(text: &str) -> Vec<Decimal> {
    AMOUNT_TOKEN
        .find_iter(text)
        .map(|m| parse_amount(m.as_str()))
        .filter(|v| *v > Decimal::ZERO)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_comma_grouping_dot_decimal() {
        assert_eq!(parse_amount("34,736.28"), dec("34736.28"));
        assert_eq!(parse_amount("1,234,567.89"), dec("1234567.89"));
    }

    #[test]
    fn test_dot_grouping_comma_decimal() {
        assert_eq!(parse_amount("1.234,56"), dec("1234.56"));
        assert_eq!(parse_amount("12,5"), dec("12.5"));
    }

    #[test]
    fn test_three_digit_tail_is_grouping() {
        assert_eq!(parse_amount("1.234"), dec("1234"));
        assert_eq!(parse_amount("1,234"), dec("1234"));
        assert_eq!(parse_amount("12.345.678"), dec("12345678"));
    }

    #[test]
    fn test_plain_integer_and_noise() {
        assert_eq!(parse_amount("1234"), dec("1234"));
        assert_eq!(parse_amount("USD 1,500.00"), dec("1500.00"));
        assert_eq!(parse_amount("500.00 CDF"), dec("500"));
    }

    #[test]
    fn test_negative_forms() {
        assert_eq!(parse_amount("-42.10"), dec("-42.10"));
        assert_eq!(parse_amount("42.10-"), dec("-42.10"));
        assert_eq!(parse_amount("(1,234.56)"), dec("-1234.56"));
    }

    #[test]
    fn test_unparsable_is_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("   "), Decimal::ZERO);
        assert_eq!(parse_amount("N/A"), Decimal::ZERO);
        assert_eq!(parse_amount("--"), Decimal::ZERO);
        assert_eq!(parse_amount(".,"), Decimal::ZERO);
    }

    #[test]
    fn test_formatted_values_parse_back() {
        for (raw, value) in [
            ("0.01", "0.01"),
            ("7.50", "7.5"),
            ("999.99", "999.99"),
            ("1,000.00", "1000"),
            ("34,736.28", "34736.28"),
            ("9,999,999.99", "9999999.99"),
            ("250", "250"),
        ] {
            assert_eq!(parse_amount(raw), dec(value), "{}", raw);
            assert_eq!(parse_amount_strict(raw), Some(dec(value)), "{}", raw);
        }
    }

    #[test]
    fn test_strict_shapes() {
        assert!(is_valid_amount("1,234.56"));
        assert!(is_valid_amount(" 1234.56 "));
        assert!(is_valid_amount("1234"));
        assert!(!is_valid_amount("1.234,56"));
        assert!(!is_valid_amount("12,34.56"));
        assert!(!is_valid_amount("1234.5"));
        assert!(!is_valid_amount("01-03-2024"));
        assert!(!is_valid_amount("N/A"));
        assert!(!is_valid_amount(""));

        assert_eq!(parse_amount_strict("N/A"), None);
        assert_eq!(parse_amount_strict("1.234,56"), None);
    }

    #[test]
    fn test_find_amounts() {
        let found = find_amounts("01-03-2024 PMT TOURISME 1,234.56 solde 20,000.00");
        assert_eq!(found, vec![dec("1234.56"), dec("20000.00")]);
        assert!(find_amounts("01-03-2024 ICCN ref 4411").is_empty());
        assert!(find_amounts("0.00").is_empty());
    }
}
