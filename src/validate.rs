use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{Result, WalletError};
use crate::models::PersonKind;

fn cedula_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{3})-?(\d{7})-?(\d)$").expect("valid cédula pattern"))
}

fn rnc_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d)-?(\d{2})-?(\d{5})-?(\d)$").expect("valid RNC pattern"))
}

/// Trimmed, non-empty free-text description.
pub fn description(s: &str) -> Result<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(WalletError::Validation("Description is required".into()));
    }
    Ok(trimmed.to_string())
}

/// Expense line items are plain words: no digits and more than one letter.
pub fn item_description(s: &str) -> Result<String> {
    let trimmed = description(s)?;
    if trimmed.chars().any(|c| c.is_ascii_digit()) {
        return Err(WalletError::Validation(
            "Item description must not contain digits".into(),
        ));
    }
    if trimmed.chars().count() < 2 {
        return Err(WalletError::Validation(
            "Item description must be longer than one letter".into(),
        ));
    }
    Ok(trimmed)
}

/// Validates a national ID for the given person kind and returns its bare digits.
pub fn national_id(kind: PersonKind, s: &str) -> Result<String> {
    let s = s.trim();
    let (re, label) = match kind {
        PersonKind::Individual => (cedula_re(), "cédula"),
        PersonKind::Company => (rnc_re(), "RNC"),
    };
    let caps = re.captures(s).ok_or_else(|| {
        WalletError::Validation(format!("Malformed {label}: {s}"))
    })?;
    let digits: String = caps
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str())
        .collect();
    let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

    let valid = match kind {
        PersonKind::Individual => cedula_checksum_ok(&values),
        PersonKind::Company => rnc_checksum_ok(&values),
    };
    if !valid {
        return Err(WalletError::Validation(format!(
            "Invalid {label} check digit: {s}"
        )));
    }
    Ok(digits)
}

// Alternating 1/2 weights over the first ten digits; two-digit products are
// reduced by summing their digits.
fn cedula_checksum_ok(digits: &[u32]) -> bool {
    if digits.len() != 11 {
        return false;
    }
    let sum: u32 = digits[..10]
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let p = d * if i % 2 == 0 { 1 } else { 2 };
            if p > 9 {
                p / 10 + p % 10
            } else {
                p
            }
        })
        .sum();
    (10 - sum % 10) % 10 == digits[10]
}

fn rnc_checksum_ok(digits: &[u32]) -> bool {
    const WEIGHTS: [u32; 8] = [7, 9, 8, 6, 5, 4, 3, 2];
    if digits.len() != 9 {
        return false;
    }
    let sum: u32 = digits[..8].iter().zip(WEIGHTS).map(|(d, w)| d * w).sum();
    let check = match sum % 11 {
        0 => 2,
        1 => 1,
        r => 11 - r,
    };
    check == digits[8]
}

/// Positive, finite amount.
pub fn amount(value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(WalletError::Validation(format!(
            "Amount must be greater than zero, got {value}"
        )));
    }
    Ok(value)
}

pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != '$').collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| WalletError::Validation(format!("Not a number: {s}")))?;
    amount(value)
}

pub fn date(s: &str) -> Result<String> {
    let d = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| WalletError::Validation(format!("Invalid date: {s} (expected YYYY-MM-DD)")))?;
    Ok(d.format("%Y-%m-%d").to_string())
}

pub fn cutoff_day(day: u32) -> Result<u32> {
    if !(1..=31).contains(&day) {
        return Err(WalletError::Validation(format!(
            "Cut-off day must be between 1 and 31, got {day}"
        )));
    }
    Ok(day)
}

pub fn expense_limit(limit: f64) -> Result<f64> {
    if !limit.is_finite() || limit < 0.0 {
        return Err(WalletError::Validation(format!(
            "Expense limit cannot be negative, got {limit}"
        )));
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_trims() {
        assert_eq!(description("  Salary  ").unwrap(), "Salary");
        assert!(description("   ").is_err());
    }

    #[test]
    fn test_item_description_rules() {
        assert_eq!(item_description("Comida").unwrap(), "Comida");
        let err = item_description("Gas 95").unwrap_err();
        assert!(err.to_string().contains("digits"));
        let err = item_description("x").unwrap_err();
        assert!(err.to_string().contains("longer than one letter"));
        assert!(item_description("").is_err());
    }

    #[test]
    fn test_cedula_valid_with_and_without_dashes() {
        // 0010000000 -> weighted sum 1, check digit 9
        assert_eq!(national_id(PersonKind::Individual, "001-0000000-9").unwrap(), "00100000009");
        assert_eq!(national_id(PersonKind::Individual, "00100000009").unwrap(), "00100000009");
        // 4,0,2,2 weighted 4+0+2+4 = 10, rest zero -> check digit 0
        assert_eq!(national_id(PersonKind::Individual, "402-2000000-0").unwrap(), "40220000000");
    }

    #[test]
    fn test_cedula_bad_check_digit() {
        let err = national_id(PersonKind::Individual, "001-0000000-8").unwrap_err();
        assert!(err.to_string().contains("check digit"));
    }

    #[test]
    fn test_cedula_malformed() {
        let err = national_id(PersonKind::Individual, "12345").unwrap_err();
        assert!(err.to_string().contains("Malformed"));
    }

    #[test]
    fn test_cedula_two_digit_products_are_reduced() {
        // digits 0,9 at positions 0,1: 0 + 18 -> 1+8 = 9, check digit 1
        assert_eq!(national_id(PersonKind::Individual, "09000000001").unwrap(), "09000000001");
        assert!(national_id(PersonKind::Individual, "09000000002").is_err());
    }

    #[test]
    fn test_rnc_checksum() {
        // 1*7 = 7 -> r = 7, check = 4
        assert_eq!(national_id(PersonKind::Company, "1-00-00000-4").unwrap(), "100000004");
        // all zero -> r = 0, check = 2
        assert_eq!(national_id(PersonKind::Company, "000000002").unwrap(), "000000002");
        assert!(national_id(PersonKind::Company, "100000005").is_err());
    }

    #[test]
    fn test_rnc_rejects_cedula_shape() {
        assert!(national_id(PersonKind::Company, "00100000009").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,250.50").unwrap(), 1250.5);
        assert_eq!(parse_amount("$40").unwrap(), 40.0);
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-3").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_date() {
        assert_eq!(date("2025-02-28").unwrap(), "2025-02-28");
        assert!(date("2025-02-30").is_err());
        assert!(date("28/02/2025").is_err());
    }

    #[test]
    fn test_cutoff_day_and_limit() {
        assert!(cutoff_day(0).is_err());
        assert!(cutoff_day(32).is_err());
        assert_eq!(cutoff_day(15).unwrap(), 15);
        assert!(expense_limit(-1.0).is_err());
        assert_eq!(expense_limit(0.0).unwrap(), 0.0);
    }
}
