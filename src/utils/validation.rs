//! Input grammar checks shared by the ledger services

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

lazy_static! {
    // Base-58 alphabet without 0, O, I and l
    static ref WALLET_ADDRESS: Regex =
        Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("wallet address pattern");
    static ref MOBILE_NUMBER: Regex =
        Regex::new(r"^\+?[0-9]{6,20}$").expect("mobile number pattern");
    // sign, whole digits, fraction digits, exponent
    static ref DECIMAL_LITERAL: Regex =
        Regex::new(r"^([+-]?)([0-9]*)(?:\.([0-9]*))?(?:[eE]([+-]?[0-9]+))?$")
            .expect("decimal literal pattern");
}

/// Largest amount a single withdrawal may request
pub const MAX_WITHDRAWAL_AMOUNT: Decimal = dec!(1000000);

/// Digits a `Decimal` mantissa holds without loss
const MAX_INTEGER_DIGITS: usize = 28;

pub fn is_valid_wallet_address(address: &str) -> bool {
    WALLET_ADDRESS.is_match(address)
}

pub fn is_valid_mobile_number(mobile: &str) -> bool {
    MOBILE_NUMBER.is_match(mobile)
}

/// Why a JSON amount could not be accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    /// Not a decimal number
    Malformed,
    /// Zero, negative or above [`MAX_WITHDRAWAL_AMOUNT`]
    OutOfRange,
    /// In range, but with more fractional digits (the scale carried here)
    /// than a `Decimal` can represent
    ExcessPrecision(u32),
}

/// Parse a JSON amount (number or numeric string) into an exact decimal
/// in the range `(0, MAX_WITHDRAWAL_AMOUNT]`.
///
/// Numbers are read from their textual form so that `1.23456789` keeps
/// exactly eight fractional digits. Scientific notation is expanded.
pub fn parse_amount(value: &Value) -> Result<Decimal, AmountError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(AmountError::Malformed),
    };

    if text.is_empty() {
        return Err(AmountError::Malformed);
    }

    let exact = if text.contains(|c: char| c == 'e' || c == 'E') {
        Decimal::from_scientific(&text)
    } else {
        Decimal::from_str_exact(&text)
    };

    match exact {
        Ok(amount) if amount > Decimal::ZERO && amount <= MAX_WITHDRAWAL_AMOUNT => Ok(amount),
        Ok(_) => Err(AmountError::OutOfRange),
        Err(_) => Err(classify_unrepresentable(&text)),
    }
}

/// Classify a literal `Decimal` refused, working on its digits alone
fn classify_unrepresentable(text: &str) -> AmountError {
    let Some(caps) = DECIMAL_LITERAL.captures(text) else {
        return AmountError::Malformed;
    };
    let negative = &caps[1] == "-";
    let whole = caps.get(2).map_or("", |m| m.as_str());
    let fraction = caps.get(3).map_or("", |m| m.as_str());
    if whole.is_empty() && fraction.is_empty() {
        return AmountError::Malformed;
    }
    let exponent: i64 = match caps.get(4).map(|m| m.as_str().parse()) {
        None => 0,
        Some(Ok(exponent)) => exponent,
        Some(Err(_)) => return AmountError::Malformed,
    };

    // value = significant * 10^-scale
    let all_digits = format!("{}{}", whole, fraction);
    let digits = all_digits.trim_start_matches('0');
    let significant = digits.trim_end_matches('0');
    if significant.is_empty() || negative {
        return AmountError::OutOfRange;
    }
    let trailing_zeros = (digits.len() - significant.len()) as i64;
    let scale = (fraction.len() as i64)
        .saturating_sub(trailing_zeros)
        .saturating_sub(exponent);

    // An integer too large for a Decimal
    if scale <= 0 {
        return AmountError::OutOfRange;
    }

    // Integer part of a value that also has a non-zero fraction
    let fraction_digits = usize::try_from(scale).unwrap_or(usize::MAX);
    let integer_digits = significant.len().saturating_sub(fraction_digits);
    if integer_digits > MAX_INTEGER_DIGITS {
        return AmountError::OutOfRange;
    }
    let integer = match Decimal::from_str_exact(&significant[..integer_digits]) {
        Ok(integer) => integer,
        Err(_) => Decimal::ZERO,
    };
    if integer >= MAX_WITHDRAWAL_AMOUNT {
        return AmountError::OutOfRange;
    }

    AmountError::ExcessPrecision(u32::try_from(scale).unwrap_or(u32::MAX))
}

/// Number of significant fractional digits (trailing zeros ignored)
pub fn decimal_places(amount: Decimal) -> u32 {
    amount.normalize().scale()
}

/// True when a JSON value counts as "not supplied"
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wallet_address_grammar() {
        assert!(is_valid_wallet_address("So11111111111111111111111111111111111111112"));
        assert!(is_valid_wallet_address("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"));
        // 31 characters
        assert!(!is_valid_wallet_address("1111111111111111111111111111111"));
        // 45 characters
        assert!(!is_valid_wallet_address("111111111111111111111111111111111111111111111"));
        // Excluded characters
        assert!(!is_valid_wallet_address("0WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"));
        assert!(!is_valid_wallet_address("OWzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"));
        assert!(!is_valid_wallet_address("lWzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"));
        assert!(!is_valid_wallet_address("!!!invalid!!!"));
        assert!(!is_valid_wallet_address(""));
    }

    #[test]
    fn test_parse_amount_forms() {
        assert_eq!(parse_amount(&json!(1)), Ok(dec!(1)));
        assert_eq!(parse_amount(&json!(2.5)), Ok(dec!(2.5)));
        assert_eq!(parse_amount(&json!("0.75")), Ok(dec!(0.75)));
        assert_eq!(parse_amount(&json!(1e-7)), Ok(dec!(0.0000001)));
        assert_eq!(parse_amount(&json!("abc")), Err(AmountError::Malformed));
        assert_eq!(parse_amount(&json!("NaN")), Err(AmountError::Malformed));
        assert_eq!(parse_amount(&json!(".")), Err(AmountError::Malformed));
        assert_eq!(parse_amount(&json!(true)), Err(AmountError::Malformed));
        assert_eq!(parse_amount(&json!([1])), Err(AmountError::Malformed));
    }

    #[test]
    fn test_parse_amount_range() {
        assert_eq!(parse_amount(&json!(0)), Err(AmountError::OutOfRange));
        assert_eq!(parse_amount(&json!(-1)), Err(AmountError::OutOfRange));
        assert_eq!(parse_amount(&json!(1000000)), Ok(MAX_WITHDRAWAL_AMOUNT));
        assert_eq!(parse_amount(&json!(1000000.5)), Err(AmountError::OutOfRange));
        assert_eq!(parse_amount(&json!("1e40")), Err(AmountError::OutOfRange));
    }

    #[test]
    fn test_parse_amount_beyond_decimal_scale() {
        assert_eq!(parse_amount(&json!(1e-30)), Err(AmountError::ExcessPrecision(30)));
        assert_eq!(
            parse_amount(&json!("0.00000000000000000000000000001")),
            Err(AmountError::ExcessPrecision(29))
        );
        assert_eq!(parse_amount(&json!("100e-40")), Err(AmountError::ExcessPrecision(38)));

        // Too fine to store, but still out of range
        assert_eq!(parse_amount(&json!("-1e-30")), Err(AmountError::OutOfRange));
        let above_max = format!("1000000.{}1", "0".repeat(28));
        assert_eq!(parse_amount(&json!(above_max)), Err(AmountError::OutOfRange));
        assert_eq!(parse_amount(&json!("0e-40")), Err(AmountError::OutOfRange));
    }

    #[test]
    fn test_decimal_places_counts_literal_digits() {
        let eight = parse_amount(&json!(1.23456789)).unwrap();
        assert_eq!(decimal_places(eight), 8);

        let ten = parse_amount(&json!(1.2345678912)).unwrap();
        assert_eq!(decimal_places(ten), 10);

        let padded = parse_amount(&json!("1.500")).unwrap();
        assert_eq!(decimal_places(padded), 1);

        assert_eq!(decimal_places(dec!(3)), 0);
    }

    #[test]
    fn test_mobile_number_grammar() {
        assert!(is_valid_mobile_number("+14155550123"));
        assert!(is_valid_mobile_number("0712345678"));
        assert!(!is_valid_mobile_number("12345"));
        assert!(!is_valid_mobile_number("+1 415 555"));
        assert!(!is_valid_mobile_number("phone"));
    }

    #[test]
    fn test_blank_values() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&Value::Null)));
        assert!(is_blank(Some(&json!("  "))));
        assert!(!is_blank(Some(&json!(0))));
    }
}
