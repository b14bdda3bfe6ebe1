/*
[INPUT]:  Decimal amount strings entered by donors
[OUTPUT]: Integer stroop amounts and their display form
[POS]:    Ledger layer - amount validation
[UPDATE]: When ledger asset precision changes
*/

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::http::{Result, WalletError};

/// Stroops per whole unit of the native asset
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Ledger asset precision
pub const MAX_FRACTION_DIGITS: u32 = 7;

/// Parse a positive decimal amount with at most 7 fractional digits into stroops
pub fn parse_amount(amount: &str) -> Result<i64> {
    let trimmed = amount.trim();
    let Some(fraction) = plain_decimal_fraction(trimmed) else {
        return Err(WalletError::InvalidAmount(format!(
            "'{amount}' is not a decimal number"
        )));
    };

    // Counted on the text: the decimal parser rounds past 28 significant digits.
    if significant_fraction_digits(fraction) > MAX_FRACTION_DIGITS as usize {
        return Err(WalletError::InvalidAmount(format!(
            "'{amount}' has more than {MAX_FRACTION_DIGITS} decimal places"
        )));
    }

    let value: Decimal = trimmed
        .parse()
        .map_err(|_| WalletError::InvalidAmount(format!("'{amount}' is out of range")))?;

    if value <= Decimal::ZERO {
        return Err(WalletError::InvalidAmount(format!(
            "'{amount}' must be greater than zero"
        )));
    }

    value
        .checked_mul(Decimal::from(STROOPS_PER_UNIT))
        .and_then(|stroops| stroops.to_i64())
        .ok_or_else(|| WalletError::InvalidAmount(format!("'{amount}' is too large")))
}

/// Render stroops as a 7-digit decimal string
pub fn format_stroops(stroops: i64) -> String {
    Decimal::new(stroops, MAX_FRACTION_DIGITS).to_string()
}

// Optional minus, digits, optional '.' followed by digits. Rejects exponents,
// separators and signs other than '-' that the decimal parser would accept.
// Returns the fraction digits ("" when there are none).
fn plain_decimal_fraction(s: &str) -> Option<&str> {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if digits(whole) && fraction.is_none_or(digits) {
        Some(fraction.unwrap_or(""))
    } else {
        None
    }
}

// Trailing zeros do not change the amount.
fn significant_fraction_digits(fraction: &str) -> usize {
    fraction.trim_end_matches('0').len()
}
