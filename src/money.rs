//! Money Codec
//!
//! Lossless conversion between user-facing decimal text and minor-unit
//! integers. All conversions MUST go through this module.
//!
//! ## Design Principles
//! 1. Single Source of Truth: AssetRegistry provides all decimal configurations
//! 2. Explicit Error Handling: No silent truncation
//! 3. Integer Only: no float ever touches a balance, fee, or goal comparison
//!
//! ## Internal Representation
//! - All amounts are stored as `u128` minor units
//! - The scale factor is `10^decimals` (e.g., 10^6 for USDT)
//! - The authoritative source for decimals is `AssetRegistry`
//!
//! ## Input normalization
//! Human-entered text may carry whitespace thousands separators and a comma
//! decimal separator ("1 234,50"). Both are normalized before parsing; any
//! remaining ambiguity (multiple separators, stray characters) is rejected.

use thiserror::Error;

use crate::core_types::Amount;

/// Money conversion errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must not be negative")]
    NegativeAmount,

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Parse: Client -> Internal (String -> u128)
// ============================================================================

/// Convert human-entered decimal text to minor units.
///
/// Normalization: whitespace thousands separators are stripped and a single
/// comma decimal separator becomes a dot. After that the input must be plain
/// digits with at most one decimal point.
///
/// # Errors
/// * `PrecisionOverflow` - more fractional digits than the asset allows
/// * `InvalidFormat` - empty input, bare ".", signs, stray characters,
///   multiple separators
/// * `Overflow` - result would not fit in u128
///
/// # Example
/// ```
/// use fincore::money::to_minor_units;
///
/// assert_eq!(to_minor_units("1 234,50", 2).unwrap(), 123_450);
/// assert_eq!(to_minor_units("1.5", 6).unwrap(), 1_500_000);
/// assert!(to_minor_units("1.2.3", 2).is_err());
/// ```
pub fn to_minor_units(text: &str, decimals: u32) -> Result<Amount, MoneyError> {
    // Strip whitespace thousands separators (ASCII space, NBSP, thin space)
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if compact.starts_with('-') {
        return Err(MoneyError::NegativeAmount);
    }
    if compact.starts_with('+') {
        return Err(MoneyError::InvalidFormat("explicit sign not allowed".into()));
    }

    // A comma acts as the decimal separator; more than one is ambiguous.
    let comma_count = compact.matches(',').count();
    if comma_count > 1 {
        return Err(MoneyError::InvalidFormat("multiple commas".into()));
    }
    let normalized = if comma_count == 1 {
        if compact.contains('.') {
            return Err(MoneyError::InvalidFormat(
                "mixed comma and dot separators".into(),
            ));
        }
        compact.replace(',', ".")
    } else {
        compact
    };

    let parts: Vec<&str> = normalized.split('.').collect();
    let (whole, frac) = match parts.len() {
        1 => (parts[0], ""),
        2 => {
            // A bare "." (both sides empty) is invalid, not zero.
            if parts[0].is_empty() && parts[1].is_empty() {
                return Err(MoneyError::InvalidFormat("bare decimal point".into()));
            }
            if decimals == 0 && !parts[1].is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "decimals is 0, but fraction provided".into(),
                ));
            }
            (parts[0], parts[1])
        }
        _ => return Err(MoneyError::InvalidFormat("multiple decimal points".into())),
    };

    if !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(MoneyError::InvalidFormat(format!(
            "invalid character in whole part: {}",
            whole
        )));
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(MoneyError::InvalidFormat(format!(
            "invalid character in fractional part: {}",
            frac
        )));
    }

    // Precision validation: REJECT if too many decimals (no silent truncation!)
    if frac.len() > decimals as usize {
        return Err(MoneyError::PrecisionOverflow {
            provided: frac.len() as u32,
            max: decimals,
        });
    }

    // Leading zeros are stripped by numeric parsing itself.
    let whole_num: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| MoneyError::Overflow)?
    };

    // Pad fractional part to exactly `decimals` digits
    let frac_num: u128 = if frac.is_empty() {
        0
    } else {
        let frac_padded = format!("{:0<width$}", frac, width = decimals as usize);
        frac_padded.parse::<u128>().map_err(|_| MoneyError::Overflow)?
    };

    let multiplier = 10u128
        .checked_pow(decimals)
        .ok_or(MoneyError::Overflow)?;
    whole_num
        .checked_mul(multiplier)
        .and_then(|v| v.checked_add(frac_num))
        .ok_or(MoneyError::Overflow)
}

/// Parse the wire form of an amount: minor units as a plain digit string.
///
/// The HTTP interface carries amounts this way; no separators, no fraction.
pub fn parse_minor_string(text: &str) -> Result<Amount, MoneyError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }
    if text.starts_with('-') {
        return Err(MoneyError::NegativeAmount);
    }
    if !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(MoneyError::InvalidFormat(format!(
            "minor-unit amount must be digits only: {}",
            text
        )));
    }
    text.parse::<u128>().map_err(|_| MoneyError::Overflow)
}

// ============================================================================
// Format: Internal -> Client (u128 -> String)
// ============================================================================

/// Convert minor units to a decimal string with `display_decimals` places.
///
/// Pure integer div/rem; truncates (never rounds up) when displaying fewer
/// places than the asset carries.
///
/// # Example
/// ```
/// use fincore::money::format_amount;
///
/// assert_eq!(format_amount(1_500_000, 6, 2), "1.50");
/// assert_eq!(format_amount(1_999_999, 6, 2), "1.99");
/// ```
pub fn format_amount(value: Amount, decimals: u32, display_decimals: u32) -> String {
    let scale = 10u128.pow(decimals);
    let whole = value / scale;
    let frac = value % scale;

    if display_decimals == 0 {
        return whole.to_string();
    }

    let frac_str = format!("{:0>width$}", frac, width = decimals as usize);
    let shown: String = if display_decimals as usize <= decimals as usize {
        frac_str[..display_decimals as usize].to_string()
    } else {
        format!("{:0<width$}", frac_str, width = display_decimals as usize)
    };
    format!("{}.{}", whole, shown)
}

/// Convert minor units to a full-precision string (inverse of `to_minor_units`).
pub fn from_minor_units(value: Amount, decimals: u32) -> String {
    format_amount(value, decimals, decimals)
}

/// Fixed two-decimal human display, regardless of the asset's precision.
pub fn format_display(value: Amount, decimals: u32) -> String {
    format_amount(value, decimals, 2)
}

// ============================================================================
// Net-receive math
// ============================================================================

/// Net amount the destination receives after the fee, signed.
///
/// Authorization decisions MUST use this value: a non-positive result means
/// the fee swallows the amount and the request is invalid.
pub fn net_receive(amount: Amount, fee: Amount) -> i128 {
    amount as i128 - fee as i128
}

/// Presentation-only net receive, clamped at zero.
///
/// Never use this to authorize a debit.
pub fn net_receive_display(amount: Amount, fee: Amount) -> Amount {
    amount.saturating_sub(fee)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qa_to_minor_units_variations() {
        assert_eq!(to_minor_units("1.23", 2).unwrap(), 123);
        assert_eq!(to_minor_units("1.23", 8).unwrap(), 123_000_000);

        // Leading zeros stripped, short fractions padded
        assert_eq!(to_minor_units("001.23", 2).unwrap(), 123);
        assert_eq!(to_minor_units("1.2", 6).unwrap(), 1_200_000);
        assert_eq!(to_minor_units("0.0001", 4).unwrap(), 1);

        // Zero is a valid quantity at codec level
        assert_eq!(to_minor_units("0", 2).unwrap(), 0);
        assert_eq!(to_minor_units("0.00", 2).unwrap(), 0);
    }

    #[test]
    fn qa_separator_normalization() {
        // "1 234,50" at 2 decimals -> 123450
        assert_eq!(to_minor_units("1 234,50", 2).unwrap(), 123_450);
        assert_eq!(to_minor_units("1 000 000", 6).unwrap(), 1_000_000_000_000);
        assert_eq!(to_minor_units("2,5", 1).unwrap(), 25);
    }

    #[test]
    fn qa_to_minor_units_invalid_formats() {
        let cases = [
            "1.2.3",   // multiple dots
            "1,2,3",   // multiple commas
            "1,23.45", // mixed separators
            "+1.23",   // explicit plus
            "1e2",     // scientific notation
            "0x12",    // hex
            ".",       // bare dot
            "",        // empty
            "   ",     // whitespace only
            "abc",     // not a number
        ];
        for case in cases {
            assert!(
                to_minor_units(case, 8).is_err(),
                "should reject invalid format: {:?}",
                case
            );
        }
        assert_eq!(to_minor_units("-1", 2), Err(MoneyError::NegativeAmount));
    }

    #[test]
    fn qa_precision_limits() {
        assert!(to_minor_units("1.234", 3).is_ok());

        let res = to_minor_units("1.2345", 3);
        assert_eq!(
            res,
            Err(MoneyError::PrecisionOverflow {
                provided: 4,
                max: 3
            })
        );

        // Scale 0 assets take whole numbers only
        assert_eq!(to_minor_units("100", 0).unwrap(), 100);
        assert!(to_minor_units("100.5", 0).is_err());
    }

    #[test]
    fn qa_parse_minor_string() {
        assert_eq!(parse_minor_string("1000000").unwrap(), 1_000_000);
        assert_eq!(parse_minor_string("  42 ").unwrap(), 42);
        assert_eq!(parse_minor_string("0").unwrap(), 0);
        assert!(parse_minor_string("1.5").is_err());
        assert!(parse_minor_string("").is_err());
        assert_eq!(parse_minor_string("-5"), Err(MoneyError::NegativeAmount));
    }

    #[test]
    fn qa_format_amount_truncation() {
        let val = 1_999_000;
        assert_eq!(format_amount(val, 6, 2), "1.99");
        assert_eq!(format_amount(val, 6, 1), "1.9");
        assert_eq!(format_amount(val, 6, 0), "1");
        assert_eq!(format_amount(val, 6, 6), "1.999000");
        // Display wider than stored precision pads with zeros
        assert_eq!(format_amount(150, 2, 4), "1.5000");
    }

    #[test]
    fn qa_format_display_is_two_decimals() {
        assert_eq!(format_display(1_000_000, 6), "1.00");
        assert_eq!(format_display(123_450, 2), "1234.50");
        assert_eq!(format_display(0, 6), "0.00");
    }

    #[test]
    fn qa_roundtrip_consistency() {
        let scales = [0u32, 2, 6, 8, 18];
        let values = ["1", "1.5", "0.00000001", "1234.5678", "999999.999999"];

        for scale in scales {
            for val_str in &values {
                if let Some(dot_pos) = val_str.find('.') {
                    if val_str.len() - dot_pos - 1 > scale as usize {
                        continue;
                    }
                }

                if let Ok(internal) = to_minor_units(val_str, scale) {
                    let formatted = from_minor_units(internal, scale);
                    let internal_back = to_minor_units(&formatted, scale).unwrap();
                    assert_eq!(
                        internal, internal_back,
                        "roundtrip failed for {} at scale {}",
                        val_str, scale
                    );
                }
            }
        }
    }

    #[test]
    fn qa_net_receive() {
        assert_eq!(net_receive(1_000_000, 100_000), 900_000);
        assert_eq!(net_receive(100, 100), 0);
        assert_eq!(net_receive(100, 150), -50);

        // Display clamps, authorization must not
        assert_eq!(net_receive_display(100, 150), 0);
        assert_eq!(net_receive_display(1_000_000, 100_000), 900_000);
    }

    #[test]
    fn qa_u128_boundary() {
        let max = u128::MAX.to_string();
        assert_eq!(to_minor_units(&max, 0).unwrap(), u128::MAX);
        // One digit more overflows
        let too_big = format!("{}0", max);
        assert_eq!(to_minor_units(&too_big, 0), Err(MoneyError::Overflow));
    }
}
