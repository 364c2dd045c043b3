//! Fixed-point quantity utilities.
//!
//! ## Overview
//!
//! Every quantity flowing through the allocator (event quantities, running
//! totals, allocated splits) is a `u64` scaled by 10^8. Cumulative sums over
//! long histories stay exact, and the conservation checks in tests can
//! compare with `==`.
//!
//! Decimal strings coming from upstream rows are converted with
//! `rust_decimal`, never through `f64`.
//!
//! ## Examples
//!
//! ```
//! use fifo_allocator::types::quantity::{to_fixed, from_fixed};
//!
//! let qty = to_fixed("12.5").unwrap();
//! assert_eq!(qty, 1_250_000_000);
//! assert_eq!(from_fixed(qty), "12.50000000");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Scaling factor for fixed-point arithmetic: 10^8
pub const SCALE: u64 = 100_000_000;

/// Largest whole-unit quantity that can be represented
///
/// u64::MAX / SCALE ≈ 184,467,440,737
pub const MAX_UNITS: u64 = u64::MAX / SCALE;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to a fixed-point quantity
///
/// Returns `None` if the string is not a decimal, is negative, or does not
/// fit the fixed-point range. Digits beyond the 8th decimal place are rounded.
///
/// ```
/// use fifo_allocator::types::quantity::to_fixed;
///
/// assert_eq!(to_fixed("1"), Some(100_000_000));
/// assert_eq!(to_fixed("0.00000001"), Some(1));
/// assert_eq!(to_fixed("-3"), None);
/// ```
pub fn to_fixed(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s.trim()).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a Decimal to a fixed-point quantity
///
/// Returns `None` for negative or out-of-range values.
pub fn decimal_to_fixed(d: Decimal) -> Option<u64> {
    if d.is_sign_negative() && !d.is_zero() {
        return None;
    }

    let scaled = d.checked_mul(Decimal::from(SCALE))?;
    scaled.round_dp(0).to_u64()
}

/// Convert a whole number of units to fixed-point
///
/// ```
/// use fifo_allocator::types::quantity::from_units;
///
/// assert_eq!(from_units(10), Some(1_000_000_000));
/// assert_eq!(from_units(u64::MAX), None);
/// ```
pub fn from_units(units: u64) -> Option<u64> {
    units.checked_mul(SCALE)
}

/// Convert a fixed-point quantity to a Decimal
pub fn fixed_to_decimal(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

/// Render a fixed-point quantity with all 8 decimal places
pub fn from_fixed(value: u64) -> String {
    format!("{:.8}", fixed_to_decimal(value))
}

/// Render a fixed-point quantity without trailing zeros
///
/// ```
/// use fifo_allocator::types::quantity::from_fixed_trimmed;
///
/// assert_eq!(from_fixed_trimmed(500_000_000), "5");
/// assert_eq!(from_fixed_trimmed(150_000_000), "1.5");
/// ```
pub fn from_fixed_trimmed(value: u64) -> String {
    format!("{}", fixed_to_decimal(value).normalize())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_fixed_basic() {
        assert_eq!(to_fixed("1.0"), Some(100_000_000));
        assert_eq!(to_fixed("10"), Some(1_000_000_000));
        assert_eq!(to_fixed(" 0.5 "), Some(50_000_000));
        assert_eq!(to_fixed("0"), Some(0));
    }

    #[test]
    fn test_to_fixed_rejects_bad_input() {
        assert_eq!(to_fixed("-1.0"), None);
        assert_eq!(to_fixed("ten"), None);
        assert_eq!(to_fixed(""), None);
        assert_eq!(to_fixed("1e400"), None);
    }

    #[test]
    fn test_to_fixed_rounds_past_scale() {
        assert_eq!(to_fixed("0.000000014"), Some(1));
        assert_eq!(to_fixed("0.000000016"), Some(2));
    }

    #[test]
    fn test_from_units() {
        assert_eq!(from_units(0), Some(0));
        assert_eq!(from_units(45), Some(4_500_000_000));
        assert_eq!(from_units(MAX_UNITS + 1), None);
    }

    #[test]
    fn test_rendering() {
        assert_eq!(from_fixed(1), "0.00000001");
        assert_eq!(from_fixed(4_000_000_000), "40.00000000");
        assert_eq!(from_fixed_trimmed(4_000_000_000), "40");
        assert_eq!(from_fixed_trimmed(123_456_789), "1.23456789");
    }

    #[test]
    fn test_precision_preserved() {
        let value = "123456789.12345678";
        let fixed = to_fixed(value).unwrap();
        assert_eq!(from_fixed(fixed), value);
    }
}
