//! Common utility functions for ledger calculations.
//!
//! This module provides shared functionality used by the ledger engine and
//! the assessment derivations, such as the zero floor and the reporting
//! tolerance.
//!
//! Amounts come straight from pasted text, so a format-valid cell can sit at
//! the edge of the `Decimal` range. The `clamped_*` helpers saturate at
//! [`Decimal::MAX`]/[`Decimal::MIN`] and log a warning instead of panicking.

use rust_decimal::Decimal;
use tracing::warn;

/// Differences at or below this amount are treated as rounding noise.
pub const AMOUNT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use vat_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(0)), dec!(0));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Clamps a value to be non-negative.
pub fn floor_at_zero(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// True when `delta` is a real positive difference rather than noise, i.e.
/// strictly greater than [`AMOUNT_TOLERANCE`].
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use vat_core::calculations::common::exceeds_tolerance;
///
/// assert!(exceeds_tolerance(dec!(0.02)));
/// assert!(!exceeds_tolerance(dec!(0.01)));
/// assert!(!exceeds_tolerance(dec!(-500)));
/// ```
pub fn exceeds_tolerance(delta: Decimal) -> bool {
    delta > AMOUNT_TOLERANCE
}

/// `a + b`, saturating on overflow.
pub fn clamped_add(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    a.checked_add(b).unwrap_or_else(|| {
        warn!(%a, %b, "amount overflow in addition, clamping");
        a.saturating_add(b)
    })
}

/// `a - b`, saturating on overflow.
pub fn clamped_sub(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    a.checked_sub(b).unwrap_or_else(|| {
        warn!(%a, %b, "amount overflow in subtraction, clamping");
        a.saturating_sub(b)
    })
}

/// `a * b`, saturating on overflow.
pub fn clamped_mul(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    a.checked_mul(b).unwrap_or_else(|| {
        warn!(%a, %b, "amount overflow in multiplication, clamping");
        a.saturating_mul(b)
    })
}

/// Sum of `values`, saturating on overflow.
pub fn clamped_sum<'a>(values: impl IntoIterator<Item = &'a Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, value| clamped_add(acc, *value))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // max tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        let result = max(dec!(100.00), dec!(200.00));

        assert_eq!(result, dec!(200.00));
    }

    #[test]
    fn max_returns_first_when_larger() {
        let result = max(dec!(200.00), dec!(100.00));

        assert_eq!(result, dec!(200.00));
    }

    #[test]
    fn max_handles_negative_values() {
        let result = max(dec!(-100.00), dec!(-200.00));

        assert_eq!(result, dec!(-100.00));
    }

    // =========================================================================
    // floor_at_zero tests
    // =========================================================================

    #[test]
    fn floor_at_zero_clamps_negative_values() {
        assert_eq!(floor_at_zero(dec!(-0.01)), Decimal::ZERO);
        assert_eq!(floor_at_zero(dec!(-1500)), Decimal::ZERO);
    }

    #[test]
    fn floor_at_zero_keeps_positive_values() {
        assert_eq!(floor_at_zero(dec!(200.50)), dec!(200.50));
        assert_eq!(floor_at_zero(Decimal::ZERO), Decimal::ZERO);
    }

    // =========================================================================
    // exceeds_tolerance tests
    // =========================================================================

    #[test]
    fn tolerance_is_one_cent() {
        assert_eq!(AMOUNT_TOLERANCE, dec!(0.01));
    }

    #[test]
    fn exceeds_tolerance_is_strict() {
        assert!(!exceeds_tolerance(dec!(0.01)));
        assert!(exceeds_tolerance(dec!(0.011)));
    }

    #[test]
    fn exceeds_tolerance_rejects_negative_deltas() {
        assert!(!exceeds_tolerance(dec!(-0.02)));
        assert!(!exceeds_tolerance(Decimal::ZERO));
    }

    // =========================================================================
    // clamped arithmetic tests
    // =========================================================================

    #[test]
    fn clamped_ops_match_plain_ops_in_range() {
        assert_eq!(clamped_add(dec!(1800), dec!(0.50)), dec!(1800.50));
        assert_eq!(clamped_sub(dec!(1500), dec!(2300)), dec!(-800));
        assert_eq!(clamped_mul(dec!(10000), dec!(20)), dec!(200000));
        assert_eq!(clamped_sum(&[dec!(1), dec!(2.5), dec!(-0.5)]), dec!(3));
    }

    #[test]
    fn clamped_add_saturates_at_max() {
        assert_eq!(clamped_add(Decimal::MAX, dec!(1)), Decimal::MAX);
        assert_eq!(clamped_sub(Decimal::MIN, dec!(1)), Decimal::MIN);
    }

    #[test]
    fn clamped_mul_saturates_by_sign() {
        assert_eq!(clamped_mul(Decimal::MAX, dec!(3)), Decimal::MAX);
        assert_eq!(clamped_mul(Decimal::MAX, dec!(-3)), Decimal::MIN);
    }

    #[test]
    fn clamped_sum_saturates() {
        assert_eq!(clamped_sum(&[Decimal::MAX, Decimal::MAX]), Decimal::MAX);
        assert_eq!(clamped_sum(&[]), Decimal::ZERO);
    }
}
