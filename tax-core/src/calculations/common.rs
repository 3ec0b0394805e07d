//! Rounding and comparison helpers shared by the calculators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents, half away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to the nearest whole dollar, half away from zero.
///
/// Tax before credits is reported in whole dollars; no fractional cents
/// survive past the bracket computation.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_whole_dollars;
///
/// assert_eq!(round_whole_dollars(dec!(2341.40)), dec!(2341));
/// assert_eq!(round_whole_dollars(dec!(2341.50)), dec!(2342));
/// ```
pub fn round_whole_dollars(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Clamps negative amounts to zero.
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}
