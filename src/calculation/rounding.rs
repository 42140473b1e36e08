//! Monetary rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a value to cents using half-up rounding (midpoint away from zero).
///
/// Applied to every per-period amount before it is withheld.
///
/// # Examples
///
/// ```
/// use withholding_engine::calculation::round_to_cents;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_to_cents(Decimal::from_str("63.1185").unwrap()), Decimal::from_str("63.12").unwrap());
/// assert_eq!(round_to_cents(Decimal::from_str("0.005").unwrap()), Decimal::from_str("0.01").unwrap());
/// ```
pub fn round_to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
