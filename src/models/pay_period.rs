//! Pay period context and contribution ceiling models.
//!
//! This module contains the per-period facts supplied by the caller and the
//! year-to-date state the caller carries between successive periods.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Most pay periods a year can be divided into (daily pay in a leap year).
pub const MAX_PAY_PERIODS_PER_YEAR: u32 = 366;

/// Largest amount accepted for any monetary input.
///
/// Annualizing an amount this size over [`MAX_PAY_PERIODS_PER_YEAR`] periods
/// and multiplying it through the tax formulas stays well inside `Decimal`'s
/// range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// The per-period facts a withholding calculation is based on.
///
/// # Example
///
/// ```
/// use withholding_engine::models::PayPeriodContext;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let context = PayPeriodContext {
///     pay_periods_per_year: 52,
///     gross_remuneration: Decimal::from_str("1174.65").unwrap(),
///     remaining_periods: 4,
///     carry_forward_authorized_annual_deduction: Decimal::ZERO,
///     authorized_reduction_after_first_period: Decimal::ZERO,
///     retirement_plan_contributions: Decimal::ZERO,
/// };
///
/// assert!(context.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriodContext {
    /// Number of pay periods in the year (P).
    pub pay_periods_per_year: u32,
    /// Gross remuneration subject to source deductions for this period.
    pub gross_remuneration: Decimal,
    /// Pay periods remaining in the year, including this one.
    pub remaining_periods: u32,
    /// Annual deduction from line 19 of TP-1015.3-V granted after the first
    /// pay period (input to J).
    #[serde(default)]
    pub carry_forward_authorized_annual_deduction: Decimal,
    /// Annual deduction authorized on TP-1016-V after the first pay period
    /// (input to J1).
    #[serde(default)]
    pub authorized_reduction_after_first_period: Decimal,
    /// RPP/RRSP/PRPP contributions withheld this period (F).
    #[serde(default)]
    pub retirement_plan_contributions: Decimal,
}

impl PayPeriodContext {
    /// Checks the caller contract for a period.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if the pay period count is zero
    /// or above [`MAX_PAY_PERIODS_PER_YEAR`], if the remaining period count
    /// exceeds it, or if any amount is negative or above [`MAX_AMOUNT`].
    pub fn validate(&self) -> EngineResult<()> {
        if self.pay_periods_per_year == 0 {
            return Err(EngineError::invalid_input(
                "pay_periods_per_year",
                "must be positive",
            ));
        }
        if self.pay_periods_per_year > MAX_PAY_PERIODS_PER_YEAR {
            return Err(EngineError::invalid_input(
                "pay_periods_per_year",
                format!(
                    "{} exceeds the maximum of {}",
                    self.pay_periods_per_year, MAX_PAY_PERIODS_PER_YEAR
                ),
            ));
        }
        if self.remaining_periods > self.pay_periods_per_year {
            return Err(EngineError::invalid_input(
                "remaining_periods",
                format!(
                    "{} exceeds pay_periods_per_year {}",
                    self.remaining_periods, self.pay_periods_per_year
                ),
            ));
        }
        ensure_amount("gross_remuneration", self.gross_remuneration)?;
        ensure_amount(
            "carry_forward_authorized_annual_deduction",
            self.carry_forward_authorized_annual_deduction,
        )?;
        ensure_amount(
            "authorized_reduction_after_first_period",
            self.authorized_reduction_after_first_period,
        )?;
        ensure_amount(
            "retirement_plan_contributions",
            self.retirement_plan_contributions,
        )
    }
}

/// Returns `InvalidInput` for `field` if `value` is negative or above
/// [`MAX_AMOUNT`].
pub(crate) fn ensure_amount(field: &str, value: Decimal) -> EngineResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(EngineError::invalid_input(
            field,
            format!("must not be negative (got {})", value),
        ));
    }
    if value > MAX_AMOUNT {
        return Err(EngineError::invalid_input(
            field,
            format!("{} exceeds the maximum of {}", value, MAX_AMOUNT),
        ));
    }
    Ok(())
}

/// The annual ceiling for a contribution type and the amount already remitted
/// toward it this year.
///
/// `already_remitted` is clamped into `[0, annual_maximum]` on construction.
///
/// # Example
///
/// ```
/// use withholding_engine::models::ContributionCeiling;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let ceiling = ContributionCeiling::new(
///     Decimal::from_str("387.79").unwrap(),
///     Decimal::from_str("400.00").unwrap(),
/// );
/// assert_eq!(ceiling.already_remitted(), Decimal::from_str("387.79").unwrap());
/// assert!(ceiling.remaining().is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContributionCeiling {
    annual_maximum: Decimal,
    already_remitted: Decimal,
}

impl ContributionCeiling {
    /// Creates a ceiling, clamping the remitted amount into range.
    pub fn new(annual_maximum: Decimal, already_remitted: Decimal) -> Self {
        let annual_maximum = annual_maximum.max(Decimal::ZERO);
        let already_remitted = already_remitted.max(Decimal::ZERO).min(annual_maximum);
        Self {
            annual_maximum,
            already_remitted,
        }
    }

    /// The maximum contribution for the year.
    pub fn annual_maximum(&self) -> Decimal {
        self.annual_maximum
    }

    /// The amount already remitted this year, after clamping.
    pub fn already_remitted(&self) -> Decimal {
        self.already_remitted
    }

    /// The amount that may still be withheld this year.
    pub fn remaining(&self) -> Decimal {
        self.annual_maximum - self.already_remitted
    }

    /// Returns `true` once nothing more may be withheld.
    pub fn is_reached(&self) -> bool {
        self.remaining().is_zero()
    }
}

/// Contributions already remitted this year, carried by the caller between
/// periods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearToDate {
    /// Pension plan (QPP) contributions already remitted.
    #[serde(default)]
    pub pension: Decimal,
    /// Parental insurance (QPIP) premiums already remitted.
    #[serde(default)]
    pub parental_insurance: Decimal,
    /// Employment insurance premiums already remitted.
    #[serde(default)]
    pub employment_insurance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_context() -> PayPeriodContext {
        PayPeriodContext {
            pay_periods_per_year: 52,
            gross_remuneration: dec("1174.65"),
            remaining_periods: 4,
            carry_forward_authorized_annual_deduction: Decimal::ZERO,
            authorized_reduction_after_first_period: Decimal::ZERO,
            retirement_plan_contributions: Decimal::ZERO,
        }
    }

    #[test]
    fn test_valid_context_passes() {
        assert!(create_context().validate().is_ok());
    }

    #[test]
    fn test_zero_pay_periods_is_invalid() {
        let mut context = create_context();
        context.pay_periods_per_year = 0;
        context.remaining_periods = 0;

        match context.validate() {
            Err(EngineError::InvalidInput { field, .. }) => {
                assert_eq!(field, "pay_periods_per_year")
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_remaining_periods_above_total_is_invalid() {
        let mut context = create_context();
        context.remaining_periods = 53;

        match context.validate() {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "remaining_periods"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_final_period_with_zero_remaining_is_valid() {
        let mut context = create_context();
        context.remaining_periods = 0;
        assert!(context.validate().is_ok());
    }

    #[test]
    fn test_negative_remuneration_is_invalid() {
        let mut context = create_context();
        context.gross_remuneration = dec("-0.01");

        match context.validate() {
            Err(EngineError::InvalidInput { field, message }) => {
                assert_eq!(field, "gross_remuneration");
                assert!(message.contains("-0.01"));
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_pay_periods_above_daily_is_invalid() {
        let mut context = create_context();
        context.pay_periods_per_year = MAX_PAY_PERIODS_PER_YEAR + 1;

        match context.validate() {
            Err(EngineError::InvalidInput { field, .. }) => {
                assert_eq!(field, "pay_periods_per_year")
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_daily_pay_periods_are_valid() {
        let mut context = create_context();
        context.pay_periods_per_year = MAX_PAY_PERIODS_PER_YEAR;
        assert!(context.validate().is_ok());
    }

    #[test]
    fn test_remuneration_above_maximum_is_invalid() {
        let mut context = create_context();
        context.gross_remuneration = dec("10000000000000000000000000000");

        match context.validate() {
            Err(EngineError::InvalidInput { field, message }) => {
                assert_eq!(field, "gross_remuneration");
                assert!(message.contains("exceeds"));
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_remuneration_at_maximum_is_valid() {
        let mut context = create_context();
        context.gross_remuneration = MAX_AMOUNT;
        assert!(context.validate().is_ok());
    }

    #[test]
    fn test_ceiling_clamps_overpayment() {
        let ceiling = ContributionCeiling::new(dec("3146.40"), dec("3200.00"));
        assert_eq!(ceiling.already_remitted(), dec("3146.40"));
        assert!(ceiling.is_reached());
    }

    #[test]
    fn test_ceiling_clamps_negative_remitted() {
        let ceiling = ContributionCeiling::new(dec("650.40"), dec("-5"));
        assert_eq!(ceiling.already_remitted(), Decimal::ZERO);
        assert_eq!(ceiling.remaining(), dec("650.40"));
    }

    #[test]
    fn test_ceiling_remaining() {
        let ceiling = ContributionCeiling::new(dec("387.79"), dec("100.00"));
        assert_eq!(ceiling.remaining(), dec("287.79"));
        assert!(!ceiling.is_reached());
    }

    #[test]
    fn test_year_to_date_defaults_to_zero() {
        let ytd: YearToDate = serde_json::from_str("{}").unwrap();
        assert_eq!(ytd, YearToDate::default());
    }
}
