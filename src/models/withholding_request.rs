//! The request bundle for a single pay period calculation.

use serde::{Deserialize, Serialize};

use super::{CreditInputs, FederalDeductionInputs, PayPeriodContext, ProvincialCreditInputs, YearToDate};
use crate::error::EngineResult;

/// Which per-period figure contributions are computed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionBasis {
    /// The gross remuneration for the period.
    #[default]
    Gross,
    /// Annual taxable income divided by the number of pay periods.
    Adjusted,
}

/// Everything needed to compute one period's withholding.
///
/// # Example
///
/// ```
/// use withholding_engine::models::{PayPeriodContext, WithholdingRequest};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let request = WithholdingRequest::new(PayPeriodContext {
///     pay_periods_per_year: 26,
///     gross_remuneration: Decimal::from_str("2000.00").unwrap(),
///     remaining_periods: 26,
///     carry_forward_authorized_annual_deduction: Decimal::ZERO,
///     authorized_reduction_after_first_period: Decimal::ZERO,
///     retirement_plan_contributions: Decimal::ZERO,
/// });
///
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingRequest {
    /// Tax year the caller expects the dataset to be for.
    #[serde(default)]
    pub tax_year: Option<i32>,
    /// Per-period facts.
    pub period: PayPeriodContext,
    /// Provincial credit inputs.
    #[serde(default)]
    pub provincial: ProvincialCreditInputs,
    /// Federal credit inputs.
    #[serde(default)]
    pub federal_credits: CreditInputs,
    /// Federal deductions and adjustments.
    #[serde(default)]
    pub federal_deductions: FederalDeductionInputs,
    /// Contributions already remitted this year.
    #[serde(default)]
    pub year_to_date: YearToDate,
    /// Earnings figure contributions are based on.
    #[serde(default)]
    pub contribution_basis: ContributionBasis,
}

impl WithholdingRequest {
    /// Creates a request with default credits and no prior remittances.
    pub fn new(period: PayPeriodContext) -> Self {
        Self {
            tax_year: None,
            period,
            provincial: ProvincialCreditInputs::default(),
            federal_credits: CreditInputs::default(),
            federal_deductions: FederalDeductionInputs::default(),
            year_to_date: YearToDate::default(),
            contribution_basis: ContributionBasis::default(),
        }
    }

    /// Validates every input group.
    pub fn validate(&self) -> EngineResult<()> {
        self.period.validate()?;
        self.provincial.validate()?;
        self.federal_credits.validate()?;
        self.federal_deductions.validate()
    }
}
