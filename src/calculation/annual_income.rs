//! Annual taxable income (I).

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// Inputs to the annual taxable income formula.
#[derive(Debug, Clone, Copy)]
pub struct AnnualIncomeInput {
    /// Number of pay periods in the year (P).
    pub pay_periods: u32,
    /// Gross remuneration for the period (G).
    pub remuneration: Decimal,
    /// Retirement plan contributions and similar per-period deductions (F).
    pub retirement_contributions: Decimal,
    /// Deduction for employment income (H).
    pub employment_deduction: Decimal,
    /// Source deduction return deductions (J).
    pub carry_forward_return: Decimal,
    /// Authorized reduction of source deductions (J1).
    pub authorized_reduction: Decimal,
}

/// The result of the annual taxable income calculation.
#[derive(Debug, Clone)]
pub struct AnnualIncomeResult {
    /// Annual taxable income (I). Not floored; may be negative.
    pub annual_income: Decimal,
    /// `I / P`, the remuneration smoothed by the deductions.
    pub adjusted_remuneration: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates `I = P × (G − F − H) − J − J1`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if `pay_periods` is zero.
///
/// # Examples
///
/// ```
/// use withholding_engine::calculation::{AnnualIncomeInput, calculate_annual_income};
/// use rust_decimal::Decimal;
///
/// let input = AnnualIncomeInput {
///     pay_periods: 26,
///     remuneration: Decimal::from(2000),
///     retirement_contributions: Decimal::from(100),
///     employment_deduction: Decimal::from(40),
///     carry_forward_return: Decimal::ZERO,
///     authorized_reduction: Decimal::from(1000),
/// };
///
/// let result = calculate_annual_income(&input, 1).unwrap();
/// assert_eq!(result.annual_income, Decimal::from(47360));
/// ```
pub fn calculate_annual_income(
    input: &AnnualIncomeInput,
    step_number: u32,
) -> EngineResult<AnnualIncomeResult> {
    if input.pay_periods == 0 {
        return Err(EngineError::invalid_input(
            "pay_periods_per_year",
            "must be positive",
        ));
    }

    let periods = Decimal::from(input.pay_periods);
    let annual_income = periods
        * (input.remuneration - input.retirement_contributions - input.employment_deduction)
        - input.carry_forward_return
        - input.authorized_reduction;
    let adjusted_remuneration = annual_income / periods;

    let audit_step = AuditStep {
        step_number,
        rule_id: "annual_taxable_income".to_string(),
        rule_name: "Annual Taxable Income".to_string(),
        formula_ref: "I".to_string(),
        input: serde_json::json!({
            "pay_periods": input.pay_periods,
            "remuneration": input.remuneration.normalize().to_string(),
            "retirement_contributions": input.retirement_contributions.normalize().to_string(),
            "employment_deduction": input.employment_deduction.normalize().to_string(),
            "carry_forward_return": input.carry_forward_return.normalize().to_string(),
            "authorized_reduction": input.authorized_reduction.normalize().to_string()
        }),
        output: serde_json::json!({
            "annual_income": annual_income.normalize().to_string(),
            "adjusted_remuneration": adjusted_remuneration.normalize().to_string()
        }),
        reasoning: format!(
            "{} x (${} - ${} - ${}) - ${} - ${} = ${}",
            input.pay_periods,
            input.remuneration.normalize(),
            input.retirement_contributions.normalize(),
            input.employment_deduction.round_dp(4).normalize(),
            input.carry_forward_return.normalize(),
            input.authorized_reduction.normalize(),
            annual_income.round_dp(2).normalize()
        ),
    };

    Ok(AnnualIncomeResult {
        annual_income,
        adjusted_remuneration,
        audit_step,
    })
}
