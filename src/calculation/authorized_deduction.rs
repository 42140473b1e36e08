//! Distribution of deductions authorized after the first pay period (J, J1).
//!
//! When an annual deduction is granted mid-year, it is spread over the pay
//! periods that remain so the full amount is still taken into account by
//! year end.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// The kind of authorized deduction being distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizedDeduction {
    /// Deductions from line 19 of form TP-1015.3-V (J).
    SourceDeductionReturn,
    /// Deductions authorized on form TP-1016-V (J1).
    ReductionOfSourceDeductions,
}

impl AuthorizedDeduction {
    fn rule_id(self) -> &'static str {
        match self {
            AuthorizedDeduction::SourceDeductionReturn => "source_deduction_return",
            AuthorizedDeduction::ReductionOfSourceDeductions => "reduction_of_source_deductions",
        }
    }

    fn rule_name(self) -> &'static str {
        match self {
            AuthorizedDeduction::SourceDeductionReturn => "Source Deduction Return Deductions",
            AuthorizedDeduction::ReductionOfSourceDeductions => {
                "Authorized Reduction of Source Deductions"
            }
        }
    }

    fn formula_ref(self) -> &'static str {
        match self {
            AuthorizedDeduction::SourceDeductionReturn => "J",
            AuthorizedDeduction::ReductionOfSourceDeductions => "J1",
        }
    }
}

/// The result of distributing an authorized deduction.
#[derive(Debug, Clone)]
pub struct DistributedDeductionResult {
    /// The annualized amount to subtract from annual income.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates `pay_periods × authorized_amount / remaining_periods`.
///
/// When `remaining_periods` is zero there is nothing left to distribute over
/// and the result is zero.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if `pay_periods` is zero,
/// `remaining_periods` exceeds it, or the amount is negative.
///
/// # Examples
///
/// ```
/// use withholding_engine::calculation::{AuthorizedDeduction, distribute_authorized_deduction};
/// use rust_decimal::Decimal;
///
/// let result = distribute_authorized_deduction(
///     AuthorizedDeduction::SourceDeductionReturn,
///     52,
///     Decimal::from(100),
///     4,
///     1,
/// ).unwrap();
/// assert_eq!(result.amount, Decimal::from(1300));
/// ```
pub fn distribute_authorized_deduction(
    kind: AuthorizedDeduction,
    pay_periods: u32,
    authorized_amount: Decimal,
    remaining_periods: u32,
    step_number: u32,
) -> EngineResult<DistributedDeductionResult> {
    if pay_periods == 0 {
        return Err(EngineError::invalid_input(
            "pay_periods_per_year",
            "must be positive",
        ));
    }
    if remaining_periods > pay_periods {
        return Err(EngineError::invalid_input(
            "remaining_periods",
            format!(
                "{} exceeds pay_periods_per_year {}",
                remaining_periods, pay_periods
            ),
        ));
    }
    if authorized_amount.is_sign_negative() && !authorized_amount.is_zero() {
        return Err(EngineError::invalid_input(
            kind.rule_id(),
            format!("must not be negative (got {})", authorized_amount),
        ));
    }

    let (amount, reasoning) = if remaining_periods == 0 {
        (
            Decimal::ZERO,
            "No pay periods remain in the year; nothing to distribute".to_string(),
        )
    } else {
        let amount = Decimal::from(pay_periods) * authorized_amount / Decimal::from(remaining_periods);
        let reasoning = format!(
            "{} periods x ${} / {} remaining periods = ${}",
            pay_periods,
            authorized_amount.normalize(),
            remaining_periods,
            amount.normalize()
        );
        (amount, reasoning)
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: kind.rule_id().to_string(),
        rule_name: kind.rule_name().to_string(),
        formula_ref: kind.formula_ref().to_string(),
        input: serde_json::json!({
            "pay_periods": pay_periods,
            "authorized_amount": authorized_amount.normalize().to_string(),
            "remaining_periods": remaining_periods
        }),
        output: serde_json::json!({
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    Ok(DistributedDeductionResult { amount, audit_step })
}
