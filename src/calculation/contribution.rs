//! Capped employee contributions (QPP, QPIP and EI).
//!
//! One engine serves all three plans: a rate applied to the period's
//! insurable earnings net of the per-period share of any annual exemption,
//! capped at what remains under the annual maximum.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ContributionPlanConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, ContributionCeiling};

use super::rounding::round_to_cents;

/// The contribution plans withheld at source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionPlan {
    /// Québec Pension Plan.
    Pension,
    /// Québec Parental Insurance Plan.
    ParentalInsurance,
    /// Employment Insurance.
    EmploymentInsurance,
}

impl ContributionPlan {
    fn rule_id(self) -> &'static str {
        match self {
            ContributionPlan::Pension => "pension_contribution",
            ContributionPlan::ParentalInsurance => "parental_insurance_premium",
            ContributionPlan::EmploymentInsurance => "employment_insurance_premium",
        }
    }

    fn rule_name(self) -> &'static str {
        match self {
            ContributionPlan::Pension => "QPP Contribution",
            ContributionPlan::ParentalInsurance => "QPIP Premium",
            ContributionPlan::EmploymentInsurance => "EI Premium",
        }
    }

    fn formula_ref(self) -> &'static str {
        match self {
            ContributionPlan::Pension => "C",
            ContributionPlan::ParentalInsurance => "PPIP",
            ContributionPlan::EmploymentInsurance => "EI",
        }
    }
}

/// The result of a contribution calculation.
#[derive(Debug, Clone)]
pub struct ContributionResult {
    /// The plan this contribution is for.
    pub plan: ContributionPlan,
    /// The uncapped contribution, floored at zero and rounded to cents.
    pub raw_amount: Decimal,
    /// The contribution to withhold this period.
    pub contribution: Decimal,
    /// Whether the annual ceiling limited this contribution.
    pub ceiling_applied: bool,
    /// Whether nothing more may be withheld this year after this period.
    pub ceiling_reached: bool,
    /// Total remitted this year including this period.
    pub remitted_to_date: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates `min(rate × (earnings − exemption / P), maximum − remitted)`.
///
/// The contribution is never negative: earnings below the per-period
/// exemption give zero. Once the ceiling has been reached the contribution is
/// zero; that is a normal outcome, not an error.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if `earnings` is negative or
/// `pay_periods` is zero.
///
/// # Examples
///
/// ```
/// use withholding_engine::calculation::{ContributionPlan, calculate_contribution};
/// use withholding_engine::config::ContributionPlanConfig;
/// use withholding_engine::models::ContributionCeiling;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let config = ContributionPlanConfig {
///     rate: dec("0.0570"),
///     exemption: dec("3500"),
///     annual_maximum: dec("3146.40"),
/// };
///
/// let result = calculate_contribution(
///     ContributionPlan::Pension,
///     dec("1174.65"),
///     52,
///     &config,
///     ContributionCeiling::new(config.annual_maximum, Decimal::ZERO),
///     1,
/// ).unwrap();
/// assert_eq!(result.contribution, dec("63.12"));
/// ```
pub fn calculate_contribution(
    plan: ContributionPlan,
    earnings: Decimal,
    pay_periods: u32,
    config: &ContributionPlanConfig,
    ceiling: ContributionCeiling,
    step_number: u32,
) -> EngineResult<ContributionResult> {
    if earnings.is_sign_negative() && !earnings.is_zero() {
        return Err(EngineError::invalid_input(
            plan.rule_id(),
            format!("insurable earnings must not be negative (got {})", earnings),
        ));
    }
    if pay_periods == 0 {
        return Err(EngineError::invalid_input(
            "pay_periods_per_year",
            "must be positive",
        ));
    }

    let period_exemption = config.exemption / Decimal::from(pay_periods);
    let contributory_earnings = (earnings - period_exemption).max(Decimal::ZERO);
    let raw_amount = round_to_cents(config.rate * contributory_earnings);

    let remaining = ceiling.remaining();
    let (contribution, ceiling_applied) = if raw_amount > remaining {
        (remaining, true)
    } else {
        (raw_amount, false)
    };
    let remitted_to_date = ceiling.already_remitted() + contribution;
    let ceiling_reached = remitted_to_date >= ceiling.annual_maximum();

    let reasoning = if ceiling.is_reached() {
        format!(
            "Annual maximum ${} already remitted; no contribution this period",
            ceiling.annual_maximum().normalize()
        )
    } else if ceiling_applied {
        format!(
            "{} x (${} - ${} / {}) = ${}; capped at remaining ${}",
            config.rate.normalize(),
            earnings.normalize(),
            config.exemption.normalize(),
            pay_periods,
            raw_amount,
            contribution
        )
    } else {
        format!(
            "{} x (${} - ${} / {}) = ${}",
            config.rate.normalize(),
            earnings.normalize(),
            config.exemption.normalize(),
            pay_periods,
            contribution
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: plan.rule_id().to_string(),
        rule_name: plan.rule_name().to_string(),
        formula_ref: plan.formula_ref().to_string(),
        input: serde_json::json!({
            "earnings": earnings.round_dp(4).normalize().to_string(),
            "pay_periods": pay_periods,
            "rate": config.rate.normalize().to_string(),
            "exemption": config.exemption.normalize().to_string(),
            "annual_maximum": ceiling.annual_maximum().normalize().to_string(),
            "already_remitted": ceiling.already_remitted().normalize().to_string()
        }),
        output: serde_json::json!({
            "raw_amount": raw_amount.to_string(),
            "contribution": contribution.to_string(),
            "ceiling_applied": ceiling_applied,
            "ceiling_reached": ceiling_reached,
            "remitted_to_date": remitted_to_date.to_string()
        }),
        reasoning,
    };

    Ok(ContributionResult {
        plan,
        raw_amount,
        contribution,
        ceiling_applied,
        ceiling_reached,
        remitted_to_date,
        audit_step,
    })
}
