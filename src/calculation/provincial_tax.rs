//! Provincial income tax (Y and A).
//!
//! The annual tax is computed from the bracket containing the annual taxable
//! income, reduced by the personal and share-purchase credits, then spread
//! over the pay periods of the year.

use rust_decimal::Decimal;

use crate::config::{ProvincialConfig, ShareCreditGrouping};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, TaxBracket};

use super::bracket_lookup::lookup_bracket;
use super::rounding::round_to_cents;

/// Inputs to the provincial income tax formulas.
#[derive(Debug, Clone, Copy)]
pub struct ProvincialTaxInput {
    /// Annual taxable income (I).
    pub annual_income: Decimal,
    /// Number of pay periods in the year (P).
    pub pay_periods: u32,
    /// Value of personal tax credits (E).
    pub personal_credit_amount: Decimal,
    /// Authorized non-refundable credits (K1).
    pub authorized_credits: Decimal,
    /// Per-period class A share purchases (Q).
    pub share_class_a_withheld: Decimal,
    /// Per-period Fondaction share purchases (Q1).
    pub share_class_b_withheld: Decimal,
    /// Annual tax substituted when the computed tax is not positive.
    pub annual_tax_floor: Decimal,
    /// Additional per-period withholding requested (L).
    pub additional_withholding: Decimal,
}

/// The result of the provincial income tax calculation.
#[derive(Debug, Clone)]
pub struct ProvincialTaxResult {
    /// The bracket selected for the annual income.
    pub bracket: TaxBracket,
    /// Annual income tax (Y) after the floor.
    pub annual_tax: Decimal,
    /// Whether the computed tax was replaced by the floor.
    pub floor_applied: bool,
    /// Income tax to withhold for the period (A), rounded to cents.
    pub per_period_tax: Decimal,
    /// Audit steps for Y and A, in order.
    pub audit_steps: Vec<AuditStep>,
}

/// Calculates the Fondaction share credit term under the given grouping.
///
/// # Examples
///
/// ```
/// use withholding_engine::calculation::share_class_b_credit;
/// use withholding_engine::config::ShareCreditGrouping;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rate = Decimal::from_str("0.20").unwrap();
/// let credit = share_class_b_credit(
///     ShareCreditGrouping::PerPeriodShares,
///     rate,
///     52,
///     Decimal::from(10),
///     Decimal::from(50000),
/// );
/// assert_eq!(credit, Decimal::from(104));
/// ```
pub fn share_class_b_credit(
    grouping: ShareCreditGrouping,
    rate: Decimal,
    pay_periods: u32,
    share_class_b_withheld: Decimal,
    annual_income: Decimal,
) -> Decimal {
    let per_period_shares = rate * Decimal::from(pay_periods) * share_class_b_withheld;
    match grouping {
        ShareCreditGrouping::PerPeriodShares => per_period_shares,
        ShareCreditGrouping::ScaledByIncome => per_period_shares * annual_income,
    }
}

/// Calculates the provincial annual tax and the per-period withholding.
///
/// `Y = T×I − K − K1 − c_E×E − c_Q×P×Q − c_Q1×P×Q1`; if `Y ≤ 0` the caller's
/// floor replaces it. Then `A = Y / P + L`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if `pay_periods` is zero and
/// [`EngineError::BracketOutOfRange`] if no bracket contains the income.
pub fn calculate_provincial_tax(
    input: &ProvincialTaxInput,
    config: &ProvincialConfig,
    step_number: u32,
) -> EngineResult<ProvincialTaxResult> {
    if input.pay_periods == 0 {
        return Err(EngineError::invalid_input(
            "pay_periods_per_year",
            "must be positive",
        ));
    }

    let bracket = lookup_bracket(&config.brackets, input.annual_income)?.clone();
    let periods = Decimal::from(input.pay_periods);

    let gross_tax = bracket.rate * input.annual_income - bracket.constant;
    let personal_credit = config.personal_credit_rate * input.personal_credit_amount;
    let share_class_a_credit =
        config.share_class_a_credit_rate * periods * input.share_class_a_withheld;
    let share_class_b_credit = share_class_b_credit(
        config.share_credit_grouping,
        config.share_class_b_credit_rate,
        input.pay_periods,
        input.share_class_b_withheld,
        input.annual_income,
    );

    let computed_tax = gross_tax
        - input.authorized_credits
        - personal_credit
        - share_class_a_credit
        - share_class_b_credit;
    let floor_applied = computed_tax <= Decimal::ZERO;
    let annual_tax = if floor_applied {
        input.annual_tax_floor
    } else {
        computed_tax
    };

    let annual_step = AuditStep {
        step_number,
        rule_id: "provincial_annual_tax".to_string(),
        rule_name: "Provincial Income Tax for the Year".to_string(),
        formula_ref: "Y".to_string(),
        input: serde_json::json!({
            "annual_income": input.annual_income.round_dp(2).normalize().to_string(),
            "bracket_rate": bracket.rate.normalize().to_string(),
            "bracket_constant": bracket.constant.normalize().to_string(),
            "authorized_credits": input.authorized_credits.normalize().to_string(),
            "personal_credit_amount": input.personal_credit_amount.normalize().to_string(),
            "share_class_a_withheld": input.share_class_a_withheld.normalize().to_string(),
            "share_class_b_withheld": input.share_class_b_withheld.normalize().to_string(),
            "share_credit_grouping": config.share_credit_grouping,
        }),
        output: serde_json::json!({
            "computed_tax": computed_tax.round_dp(2).normalize().to_string(),
            "annual_tax": annual_tax.round_dp(2).normalize().to_string(),
            "floor_applied": floor_applied
        }),
        reasoning: if floor_applied {
            format!(
                "Computed tax ${} is not positive; using floor ${}",
                computed_tax.round_dp(2).normalize(),
                input.annual_tax_floor.normalize()
            )
        } else {
            format!(
                "{} x ${} - ${} - ${} - ${} - ${} - ${} = ${}",
                bracket.rate.normalize(),
                input.annual_income.round_dp(2).normalize(),
                bracket.constant.normalize(),
                input.authorized_credits.normalize(),
                personal_credit.round_dp(2).normalize(),
                share_class_a_credit.round_dp(2).normalize(),
                share_class_b_credit.round_dp(2).normalize(),
                annual_tax.round_dp(2).normalize()
            )
        },
    };

    let per_period_tax = round_to_cents(annual_tax / periods + input.additional_withholding);

    let per_period_step = AuditStep {
        step_number: step_number + 1,
        rule_id: "provincial_tax_per_period".to_string(),
        rule_name: "Provincial Income Tax Withheld for the Period".to_string(),
        formula_ref: "A".to_string(),
        input: serde_json::json!({
            "annual_tax": annual_tax.round_dp(2).normalize().to_string(),
            "pay_periods": input.pay_periods,
            "additional_withholding": input.additional_withholding.normalize().to_string()
        }),
        output: serde_json::json!({
            "per_period_tax": per_period_tax.to_string()
        }),
        reasoning: format!(
            "${} / {} + ${} = ${}",
            annual_tax.round_dp(2).normalize(),
            input.pay_periods,
            input.additional_withholding.normalize(),
            per_period_tax
        ),
    };

    Ok(ProvincialTaxResult {
        bracket,
        annual_tax,
        floor_applied,
        per_period_tax,
        audit_steps: vec![annual_step, per_period_step],
    })
}
