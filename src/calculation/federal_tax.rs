//! Federal income tax for Québec employees (A, K2Q, T3, T1 and T).
//!
//! The federal formula annualizes the period's remuneration on its own,
//! independently of the provincial annual income, then applies the federal
//! bracket, the non-refundable credits and the refundable Québec abatement.

use rust_decimal::Decimal;

use crate::config::FederalConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, TaxBracket};

use super::bracket_lookup::lookup_bracket;
use super::rounding::round_to_cents;

/// Inputs to the federal income tax formulas.
#[derive(Debug, Clone, Copy)]
pub struct FederalTaxInput {
    /// Number of pay periods in the year (P).
    pub pay_periods: u32,
    /// Gross remuneration for the period (I).
    pub remuneration: Decimal,
    /// Retirement plan contributions for the period (F).
    pub retirement_contributions: Decimal,
    /// Pension deduction for the period (F2).
    pub pension_deduction: Decimal,
    /// Union dues for the period (U1).
    pub union_dues: Decimal,
    /// Annual prescribed-zone deduction (HD).
    pub region_deduction: Decimal,
    /// Other annual deductions (F1).
    pub other_annual_deductions: Decimal,
    /// Taxable income substituted when A is not positive.
    pub taxable_income_floor: Decimal,
    /// QPP contribution withheld this period (C).
    pub pension_contribution: Decimal,
    /// EI premium withheld this period (EI).
    pub employment_insurance_premium: Decimal,
    /// Earnings insurable under QPIP this period (IE).
    pub parental_insurable_earnings: Decimal,
    /// QPIP premium rate applied to IE.
    pub parental_insurance_rate: Decimal,
    /// Total claim amount (TC).
    pub total_claim_amount: Decimal,
    /// Other non-refundable credits (K3).
    pub other_credits: Decimal,
    /// Canada employment amount ceiling (CEA).
    pub employment_amount_ceiling: Decimal,
    /// Labour-sponsored funds credit (LCF).
    pub lcf_reduction: Decimal,
    /// Additional federal tax requested per period (L).
    pub additional_withholding: Decimal,
}

/// The result of the federal income tax calculation.
#[derive(Debug, Clone)]
pub struct FederalTaxResult {
    /// Annual taxable income (A) after the floor.
    pub taxable_income: Decimal,
    /// Whether the computed taxable income was replaced by the floor.
    pub floor_applied: bool,
    /// The federal bracket selected for A.
    pub bracket: TaxBracket,
    /// Credit for QPP, EI and QPIP contributions (K2Q).
    pub contribution_credit: Decimal,
    /// Basic federal tax (T3).
    pub basic_tax: Decimal,
    /// Annual federal tax payable after the abatement (T1).
    pub annual_tax: Decimal,
    /// Federal tax to withhold for the period (T), rounded to cents.
    pub per_period_tax: Decimal,
    /// Audit steps for A, K2Q, T3, T1 and T, in order.
    pub audit_steps: Vec<AuditStep>,
}

/// Calculates `K2Q`, the credit for contributions projected over the year.
///
/// Each projected annual amount is capped at its ceiling before the credit
/// rate is applied.
pub fn contribution_credit(input: &FederalTaxInput, config: &FederalConfig) -> Decimal {
    let periods = Decimal::from(input.pay_periods);
    let ceilings = &config.contribution_credit_ceilings;

    let pension = (periods * input.pension_contribution).min(ceilings.pension);
    let employment_insurance =
        (periods * input.employment_insurance_premium).min(ceilings.employment_insurance);
    let parental_insurance = (periods
        * input.parental_insurable_earnings
        * input.parental_insurance_rate)
        .min(ceilings.parental_insurance);

    config.credit_rate * pension
        + config.credit_rate * employment_insurance
        + config.credit_rate * parental_insurance
}

/// Calculates the federal tax to withhold for the period.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if `pay_periods` is zero and
/// [`EngineError::BracketOutOfRange`] if no federal bracket contains A.
///
/// # Examples
///
/// ```
/// use withholding_engine::calculation::{FederalTaxInput, calculate_federal_tax};
/// use withholding_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let loader = ConfigLoader::load("./config/qc-2020").unwrap();
/// let federal = loader.config().federal();
///
/// let input = FederalTaxInput {
///     pay_periods: 52,
///     remuneration: dec("1174.65"),
///     retirement_contributions: Decimal::ZERO,
///     pension_deduction: Decimal::ZERO,
///     union_dues: Decimal::ZERO,
///     region_deduction: Decimal::ZERO,
///     other_annual_deductions: Decimal::ZERO,
///     taxable_income_floor: Decimal::ZERO,
///     pension_contribution: dec("63.12"),
///     employment_insurance_premium: dec("14.10"),
///     parental_insurable_earnings: dec("1174.65"),
///     parental_insurance_rate: dec("0.00494"),
///     total_claim_amount: federal.basic_personal_amount,
///     other_credits: Decimal::ZERO,
///     employment_amount_ceiling: federal.canada_employment_amount,
///     lcf_reduction: Decimal::ZERO,
///     additional_withholding: Decimal::ZERO,
/// };
///
/// let result = calculate_federal_tax(&input, federal, 1).unwrap();
/// assert_eq!(result.per_period_tax, dec("113.48"));
/// ```
pub fn calculate_federal_tax(
    input: &FederalTaxInput,
    config: &FederalConfig,
    step_number: u32,
) -> EngineResult<FederalTaxResult> {
    if input.pay_periods == 0 {
        return Err(EngineError::invalid_input(
            "pay_periods_per_year",
            "must be positive",
        ));
    }

    let periods = Decimal::from(input.pay_periods);
    let mut audit_steps = Vec::with_capacity(5);

    // A
    let computed_income = periods
        * (input.remuneration
            - input.retirement_contributions
            - input.pension_deduction
            - input.union_dues)
        - input.region_deduction
        - input.other_annual_deductions;
    let floor_applied = computed_income <= Decimal::ZERO;
    let taxable_income = if floor_applied {
        input.taxable_income_floor
    } else {
        computed_income
    };

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "federal_taxable_income".to_string(),
        rule_name: "Federal Annual Taxable Income".to_string(),
        formula_ref: "A".to_string(),
        input: serde_json::json!({
            "pay_periods": input.pay_periods,
            "remuneration": input.remuneration.normalize().to_string(),
            "retirement_contributions": input.retirement_contributions.normalize().to_string(),
            "pension_deduction": input.pension_deduction.normalize().to_string(),
            "union_dues": input.union_dues.normalize().to_string(),
            "region_deduction": input.region_deduction.normalize().to_string(),
            "other_annual_deductions": input.other_annual_deductions.normalize().to_string()
        }),
        output: serde_json::json!({
            "taxable_income": taxable_income.normalize().to_string(),
            "floor_applied": floor_applied
        }),
        reasoning: if floor_applied {
            format!(
                "Computed taxable income ${} is not positive; using floor ${}",
                computed_income.normalize(),
                input.taxable_income_floor.normalize()
            )
        } else {
            format!(
                "{} x (${} - ${} - ${} - ${}) - ${} - ${} = ${}",
                input.pay_periods,
                input.remuneration.normalize(),
                input.retirement_contributions.normalize(),
                input.pension_deduction.normalize(),
                input.union_dues.normalize(),
                input.region_deduction.normalize(),
                input.other_annual_deductions.normalize(),
                taxable_income.normalize()
            )
        },
    });

    let bracket = lookup_bracket(&config.brackets, taxable_income)?.clone();

    // K2Q
    let contribution_credit = contribution_credit(input, config);

    audit_steps.push(AuditStep {
        step_number: step_number + 1,
        rule_id: "federal_contribution_credit".to_string(),
        rule_name: "Credit for QPP, EI and QPIP Contributions".to_string(),
        formula_ref: "K2Q".to_string(),
        input: serde_json::json!({
            "pension_contribution": input.pension_contribution.normalize().to_string(),
            "employment_insurance_premium": input.employment_insurance_premium.normalize().to_string(),
            "parental_insurable_earnings": input.parental_insurable_earnings.normalize().to_string(),
            "parental_insurance_rate": input.parental_insurance_rate.normalize().to_string(),
            "credit_rate": config.credit_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "contribution_credit": contribution_credit.round_dp(4).normalize().to_string()
        }),
        reasoning: format!(
            "{} x (min({} x ${}, ${}) + min({} x ${}, ${}) + min({} x ${} x {}, ${})) = ${}",
            config.credit_rate.normalize(),
            input.pay_periods,
            input.pension_contribution.normalize(),
            config.contribution_credit_ceilings.pension.normalize(),
            input.pay_periods,
            input.employment_insurance_premium.normalize(),
            config.contribution_credit_ceilings.employment_insurance.normalize(),
            input.pay_periods,
            input.parental_insurable_earnings.normalize(),
            input.parental_insurance_rate.normalize(),
            config.contribution_credit_ceilings.parental_insurance.normalize(),
            contribution_credit.round_dp(2).normalize()
        ),
    });

    // T3
    let personal_credit = config.credit_rate * input.total_claim_amount;
    let employment_credit = (config.credit_rate * taxable_income)
        .min(config.credit_rate * input.employment_amount_ceiling);
    let basic_tax = (bracket.rate * taxable_income
        - bracket.constant
        - personal_credit
        - contribution_credit
        - input.other_credits
        - employment_credit)
        .max(Decimal::ZERO);

    audit_steps.push(AuditStep {
        step_number: step_number + 2,
        rule_id: "basic_federal_tax".to_string(),
        rule_name: "Basic Federal Tax".to_string(),
        formula_ref: "T3".to_string(),
        input: serde_json::json!({
            "taxable_income": taxable_income.normalize().to_string(),
            "bracket_rate": bracket.rate.normalize().to_string(),
            "bracket_constant": bracket.constant.normalize().to_string(),
            "personal_credit": personal_credit.normalize().to_string(),
            "contribution_credit": contribution_credit.round_dp(4).normalize().to_string(),
            "other_credits": input.other_credits.normalize().to_string(),
            "employment_credit": employment_credit.normalize().to_string()
        }),
        output: serde_json::json!({
            "basic_tax": basic_tax.round_dp(4).normalize().to_string()
        }),
        reasoning: format!(
            "max(0, {} x ${} - ${} - ${} - ${} - ${} - ${}) = ${}",
            bracket.rate.normalize(),
            taxable_income.normalize(),
            bracket.constant.normalize(),
            personal_credit.normalize(),
            contribution_credit.round_dp(2).normalize(),
            input.other_credits.normalize(),
            employment_credit.normalize(),
            basic_tax.round_dp(2).normalize()
        ),
    });

    // T1
    let after_lcf = (basic_tax - input.lcf_reduction).max(Decimal::ZERO);
    let abatement = config.quebec_abatement_rate * basic_tax;
    let annual_tax = (after_lcf - abatement).max(Decimal::ZERO);

    audit_steps.push(AuditStep {
        step_number: step_number + 3,
        rule_id: "annual_federal_tax".to_string(),
        rule_name: "Annual Federal Tax Payable".to_string(),
        formula_ref: "T1".to_string(),
        input: serde_json::json!({
            "basic_tax": basic_tax.round_dp(4).normalize().to_string(),
            "lcf_reduction": input.lcf_reduction.normalize().to_string(),
            "quebec_abatement_rate": config.quebec_abatement_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "abatement": abatement.round_dp(4).normalize().to_string(),
            "annual_tax": annual_tax.round_dp(4).normalize().to_string()
        }),
        reasoning: format!(
            "max(0, max(0, ${} - ${}) - {} x ${}) = ${}",
            basic_tax.round_dp(2).normalize(),
            input.lcf_reduction.normalize(),
            config.quebec_abatement_rate.normalize(),
            basic_tax.round_dp(2).normalize(),
            annual_tax.round_dp(2).normalize()
        ),
    });

    // T
    let per_period_tax = round_to_cents(annual_tax / periods + input.additional_withholding);

    audit_steps.push(AuditStep {
        step_number: step_number + 4,
        rule_id: "federal_tax_per_period".to_string(),
        rule_name: "Federal Tax Withheld for the Period".to_string(),
        formula_ref: "T".to_string(),
        input: serde_json::json!({
            "annual_tax": annual_tax.round_dp(4).normalize().to_string(),
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
    });

    Ok(FederalTaxResult {
        taxable_income,
        floor_applied,
        bracket,
        contribution_credit,
        basic_tax,
        annual_tax,
        per_period_tax,
        audit_steps,
    })
}
