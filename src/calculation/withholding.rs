//! The full withholding pipeline for one pay period.
//!
//! Runs every formula in dependency order, threading step numbers through the
//! audit trace:
//!
//! 1. Deduction for employment income (H)
//! 2. Authorized deductions distributed over the remaining periods (J, J1)
//! 3. Annual taxable income (I)
//! 4. Provincial income tax (Y, A)
//! 5. QPP, QPIP and EI contributions against their annual ceilings
//! 6. Federal income tax (A, K2Q, T3, T1, T)
//! 7. Net pay

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::TaxYearConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditTrace, ContributionBasis, ContributionCeiling, WithholdingRequest, WithholdingResult,
    YearToDate,
};

use super::annual_income::{AnnualIncomeInput, calculate_annual_income};
use super::authorized_deduction::{AuthorizedDeduction, distribute_authorized_deduction};
use super::contribution::{ContributionPlan, calculate_contribution};
use super::employment_deduction::calculate_employment_deduction;
use super::federal_tax::{FederalTaxInput, calculate_federal_tax};
use super::net_pay::{Withholdings, calculate_net_pay};
use super::provincial_tax::{ProvincialTaxInput, calculate_provincial_tax};

/// Calculates every amount withheld from one period's pay.
///
/// The result depends only on the request and the dataset, so the same
/// inputs with the same year-to-date totals always give the same result.
/// The caller carries `remitted_to_date` forward into the next period's
/// `year_to_date`.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] for negative or oversized amounts, a pay
///   period count of zero or above the daily maximum, or more remaining
///   periods than periods in the year
/// - [`EngineError::TaxYearMismatch`] if the request names a different year
///   than the dataset
/// - [`EngineError::BracketOutOfRange`] if an annual income is negative.
///   H is taken on gross pay, so this happens whenever the deductions exceed
///   remuneration: retirement plan contributions (F) close to the gross, or
///   federal deductions (F2, U1, HD, F1) larger than annual pay, as well as
///   carry-forward amounts (J, J1) spread over few remaining periods
///
/// # Examples
///
/// ```
/// use withholding_engine::calculation::calculate_withholding;
/// use withholding_engine::config::ConfigLoader;
/// use withholding_engine::models::{PayPeriodContext, WithholdingRequest};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let loader = ConfigLoader::load("./config/qc-2020").unwrap();
/// let request = WithholdingRequest::new(PayPeriodContext {
///     pay_periods_per_year: 52,
///     gross_remuneration: Decimal::from_str("1174.65").unwrap(),
///     remaining_periods: 52,
///     carry_forward_authorized_annual_deduction: Decimal::ZERO,
///     authorized_reduction_after_first_period: Decimal::ZERO,
///     retirement_plan_contributions: Decimal::ZERO,
/// });
///
/// let result = calculate_withholding(&request, loader.config()).unwrap();
/// assert_eq!(result.net_pay, Decimal::from_str("835.43").unwrap());
/// ```
pub fn calculate_withholding(
    request: &WithholdingRequest,
    config: &TaxYearConfig,
) -> EngineResult<WithholdingResult> {
    request.validate()?;
    if let Some(requested) = request.tax_year {
        if requested != config.tax_year() {
            return Err(EngineError::TaxYearMismatch {
                requested,
                loaded: config.tax_year(),
            });
        }
    }

    let period = &request.period;
    let pay_periods = period.pay_periods_per_year;
    let provincial = config.provincial();
    let federal = config.federal();
    let contributions = config.contributions();

    let mut trace = AuditTrace::default();
    let mut step_number: u32 = 1;

    // H
    let employment_deduction = calculate_employment_deduction(
        period.gross_remuneration,
        pay_periods,
        &provincial.employment_deduction,
        step_number,
    )?;
    step_number = trace.record(employment_deduction.audit_step);

    // J
    let carry_forward = distribute_authorized_deduction(
        AuthorizedDeduction::SourceDeductionReturn,
        pay_periods,
        period.carry_forward_authorized_annual_deduction,
        period.remaining_periods,
        step_number,
    )?;
    step_number = trace.record(carry_forward.audit_step);

    // J1
    let authorized_reduction = distribute_authorized_deduction(
        AuthorizedDeduction::ReductionOfSourceDeductions,
        pay_periods,
        period.authorized_reduction_after_first_period,
        period.remaining_periods,
        step_number,
    )?;
    step_number = trace.record(authorized_reduction.audit_step);

    // I
    let annual_income = calculate_annual_income(
        &AnnualIncomeInput {
            pay_periods,
            remuneration: period.gross_remuneration,
            retirement_contributions: period.retirement_plan_contributions,
            employment_deduction: employment_deduction.deduction,
            carry_forward_return: carry_forward.amount,
            authorized_reduction: authorized_reduction.amount,
        },
        step_number,
    )?;
    step_number = trace.record(annual_income.audit_step);

    // Y, A
    let provincial_tax = calculate_provincial_tax(
        &ProvincialTaxInput {
            annual_income: annual_income.annual_income,
            pay_periods,
            personal_credit_amount: request
                .provincial
                .personal_credit_amount
                .unwrap_or(provincial.basic_personal_amount),
            authorized_credits: request.provincial.authorized_credits,
            share_class_a_withheld: request.provincial.share_class_a_withheld,
            share_class_b_withheld: request.provincial.share_class_b_withheld,
            annual_tax_floor: request.provincial.annual_tax_floor,
            additional_withholding: request.provincial.additional_withholding,
        },
        provincial,
        step_number,
    )?;
    for step in provincial_tax.audit_steps {
        step_number = trace.record(step);
    }

    let insurable_earnings = match request.contribution_basis {
        ContributionBasis::Gross => period.gross_remuneration,
        ContributionBasis::Adjusted => annual_income.adjusted_remuneration,
    };

    let pension = calculate_contribution(
        ContributionPlan::Pension,
        insurable_earnings,
        pay_periods,
        &contributions.pension,
        ContributionCeiling::new(
            contributions.pension.annual_maximum,
            request.year_to_date.pension,
        ),
        step_number,
    )?;
    step_number = trace.record(pension.audit_step);

    let parental_insurance = calculate_contribution(
        ContributionPlan::ParentalInsurance,
        insurable_earnings,
        pay_periods,
        &contributions.parental_insurance,
        ContributionCeiling::new(
            contributions.parental_insurance.annual_maximum,
            request.year_to_date.parental_insurance,
        ),
        step_number,
    )?;
    step_number = trace.record(parental_insurance.audit_step);

    let employment_insurance = calculate_contribution(
        ContributionPlan::EmploymentInsurance,
        insurable_earnings,
        pay_periods,
        &contributions.employment_insurance,
        ContributionCeiling::new(
            contributions.employment_insurance.annual_maximum,
            request.year_to_date.employment_insurance,
        ),
        step_number,
    )?;
    step_number = trace.record(employment_insurance.audit_step);

    // A, K2Q, T3, T1, T
    let deductions = &request.federal_deductions;
    let federal_tax = calculate_federal_tax(
        &FederalTaxInput {
            pay_periods,
            remuneration: period.gross_remuneration,
            retirement_contributions: period.retirement_plan_contributions,
            pension_deduction: deductions.pension_deduction,
            union_dues: deductions.union_dues,
            region_deduction: deductions.region_deduction,
            other_annual_deductions: deductions.other_annual_deductions,
            taxable_income_floor: deductions.taxable_income_floor,
            pension_contribution: pension.contribution,
            employment_insurance_premium: employment_insurance.contribution,
            parental_insurable_earnings: insurable_earnings,
            parental_insurance_rate: contributions.parental_insurance.rate,
            total_claim_amount: request
                .federal_credits
                .total_claim_amount
                .unwrap_or(federal.basic_personal_amount),
            other_credits: request.federal_credits.other_non_refundable_credits,
            employment_amount_ceiling: request
                .federal_credits
                .employment_amount_ceiling
                .unwrap_or(federal.canada_employment_amount),
            lcf_reduction: deductions.lcf_reduction,
            additional_withholding: deductions.additional_withholding,
        },
        federal,
        step_number,
    )?;
    for step in federal_tax.audit_steps {
        step_number = trace.record(step);
    }

    let withholdings = Withholdings {
        provincial_income_tax: provincial_tax.per_period_tax,
        federal_income_tax: federal_tax.per_period_tax,
        pension_contribution: pension.contribution,
        parental_insurance_contribution: parental_insurance.contribution,
        employment_insurance_contribution: employment_insurance.contribution,
    };
    let net_pay = calculate_net_pay(period.gross_remuneration, &withholdings, step_number);
    trace.record(net_pay.audit_step);
    if let Some(warning) = net_pay.warning {
        trace.warnings.push(warning);
    }

    debug!(
        annual_income = %annual_income.annual_income.round_dp(2),
        federal_taxable_income = %federal_tax.taxable_income.round_dp(2),
        total_withholding = %withholdings.total(),
        steps = trace.steps.len(),
        "Withholding pipeline completed"
    );

    Ok(WithholdingResult {
        gross_remuneration: period.gross_remuneration,
        provincial_income_tax: withholdings.provincial_income_tax,
        federal_income_tax: withholdings.federal_income_tax,
        pension_contribution: withholdings.pension_contribution,
        parental_insurance_contribution: withholdings.parental_insurance_contribution,
        employment_insurance_contribution: withholdings.employment_insurance_contribution,
        net_pay: net_pay.net_pay,
        annual_taxable_income: annual_income.annual_income,
        federal_taxable_income: federal_tax.taxable_income,
        provincial_bracket: provincial_tax.bracket,
        federal_bracket: federal_tax.bracket,
        remitted_to_date: YearToDate {
            pension: pension.remitted_to_date,
            parental_insurance: parental_insurance.remitted_to_date,
            employment_insurance: employment_insurance.remitted_to_date,
        },
        audit_trace: trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLoader, ShareCreditGrouping};
    use crate::models::{MAX_AMOUNT, MAX_PAY_PERIODS_PER_YEAR, PayPeriodContext};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn load_config() -> TaxYearConfig {
        ConfigLoader::load("./config/qc-2020")
            .expect("Failed to load config")
            .config()
            .clone()
    }

    fn weekly_request(gross: &str) -> WithholdingRequest {
        WithholdingRequest::new(PayPeriodContext {
            pay_periods_per_year: 52,
            gross_remuneration: dec(gross),
            remaining_periods: 52,
            carry_forward_authorized_annual_deduction: Decimal::ZERO,
            authorized_reduction_after_first_period: Decimal::ZERO,
            retirement_plan_contributions: Decimal::ZERO,
        })
    }

    #[test]
    fn test_weekly_pay_full_pipeline() {
        let result = calculate_withholding(&weekly_request("1174.65"), &load_config()).unwrap();

        assert_eq!(result.provincial_income_tax, dec("142.72"));
        assert_eq!(result.federal_income_tax, dec("113.48"));
        assert_eq!(result.pension_contribution, dec("63.12"));
        assert_eq!(result.parental_insurance_contribution, dec("5.80"));
        assert_eq!(result.employment_insurance_contribution, dec("14.10"));
        assert_eq!(result.net_pay, dec("835.43"));
        assert_eq!(result.annual_taxable_income.round_dp(2), dec("59891.80"));
        assert_eq!(result.provincial_bracket.rate, dec("0.20"));
        assert_eq!(result.federal_bracket.rate, dec("0.205"));
    }

    #[test]
    fn test_net_identity_holds() {
        let result = calculate_withholding(&weekly_request("1174.65"), &load_config()).unwrap();

        assert_eq!(
            result.net_pay + result.total_withholding(),
            result.gross_remuneration
        );
    }

    #[test]
    fn test_audit_trace_numbers_every_formula_in_order() {
        let result = calculate_withholding(&weekly_request("1174.65"), &load_config()).unwrap();

        let refs: Vec<&str> = result
            .audit_trace
            .steps
            .iter()
            .map(|step| step.formula_ref.as_str())
            .collect();
        assert_eq!(
            refs,
            vec![
                "H", "J", "J1", "I", "Y", "A", "C", "PPIP", "EI", "A", "K2Q", "T3", "T1", "T",
                "NET"
            ]
        );
        for (index, step) in result.audit_trace.steps.iter().enumerate() {
            assert_eq!(step.step_number, index as u32 + 1);
        }
        assert!(result.audit_trace.warnings.is_empty());
    }

    #[test]
    fn test_remitted_to_date_carries_contributions() {
        let mut request = weekly_request("1174.65");
        request.year_to_date = YearToDate {
            pension: dec("1000"),
            parental_insurance: dec("100"),
            employment_insurance: dec("200"),
        };

        let result = calculate_withholding(&request, &load_config()).unwrap();

        assert_eq!(result.remitted_to_date.pension, dec("1063.12"));
        assert_eq!(result.remitted_to_date.parental_insurance, dec("105.80"));
        assert_eq!(result.remitted_to_date.employment_insurance, dec("214.10"));
    }

    #[test]
    fn test_reached_ceilings_stop_contributions() {
        let mut request = weekly_request("1174.65");
        request.year_to_date = YearToDate {
            pension: dec("3146.40"),
            parental_insurance: dec("387.79"),
            employment_insurance: dec("650.40"),
        };

        let result = calculate_withholding(&request, &load_config()).unwrap();

        assert!(result.pension_contribution.is_zero());
        assert!(result.parental_insurance_contribution.is_zero());
        assert!(result.employment_insurance_contribution.is_zero());
        assert_eq!(result.net_pay + result.total_withholding(), dec("1174.65"));
    }

    #[test]
    fn test_adjusted_basis_uses_smoothed_remuneration() {
        let mut request = weekly_request("1174.65");
        request.contribution_basis = ContributionBasis::Adjusted;

        let result = calculate_withholding(&request, &load_config()).unwrap();

        // I / P = 59891.80 / 52 = 1151.765...; 0.00494 x 1151.765 = 5.6897
        assert_eq!(result.parental_insurance_contribution, dec("5.69"));
    }

    #[test]
    fn test_mismatched_tax_year_is_rejected() {
        let mut request = weekly_request("1174.65");
        request.tax_year = Some(2021);

        match calculate_withholding(&request, &load_config()) {
            Err(EngineError::TaxYearMismatch { requested, loaded }) => {
                assert_eq!(requested, 2021);
                assert_eq!(loaded, 2020);
            }
            other => panic!("Expected TaxYearMismatch, got {:?}", other.map(|r| r.net_pay)),
        }
    }

    #[test]
    fn test_deductions_exceeding_income_are_out_of_range() {
        let mut request = weekly_request("100");
        request.period.carry_forward_authorized_annual_deduction = dec("10000");

        let result = calculate_withholding(&request, &load_config());

        assert!(matches!(result, Err(EngineError::BracketOutOfRange { .. })));
    }

    #[test]
    fn test_retirement_contributions_equal_to_gross_are_out_of_range() {
        let mut request = weekly_request("1174.65");
        request.period.retirement_plan_contributions = dec("1174.65");

        let result = calculate_withholding(&request, &load_config());

        assert!(matches!(result, Err(EngineError::BracketOutOfRange { .. })));
    }

    #[test]
    fn test_spread_authorized_credits_reduce_annual_tax() {
        // K2 = 130 granted with 13 of 52 periods left: K1 = 52 x 130 / 13 = 520
        let mut request = weekly_request("1174.65");
        request.provincial.authorized_credits = dec("520");

        let result = calculate_withholding(&request, &load_config()).unwrap();

        assert_eq!(result.provincial_income_tax, dec("132.72"));
    }

    #[test]
    fn test_invalid_request_is_rejected_before_calculation() {
        let mut request = weekly_request("1174.65");
        request.period.remaining_periods = 60;

        assert!(matches!(
            calculate_withholding(&request, &load_config()),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_remuneration_beyond_decimal_products_is_rejected() {
        let request = weekly_request("10000000000000000000000000000");

        match calculate_withholding(&request, &load_config()) {
            Err(EngineError::InvalidInput { field, .. }) => {
                assert_eq!(field, "gross_remuneration")
            }
            other => panic!("Expected InvalidInput, got {:?}", other.map(|r| r.net_pay)),
        }
    }

    #[test]
    fn test_largest_accepted_inputs_calculate() {
        let base = load_config();
        let mut provincial = base.provincial().clone();
        provincial.share_credit_grouping = ShareCreditGrouping::ScaledByIncome;
        let config = TaxYearConfig::new(
            base.metadata().clone(),
            provincial,
            base.federal().clone(),
            base.contributions().clone(),
        )
        .unwrap();

        let mut request = WithholdingRequest::new(PayPeriodContext {
            pay_periods_per_year: MAX_PAY_PERIODS_PER_YEAR,
            gross_remuneration: MAX_AMOUNT,
            remaining_periods: MAX_PAY_PERIODS_PER_YEAR,
            carry_forward_authorized_annual_deduction: MAX_AMOUNT,
            authorized_reduction_after_first_period: MAX_AMOUNT,
            retirement_plan_contributions: Decimal::ZERO,
        });
        request.provincial.personal_credit_amount = Some(MAX_AMOUNT);
        request.provincial.authorized_credits = MAX_AMOUNT;
        request.provincial.share_class_a_withheld = MAX_AMOUNT;
        request.provincial.share_class_b_withheld = MAX_AMOUNT;
        request.provincial.additional_withholding = MAX_AMOUNT;
        request.federal_credits.total_claim_amount = Some(MAX_AMOUNT);
        request.federal_credits.other_non_refundable_credits = MAX_AMOUNT;
        request.federal_deductions.region_deduction = MAX_AMOUNT;
        request.federal_deductions.additional_withholding = MAX_AMOUNT;

        let result = calculate_withholding(&request, &config).unwrap();

        assert_eq!(
            result.net_pay + result.total_withholding(),
            result.gross_remuneration
        );
    }
}
