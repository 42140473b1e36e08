//! Deduction for employment income (H).
//!
//! The deduction is a share of the period's remuneration, capped at the
//! annual maximum spread evenly over the pay periods of the year.

use rust_decimal::Decimal;

use crate::config::EmploymentDeductionConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// The result of computing the deduction for employment income.
#[derive(Debug, Clone)]
pub struct EmploymentDeductionResult {
    /// The per-period deduction (H), unrounded.
    pub deduction: Decimal,
    /// Whether the per-period cap was applied.
    pub cap_applied: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates `H = min(rate × remuneration, annual_maximum / pay_periods)`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if `remuneration` is negative or
/// `pay_periods` is zero.
///
/// # Examples
///
/// ```
/// use withholding_engine::calculation::calculate_employment_deduction;
/// use withholding_engine::config::EmploymentDeductionConfig;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let config = EmploymentDeductionConfig {
///     rate: Decimal::from_str("0.06").unwrap(),
///     annual_maximum: Decimal::from_str("1190").unwrap(),
/// };
///
/// let result = calculate_employment_deduction(Decimal::from_str("300").unwrap(), 52, &config, 1).unwrap();
/// assert_eq!(result.deduction, Decimal::from_str("18.00").unwrap());
/// assert!(!result.cap_applied);
/// ```
pub fn calculate_employment_deduction(
    remuneration: Decimal,
    pay_periods: u32,
    config: &EmploymentDeductionConfig,
    step_number: u32,
) -> EngineResult<EmploymentDeductionResult> {
    if remuneration.is_sign_negative() && !remuneration.is_zero() {
        return Err(EngineError::invalid_input(
            "gross_remuneration",
            format!("must not be negative (got {})", remuneration),
        ));
    }
    if pay_periods == 0 {
        return Err(EngineError::invalid_input(
            "pay_periods_per_year",
            "must be positive",
        ));
    }

    let uncapped = config.rate * remuneration;
    let per_period_cap = config.annual_maximum / Decimal::from(pay_periods);
    let (deduction, cap_applied) = if uncapped > per_period_cap {
        (per_period_cap, true)
    } else {
        (uncapped, false)
    };

    let reasoning = if cap_applied {
        format!(
            "{} x ${} = ${} exceeds ${} / {} periods; capped at ${}",
            config.rate.normalize(),
            remuneration.normalize(),
            uncapped.normalize(),
            config.annual_maximum.normalize(),
            pay_periods,
            deduction.round_dp(4).normalize()
        )
    } else {
        format!(
            "{} x ${} = ${}",
            config.rate.normalize(),
            remuneration.normalize(),
            deduction.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "employment_income_deduction".to_string(),
        rule_name: "Deduction for Employment Income".to_string(),
        formula_ref: "H".to_string(),
        input: serde_json::json!({
            "remuneration": remuneration.normalize().to_string(),
            "pay_periods": pay_periods,
            "rate": config.rate.normalize().to_string(),
            "annual_maximum": config.annual_maximum.normalize().to_string()
        }),
        output: serde_json::json!({
            "deduction": deduction.normalize().to_string(),
            "cap_applied": cap_applied
        }),
        reasoning,
    };

    Ok(EmploymentDeductionResult {
        deduction,
        cap_applied,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_config() -> EmploymentDeductionConfig {
        EmploymentDeductionConfig {
            rate: dec("0.06"),
            annual_maximum: dec("1190"),
        }
    }

    #[test]
    fn test_weekly_pay_is_capped_at_annual_maximum_share() {
        let result = calculate_employment_deduction(dec("1174.65"), 52, &create_config(), 1).unwrap();

        assert!(result.cap_applied);
        assert_eq!(result.deduction, dec("1190") / Decimal::from(52));
        assert_eq!(result.deduction.round_dp(4), dec("22.8846"));
    }

    #[test]
    fn test_low_pay_is_not_capped() {
        let result = calculate_employment_deduction(dec("200"), 52, &create_config(), 1).unwrap();

        assert!(!result.cap_applied);
        assert_eq!(result.deduction, dec("12.00"));
    }

    #[test]
    fn test_zero_remuneration_gives_zero_deduction() {
        let result = calculate_employment_deduction(Decimal::ZERO, 26, &create_config(), 1).unwrap();
        assert!(result.deduction.is_zero());
    }

    #[test]
    fn test_negative_remuneration_is_invalid() {
        let result = calculate_employment_deduction(dec("-1"), 52, &create_config(), 1);

        match result {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "gross_remuneration"),
            other => panic!("Expected InvalidInput, got {:?}", other.map(|r| r.deduction)),
        }
    }

    #[test]
    fn test_zero_pay_periods_is_invalid() {
        let result = calculate_employment_deduction(dec("500"), 0, &create_config(), 1);

        match result {
            Err(EngineError::InvalidInput { field, .. }) => {
                assert_eq!(field, "pay_periods_per_year")
            }
            other => panic!("Expected InvalidInput, got {:?}", other.map(|r| r.deduction)),
        }
    }

    #[test]
    fn test_audit_step_records_cap() {
        let result = calculate_employment_deduction(dec("1174.65"), 52, &create_config(), 3).unwrap();

        assert_eq!(result.audit_step.step_number, 3);
        assert_eq!(result.audit_step.formula_ref, "H");
        assert_eq!(result.audit_step.output["cap_applied"].as_bool().unwrap(), true);
        assert!(result.audit_step.reasoning.contains("capped"));
    }
}
