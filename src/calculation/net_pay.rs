//! Net pay for the period.

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{AuditStep, AuditWarning};

/// Per-period amounts withheld from gross pay, already rounded to cents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Withholdings {
    /// Provincial income tax (A).
    pub provincial_income_tax: Decimal,
    /// Federal income tax (T).
    pub federal_income_tax: Decimal,
    /// QPP contribution.
    pub pension_contribution: Decimal,
    /// QPIP premium.
    pub parental_insurance_contribution: Decimal,
    /// EI premium.
    pub employment_insurance_contribution: Decimal,
}

impl Withholdings {
    /// Sum of every amount withheld.
    pub fn total(&self) -> Decimal {
        self.provincial_income_tax
            + self.federal_income_tax
            + self.pension_contribution
            + self.parental_insurance_contribution
            + self.employment_insurance_contribution
    }
}

/// The result of the net pay calculation.
#[derive(Debug, Clone)]
pub struct NetPayResult {
    /// Gross pay less every withholding. May be negative.
    pub net_pay: Decimal,
    /// Set when net pay is negative.
    pub warning: Option<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates `net = gross − federal − provincial − QPP − QPIP − EI`.
///
/// The result is not clamped. A negative net pay is returned as is, logged,
/// and flagged with a warning so the caller can decide what to do.
///
/// # Examples
///
/// ```
/// use withholding_engine::calculation::{Withholdings, calculate_net_pay};
/// use rust_decimal::Decimal;
///
/// let withholdings = Withholdings {
///     provincial_income_tax: Decimal::from(100),
///     federal_income_tax: Decimal::from(80),
///     ..Default::default()
/// };
/// let result = calculate_net_pay(Decimal::from(1000), &withholdings, 1);
/// assert_eq!(result.net_pay, Decimal::from(820));
/// assert!(result.warning.is_none());
/// ```
pub fn calculate_net_pay(
    gross_remuneration: Decimal,
    withholdings: &Withholdings,
    step_number: u32,
) -> NetPayResult {
    let total = withholdings.total();
    let net_pay = gross_remuneration - total;

    let warning = if net_pay < Decimal::ZERO {
        warn!(
            gross = %gross_remuneration,
            withheld = %total,
            net_pay = %net_pay,
            "Withholdings exceed gross remuneration"
        );
        Some(AuditWarning {
            code: "NEGATIVE_NET_PAY".to_string(),
            message: format!(
                "Withholdings of ${} exceed gross remuneration of ${}",
                total, gross_remuneration
            ),
            severity: "high".to_string(),
        })
    } else {
        None
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        formula_ref: "NET".to_string(),
        input: serde_json::json!({
            "gross_remuneration": gross_remuneration.to_string(),
            "provincial_income_tax": withholdings.provincial_income_tax.to_string(),
            "federal_income_tax": withholdings.federal_income_tax.to_string(),
            "pension_contribution": withholdings.pension_contribution.to_string(),
            "parental_insurance_contribution": withholdings.parental_insurance_contribution.to_string(),
            "employment_insurance_contribution": withholdings.employment_insurance_contribution.to_string()
        }),
        output: serde_json::json!({
            "total_withholding": total.to_string(),
            "net_pay": net_pay.to_string()
        }),
        reasoning: format!(
            "${} - ${} - ${} - ${} - ${} - ${} = ${}",
            gross_remuneration,
            withholdings.federal_income_tax,
            withholdings.provincial_income_tax,
            withholdings.pension_contribution,
            withholdings.parental_insurance_contribution,
            withholdings.employment_insurance_contribution,
            net_pay
        ),
    };

    NetPayResult {
        net_pay,
        warning,
        audit_step,
    }
}
