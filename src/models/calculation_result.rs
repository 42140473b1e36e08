//! Calculation result models for the withholding engine.
//!
//! This module contains the [`WithholdingResult`] type and the audit structures
//! that record every formula applied while producing it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{TaxBracket, YearToDate};

/// A single step in the audit trace recording a formula application.
///
/// Each step captures the input, output, and reasoning for one formula of
/// the published source deduction guides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the formula that was applied.
    pub rule_id: String,
    /// The human-readable name of the formula.
    pub rule_name: String,
    /// The variable name used for this formula in the published guide.
    pub formula_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the computation.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate results that were computed but likely reflect a problem
/// in the inputs or the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use withholding_engine::models::AuditTrace;
///
/// let trace = AuditTrace::default();
/// assert!(trace.steps.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Appends a step and returns the next step number.
    pub fn record(&mut self, step: AuditStep) -> u32 {
        let next = step.step_number + 1;
        self.steps.push(step);
        next
    }
}

/// The per-period withholding for one pay period.
///
/// All per-period amounts are rounded to cents, and `net_pay` is computed
/// from the rounded amounts, so
/// `net_pay + total_withholding() == gross_remuneration` exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingResult {
    /// Gross remuneration for the period.
    pub gross_remuneration: Decimal,
    /// Provincial income tax withheld.
    pub provincial_income_tax: Decimal,
    /// Federal income tax withheld.
    pub federal_income_tax: Decimal,
    /// Pension plan contribution withheld.
    pub pension_contribution: Decimal,
    /// Parental insurance premium withheld.
    pub parental_insurance_contribution: Decimal,
    /// Employment insurance premium withheld.
    pub employment_insurance_contribution: Decimal,
    /// Gross remuneration minus all withholdings.
    pub net_pay: Decimal,
    /// Provincial annual taxable income (I).
    pub annual_taxable_income: Decimal,
    /// Federal annual taxable income (A).
    pub federal_taxable_income: Decimal,
    /// Provincial bracket selected for `annual_taxable_income`.
    pub provincial_bracket: TaxBracket,
    /// Federal bracket selected for `federal_taxable_income`.
    pub federal_bracket: TaxBracket,
    /// Year-to-date contributions after this period, for the caller to carry.
    pub remitted_to_date: YearToDate,
    /// Formula-by-formula record of the calculation.
    pub audit_trace: AuditTrace,
}

impl WithholdingResult {
    /// Sum of every amount withheld this period.
    pub fn total_withholding(&self) -> Decimal {
        self.provincial_income_tax
            + self.federal_income_tax
            + self.pension_contribution
            + self.parental_insurance_contribution
            + self.employment_insurance_contribution
    }
}
