//! Configuration types for a tax year's dataset.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::BracketTable;

/// Metadata about the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionMetadata {
    /// The tax year these values apply to.
    pub tax_year: i32,
    /// Short jurisdiction code (e.g., "QC").
    pub code: String,
    /// Human-readable name of the dataset.
    pub name: String,
    /// Date from which the values are in force.
    pub effective_date: NaiveDate,
    /// URL to the official formula guide.
    pub source_url: String,
}

/// How the Fondaction share credit (Q1) term is grouped in the provincial
/// annual tax formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareCreditGrouping {
    /// `rate × P × Q1`, as written in the published guide.
    #[default]
    PerPeriodShares,
    /// `(rate × P × Q1) × I`, where the term is also scaled by annual income.
    ScaledByIncome,
}

/// Deduction for employment income (H).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentDeductionConfig {
    /// Share of remuneration deducted (e.g., 0.06).
    pub rate: Decimal,
    /// Annual maximum deduction.
    pub annual_maximum: Decimal,
}

/// provincial.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvincialConfig {
    /// Annual taxable income brackets with rates (T) and constants (K).
    pub brackets: BracketTable,
    /// Basic personal amount used when no E is supplied.
    pub basic_personal_amount: Decimal,
    /// Rate applied to personal tax credits (E).
    pub personal_credit_rate: Decimal,
    /// Rate applied to class A share purchases (Q).
    pub share_class_a_credit_rate: Decimal,
    /// Rate applied to Fondaction share purchases (Q1).
    pub share_class_b_credit_rate: Decimal,
    /// Grouping of the Q1 term.
    #[serde(default)]
    pub share_credit_grouping: ShareCreditGrouping,
    /// Deduction for employment income.
    pub employment_deduction: EmploymentDeductionConfig,
}

/// Annual ceilings on contribution amounts eligible for the federal K2Q credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionCreditCeilings {
    /// Maximum QPP contributions eligible for the credit.
    pub pension: Decimal,
    /// Maximum EI premiums eligible for the credit.
    pub employment_insurance: Decimal,
    /// Maximum QPIP premiums eligible for the credit.
    pub parental_insurance: Decimal,
}

/// federal.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederalConfig {
    /// Annual taxable income brackets with rates (R) and constants (K).
    pub brackets: BracketTable,
    /// Basic personal amount used when no TC is supplied.
    pub basic_personal_amount: Decimal,
    /// Lowest federal rate, applied to every credit.
    pub credit_rate: Decimal,
    /// Refundable Québec abatement applied to basic federal tax.
    pub quebec_abatement_rate: Decimal,
    /// Canada employment amount (CEA).
    pub canada_employment_amount: Decimal,
    /// Ceilings for the contribution credits.
    pub contribution_credit_ceilings: ContributionCreditCeilings,
}

/// Rate, exemption and ceiling for one contribution plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionPlanConfig {
    /// Contribution rate.
    pub rate: Decimal,
    /// Annual basic exemption; zero for plans without one.
    #[serde(default)]
    pub exemption: Decimal,
    /// Maximum employee contribution for the year.
    pub annual_maximum: Decimal,
}

/// contributions.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionsConfig {
    /// Québec Pension Plan.
    pub pension: ContributionPlanConfig,
    /// Québec Parental Insurance Plan.
    pub parental_insurance: ContributionPlanConfig,
    /// Employment Insurance at the Québec rate.
    pub employment_insurance: ContributionPlanConfig,
}

/// The complete dataset for one tax year, loaded from YAML files.
#[derive(Debug, Clone)]
pub struct TaxYearConfig {
    metadata: JurisdictionMetadata,
    provincial: ProvincialConfig,
    federal: FederalConfig,
    contributions: ContributionsConfig,
}

impl TaxYearConfig {
    /// Creates a TaxYearConfig from its component parts.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if either bracket table is
    /// malformed or any rate, amount or ceiling is negative.
    pub fn new(
        metadata: JurisdictionMetadata,
        provincial: ProvincialConfig,
        federal: FederalConfig,
        contributions: ContributionsConfig,
    ) -> EngineResult<Self> {
        for (name, table) in [
            ("provincial.brackets", &provincial.brackets),
            ("federal.brackets", &federal.brackets),
        ] {
            table.validate().map_err(|e| match e {
                EngineError::InvalidConfig { message } => EngineError::InvalidConfig {
                    message: format!("{}: {}", name, message),
                },
                other => other,
            })?;
        }

        let values = [
            ("provincial.basic_personal_amount", provincial.basic_personal_amount),
            ("provincial.personal_credit_rate", provincial.personal_credit_rate),
            ("provincial.share_class_a_credit_rate", provincial.share_class_a_credit_rate),
            ("provincial.share_class_b_credit_rate", provincial.share_class_b_credit_rate),
            ("provincial.employment_deduction.rate", provincial.employment_deduction.rate),
            (
                "provincial.employment_deduction.annual_maximum",
                provincial.employment_deduction.annual_maximum,
            ),
            ("federal.basic_personal_amount", federal.basic_personal_amount),
            ("federal.credit_rate", federal.credit_rate),
            ("federal.quebec_abatement_rate", federal.quebec_abatement_rate),
            ("federal.canada_employment_amount", federal.canada_employment_amount),
            (
                "federal.contribution_credit_ceilings.pension",
                federal.contribution_credit_ceilings.pension,
            ),
            (
                "federal.contribution_credit_ceilings.employment_insurance",
                federal.contribution_credit_ceilings.employment_insurance,
            ),
            (
                "federal.contribution_credit_ceilings.parental_insurance",
                federal.contribution_credit_ceilings.parental_insurance,
            ),
            ("contributions.pension.rate", contributions.pension.rate),
            ("contributions.pension.exemption", contributions.pension.exemption),
            ("contributions.pension.annual_maximum", contributions.pension.annual_maximum),
            ("contributions.parental_insurance.rate", contributions.parental_insurance.rate),
            (
                "contributions.parental_insurance.annual_maximum",
                contributions.parental_insurance.annual_maximum,
            ),
            ("contributions.employment_insurance.rate", contributions.employment_insurance.rate),
            (
                "contributions.employment_insurance.annual_maximum",
                contributions.employment_insurance.annual_maximum,
            ),
        ];

        if let Some((name, value)) = values
            .iter()
            .find(|(_, value)| value.is_sign_negative() && !value.is_zero())
        {
            return Err(EngineError::InvalidConfig {
                message: format!("{} must not be negative (got {})", name, value),
            });
        }

        Ok(Self {
            metadata,
            provincial,
            federal,
            contributions,
        })
    }

    /// Returns the dataset metadata.
    pub fn metadata(&self) -> &JurisdictionMetadata {
        &self.metadata
    }

    /// Returns the tax year of the dataset.
    pub fn tax_year(&self) -> i32 {
        self.metadata.tax_year
    }

    /// Returns the provincial configuration.
    pub fn provincial(&self) -> &ProvincialConfig {
        &self.provincial
    }

    /// Returns the federal configuration.
    pub fn federal(&self) -> &FederalConfig {
        &self.federal
    }

    /// Returns the contribution plan configuration.
    pub fn contributions(&self) -> &ContributionsConfig {
        &self.contributions
    }
}
