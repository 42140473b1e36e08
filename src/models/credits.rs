//! Credit and deduction inputs for the provincial and federal formulas.
//!
//! Every field that has a published default (basic personal amounts, the
//! Canada employment amount) is optional here and filled from the year's
//! dataset when omitted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::pay_period::ensure_amount;
use crate::error::EngineResult;

/// Provincial credit inputs (variables E, K1, Q, Q1 and L of the Québec formula).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvincialCreditInputs {
    /// Value of personal tax credits from TP-1015.3-V (E). Defaults to the
    /// year's basic personal amount.
    #[serde(default)]
    pub personal_credit_amount: Option<Decimal>,
    /// Non-refundable credits authorized on TP-1016-V, annual amount (K1).
    ///
    /// Used as given. When the credits are granted after the first pay
    /// period, pass the amount already spread over the rest of the year,
    /// `P × K2 / Pr`, where K2 is the amount on the form and Pr the periods
    /// remaining.
    #[serde(default)]
    pub authorized_credits: Decimal,
    /// Amount withheld this period for class A Fonds de solidarité FTQ shares (Q).
    #[serde(default)]
    pub share_class_a_withheld: Decimal,
    /// Amount withheld this period for Fondaction shares (Q1).
    #[serde(default)]
    pub share_class_b_withheld: Decimal,
    /// Annual tax substituted when the computed annual tax is not positive.
    #[serde(default)]
    pub annual_tax_floor: Decimal,
    /// Additional source deduction requested for the period (L).
    #[serde(default)]
    pub additional_withholding: Decimal,
}

impl ProvincialCreditInputs {
    /// Rejects negative amounts and amounts above `MAX_AMOUNT`.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(amount) = self.personal_credit_amount {
            ensure_amount("provincial.personal_credit_amount", amount)?;
        }
        ensure_amount("provincial.authorized_credits", self.authorized_credits)?;
        ensure_amount("provincial.share_class_a_withheld", self.share_class_a_withheld)?;
        ensure_amount("provincial.share_class_b_withheld", self.share_class_b_withheld)?;
        ensure_amount("provincial.annual_tax_floor", self.annual_tax_floor)?;
        ensure_amount("provincial.additional_withholding", self.additional_withholding)
    }
}

/// Federal credit inputs (TC, K3 and the Canada employment amount ceiling).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditInputs {
    /// Total claim amount from the federal TD1 (TC). Defaults to the year's
    /// federal basic personal amount.
    #[serde(default)]
    pub total_claim_amount: Option<Decimal>,
    /// Other federal non-refundable credits (K3).
    #[serde(default)]
    pub other_non_refundable_credits: Decimal,
    /// Canada employment amount ceiling (CEA). Defaults to the year's value.
    #[serde(default)]
    pub employment_amount_ceiling: Option<Decimal>,
}

impl CreditInputs {
    /// Rejects negative amounts and amounts above `MAX_AMOUNT`.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(amount) = self.total_claim_amount {
            ensure_amount("federal.total_claim_amount", amount)?;
        }
        if let Some(amount) = self.employment_amount_ceiling {
            ensure_amount("federal.employment_amount_ceiling", amount)?;
        }
        ensure_amount(
            "federal.other_non_refundable_credits",
            self.other_non_refundable_credits,
        )
    }
}

/// Federal deductions and adjustments (F2, U1, HD, F1, LCF and L).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederalDeductionInputs {
    /// Pension deduction withheld this period (F2).
    #[serde(default)]
    pub pension_deduction: Decimal,
    /// Union dues withheld this period (U1).
    #[serde(default)]
    pub union_dues: Decimal,
    /// Annual prescribed-zone deduction (HD).
    #[serde(default)]
    pub region_deduction: Decimal,
    /// Other annual deductions authorized by the CRA (F1).
    #[serde(default)]
    pub other_annual_deductions: Decimal,
    /// Taxable income substituted when the computed amount is not positive.
    #[serde(default)]
    pub taxable_income_floor: Decimal,
    /// Labour-sponsored funds credit subtracted before the abatement (LCF).
    #[serde(default)]
    pub lcf_reduction: Decimal,
    /// Additional federal tax requested per period (L).
    #[serde(default)]
    pub additional_withholding: Decimal,
}

impl FederalDeductionInputs {
    /// Rejects negative amounts and amounts above `MAX_AMOUNT`.
    pub fn validate(&self) -> EngineResult<()> {
        ensure_amount("federal.pension_deduction", self.pension_deduction)?;
        ensure_amount("federal.union_dues", self.union_dues)?;
        ensure_amount("federal.region_deduction", self.region_deduction)?;
        ensure_amount("federal.other_annual_deductions", self.other_annual_deductions)?;
        ensure_amount("federal.taxable_income_floor", self.taxable_income_floor)?;
        ensure_amount("federal.lcf_reduction", self.lcf_reduction)?;
        ensure_amount("federal.additional_withholding", self.additional_withholding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_defaults_deserialize_from_empty_object() {
        let provincial: ProvincialCreditInputs = serde_json::from_str("{}").unwrap();
        let federal: CreditInputs = serde_json::from_str("{}").unwrap();
        let deductions: FederalDeductionInputs = serde_json::from_str("{}").unwrap();

        assert_eq!(provincial.personal_credit_amount, None);
        assert_eq!(federal.total_claim_amount, None);
        assert_eq!(deductions.union_dues, Decimal::ZERO);
    }

    #[test]
    fn test_negative_share_purchase_is_rejected() {
        let inputs = ProvincialCreditInputs {
            share_class_b_withheld: dec("-1"),
            ..Default::default()
        };
        match inputs.validate() {
            Err(EngineError::InvalidInput { field, .. }) => {
                assert_eq!(field, "provincial.share_class_b_withheld")
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_claim_amount_is_rejected() {
        let inputs = CreditInputs {
            total_claim_amount: Some(dec("-13229")),
            ..Default::default()
        };
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn test_oversized_credit_is_rejected() {
        let inputs = ProvincialCreditInputs {
            personal_credit_amount: Some(dec("1000000000.01")),
            ..Default::default()
        };
        match inputs.validate() {
            Err(EngineError::InvalidInput { field, .. }) => {
                assert_eq!(field, "provincial.personal_credit_amount")
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_union_dues_is_rejected() {
        let inputs = FederalDeductionInputs {
            union_dues: dec("-12.00"),
            ..Default::default()
        };
        match inputs.validate() {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "federal.union_dues"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }
}
