//! Core data models for the withholding engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod credits;
mod pay_period;
mod tax_bracket;
mod withholding_request;

pub use calculation_result::{AuditStep, AuditTrace, AuditWarning, WithholdingResult};
pub use credits::{CreditInputs, FederalDeductionInputs, ProvincialCreditInputs};
pub use pay_period::{
    ContributionCeiling, MAX_AMOUNT, MAX_PAY_PERIODS_PER_YEAR, PayPeriodContext, YearToDate,
};
pub use tax_bracket::{BracketTable, TaxBracket};
pub use withholding_request::{ContributionBasis, WithholdingRequest};
