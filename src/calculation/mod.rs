//! Calculation logic for the withholding engine.
//!
//! Each formula of the Québec (TP-1015.F) and federal (T4127) source deduction
//! guides is a pure function that takes explicit inputs and returns a result
//! struct carrying its audit step(s). [`calculate_withholding`] chains them for
//! one pay period: employment income deduction, authorized deductions,
//! annual taxable income, bracket lookup, provincial tax, the three capped
//! contributions, federal tax and net pay.

mod annual_income;
mod authorized_deduction;
mod bracket_lookup;
mod contribution;
mod employment_deduction;
mod federal_tax;
mod net_pay;
mod provincial_tax;
mod rounding;
mod withholding;

pub use annual_income::{AnnualIncomeInput, AnnualIncomeResult, calculate_annual_income};
pub use authorized_deduction::{
    AuthorizedDeduction, DistributedDeductionResult, distribute_authorized_deduction,
};
pub use bracket_lookup::lookup_bracket;
pub use contribution::{ContributionPlan, ContributionResult, calculate_contribution};
pub use employment_deduction::{EmploymentDeductionResult, calculate_employment_deduction};
pub use federal_tax::{
    FederalTaxInput, FederalTaxResult, calculate_federal_tax, contribution_credit,
};
pub use net_pay::{NetPayResult, Withholdings, calculate_net_pay};
pub use provincial_tax::{
    ProvincialTaxInput, ProvincialTaxResult, calculate_provincial_tax, share_class_b_credit,
};
pub use rounding::round_to_cents;
pub use withholding::calculate_withholding;
