//! Source Deduction Engine for Québec Employees
//!
//! This crate computes the amounts an employer withholds from one pay period's
//! remuneration for a Québec employee: provincial income tax, federal income
//! tax, QPP contributions, QPIP and EI premiums, and the resulting net pay.
//! Year-specific rates, brackets and ceilings are loaded from a YAML dataset.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
